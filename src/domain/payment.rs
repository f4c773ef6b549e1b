use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Borrowing, BorrowingId, PaymentId};

/// 延滞罰金の倍率
pub const FINE_MULTIPLIER: i64 = 2;

/// 支払いステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// 支払い種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    /// 貸出料金
    Payment,
    /// 延滞罰金
    Fine,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Payment => "PAYMENT",
            PaymentType::Fine => "FINE",
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT" => Ok(PaymentType::Payment),
            "FINE" => Ok(PaymentType::Fine),
            _ => Err(format!("Invalid payment type: {}", s)),
        }
    }
}

/// Payment集約 - 貸出に紐づく支払い（料金または罰金）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub borrowing_id: BorrowingId,
    pub session_url: String,
    pub session_id: String,
    pub money_to_pay: Decimal,
}

impl Payment {
    /// 新しい未払いの支払いを作る
    pub fn pending(
        payment_type: PaymentType,
        borrowing_id: BorrowingId,
        session_id: String,
        session_url: String,
        money_to_pay: Decimal,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            status: PaymentStatus::Pending,
            payment_type,
            borrowing_id,
            session_url,
            session_id,
            money_to_pay,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}

/// 純粋関数：貸出日数（返却予定日 - 貸出日、日単位切り捨て）
pub fn days_borrowed(borrowing: &Borrowing) -> i64 {
    (borrowing.expected_return_date - borrowing.borrow_date)
        .num_days()
        .max(0)
}

/// 純粋関数：貸出料金 = 貸出日数 × 日額料金
pub fn borrowing_fee(borrowing: &Borrowing, daily_fee: Decimal) -> Decimal {
    Decimal::from(days_borrowed(borrowing)) * daily_fee
}

/// 純粋関数：延滞日数（実返却日 - 返却予定日、日単位切り捨て）
///
/// 未返却または期限内の返却は0。
pub fn overdue_days(borrowing: &Borrowing) -> i64 {
    borrowing
        .actual_return_date
        .map(|returned_at| (returned_at - borrowing.expected_return_date).num_days())
        .unwrap_or(0)
        .max(0)
}

/// 純粋関数：罰金 = 延滞日数 × 日額料金 × 倍率
pub fn fine_amount(borrowing: &Borrowing, daily_fee: Decimal) -> Decimal {
    Decimal::from(overdue_days(borrowing)) * daily_fee * Decimal::from(FINE_MULTIPLIER)
}
