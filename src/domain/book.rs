use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookId, BookValidationError};

/// タイトル・著者名の最大文字数
pub const MAX_TEXT_LENGTH: usize = 60;

/// 装丁
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoverType {
    #[default]
    Hard,
    Soft,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverType::Hard => "HARD",
            CoverType::Soft => "SOFT",
        }
    }
}

impl std::str::FromStr for CoverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HARD" => Ok(CoverType::Hard),
            "SOFT" => Ok(CoverType::Soft),
            _ => Err(format!("Invalid cover type: {}", s)),
        }
    }
}

/// Book集約 - カタログの1タイトル
///
/// 不変条件：inventoryは負にならない（貸出で-1、返却で+1）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

/// 書籍の作成・更新入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: i32,
    pub daily_fee: Decimal,
}

impl Book {
    /// 貸出可能な在庫があるか
    pub fn in_stock(&self) -> bool {
        self.inventory > 0
    }
}

/// 純粋関数：書籍入力を検証する
///
/// カタログ経由の書き込みでは在庫1以上・日額料金0より大を要求する。
/// 日額料金は保存時と同じくセント単位に丸めてから判定する。
pub fn validate_draft(draft: &BookDraft) -> Result<(), BookValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(BookValidationError::EmptyTitle);
    }
    if title.chars().count() > MAX_TEXT_LENGTH {
        return Err(BookValidationError::TitleTooLong);
    }
    if draft.author.chars().count() > MAX_TEXT_LENGTH {
        return Err(BookValidationError::AuthorTooLong);
    }
    if draft.inventory < 1 {
        return Err(BookValidationError::InventoryBelowOne);
    }
    if draft.daily_fee.round_dp(2) <= Decimal::ZERO {
        return Err(BookValidationError::NonPositiveDailyFee);
    }
    Ok(())
}

/// 純粋関数：検証済みの入力から新しい書籍を作る
pub fn create_book(draft: BookDraft) -> Result<Book, BookValidationError> {
    validate_draft(&draft)?;
    Ok(Book {
        id: BookId::new(),
        title: draft.title.trim().to_string(),
        author: draft.author,
        cover: draft.cover,
        inventory: draft.inventory,
        daily_fee: draft.daily_fee.round_dp(2),
    })
}

/// 純粋関数：既存の書籍を入力で置き換える（IDは保持）
pub fn update_book(book: &Book, draft: BookDraft) -> Result<Book, BookValidationError> {
    let updated = create_book(draft)?;
    Ok(Book {
        id: book.id,
        ..updated
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn draft() -> BookDraft {
        BookDraft {
            title: "Sample book".to_string(),
            author: "Same author".to_string(),
            cover: CoverType::Hard,
            inventory: 1,
            daily_fee: Decimal::new(464, 2),
        }
    }

    #[test]
    fn test_create_book_accepts_valid_draft() {
        let book = create_book(draft()).unwrap();
        assert_eq!(book.title, "Sample book");
        assert_eq!(book.daily_fee, Decimal::new(464, 2));
        assert!(book.in_stock());
    }

    #[test]
    fn test_create_book_rejects_zero_inventory() {
        let result = create_book(BookDraft {
            inventory: 0,
            ..draft()
        });
        assert_eq!(result.unwrap_err(), BookValidationError::InventoryBelowOne);
    }

    #[test]
    fn test_create_book_rejects_non_positive_fee() {
        let result = create_book(BookDraft {
            daily_fee: Decimal::ZERO,
            ..draft()
        });
        assert_eq!(result.unwrap_err(), BookValidationError::NonPositiveDailyFee);
    }

    #[test]
    fn test_create_book_rejects_fee_that_rounds_to_zero() {
        let result = create_book(BookDraft {
            daily_fee: Decimal::new(4, 3),
            ..draft()
        });
        assert_eq!(result.unwrap_err(), BookValidationError::NonPositiveDailyFee);

        let book = create_book(BookDraft {
            daily_fee: Decimal::new(6, 3),
            ..draft()
        })
        .unwrap();
        assert_eq!(book.daily_fee, Decimal::new(1, 2));
    }

    #[test]
    fn test_create_book_rejects_blank_and_long_title() {
        let blank = create_book(BookDraft {
            title: "   ".to_string(),
            ..draft()
        });
        assert_eq!(blank.unwrap_err(), BookValidationError::EmptyTitle);

        let long = create_book(BookDraft {
            title: "x".repeat(61),
            ..draft()
        });
        assert_eq!(long.unwrap_err(), BookValidationError::TitleTooLong);
    }

    #[test]
    fn test_update_book_keeps_id() {
        let book = create_book(draft()).unwrap();
        let updated = update_book(
            &book,
            BookDraft {
                title: "Renamed".to_string(),
                cover: CoverType::Soft,
                ..draft()
            },
        )
        .unwrap();
        assert_eq!(updated.id, book.id);
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.cover, CoverType::Soft);
    }

    #[test]
    fn test_cover_type_round_trips_through_str() {
        assert_eq!(CoverType::from_str("SOFT").unwrap(), CoverType::Soft);
        assert_eq!(CoverType::Hard.as_str(), "HARD");
        assert!(CoverType::from_str("paper").is_err());
    }
}
