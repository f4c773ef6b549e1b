mod errors;
mod payment_service;

pub use errors::{PaymentApplicationError, Result};
pub use payment_service::{
    calculate_fine, create_payment, get_payment, list_payments, set_paid_status,
};
