pub mod book;
pub mod borrowing;
pub mod commands;
pub mod errors;
pub mod events;
pub mod payment;
pub mod user;
pub mod value_objects;

pub use book::{Book, BookDraft, CoverType};
pub use borrowing::Borrowing;
pub use errors::*;
pub use events::*;
pub use payment::{Payment, PaymentStatus, PaymentType};
pub use user::User;
pub use value_objects::*;
