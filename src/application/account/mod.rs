mod errors;
mod user_service;

pub use errors::{AccountApplicationError, Result};
pub use user_service::{
    ProfileUpdate, authenticate, ensure_staff_account, get_profile, obtain_token, refresh_token,
    register, update_profile, verify_token,
};
