use crate::application::ServiceDependencies;
use crate::auth::TokenIssuer;

pub mod books;
pub mod borrowings;
pub mod payments;
pub mod users;

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    pub tokens: TokenIssuer,
}
