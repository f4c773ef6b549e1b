#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub stripe: Stripe,
    pub telegram: Option<Telegram>,
    pub overdue_sweep_interval_secs: u64,
    pub admin: Option<Admin>,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,
}

/// `api_key` が無い場合はインプロセスのモックゲートウェイを使う
#[derive(Debug, Clone)]
pub struct Stripe {
    pub api_key: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct Telegram {
    pub bot_token: String,
    pub chat_id: String,
}

/// 起動時に用意する職員アカウント
#[derive(Debug, Clone)]
pub struct Admin {
    pub email: String,
    pub password: String,
}
