use anyhow::{Context, Result};
use std::str::FromStr;

use super::config_model::{Admin, AppConfig, Auth, Database, Server, Stripe, Telegram};

const DEFAULT_SUCCESS_URL: &str =
    "http://localhost:3000/payments/success?session_id={CHECKOUT_SESSION_ID}";
const DEFAULT_CANCEL_URL: &str = "http://localhost:3000/payments/cancel";

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} is not set", key))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("{} is invalid: {:?}", key, value)),
        None => Ok(default),
    }
}

pub fn load() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: parsed_or("SERVER_PORT", 3000)?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 5)?,
    };

    let auth = Auth {
        jwt_secret: required("JWT_SECRET")?,
        access_token_ttl_minutes: parsed_or("ACCESS_TOKEN_TTL_MINUTES", 60)?,
        refresh_token_ttl_minutes: parsed_or("REFRESH_TOKEN_TTL_MINUTES", 1440)?,
    };

    let stripe = Stripe {
        api_key: optional("STRIPE_API_KEY"),
        success_url: optional("PAYMENT_SUCCESS_URL")
            .unwrap_or_else(|| DEFAULT_SUCCESS_URL.to_string()),
        cancel_url: optional("PAYMENT_CANCEL_URL")
            .unwrap_or_else(|| DEFAULT_CANCEL_URL.to_string()),
    };

    let telegram = match (optional("TELEGRAM_BOT_TOKEN"), optional("TELEGRAM_CHAT_ID")) {
        (Some(bot_token), Some(chat_id)) => Some(Telegram { bot_token, chat_id }),
        (None, None) => None,
        _ => anyhow::bail!("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together"),
    };

    let admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
        (Some(email), Some(password)) => Some(Admin { email, password }),
        (None, None) => None,
        _ => anyhow::bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
    };

    Ok(AppConfig {
        server,
        database,
        auth,
        stripe,
        telegram,
        overdue_sweep_interval_secs: parsed_or("OVERDUE_SWEEP_INTERVAL_SECS", 86_400)?,
        admin,
    })
}
