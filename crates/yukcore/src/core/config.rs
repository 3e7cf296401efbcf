use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration for the bot
///
/// Every value is read once from the environment (a `.env` file is loaded by
/// the binary before the first access) and cached for the process lifetime.

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Code that unlocks the admin panel after `/admin`
/// Read from ADMIN_CODE environment variable
pub static ADMIN_CODE: Lazy<String> = Lazy::new(|| env::var("ADMIN_CODE").unwrap_or_else(|_| "Q1w2e3r4+".to_string()));

/// Collaborator channel that receives completed registrations
/// Read from CHANNEL_ID environment variable, either `@username` or a numeric chat id
pub static CHANNEL_ID: Lazy<String> =
    Lazy::new(|| env::var("CHANNEL_ID").unwrap_or_else(|_| "@crm_tekshiruv".to_string()));

/// JSON snapshot file path
/// Read from DATA_FILE environment variable
/// Default: bot_data.json
pub static DATA_FILE: Lazy<String> = Lazy::new(|| env::var("DATA_FILE").unwrap_or_else(|_| "bot_data.json".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: yukbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "yukbot.log".to_string()));

/// Externally reachable webhook URL (including the `/webhook` path)
/// Read from WEBHOOK_URL environment variable
pub static WEBHOOK_URL: Lazy<Option<String>> = Lazy::new(|| env::var("WEBHOOK_URL").ok());

/// Custom Bot API server
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Inbound webhook server configuration
pub mod server {
    use super::{env, Lazy};

    /// Bind host, read from HOST (default 0.0.0.0)
    pub static HOST: Lazy<String> = Lazy::new(|| env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()));

    /// Bind port, read from PORT (default 8080)
    pub static PORT: Lazy<u16> = Lazy::new(|| env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8080));
}

/// Broadcast configuration
pub mod broadcast {
    use super::{env, Duration, Lazy};

    /// Default delay between two recipients (in milliseconds)
    pub const DEFAULT_PACING_MS: u64 = 100;

    /// Delay between recipients, read from BROADCAST_PACING_MS
    pub static PACING_MS: Lazy<u64> = Lazy::new(|| {
        env::var("BROADCAST_PACING_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PACING_MS)
    });

    /// Pacing delay duration
    pub fn pacing() -> Duration {
        Duration::from_millis(*PACING_MS)
    }
}

/// Registry retention configuration
pub mod storage {
    use super::{env, Lazy};

    /// Default number of days of daily activity kept in the snapshot
    pub const DEFAULT_DAILY_RETENTION_DAYS: u32 = 90;

    /// Days of daily activity to keep, read from DAILY_RETENTION_DAYS.
    /// `0` keeps every day forever.
    pub static DAILY_RETENTION_DAYS: Lazy<u32> = Lazy::new(|| {
        env::var("DAILY_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_DAILY_RETENTION_DAYS)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    /// Document uploads to the channel go through the same client
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Constants the conversation state machine treats as opaque
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSettings {
    /// Code that grants access to the admin menu
    pub admin_code: String,
    /// Collaborator channel identity
    pub channel: String,
}

impl FlowSettings {
    pub fn new(admin_code: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            admin_code: admin_code.into(),
            channel: channel.into(),
        }
    }

    /// Builds settings from the process environment
    pub fn from_env() -> Self {
        Self::new(ADMIN_CODE.as_str(), CHANNEL_ID.as_str())
    }
}
