use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::time::Duration;
use clap::Args;

pub const DEFAULT_PLUGINS_URL: &str = "https://bakkesplugins.com/plugin-search?style=list";

#[derive(Args, Debug, Clone)]
pub struct FlatConfig {
    #[arg(long, env = "PORT", default_value_t = 5000, help = "Port to listen on")]
    port: u16,

    #[arg(long, env = "DB_PATH", default_value = "tirl.db.json", help = "Operation log file")]
    db_path: PathBuf,

    #[arg(long, env = "ADMIN_KEY", help = "Shared secret for the admin endpoints")]
    admin_key: Option<String>,

    #[arg(long, env = "APP_ENV", default_value = "production", help = "'development' includes error causes in responses")]
    app_env: String,

    #[arg(long, env = "PLUGINS_URL", default_value = DEFAULT_PLUGINS_URL, help = "Plugin catalog page to scrape")]
    plugins_url: String,

    #[arg(long, env = "PLUGINS_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    plugins_timeout: Duration,

    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 100, help = "Requests allowed per client per window")]
    rate_limit_max: u32,

    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value = "15m", value_parser = humantime::parse_duration)]
    rate_limit_window: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfiguration,
    pub db: DbConfiguration,
    pub plugins: PluginsConfiguration,
    pub rate_limit: RateLimitConfiguration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }
}

/// Admin secret that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminKey(String);

impl AdminKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for AdminKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminKey(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfiguration {
    pub port: u16, // PORT
    pub app_env: AppEnv, // APP_ENV
    pub admin_key: Option<AdminKey>, // ADMIN_KEY
}

#[derive(Debug, Clone)]
pub struct DbConfiguration {
    pub db_path: PathBuf, // DB_PATH
}

#[derive(Debug, Clone)]
pub struct PluginsConfiguration {
    pub url: String, // PLUGINS_URL
    pub timeout: Duration, // PLUGINS_TIMEOUT
}

#[derive(Debug, Clone)]
pub struct RateLimitConfiguration {
    pub max_requests: u32, // RATE_LIMIT_MAX
    pub window: Duration, // RATE_LIMIT_WINDOW
}

impl From<FlatConfig> for Config {
    fn from(value: FlatConfig) -> Self {
        Config {
            server: ServerConfiguration {
                port: value.port,
                app_env: AppEnv::parse(&value.app_env),
                admin_key: value.admin_key.filter(|x| !x.is_empty()).map(AdminKey),
            },
            db: DbConfiguration {
                db_path: value.db_path,
            },
            plugins: PluginsConfiguration {
                url: value.plugins_url,
                timeout: value.plugins_timeout,
            },
            rate_limit: RateLimitConfiguration {
                max_requests: value.rate_limit_max,
                window: value.rate_limit_window,
            },
        }
    }
}
