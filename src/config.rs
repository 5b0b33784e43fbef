/*
 * Responsibility
 * - 環境変数の読み込み (PORT, JWT_PUBLIC_KEY_BASE64, QUEUE_URL など)
 * - 設定値のバリデーション (不正なら起動失敗)
 * - 公開鍵の未設定は起動失敗にしない (リクエスト単位で 500 を返す)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub request_timeout_seconds: u64,

    // base64(SPKI PEM). Optional at startup on purpose.
    pub jwt_public_key_base64: Option<String>,
    pub jwt_leeway_seconds: u64,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    pub queue_url: Option<Url>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("jwt_public_key_set", &self.jwt_public_key_base64.is_some())
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("queue_url_set", &self.queue_url.is_some())
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let request_timeout_seconds = non_empty("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(30);

        let jwt_public_key_base64 = non_empty("JWT_PUBLIC_KEY_BASE64");

        let jwt_leeway_seconds = match non_empty("JWT_LEEWAY_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let jwt_issuer = non_empty("JWT_ISSUER");
        let jwt_audience = non_empty("JWT_AUDIENCE");

        let queue_url = match non_empty("QUEUE_URL") {
            Some(raw) => {
                let url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("QUEUE_URL"))?;
                if !matches!(url.scheme(), "redis" | "rediss") {
                    return Err(ConfigError::Invalid("QUEUE_URL"));
                }
                Some(url)
            }
            None => None,
        };

        Ok(Self {
            addr,
            app_env,
            request_timeout_seconds,
            jwt_public_key_base64,
            jwt_leeway_seconds,
            jwt_issuer,
            jwt_audience,
            queue_url,
        })
    }
}
