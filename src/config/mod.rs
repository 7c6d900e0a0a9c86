use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use log::warn;

const DEFAULT_PORT: u16 = 7000;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SESSION_TTL_DAYS: u64 = 365;
const MAX_SESSION_TTL_DAYS: u64 = 100 * 365;
const SECS_PER_DAY: u64 = 24 * 60 * 60;
const DEFAULT_HASH_ROUNDS: u32 = 100_000;

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub pages_dir: Arc<PathBuf>,
    pub users_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
    pub template_dir: Arc<PathBuf>,
    pub port: u16,
    pub host: String,
    /// Maximum time allowed to receive a request body.
    pub read_timeout: Duration,
    /// Maximum time allowed to stream a response body.
    pub write_timeout: Duration,
    pub session_ttl: Duration,
    /// PBKDF2 iteration count for new account digests.
    pub hash_rounds: u32,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            pages_dir: Arc::new(PathBuf::from("pages")),
            users_dir: Arc::new(PathBuf::from("users")),
            static_dir: Arc::new(PathBuf::from("static")),
            template_dir: Arc::new(PathBuf::from("static/html")),
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            read_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            write_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_DAYS * SECS_PER_DAY),
            hash_rounds: DEFAULT_HASH_ROUNDS,
        }
    }

    /// Create configuration rooted at a single data directory.
    ///
    /// Pages and users live in `pages/` and `users/` below `root`; assets and
    /// templates keep their defaults.
    pub fn with_data_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pages_dir: Arc::new(root.join("pages")),
            users_dir: Arc::new(root.join("users")),
            ..Self::new()
        }
    }

    /// Build configuration from `TINYWIKI_*` environment variables, falling
    /// back to defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(dir) = lookup("TINYWIKI_PAGES_DIR") {
            config.pages_dir = Arc::new(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("TINYWIKI_USERS_DIR") {
            config.users_dir = Arc::new(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("TINYWIKI_STATIC_DIR") {
            config.static_dir = Arc::new(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("TINYWIKI_TEMPLATE_DIR") {
            config.template_dir = Arc::new(PathBuf::from(dir));
        }
        if let Some(host) = lookup("TINYWIKI_HOST") {
            config.host = host;
        }
        config.port = parse_or(&lookup, "TINYWIKI_PORT", config.port);
        config.read_timeout = Duration::from_secs(parse_or(
            &lookup,
            "TINYWIKI_READ_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ));
        config.write_timeout = Duration::from_secs(parse_or(
            &lookup,
            "TINYWIKI_WRITE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ));
        let ttl_days = parse_or(&lookup, "TINYWIKI_SESSION_TTL_DAYS", DEFAULT_SESSION_TTL_DAYS);
        let ttl_days = if ttl_days > MAX_SESSION_TTL_DAYS {
            warn!(
                "TINYWIKI_SESSION_TTL_DAYS={} is too large, capping at {}",
                ttl_days, MAX_SESSION_TTL_DAYS
            );
            MAX_SESSION_TTL_DAYS
        } else {
            ttl_days
        };
        config.session_ttl = Duration::from_secs(ttl_days * SECS_PER_DAY);
        config.hash_rounds = parse_or(&lookup, "TINYWIKI_HASH_ROUNDS", DEFAULT_HASH_ROUNDS).max(1);

        config
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = IpAddr::from_str(&self.host).unwrap_or_else(|_| {
            warn!("Invalid host '{}', binding to {}", self.host, DEFAULT_HOST);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        });
        SocketAddr::new(ip, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}='{}'", key, raw);
            default
        }),
        None => default,
    }
}
