use anyhow::{Context, Error};
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub redis_url: String,
    pub database_url: String,
    pub database_pool_size: u32,
    pub geo_key: String,
    pub bind_addr: String,
}

impl Config {
    /// Loads `.env` when there is one, then reads the process environment.
    pub fn from_env() -> Result<Self, Error> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("loaded {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| {
                debug!("{} not set, using default: {}", key, default);
                default.to_owned()
            })
        };
        let database_pool_size = or_default("DATABASE_POOL_SIZE", "10")
            .parse::<u32>()
            .context("DATABASE_POOL_SIZE must be a positive integer")?;
        if database_pool_size == 0 {
            return Err(Error::msg("DATABASE_POOL_SIZE must be a positive integer"));
        }
        Ok(Self {
            redis_url: or_default("REDIS_URL", "redis://localhost"),
            database_url: lookup("DATABASE_URL").context("DATABASE_URL is not set")?,
            database_pool_size,
            geo_key: or_default("GEO_KEY", "locates"),
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:50051"),
        })
    }
}
