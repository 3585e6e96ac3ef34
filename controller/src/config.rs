//! Process configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded
//! first if present):
//!
//! | Variable               | Default                    |                                |
//! |------------------------|----------------------------|--------------------------------|
//! | `COMMERCE_URL`         | `https://order.dominos.ca` | Commerce service base URL      |
//! | `REQUEST_TIMEOUT_SECS` | `15`                       | Per-request HTTP timeout       |
//! | `RESYNC_SECS`          | `180`                      | Steady per-key requeue cadence |
//! | `FULL_RESYNC_SECS`     | `600`                      | Full key re-list interval      |
//! | `WORKERS`              | `4`                        | Concurrent passes per engine   |
//! | `DUMP_HTTP`            | unset                      | Set to `1` to log HTTP bodies  |

use std::time::Duration;

use commerce_client::{ClientConfig, TracingDump};
use shared::{Error, Result};

use crate::engine::EngineConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub commerce_url: String,
    pub request_timeout_secs: u64,
    pub resync_secs: u64,
    pub full_resync_secs: u64,
    pub workers: usize,
    pub dump_http: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            commerce_url: std::env::var("COMMERCE_URL")
                .unwrap_or_else(|_| "https://order.dominos.ca".into()),
            request_timeout_secs: env_number("REQUEST_TIMEOUT_SECS", 15)?,
            resync_secs: env_number("RESYNC_SECS", 180)?,
            full_resync_secs: env_number("FULL_RESYNC_SECS", 600)?,
            workers: env_number("WORKERS", 4)?,
            dump_http: std::env::var("DUMP_HTTP").is_ok_and(|v| v == "1" || v == "true"),
        };

        if config.workers == 0 {
            return Err(Error::configuration("WORKERS must be at least 1"));
        }
        Ok(config)
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(&self.commerce_url).with_timeout(self.request_timeout_secs);
        if self.dump_http {
            client = client.with_dump(std::sync::Arc::new(TracingDump));
        }
        client
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            resync: Duration::from_secs(self.resync_secs),
            full_resync: Duration::from_secs(self.full_resync_secs),
            workers: self.workers,
            ..EngineConfig::default()
        }
    }
}

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::configuration(format!("{name} is not a number: '{raw}'"))),
        Err(_) => Ok(default),
    }
}
