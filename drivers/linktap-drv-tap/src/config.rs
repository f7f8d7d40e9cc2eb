use linktap_api::{driver::DriverConfig, Error};
use std::sync::Arc;
use tokio::time::Duration;

pub const DEFAULT_URL: &str = "https://www.link-tap.com/api/";

const DEFAULT_TIMEOUT: u64 = 10;
const DEFAULT_REFRESH: u64 = 60;
const DEFAULT_TICK: u64 = 5;

// The account-wide parameters. One set of credentials is shared by
// every tap registered to the account.

#[derive(serde::Deserialize)]
pub struct BridgeParams {
    pub username: Arc<str>,
    pub api_key: Arc<str>,
    pub url: Option<String>,
    pub timeout: Option<u64>,
}

impl BridgeParams {
    pub fn base_url(&self) -> String {
        let url = self.url.as_deref().unwrap_or(DEFAULT_URL);

        if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{}/", url)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT).max(1))
    }
}

impl TryFrom<DriverConfig> for BridgeParams {
    type Error = Error;

    fn try_from(cfg: DriverConfig) -> std::result::Result<Self, Self::Error> {
        cfg.parse_into()
    }
}

// The parameters of one valve.

#[derive(serde::Deserialize)]
pub struct TapParams {
    pub name: Arc<str>,
    pub gateway_id: Arc<str>,
    pub tap_id: Arc<str>,
    pub refresh_interval: Option<u64>,
    pub mode_change_interval: Option<u64>,
    pub dispatch_tick: Option<u64>,
}

impl TapParams {
    /// How often the watering status is fetched.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(
            self.refresh_interval.unwrap_or(DEFAULT_REFRESH).max(1),
        )
    }

    /// The minimum time between two mode changes. Unless configured,
    /// this is the refresh interval.
    pub fn mode_change_interval(&self) -> Duration {
        self.mode_change_interval
            .map(|v| Duration::from_secs(v.max(1)))
            .unwrap_or_else(|| self.refresh_interval())
    }

    /// How often the dirty flag is inspected.
    pub fn dispatch_tick(&self) -> Duration {
        Duration::from_secs(self.dispatch_tick.unwrap_or(DEFAULT_TICK).max(1))
    }
}

impl TryFrom<DriverConfig> for TapParams {
    type Error = Error;

    fn try_from(cfg: DriverConfig) -> std::result::Result<Self, Self::Error> {
        cfg.parse_into()
    }
}
