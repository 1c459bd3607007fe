use std::{path::PathBuf, time::Duration};

use clap::Args;
use ureq::{Agent, AgentBuilder};

use crate::{
    distance::DistanceModel,
    fetch::{FileSource, HttpSource, StoreSource},
    geocoding::Nominatim,
};

pub const DEFAULT_SERVER: &str = "http://46.101.187.63:3000";
pub const DEFAULT_STORES_PATH: &str = "/stores";
pub const DEFAULT_GEOCODER: &str = "https://nominatim.openstreetmap.org";
pub const USER_AGENT: &str = concat!("storemap/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every command. Each can also come from the
/// environment.
#[derive(Clone, Debug, Args)]
pub struct Config {
    /// Base url of the store server
    #[arg(long, env = "STOREMAP_SERVER", default_value = DEFAULT_SERVER, global = true)]
    pub server: String,

    /// Path of the store list on the server
    #[arg(long, env = "STOREMAP_STORES_PATH", default_value = DEFAULT_STORES_PATH, global = true)]
    pub stores_path: String,

    /// Read the store list from a file instead of the server
    #[arg(long, env = "STOREMAP_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// Base url of the Nominatim instance used for addresses
    #[arg(long, env = "STOREMAP_GEOCODER", default_value = DEFAULT_GEOCODER, global = true)]
    pub geocoder: String,

    /// Contact email sent to Nominatim
    #[arg(long, env = "STOREMAP_EMAIL", global = true)]
    pub email: Option<String>,

    /// Minimum gap between address lookups, in milliseconds
    #[arg(long, env = "STOREMAP_GEOCODE_INTERVAL_MS", default_value_t = 1000, global = true)]
    pub geocode_interval_ms: u64,

    /// HTTP timeout, in seconds
    #[arg(long, env = "STOREMAP_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Earth model for distances
    #[arg(long, value_enum, env = "STOREMAP_DISTANCE", default_value_t = DistanceModel::Geodesic, global = true)]
    pub distance: DistanceModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            stores_path: DEFAULT_STORES_PATH.to_string(),
            file: None,
            geocoder: DEFAULT_GEOCODER.to_string(),
            email: None,
            geocode_interval_ms: 1000,
            timeout_secs: 10,
            distance: DistanceModel::Geodesic,
        }
    }
}

impl Config {
    pub fn stores_url(&self) -> String {
        format!(
            "{}/{}",
            self.server.trim_end_matches('/'),
            self.stores_path.trim_start_matches('/')
        )
    }

    pub fn geocode_interval(&self) -> Duration {
        Duration::from_millis(self.geocode_interval_ms)
    }

    pub fn agent(&self) -> Agent {
        AgentBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
    }

    pub fn source(&self) -> Box<dyn StoreSource> {
        match &self.file {
            Some(path) => Box::new(FileSource::new(path)),
            None => Box::new(HttpSource::new(self.agent(), self.stores_url())),
        }
    }

    pub fn geocoder(&self) -> Nominatim {
        let geocoder = Nominatim::new(self.agent(), &self.geocoder);
        match &self.email {
            Some(email) => geocoder.with_email(email),
            None => geocoder,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn defaults_match() {
        let parsed = Cli::try_parse_from(["storemap"]).unwrap().config;
        let default = Config::default();
        assert_eq!(parsed.server, default.server);
        assert_eq!(parsed.stores_path, default.stores_path);
        assert_eq!(parsed.geocoder, default.geocoder);
        assert_eq!(parsed.geocode_interval_ms, default.geocode_interval_ms);
        assert_eq!(parsed.timeout_secs, default.timeout_secs);
        assert_eq!(parsed.distance, default.distance);
        assert_eq!(default.stores_url(), "http://46.101.187.63:3000/stores");
    }

    #[test]
    fn flags() {
        let config = Cli::try_parse_from([
            "storemap",
            "--server",
            "http://localhost:3000/",
            "--stores-path",
            "api/stores",
            "--distance",
            "haversine",
            "--geocode-interval-ms",
            "0",
        ])
        .unwrap()
        .config;
        assert_eq!(config.stores_url(), "http://localhost:3000/api/stores");
        assert_eq!(config.distance, DistanceModel::Haversine);
        assert_eq!(config.geocode_interval(), Duration::ZERO);
    }

    #[test]
    fn rejects_unknown_model() {
        assert!(Cli::try_parse_from(["storemap", "--distance", "flat"]).is_err());
    }
}
