use crate::catalog::{default_points, OceanReferencePoint, ReferenceCatalog};
use crate::error::{Error, Result};
use crate::models::Coordinate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub location: LocationConfig,
    pub marine: MarineConfig,
    pub ocean: OceanConfig,
    pub database: DatabaseConfig,
    pub profile: ProfileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_points")]
    pub reference_points: Vec<OceanReferencePoint>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LocationConfig {
    pub auto_geolocate: bool, // Use IP geolocation if true
    pub default_lat: f64,     // Used when geolocation is off or fails
    pub default_lon: f64,
    #[serde(default = "default_public_ip_url")]
    pub public_ip_url: String, // Plain-text "what is my IP" endpoint
}

fn default_public_ip_url() -> String {
    "https://api.ipify.org".to_string()
}

impl LocationConfig {
    pub fn default_coordinate(&self) -> Coordinate {
        Coordinate::new(self.default_lat, self.default_lon)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MarineConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub forecast_days: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OceanConfig {
    pub poll_interval_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProfileConfig {
    pub email: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub directory: String,
    pub level: String, // EnvFilter directive, RUST_LOG wins when set
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            directory: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                auto_geolocate: false,
                default_lat: 20.0,
                default_lon: -157.0,
                public_ip_url: default_public_ip_url(),
            },
            marine: MarineConfig {
                base_url: "https://marine-api.open-meteo.com/v1/marine".to_string(),
                timeout_seconds: 10,
                forecast_days: 1,
            },
            ocean: OceanConfig {
                poll_interval_seconds: 600,
            },
            database: DatabaseConfig {
                path: "blue_steps.db".to_string(),
            },
            profile: ProfileConfig {
                email: "diver@bluesteps.local".to_string(),
                name: "Blue Stepper".to_string(),
            },
            logging: LoggingConfig::default(),
            reference_points: default_points(),
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if let Ok(content) = fs::read_to_string(path) {
            match Self::parse(path, &content) {
                Ok(config) => return config,
                Err(e) => warn!("{}. Using defaults.", e),
            }
            return Config::default();
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Rejects deployments that could never fall back from a land coordinate.
    pub fn validate(&self) -> Result<()> {
        if self.reference_points.is_empty() {
            return Err(Error::NoReferencePoints);
        }
        Ok(())
    }

    pub fn catalog(&self) -> ReferenceCatalog {
        ReferenceCatalog::new(self.reference_points.clone())
    }
}
