//! Service configuration.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`SAFEROUTE_PERSIST_DATA`)
//! 2. TOML file passed to [`ServiceConfig::load`]
//! 3. Compiled defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sr_core::GeoPoint;
use sr_core::risk::{MAX_RISK, MIN_RISK};
use sr_graph::{DEFAULT_SPEED_LIMIT_KMH, GridSource};
use sr_routing::{HeuristicKind, SafetyProfile};

use crate::{ServiceError, ServiceResult};

/// Overrides `persistence.enabled`; accepts `true`/`false`/`1`/`0`.
pub const PERSIST_ENV: &str = "SAFEROUTE_PERSIST_DATA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub persistence: PersistenceConfig,
    pub routing: RoutingConfig,
    pub grid: GridConfig,
    /// `tracing-subscriber` filter used when `SAFEROUTE_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            persistence: PersistenceConfig::default(),
            routing: RoutingConfig::default(),
            grid: GridConfig::default(),
            log_filter: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Save the graph after every successful mutation and load it at startup.
    pub enabled: bool,
    pub data_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { enabled: true, data_path: PathBuf::from("data/graph-data.json") }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub heuristic: HeuristicKind,
    /// Give up after settling this many nodes.  Unlimited when absent.
    pub max_expansions: Option<usize>,
    pub default_profile: SafetyProfile,
}

/// Synthetic grid used when no real street data is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub center: GeoPoint,
    pub rows: usize,
    pub cols: usize,
    pub spacing_m: f64,
    pub initial_risk: f64,
    pub speed_limit_kmh: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(10.3932, -75.4898),
            rows: 10,
            cols: 10,
            spacing_m: 100.0,
            initial_risk: 1.0,
            speed_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
        }
    }
}

impl GridConfig {
    /// A grid source with these settings centred on `center`.
    pub fn source(&self, center: GeoPoint) -> GridSource {
        GridSource::new(center, self.rows, self.cols, self.spacing_m)
            .with_initial_risk(self.initial_risk)
            .with_speed_limit(self.speed_limit_kmh)
    }
}

impl ServiceConfig {
    /// Read `path`, apply environment overrides and validate.
    pub fn load(path: &Path) -> ServiceResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ServiceError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: ServiceConfig =
            toml::from_str(&text).map_err(|e| ServiceError::ConfigParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML string.  Ignores the environment.
    pub fn from_toml(text: &str) -> ServiceResult<Self> {
        let config: ServiceConfig = toml::from_str(text).map_err(|e| ServiceError::ConfigParse {
            path: "<string>".to_owned(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn apply_env_overrides(&mut self) {
        let value = std::env::var(PERSIST_ENV).ok();
        self.apply_persist_override(value.as_deref());
    }

    pub(crate) fn apply_persist_override(&mut self, value: Option<&str>) {
        let Some(raw) = value else { return };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => self.persistence.enabled = true,
            "false" | "0" => self.persistence.enabled = false,
            _ => tracing::warn!(var = PERSIST_ENV, value = raw, "ignoring unrecognised override"),
        }
    }

    pub fn validate(&self) -> ServiceResult<()> {
        let invalid = |field, message: &str| {
            Err(ServiceError::ConfigInvalid { field, message: message.to_owned() })
        };
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return invalid("grid.rows/grid.cols", "must be at least 1");
        }
        if !(self.grid.spacing_m.is_finite() && self.grid.spacing_m > 0.0) {
            return invalid("grid.spacing_m", "must be a positive number of metres");
        }
        if !(MIN_RISK..=MAX_RISK).contains(&self.grid.initial_risk) {
            return invalid("grid.initial_risk", "must be between 0 and 10");
        }
        if !self.grid.center.is_valid() {
            return invalid("grid.center", "must be a valid latitude/longitude");
        }
        if self.routing.max_expansions == Some(0) {
            return invalid("routing.max_expansions", "must be at least 1 when set");
        }
        if self.persistence.enabled && self.persistence.data_path.as_os_str().is_empty() {
            return invalid("persistence.data_path", "must not be empty");
        }
        Ok(())
    }
}
