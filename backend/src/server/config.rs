//! Application settings loaded via OrthoConfig, and the server configuration
//! derived from them.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use equipment_movements::domain::movement::{
    DEFAULT_GPS_TOLERANCE, DEFAULT_MAX_CYCLES_PER_GROUP, DEFAULT_SLOT_CAPACITY,
    DEFAULT_SLOT_COUNT, MovementSettings, MovementSettingsError, SlotLayout, StatusStrategy,
};
use equipment_movements::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings rejected before the server starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("bind_addr {value:?} is not a socket address")]
    BindAddr { value: String },
    #[error("status_strategy must be gps or type_tag (got {value:?})")]
    StatusStrategy { value: String },
    #[error("pool_max_size must be at least 1")]
    PoolSize,
    #[error(transparent)]
    Movement(#[from] MovementSettingsError),
}

/// Values read from CLI flags and `MOVEMENTS_*` environment variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MOVEMENTS")]
pub struct AppSettings {
    /// PostgreSQL URL; the server keeps its data in memory without one.
    pub database_url: Option<String>,
    /// Listen address, `0.0.0.0:8080` by default.
    pub bind_addr: Option<String>,
    pub max_cycles_per_group: Option<u32>,
    pub slot_count: Option<usize>,
    pub slot_capacity: Option<usize>,
    /// `gps` or `type_tag` (default).
    pub status_strategy: Option<String>,
    /// Coordinate tolerance for the `gps` strategy.
    pub gps_tolerance: Option<f64>,
    pub pool_max_size: Option<u32>,
}

impl AppSettings {
    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim().parse().map_err(|_| SettingsError::BindAddr {
            value: raw.to_owned(),
        })
    }

    pub fn pool_max_size(&self) -> Result<u32, SettingsError> {
        match self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE) {
            0 => Err(SettingsError::PoolSize),
            size => Ok(size),
        }
    }

    fn status_strategy(&self) -> Result<StatusStrategy, SettingsError> {
        let raw = self.status_strategy.as_deref().unwrap_or("type_tag");
        match raw.trim().to_ascii_lowercase().as_str() {
            "gps" => Ok(StatusStrategy::GpsMatching {
                tolerance: self.gps_tolerance.unwrap_or(DEFAULT_GPS_TOLERANCE),
            }),
            "type_tag" => Ok(StatusStrategy::TypeTag),
            _ => Err(SettingsError::StatusStrategy {
                value: raw.to_owned(),
            }),
        }
    }

    /// Validate the cycle writer settings.
    pub fn movement_settings(&self) -> Result<MovementSettings, SettingsError> {
        let layout = SlotLayout::new(
            self.slot_count.unwrap_or(DEFAULT_SLOT_COUNT),
            self.slot_capacity.unwrap_or(DEFAULT_SLOT_CAPACITY),
        )
        .map_err(MovementSettingsError::from)?;
        Ok(MovementSettings::new(
            layout,
            self.max_cycles_per_group
                .unwrap_or(DEFAULT_MAX_CYCLES_PER_GROUP),
            self.status_strategy()?,
        )?)
    }
}

/// Everything `create_server` needs, assembled by `main`.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) movement_settings: MovementSettings,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, movement_settings: MovementSettings) -> Self {
        Self {
            bind_addr,
            movement_settings,
            db_pool: None,
        }
    }

    /// Back the stores with PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and validation.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 8] = [
        "MOVEMENTS_DATABASE_URL",
        "MOVEMENTS_BIND_ADDR",
        "MOVEMENTS_MAX_CYCLES_PER_GROUP",
        "MOVEMENTS_SLOT_COUNT",
        "MOVEMENTS_SLOT_CAPACITY",
        "MOVEMENTS_STATUS_STRATEGY",
        "MOVEMENTS_GPS_TOLERANCE",
        "MOVEMENTS_POOL_MAX_SIZE",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> AppSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        AppSettings::load_from_iter([OsString::from("equipment-movements")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);
        assert_eq!(settings.database_url(), None);
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.pool_max_size(), Ok(10));
        let movement = settings.movement_settings().expect("valid defaults");
        assert_eq!(movement, MovementSettings::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("MOVEMENTS_DATABASE_URL", "postgres://db/movements"),
            ("MOVEMENTS_MAX_CYCLES_PER_GROUP", "4"),
            ("MOVEMENTS_SLOT_COUNT", "5"),
            ("MOVEMENTS_SLOT_CAPACITY", "50"),
            ("MOVEMENTS_STATUS_STRATEGY", "gps"),
            ("MOVEMENTS_GPS_TOLERANCE", "0.01"),
        ]);
        assert_eq!(settings.database_url(), Some("postgres://db/movements"));
        let movement = settings.movement_settings().expect("valid settings");
        assert_eq!(movement.max_cycles_per_group(), 4);
        assert_eq!(movement.layout().max_samples(), 250);
        assert_eq!(
            movement.status_strategy(),
            StatusStrategy::GpsMatching { tolerance: 0.01 }
        );
    }

    #[rstest]
    #[case(&[("MOVEMENTS_STATUS_STRATEGY", "vibes")])]
    #[case(&[("MOVEMENTS_SLOT_COUNT", "0")])]
    #[case(&[("MOVEMENTS_MAX_CYCLES_PER_GROUP", "0")])]
    #[case(&[("MOVEMENTS_STATUS_STRATEGY", "gps"), ("MOVEMENTS_GPS_TOLERANCE", "-1")])]
    fn invalid_movement_settings_are_rejected(#[case] overrides: &[(&str, &str)]) {
        assert!(load_with(overrides).movement_settings().is_err());
    }

    #[rstest]
    fn blank_database_url_means_memory() {
        let settings = load_with(&[("MOVEMENTS_DATABASE_URL", "  ")]);
        assert_eq!(settings.database_url(), None);
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = load_with(&[("MOVEMENTS_BIND_ADDR", "localhost")]);
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
