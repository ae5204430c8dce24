//! Configuration loading and typed config structures for the farm.
//!
//! The canonical configuration lives in `saverville-config.yaml` next to the
//! binary's working directory. Every field has a serde default, so a missing
//! file or a partial file both yield a usable configuration.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Environment variable overriding [`LedgerConfig::remote_timeout_ms`].
pub const REMOTE_TIMEOUT_ENV: &str = "SAVERVILLE_REMOTE_TIMEOUT_MS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level farm configuration.
///
/// Mirrors the structure of `saverville-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FarmConfig {
    /// Grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Local economy parameters.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Remote ledger connection and simulation parameters.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FarmConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SAVERVILLE_REMOTE_TIMEOUT_MS` overrides `ledger.remote_timeout_ms`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.ledger.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the farm cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.plot_count == 0 {
            return Err(ConfigError::Invalid {
                reason: "grid.plot_count must be at least 1".to_owned(),
            });
        }
        if self.economy.sale_rate.is_sign_negative() && !self.economy.sale_rate.is_zero() {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "economy.sale_rate must not be negative, got {}",
                    self.economy.sale_rate
                ),
            });
        }
        if self.economy.starting_balance.is_sign_negative()
            && !self.economy.starting_balance.is_zero()
        {
            return Err(ConfigError::Invalid {
                reason: "economy.starting_balance must not be negative".to_owned(),
            });
        }
        if self.ledger.remote_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "ledger.remote_timeout_ms must be at least 1".to_owned(),
            });
        }
        if self.ledger.failure_percent > 100 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "ledger.failure_percent must be 0-100, got {}",
                    self.ledger.failure_percent
                ),
            });
        }
        Ok(())
    }
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GridConfig {
    /// Number of plots (rendered 10 per row).
    #[serde(default = "default_plot_count")]
    pub plot_count: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            plot_count: default_plot_count(),
        }
    }
}

/// Local economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Currency credited per harvested plant sold.
    #[serde(default = "default_sale_rate")]
    pub sale_rate: Decimal,

    /// Currency balance at startup.
    #[serde(default)]
    pub starting_balance: Decimal,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            sale_rate: default_sale_rate(),
            starting_balance: Decimal::ZERO,
        }
    }
}

/// Remote ledger configuration.
///
/// `remote_timeout_ms` applies to every backend; the remaining fields drive
/// the in-memory simulated ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound on waiting for a transaction to confirm.
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,

    /// Simulated confirmation latency.
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,

    /// Simulated seed unit price, in wallet currency.
    #[serde(default = "default_seed_unit_price")]
    pub seed_unit_price: Decimal,

    /// Percentage (0-100) of simulated transactions the wallet declines.
    #[serde(default)]
    pub failure_percent: u32,

    /// Whether the simulated wallet session starts connected.
    #[serde(default = "default_true")]
    pub wallet_connected: bool,
}

impl LedgerConfig {
    /// Override the remote timeout from the environment when set.
    pub fn apply_env_overrides(&mut self) {
        if let Some(ms) = std::env::var(REMOTE_TIMEOUT_ENV)
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
        {
            self.remote_timeout_ms = ms;
        }
    }

    /// The remote timeout as a [`Duration`].
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// The simulated latency as a [`Duration`].
    pub const fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: default_remote_timeout_ms(),
            simulated_latency_ms: default_simulated_latency_ms(),
            seed_unit_price: default_seed_unit_price(),
            failure_percent: 0,
            wallet_connected: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_plot_count() -> u32 {
    saverville_world::DEFAULT_PLOT_COUNT
}

fn default_sale_rate() -> Decimal {
    Decimal::new(20, 0)
}

const fn default_remote_timeout_ms() -> u64 {
    120_000
}

const fn default_simulated_latency_ms() -> u64 {
    1_500
}

fn default_seed_unit_price() -> Decimal {
    Decimal::new(1, 2)
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FarmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.plot_count, 100);
        assert_eq!(config.economy.sale_rate, Decimal::new(20, 0));
        assert_eq!(config.economy.starting_balance, Decimal::ZERO);
        assert_eq!(config.ledger.seed_unit_price, Decimal::new(1, 2));
        assert!(config.ledger.wallet_connected);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
grid:
  plot_count: 25

economy:
  sale_rate: "15"
  starting_balance: "100"

ledger:
  remote_timeout_ms: 30000
  simulated_latency_ms: 250
  seed_unit_price: "0.05"
  failure_percent: 10
  wallet_connected: false

logging:
  level: "debug"
  format: "json"
"#;
        let config = FarmConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.grid.plot_count, 25);
        assert_eq!(config.economy.sale_rate, Decimal::new(15, 0));
        assert_eq!(config.economy.starting_balance, Decimal::new(100, 0));
        assert_eq!(config.ledger.simulated_latency(), Duration::from_millis(250));
        assert_eq!(config.ledger.seed_unit_price, Decimal::new(5, 2));
        assert_eq!(config.ledger.failure_percent, 10);
        assert!(!config.ledger.wallet_connected);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = FarmConfig::parse("grid:\n  plot_count: 9\n").unwrap_or_default();
        assert_eq!(config.grid.plot_count, 9);
        assert_eq!(config.economy, EconomyConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn zero_plots_is_invalid() {
        let result = FarmConfig::parse("grid:\n  plot_count: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn failure_percent_above_hundred_is_invalid() {
        let result = FarmConfig::parse("ledger:\n  failure_percent: 101\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let result = FarmConfig::parse("grid: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
