//! Game and session configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_minesweeper::DEFAULT_MAX_PASSES;
use tracing::{debug, info, instrument};

/// Board dimensions and session settings.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct SweeperConfig {
    /// Number of rows.
    height: usize,

    /// Number of columns.
    width: usize,

    /// Number of mines placed on each board.
    mines: usize,

    /// Number of games in a series.
    games: usize,

    /// Seed for mine placement and guesses; entropy when absent.
    #[setters(strip_option)]
    seed: Option<u64>,

    /// Fixpoint pass limit for the knowledge base.
    max_passes: usize,

    /// Replay logged observations after every new one.
    replay_observations: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            height: 8,
            width: 8,
            mines: 8,
            games: 1,
            seed: None,
            max_passes: DEFAULT_MAX_PASSES,
            replay_observations: false,
        }
    }
}

impl SweeperConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(
            height = config.height,
            width = config.width,
            mines = config.mines,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Checks that a board can be built from these settings.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height == 0 || self.width == 0 {
            return Err(ConfigError::new(format!(
                "Board must be at least 1x1, got {}x{}",
                self.height, self.width
            )));
        }
        let cells = self.height.checked_mul(self.width).ok_or_else(|| {
            ConfigError::new(format!("Board {}x{} is too large", self.height, self.width))
        })?;
        if self.mines > cells {
            return Err(ConfigError::new(format!(
                "{} mines do not fit on {} cells",
                self.mines, cells
            )));
        }
        if self.games == 0 {
            return Err(ConfigError::new("A series needs at least one game".to_string()));
        }
        if self.max_passes == 0 {
            return Err(ConfigError::new("max_passes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
