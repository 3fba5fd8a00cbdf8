use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::geometry::Canvas;
use crate::puzzle::{Puzzle, DEFAULT_CATALOG};

/// Smallest grid unit accepted, in pixels.
pub const MIN_UNIT_PX: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Pixels per grid unit.
    pub unit_px: f64,
    pub hold_ms: u64,
    pub fail_flash_ms: u64,
    pub countdown_ticks: u32,
    pub countdown_interval_ms: u64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Flip x like a selfie camera.
    pub mirror: bool,
    pub puzzles: Vec<Puzzle>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            unit_px: 60.0,
            hold_ms: 1000,
            fail_flash_ms: 2000,
            countdown_ticks: 5,
            countdown_interval_ms: 1000,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            mirror: false,
            puzzles: DEFAULT_CATALOG.to_vec(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid unit must be at least 1px and leave the canvas area countable, got {0}")]
    UnitSize(f64),
    #[error("canvas must have a positive size, got {0}x{1}")]
    Canvas(f64, f64),
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("puzzle catalog is empty")]
    EmptyCatalog,
    #[error("puzzle (area {}, perimeter {}) has no whole-unit solution", .0.area, .0.perimeter)]
    Infeasible(Puzzle),
}

impl GameConfig {
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.canvas_width, self.canvas_height)
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn fail_flash_duration(&self) -> Duration {
        Duration::from_millis(self.fail_flash_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.unit_px.is_finite() && self.unit_px >= MIN_UNIT_PX) {
            return Err(ConfigError::UnitSize(self.unit_px));
        }
        let canvas_ok = |v: f64| v.is_finite() && v > 0.0;
        if !canvas_ok(self.canvas_width) || !canvas_ok(self.canvas_height) {
            return Err(ConfigError::Canvas(self.canvas_width, self.canvas_height));
        }
        // a full-canvas rectangle must still have an area that fits in u32
        let cells = (self.canvas_width / self.unit_px).round().max(1.0)
            * (self.canvas_height / self.unit_px).round().max(1.0);
        if cells > u32::MAX as f64 {
            return Err(ConfigError::UnitSize(self.unit_px));
        }
        if self.hold_ms == 0 {
            return Err(ConfigError::ZeroDuration("hold_ms"));
        }
        if self.fail_flash_ms == 0 {
            return Err(ConfigError::ZeroDuration("fail_flash_ms"));
        }
        if self.countdown_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("countdown_interval_ms"));
        }
        if self.puzzles.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if let Some(bad) = self.puzzles.iter().find(|p| !p.is_feasible()) {
            return Err(ConfigError::Infeasible(*bad));
        }
        Ok(())
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "handgrid") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("handgrid_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing, unreadable or invalid files fall back to defaults.
    fn load(&self) -> GameConfig {
        let Ok(bytes) = fs::read(&self.path) else {
            return GameConfig::default();
        };
        match serde_json::from_slice::<GameConfig>(&bytes) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "ignoring invalid config");
                    GameConfig::default()
                }
            },
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unparsable config");
                GameConfig::default()
            }
        }
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.hold_duration(), Duration::from_millis(1000));
        assert_eq!(cfg.fail_flash_duration(), Duration::from_millis(2000));
        assert_eq!(cfg.puzzles.len(), 8);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = GameConfig::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = GameConfig {
            unit_px: 80.0,
            hold_ms: 1500,
            mirror: true,
            puzzles: vec![Puzzle::new(6, 10), Puzzle::new(4, 8)],
            ..GameConfig::default()
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "hold_ms": 750 }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.hold_ms, 750);
        assert_eq!(cfg.unit_px, 60.0);
    }

    #[test]
    fn corrupt_or_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, b"not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), GameConfig::default());

        fs::write(&path, br#"{ "puzzles": [] }"#).unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), GameConfig::default());
    }

    #[test]
    fn grid_unit_too_fine_is_rejected() {
        let fine = GameConfig {
            unit_px: 0.01,
            ..GameConfig::default()
        };
        assert_eq!(fine.validate(), Err(ConfigError::UnitSize(0.01)));

        let smallest = GameConfig {
            unit_px: MIN_UNIT_PX,
            ..GameConfig::default()
        };
        assert_eq!(smallest.validate(), Ok(()));

        // one-pixel units on a canvas this large overflow the area
        let vast = GameConfig {
            unit_px: MIN_UNIT_PX,
            canvas_width: 100_000.0,
            canvas_height: 100_000.0,
            ..GameConfig::default()
        };
        assert_eq!(vast.validate(), Err(ConfigError::UnitSize(MIN_UNIT_PX)));
    }

    #[test]
    fn validation_errors() {
        let bad_unit = GameConfig {
            unit_px: 0.0,
            ..GameConfig::default()
        };
        assert_matches!(bad_unit.validate(), Err(ConfigError::UnitSize(_)));

        let no_hold = GameConfig {
            hold_ms: 0,
            ..GameConfig::default()
        };
        assert_matches!(no_hold.validate(), Err(ConfigError::ZeroDuration("hold_ms")));

        let infeasible = GameConfig {
            puzzles: vec![Puzzle::new(6, 10), Puzzle::new(7, 10)],
            ..GameConfig::default()
        };
        assert_eq!(
            infeasible.validate(),
            Err(ConfigError::Infeasible(Puzzle::new(7, 10)))
        );
    }
}
