use crate::{
    base::Player,
    error::{Error, Result},
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    pub color: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub server_url: String,
    pub canvas_size: u32,
    pub grid_color: u32,
    pub grid_line_width: f32,
    pub personal_player: PlayerConfig,
    pub computer_player: PlayerConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3000".to_string(),
            canvas_size: 400,
            grid_color: 0x596575,
            grid_line_width: 3.0,
            personal_player: PlayerConfig {
                name: "You".to_string(),
                color: 0x33b4d6,
            },
            computer_player: PlayerConfig {
                name: "Computer".to_string(),
                color: 0x2ce0b7,
            },
        }
    }
}

impl GlobalConfig {
    pub const CANVAS_SIZE_RANGE: std::ops::RangeInclusive<u32> = 150..=1200;

    pub fn load() -> Result<Self> {
        let path = crate::utils::config_path()?;
        debug!("Loading config from {}", path.to_string_lossy());
        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text)?;
        info!("Config loaded from {}", path.to_string_lossy());
        Ok(config)
    }

    /// Load the config, falling back to the defaults. The flag tells whether the config file may
    /// be written back on exit: a file that exists but could not be read is left untouched.
    pub fn load_or_default() -> (Self, bool) {
        Self::or_default(Self::load())
    }

    fn or_default(loaded: Result<Self>) -> (Self, bool) {
        match loaded {
            Ok(config) => (config, true),
            Err(Error::IO(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config file yet, using default config");
                (Self::default(), true)
            },
            Err(e) => {
                warn!("Failed to load config ({}), using default config without saving it", e);
                (Self::default(), false)
            },
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = crate::utils::config_path()?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        info!("Config saved to {}", path.to_string_lossy());
        Ok(())
    }

    /// Parse and sanitize a config file. Missing keys, including keys inside a player section,
    /// take their default value. Invalid values fall back to defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let overrides: toml::Table = toml::from_str(text)?;
        let mut merged = match toml::Value::try_from(GlobalConfig::default())? {
            toml::Value::Table(table) => table,
            _ => toml::Table::new(),
        };
        merge(&mut merged, overrides);
        let mut config: GlobalConfig = toml::Value::Table(merged).try_into()?;
        config.sanitize();
        Ok(config)
    }

    fn sanitize(&mut self) {
        let defaults = GlobalConfig::default();
        if !Self::CANVAS_SIZE_RANGE.contains(&self.canvas_size) {
            warn!(
                "canvas_size {} out of range {:?}, clamping",
                self.canvas_size,
                Self::CANVAS_SIZE_RANGE
            );
            self.canvas_size = self
                .canvas_size
                .clamp(*Self::CANVAS_SIZE_RANGE.start(), *Self::CANVAS_SIZE_RANGE.end());
        }
        if !(self.grid_line_width.is_finite() && self.grid_line_width > 0.0) {
            warn!("Invalid grid_line_width {}, using default", self.grid_line_width);
            self.grid_line_width = defaults.grid_line_width;
        }
        if let Err(e) = crate::net::protocol::endpoint(&self.server_url) {
            warn!("Invalid server_url '{}': {}, using default", self.server_url, e);
            self.server_url = defaults.server_url;
        }
    }

    pub fn personal_player(&self) -> Player {
        Player::personal(&self.personal_player.name, self.personal_player.color)
    }

    pub fn computer_player(&self) -> Player {
        Player::computer(&self.computer_player.name, self.computer_player.color)
    }
}

fn merge(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(value)) => merge(inner, value),
            (Some(slot), value) => *slot = value,
            (None, value) => {
                base.insert(key, value);
            },
        }
    }
}
