use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceKind {
    Digital,
    Analog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_face")]
    pub face: FaceKind,

    /// Pomodoro indicator enabled; rewritten on every toggle.
    #[serde(default)]
    pub pomodoro: bool,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            face: default_face(),
            pomodoro: false,
            output: default_output(),
        }
    }
}

fn default_face() -> FaceKind {
    FaceKind::Digital
}

fn default_output() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cadran.svg")
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_path = config_dir.join("cadran").join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        let config_dir = config_dir.join("cadran");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.face, FaceKind::Digital);
        assert!(!config.pomodoro);
        assert_eq!(config.output, default_output());
    }

    #[test]
    fn preference_survives_a_round_trip() {
        let mut config = Config::default();
        config.face = FaceKind::Analog;
        config.pomodoro = true;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let restored: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(restored.face, FaceKind::Analog);
        assert!(restored.pomodoro);
    }

    #[test]
    fn face_names_are_lowercase() {
        let config: Config = toml::from_str("face = \"analog\"").unwrap();
        assert_eq!(config.face, FaceKind::Analog);
    }
}
