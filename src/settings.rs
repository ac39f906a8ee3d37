use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EstabError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_reference_path")]
    pub reference_path: String,
    #[serde(default = "default_time_factor_divisor")]
    pub time_factor_divisor: f64,
    #[serde(default = "default_shift_minutes")]
    pub shift_minutes: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_reference_path() -> String {
    "time_factors.xlsx".to_string()
}

/// Converts item_value * avg_time_factor into minutes per working day.
fn default_time_factor_divisor() -> f64 {
    1500.0
}

fn default_shift_minutes() -> f64 {
    240.0
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_preview_rows() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reference_path: default_reference_path(),
            time_factor_divisor: default_time_factor_divisor(),
            shift_minutes: default_shift_minutes(),
            output_dir: default_output_dir(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Settings {
    /// Update one field from its string form, as given on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let bad = |e: &dyn std::fmt::Display| EstabError::Settings(format!("{key}: {e}"));
        match key {
            "reference_path" => self.reference_path = value.to_string(),
            "time_factor_divisor" => self.time_factor_divisor = value.parse().map_err(|e| bad(&e))?,
            "shift_minutes" => self.shift_minutes = value.parse().map_err(|e| bad(&e))?,
            "output_dir" => self.output_dir = value.to_string(),
            "preview_rows" => self.preview_rows = value.parse().map_err(|e| bad(&e))?,
            _ => return Err(EstabError::Settings(format!("unknown key '{key}'"))),
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("reference_path", self.reference_path.clone()),
            ("time_factor_divisor", self.time_factor_divisor.to_string()),
            ("shift_minutes", self.shift_minutes.to_string()),
            ("output_dir", self.output_dir.clone()),
            ("preview_rows", self.preview_rows.to_string()),
        ]
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("estab")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| EstabError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            reference_path: "/srv/factors.xlsx".to_string(),
            time_factor_divisor: 1.0,
            shift_minutes: 480.0,
            output_dir: "/tmp/out".to_string(),
            preview_rows: 5,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.reference_path, "/srv/factors.xlsx");
        assert_eq!(loaded.time_factor_divisor, 1.0);
        assert_eq!(loaded.shift_minutes, 480.0);
        assert_eq!(loaded.preview_rows, 5);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.time_factor_divisor, 1500.0);
        assert_eq!(s.shift_minutes, 240.0);
        assert_eq!(s.reference_path, "time_factors.xlsx");
        assert_eq!(s.preview_rows, 20);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"shift_minutes": 480}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.shift_minutes, 480.0);
        assert_eq!(s.time_factor_divisor, 1500.0);
        assert_eq!(s.output_dir, ".");
    }

    #[test]
    fn test_set_parses_values() {
        let mut s = Settings::default();
        s.set("time_factor_divisor", "1").unwrap();
        s.set("output_dir", "reports").unwrap();
        assert_eq!(s.time_factor_divisor, 1.0);
        assert_eq!(s.output_dir, "reports");
        assert!(s.set("shift_minutes", "eight hours").is_err());
        assert!(s.set("colour", "blue").is_err());
    }
}
