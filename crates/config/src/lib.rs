//! NetGore IO Configuration
//!
//! Loads the serialization settings from `config/ioconfig.txt`. The file holds
//! `key = value` lines; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! # Write enums by name instead of by value
//! enumnames = true
//! tempdir = /var/tmp/netgore
//! loglevel = debug
//! inspectdepth = 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use netgore_core::{EnumIoMode, Result};
use netgore_protocol::ValueWriter;

/// Default location of the config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/ioconfig.txt";

/// Serialization settings
#[derive(Debug, Clone, PartialEq)]
pub struct IoConfig {
    /// Write and read enums by name (from "enumnames" option, default: false)
    pub enum_names: bool,
    /// Directory for writer temp files (from "tempdir" option). When unset,
    /// temp files go next to the destination.
    pub temp_dir: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset (from "loglevel" option)
    pub log_level: String,
    /// How many nested node levels the inspector descends (from
    /// "inspectdepth" option, default: 2)
    pub inspect_depth: usize,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            enum_names: false,
            temp_dir: None,
            log_level: "info".into(),
            inspect_depth: 2,
        }
    }
}

impl IoConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Load configuration from [`DEFAULT_CONFIG_PATH`]
    pub fn load_default() -> Result<Self> {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Parse config file content. Unknown keys are ignored and values that
    /// fail to parse keep their defaults.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                config.parse_option(key.trim(), value.trim());
            }
        }

        config
    }

    fn parse_option(&mut self, key: &str, value: &str) {
        match key {
            "enumnames" => {
                self.enum_names = parse_bool(value).unwrap_or(false);
            }
            "tempdir" => {
                self.temp_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "loglevel" => {
                if !value.is_empty() {
                    self.log_level = value.to_lowercase();
                }
            }
            "inspectdepth" => {
                self.inspect_depth = value.parse().unwrap_or(2);
            }
            _ => {
                tracing::debug!("Ignoring unknown config option '{}'", key);
            }
        }
    }

    /// Enum mode for readers and writers
    pub fn enum_mode(&self) -> EnumIoMode {
        EnumIoMode::from_use_names(self.enum_names)
    }

    /// File writer using this config's enum mode and temp directory
    pub fn create_file_writer<P: AsRef<Path>>(&self, path: P) -> ValueWriter {
        let writer = ValueWriter::create_file(path, self.enum_mode());
        match &self.temp_dir {
            Some(dir) => writer.with_temp_dir(dir),
            None => writer,
        }
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("IO configuration:");
        tracing::info!("  Enum mode: {}", self.enum_mode().as_str());
        match &self.temp_dir {
            Some(dir) => tracing::info!("  Temp dir: {}", dir.display()),
            None => tracing::info!("  Temp dir: (next to destination)"),
        }
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Inspect depth: {}", self.inspect_depth);
    }
}

/// Accepts `true`/`false`, `1`/`0` and `yes`/`no`, case-insensitively
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
