// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolwerkError};
use crate::types::FileType;

/// Well-known LPD port (RFC 1179).
pub const LPD_PORT: u16 = 515;

const CONFIG_FILE: &str = "config.json";

/// Persistent client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Port of the remote spooler (default 515).
    pub port: u16,
    /// Upper bound on connection establishment, in seconds (at least 1).
    pub connect_timeout_secs: u64,
    /// Upper bound on each socket read or write. `None` leaves it to the OS.
    pub io_timeout_secs: Option<u64>,
    /// Queue used when none is given on the command line.
    pub default_printer: Option<String>,
    /// Format used when none is given on the command line.
    pub default_file_type: FileType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: LPD_PORT,
            connect_timeout_secs: 60,
            io_timeout_secs: None,
            default_printer: None,
            default_file_type: FileType::Binary,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn io_timeout(&self) -> Option<Duration> {
        self.io_timeout_secs.map(Duration::from_secs)
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SpoolwerkError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&json)?;
        if config.port == 0 {
            return Err(SpoolwerkError::Config("port must not be 0".into()));
        }
        if config.connect_timeout_secs == 0 || config.io_timeout_secs == Some(0) {
            return Err(SpoolwerkError::Config("timeouts must be at least 1 second".into()));
        }
        Ok(config)
    }

    /// Load `config.json` from `dir`, or fall back to defaults when it does
    /// not exist. A file that exists but fails to parse is still an error.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write this config as pretty-printed JSON to `config.json` in `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(CONFIG_FILE), json)?;
        Ok(())
    }
}

/// Return the configuration directory for Spoolwerk.
pub fn config_dir() -> PathBuf {
    // Try XDG config dir, then fallback to home
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("spoolwerk");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("spoolwerk");
    }
    PathBuf::from(".spoolwerk")
}
