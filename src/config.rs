// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration module.
//!
//! Handles loading and saving link settings.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bluetooth settings.
    pub bluetooth: BluetoothConfig,

    /// Read operation settings.
    pub read: ReadConfig,

    /// Device discovery settings.
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BluetoothConfig {
    /// RFCOMM channel to connect on.
    pub channel: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadConfig {
    /// Default read deadline in milliseconds.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Default scan duration in milliseconds.
    pub duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bluetooth: BluetoothConfig { channel: 1 },
            read: ReadConfig { timeout_ms: 10_000 },
            discovery: DiscoveryConfig { duration_ms: 5_000 },
        }
    }
}

impl Config {
    /// Load configuration from the default location or create it.
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rfcomm-link");

        std::fs::create_dir_all(&config_dir)?;

        Self::load_from(&config_dir.join("config.toml"))
    }

    /// Load configuration from `path`, writing defaults when missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default read deadline as a duration.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read.timeout_ms)
    }

    /// Default scan duration as a duration.
    pub fn scan_duration(&self) -> Duration {
        Duration::from_millis(self.discovery.duration_ms)
    }
}
