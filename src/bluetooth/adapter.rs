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

//! Adapter power state and pairing.

use anyhow::{Context, Result};
use bluer::Address;
use tracing::info;

use super::parse_address;

/// Handle on the default BlueZ adapter.
pub struct BluetoothAdapter {
    adapter: bluer::Adapter,
}

impl BluetoothAdapter {
    /// Open a BlueZ session and grab the default adapter.
    pub async fn new() -> Result<Self> {
        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        info!("Using Bluetooth adapter: {}", adapter.name());
        Ok(Self { adapter })
    }

    /// Whether the adapter is powered on.
    pub async fn is_enabled(&self) -> Result<bool> {
        Ok(self.adapter.is_powered().await?)
    }

    /// Power the adapter on.
    pub async fn enable(&self) -> Result<()> {
        self.adapter.set_powered(true).await?;
        info!("Bluetooth adapter powered on");
        Ok(())
    }

    /// The adapter's own address.
    pub async fn address(&self) -> Result<Address> {
        Ok(self.adapter.address().await?)
    }

    /// Start the bonding sequence with the device at `address`.
    pub async fn pair(&self, address: &str) -> Result<()> {
        let addr = parse_address(address)?;
        let device = self.adapter.device(addr)?;
        device
            .pair()
            .await
            .context("bonding sequence not started")?;
        info!("Paired with {}", address);
        Ok(())
    }

    /// Addresses and names of devices already paired with this adapter.
    pub async fn paired_devices(&self) -> Result<Vec<(Address, String)>> {
        let mut devices = Vec::new();

        for addr in self.adapter.device_addresses().await? {
            let device = self.adapter.device(addr)?;
            if device.is_paired().await? {
                let name = device.alias().await.unwrap_or_else(|_| addr.to_string());
                devices.push((addr, name));
            }
        }

        Ok(devices)
    }

    pub(crate) fn inner(&self) -> &bluer::Adapter {
        &self.adapter
    }
}
