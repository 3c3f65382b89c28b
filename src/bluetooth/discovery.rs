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

//! Bounded device discovery.

use anyhow::{bail, Result};
use bluer::{AdapterEvent, Address};
use futures::{pin_mut, StreamExt};
use std::time::Duration;
use tracing::{debug, info};

use super::adapter::BluetoothAdapter;

/// Default scan duration when none is given.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_millis(5_000);

/// A device seen during a scan.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device address.
    pub address: Address,
    /// Human-readable name, falling back to the address.
    pub name: String,
    /// Whether the device is already paired with this adapter.
    pub paired: bool,
    /// Received signal strength, when the adapter reports one.
    pub rssi: Option<i16>,
}

/// Runs bounded scans against one adapter.
///
/// Each scan is an explicit start/collect/stop cycle: discovery begins,
/// device-found events accumulate until the deadline, then discovery ends
/// before the results are resolved. No scan state outlives the call.
pub struct DeviceScanner {
    adapter: bluer::Adapter,
}

impl DeviceScanner {
    /// Create a scanner for `adapter`.
    pub fn new(adapter: &BluetoothAdapter) -> Self {
        Self {
            adapter: adapter.inner().clone(),
        }
    }

    /// Discover nearby devices for `duration` (default 5 s).
    ///
    /// Fails when the adapter is not powered on. Duplicate sightings of
    /// the same address are collapsed.
    pub async fn scan(&self, duration: Option<Duration>) -> Result<Vec<DiscoveredDevice>> {
        if !self.adapter.is_powered().await? {
            bail!("Bluetooth adapter is not enabled");
        }

        let duration = duration.unwrap_or(DEFAULT_SCAN_DURATION);
        info!("Scanning for {} ms", duration.as_millis());

        let mut found: Vec<Address> = Vec::new();
        {
            // The event stream holds the discovery session; leaving this
            // block ends it before results are resolved.
            let events = self.adapter.discover_devices().await?;
            pin_mut!(events);

            let deadline = tokio::time::sleep(duration);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    _ = &mut deadline => break,
                    event = events.next() => match event {
                        Some(AdapterEvent::DeviceAdded(addr)) => {
                            if !found.contains(&addr) {
                                debug!("Device found: {}", addr);
                                found.push(addr);
                            }
                        }
                        Some(_) => {}
                        None => break,
                    },
                }
            }
        }
        info!("Scan complete, {} device(s) found", found.len());

        let mut devices = Vec::with_capacity(found.len());
        for addr in found {
            let device = self.adapter.device(addr)?;
            let name = device.alias().await.unwrap_or_else(|_| addr.to_string());
            let paired = device.is_paired().await.unwrap_or(false);
            let rssi = device.rssi().await.ok().flatten();
            devices.push(DiscoveredDevice {
                address: addr,
                name,
                paired,
                rssi,
            });
        }

        Ok(devices)
    }
}
