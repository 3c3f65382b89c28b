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

//! Bluetooth platform collaborators.
//!
//! Thin wrappers around BlueZ for adapter power state, pairing, device
//! discovery, and the RFCOMM transport. The connection manager itself
//! does not depend on anything in this module.

mod adapter;
mod discovery;
mod transport;

pub use adapter::BluetoothAdapter;
pub use discovery::{DeviceScanner, DiscoveredDevice, DEFAULT_SCAN_DURATION};
pub use transport::{RfcommTransport, DEFAULT_RFCOMM_CHANNEL, SPP_UUID};

use bluer::Address;
use std::io;

/// Parse a `XX:XX:XX:XX:XX:XX` device address.
pub(crate) fn parse_address(address: &str) -> io::Result<Address> {
    address
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid device address"))
}
