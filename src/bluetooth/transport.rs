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

//! RFCOMM transport implementation.

use async_trait::async_trait;
use bluer::rfcomm::{SocketAddr, Stream};
use std::io;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::parse_address;
use crate::transport::{io_pair, Transport, TransportReader, TransportWriter};

/// Standard SPP UUID.
pub const SPP_UUID: Uuid = Uuid::from_u128(0x00001101_0000_1000_8000_00805F9B34FB);

/// RFCOMM channel the serial port profile conventionally listens on.
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Transport over classic-Bluetooth RFCOMM sockets.
pub struct RfcommTransport {
    channel: u8,
}

impl RfcommTransport {
    /// Transport connecting on `channel`.
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }
}

impl Default for RfcommTransport {
    fn default() -> Self {
        Self::new(DEFAULT_RFCOMM_CHANNEL)
    }
}

#[async_trait]
impl Transport for RfcommTransport {
    async fn open(
        &self,
        address: &str,
    ) -> io::Result<(Arc<dyn TransportReader>, Box<dyn TransportWriter>)> {
        let addr = parse_address(address)?;
        debug!(
            "Opening RFCOMM stream to {} on channel {} (SPP {})",
            addr, self.channel, SPP_UUID
        );
        let stream = Stream::connect(SocketAddr::new(addr, self.channel)).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(io_pair(read_half, write_half))
    }
}
