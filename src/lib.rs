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

//! Serial-style connection manager for classic-Bluetooth RFCOMM links.
//!
//! A [`ConnectionManager`] owns at most one connected byte stream at a
//! time and exposes connect/disconnect, raw writes, and two deadline-bound
//! read modes: read to end-of-stream and read until a delimiter. Reads
//! never hang on a silent peer: a reader task races a one-shot timeout,
//! and the first of {match, end of stream, I/O error, timeout} decides the
//! outcome.
//!
//! The manager is transport-agnostic; [`bluetooth::RfcommTransport`]
//! provides the BlueZ-backed RFCOMM stream, and anything implementing
//! [`Transport`] (see [`io_pair`]) works in its place.

pub mod bluetooth;
pub mod config;
pub mod delimiter;
pub mod error;
pub mod link;
mod read;
mod signal;
pub mod transport;

pub use bluetooth::{
    BluetoothAdapter, DeviceScanner, DiscoveredDevice, RfcommTransport, DEFAULT_SCAN_DURATION,
};
pub use config::Config;
pub use delimiter::DelimiterMatcher;
pub use error::{Error, Result};
pub use link::{ConnectionManager, DEFAULT_READ_TIMEOUT};
pub use transport::{io_pair, Transport, TransportReader, TransportWriter};
