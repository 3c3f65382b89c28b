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

//! Error types for link operations.

use thiserror::Error;

/// Errors reported by the connection manager and read operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not be opened, or tearing down the previous
    /// connection failed. Fatal to the call; the caller may retry.
    #[error("connection failed: {reason}")]
    Connection {
        reason: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A write or read was attempted with no live connection.
    #[error("not connected")]
    NotConnected,

    /// The transport failed during an in-flight operation, including a
    /// failure induced by a concurrent teardown.
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    /// The read deadline elapsed before any other outcome resolved.
    #[error("read timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
}

impl Error {
    pub(crate) fn connection(reason: &'static str, source: std::io::Error) -> Self {
        Self::Connection { reason, source }
    }

    /// Whether this error is the read-timeout outcome, as opposed to a
    /// transport failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
