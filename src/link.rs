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

//! Connection lifecycle and the caller-facing link API.

use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::delimiter::DelimiterMatcher;
use crate::error::{Error, Result};
use crate::read::ReadOperation;
use crate::transport::{Transport, TransportReader, TransportWriter};

/// Default deadline for `read` and `read_until` when none is given.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10_000);

/// The live stream handles. Both halves exist together or not at all.
struct Connection {
    reader: Arc<dyn TransportReader>,
    writer: Box<dyn TransportWriter>,
}

/// Serial-style manager for a single connected byte stream.
///
/// Owns at most one live connection at a time behind an exclusive lock
/// that serializes `connect`/`disconnect`/`write` against socket teardown.
/// Read operations clone the readable handle once at start and run
/// outside the lock; a concurrent teardown invalidates the handle and the
/// read surfaces an I/O error rather than hanging.
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    connection: Mutex<Option<Connection>>,
    read_timeout: Duration,
}

impl ConnectionManager {
    /// Create a manager over `transport` with the default read timeout.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            connection: Mutex::new(None),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Replace the default read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Tear down any existing connection, then open a stream to `address`.
    ///
    /// Atomic with respect to concurrent `write`/`disconnect`: the whole
    /// teardown-then-establish sequence runs under the connection lock.
    /// An in-flight read against the old handles resolves with an I/O
    /// error once they are invalidated.
    pub async fn connect(&self, address: &str) -> Result<()> {
        let mut slot = self.connection.lock().await;
        if slot.is_some() {
            debug!("closing previous connection before connecting");
        }
        Self::teardown(&mut slot)
            .await
            .map_err(|e| Error::connection("unable to close previous connection", e))?;

        info!("connecting to {}", address);
        let (reader, writer) = self
            .transport
            .open(address)
            .await
            .map_err(|e| Error::connection("unable to open stream", e))?;
        *slot = Some(Connection { reader, writer });
        info!("connected to {}", address);
        Ok(())
    }

    /// Close and clear the live connection. A no-op when none exists.
    pub async fn disconnect(&self) -> Result<()> {
        let mut slot = self.connection.lock().await;
        Self::teardown(&mut slot)
            .await
            .map_err(|e| Error::connection("unable to close connection", e))?;
        Ok(())
    }

    /// Whether a live connection exists.
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Write the whole of `data` to the peer.
    pub async fn write(&self, data: &[u8]) -> Result<()> {
        let mut slot = self.connection.lock().await;
        let conn = slot.as_mut().ok_or(Error::NotConnected)?;
        debug!("writing {} bytes", data.len());
        conn.writer.write_all(data).await?;
        Ok(())
    }

    /// Read until the peer closes the stream, or until `timeout`
    /// (defaulting to the manager's read timeout) elapses.
    ///
    /// End of stream is not an error: the bytes accumulated so far are
    /// returned, possibly none.
    pub async fn read(&self, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let reader = self.reader_handle().await?;
        ReadOperation::to_end(reader, timeout.unwrap_or(self.read_timeout))
            .run()
            .await
    }

    /// Read until `delimiter` occurs in the stream, or until end of
    /// stream, or until the timeout elapses.
    ///
    /// On a match the returned bytes include the delimiter. End of stream
    /// without a match returns everything accumulated, not an error.
    pub async fn read_until(&self, delimiter: &[u8], timeout: Option<Duration>) -> Result<Vec<u8>> {
        let matcher = DelimiterMatcher::new(delimiter).ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "delimiter must not be empty",
            ))
        })?;
        let reader = self.reader_handle().await?;
        ReadOperation::until(reader, matcher, timeout.unwrap_or(self.read_timeout))
            .run()
            .await
    }

    /// Clone the current readable handle under the lock.
    ///
    /// The lock is held only for the clone; the read operation itself
    /// runs against the snapshot and observes teardown as an I/O error.
    async fn reader_handle(&self) -> Result<Arc<dyn TransportReader>> {
        let slot = self.connection.lock().await;
        slot.as_ref()
            .map(|conn| Arc::clone(&conn.reader))
            .ok_or(Error::NotConnected)
    }

    /// Close both handles and clear the slot.
    ///
    /// The slot is emptied before anything is closed, so a close failure
    /// can never leave one handle without the other.
    async fn teardown(slot: &mut Option<Connection>) -> io::Result<()> {
        if let Some(mut conn) = slot.take() {
            conn.reader.close();
            if let Err(e) = conn.writer.close().await {
                warn!("error closing stream: {}", e);
                return Err(e);
            }
            info!("disconnected");
        }
        Ok(())
    }
}
