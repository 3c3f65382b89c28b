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

//! Byte-stream transport abstraction.
//!
//! The connection manager is written against these traits; the concrete
//! RFCOMM transport lives in [`crate::bluetooth`], and tests substitute an
//! in-memory stream.

use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// A way of opening a bidirectional connected byte stream to an address.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a stream to `address`, yielding its read and write halves.
    async fn open(
        &self,
        address: &str,
    ) -> io::Result<(Arc<dyn TransportReader>, Box<dyn TransportWriter>)>;
}

/// Readable half of a connected stream.
#[async_trait]
pub trait TransportReader: Send + Sync {
    /// Read a single byte, waiting until data arrives. `Ok(None)` means
    /// the peer closed the stream.
    async fn read_byte(&self) -> io::Result<Option<u8>>;

    /// Invalidate the handle: any in-flight `read_byte` wakes with an
    /// error, and further reads fail. Safe to call more than once.
    fn close(&self);
}

/// Writable half of a connected stream.
#[async_trait]
pub trait TransportWriter: Send {
    /// Write the whole of `data` and flush it to the transport.
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Shut down the write direction.
    async fn close(&mut self) -> io::Result<()>;
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionAborted, "connection closed")
}

/// Reader handle over any tokio async read half.
///
/// The inner half sits behind an async mutex so the handle can be shared;
/// `close` cancels a token rather than touching the half, which is what
/// lets it wake a read that is parked inside the underlying stream.
pub struct IoReader<R> {
    inner: Mutex<R>,
    closed: CancellationToken,
}

#[async_trait]
impl<R> TransportReader for IoReader<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    async fn read_byte(&self) -> io::Result<Option<u8>> {
        let mut inner = self.inner.lock().await;
        if self.closed.is_cancelled() {
            return Err(closed_error());
        }
        tokio::select! {
            _ = self.closed.cancelled() => Err(closed_error()),
            res = inner.read_u8() => match res {
                Ok(byte) => Ok(Some(byte)),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
                Err(e) => Err(e),
            },
        }
    }

    fn close(&self) {
        self.closed.cancel();
    }
}

/// Writer handle over any tokio async write half.
pub struct IoWriter<W> {
    inner: W,
}

#[async_trait]
impl<W> TransportWriter for IoWriter<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data).await?;
        self.inner.flush().await
    }

    async fn close(&mut self) -> io::Result<()> {
        self.inner.shutdown().await
    }
}

/// Wrap a pair of stream halves into transport handles.
pub fn io_pair<R, W>(reader: R, writer: W) -> (Arc<dyn TransportReader>, Box<dyn TransportWriter>)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let reader = IoReader {
        inner: Mutex::new(reader),
        closed: CancellationToken::new(),
    };
    (Arc::new(reader), Box::new(IoWriter { inner: writer }))
}
