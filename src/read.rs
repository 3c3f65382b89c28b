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

//! The read engine: a reader task racing a one-shot timeout through a
//! single-resolution completion signal.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use crate::delimiter::DelimiterMatcher;
use crate::error::{Error, Result};
use crate::signal::Completion;
use crate::transport::TransportReader;

/// One ephemeral read, either to end-of-stream or until a delimiter.
///
/// The operation owns a completion signal, an accumulation buffer, and
/// optionally delimiter-matcher state. The reader task and the timeout
/// guard are the only writers of the signal; the caller is its only
/// reader.
pub(crate) struct ReadOperation {
    reader: Arc<dyn TransportReader>,
    matcher: Option<DelimiterMatcher>,
    timeout: Duration,
}

impl ReadOperation {
    /// Read until the peer closes the stream (or the timeout fires).
    pub fn to_end(reader: Arc<dyn TransportReader>, timeout: Duration) -> Self {
        Self {
            reader,
            matcher: None,
            timeout,
        }
    }

    /// Read until `matcher`'s pattern occurs (or end-of-stream, or the
    /// timeout fires).
    pub fn until(
        reader: Arc<dyn TransportReader>,
        matcher: DelimiterMatcher,
        timeout: Duration,
    ) -> Self {
        Self {
            reader,
            matcher: Some(matcher),
            timeout,
        }
    }

    /// Run the operation to its single outcome.
    ///
    /// Exactly one of {delimiter match, end-of-stream, I/O error, timeout}
    /// resolves the signal; late arrivals from the losing paths are
    /// discarded. The call returns as soon as the signal resolves; the
    /// reader task may still be winding down in the background, where its
    /// resolution attempts are no-ops.
    pub async fn run(self) -> Result<Vec<u8>> {
        let Self {
            reader,
            mut matcher,
            timeout,
        } = self;
        let signal: Arc<Completion<Result<Vec<u8>>>> = Arc::new(Completion::new());

        let task_signal = Arc::clone(&signal);
        let task = tokio::spawn(async move {
            let mut buffer: Vec<u8> = Vec::new();
            loop {
                // The timeout may have won while we were parked in the
                // previous read; stop without further side effects.
                if task_signal.is_resolved() {
                    return;
                }
                match reader.read_byte().await {
                    Ok(Some(byte)) => {
                        buffer.push(byte);
                        if matcher.as_mut().is_some_and(|m| m.push(byte)) {
                            trace!("delimiter matched after {} bytes", buffer.len());
                            task_signal.try_resolve(Ok(std::mem::take(&mut buffer)));
                            return;
                        }
                    }
                    Ok(None) => {
                        // End of stream is a normal outcome: deliver
                        // whatever accumulated, matched or not.
                        trace!("end of stream after {} bytes", buffer.len());
                        task_signal.try_resolve(Ok(std::mem::take(&mut buffer)));
                        return;
                    }
                    Err(err) => {
                        task_signal.try_resolve(Err(Error::Io(err)));
                        return;
                    }
                }
            }
        });

        let guard_signal = Arc::clone(&signal);
        let abort = task.abort_handle();
        let elapsed_ms = timeout.as_millis() as u64;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if guard_signal.try_resolve(Err(Error::Timeout { elapsed_ms })) {
                debug!("read timed out after {} ms", elapsed_ms);
                // Best-effort cancellation; the outcome is already
                // decided either way.
                abort.abort();
            }
        });

        signal.wait().await
    }
}
