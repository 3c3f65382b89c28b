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

//! Single-assignment completion cell shared by the racing paths of a
//! read operation.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// A result cell that resolves at most once.
///
/// Up to three writers race on `try_resolve` (reader success, reader
/// error, timeout); only the first call takes effect. Exactly one caller
/// awaits the outcome via `wait`.
pub(crate) struct Completion<T> {
    resolved: AtomicBool,
    cell: Mutex<Option<T>>,
    notify: Notify,
}

impl<T> Completion<T> {
    pub fn new() -> Self {
        Self {
            resolved: AtomicBool::new(false),
            cell: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    /// Whether the cell has already been resolved.
    ///
    /// Racing writers query this before side effects; a `true` here means
    /// some other path has already won.
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    /// Resolve the cell with `value` if no other writer got there first.
    ///
    /// Returns `true` for the single winning call; every later call is a
    /// no-op returning `false` and `value` is dropped.
    pub fn try_resolve(&self, value: T) -> bool {
        if self
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        *self.cell.lock() = Some(value);
        self.notify.notify_one();
        true
    }

    /// Wait for resolution and take the outcome.
    ///
    /// Must be called by at most one task; the stored permit of
    /// `notify_one` makes the wakeup race-free for a single waiter.
    pub async fn wait(&self) -> T {
        loop {
            if let Some(value) = self.cell.lock().take() {
                return value;
            }
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_resolution_wins() {
        let signal = Completion::new();
        assert!(signal.try_resolve(1));
        assert!(!signal.try_resolve(2));
        assert!(signal.is_resolved());
    }

    #[tokio::test]
    async fn wait_returns_first_value() {
        let signal = Completion::new();
        signal.try_resolve("first");
        signal.try_resolve("second");
        assert_eq!(signal.wait().await, "first");
    }

    #[tokio::test]
    async fn wait_before_resolution() {
        let signal = Arc::new(Completion::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::task::yield_now().await;
        signal.try_resolve(42u32);
        assert_eq!(waiter.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn concurrent_writers_single_winner() {
        let signal = Arc::new(Completion::new());
        let mut tasks = Vec::new();
        for i in 0..8 {
            let signal = Arc::clone(&signal);
            tasks.push(tokio::spawn(async move { signal.try_resolve(i) }));
        }
        let mut wins = 0;
        for task in tasks {
            if task.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
