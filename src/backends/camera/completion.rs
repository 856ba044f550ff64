// SPDX-License-Identifier: MPL-2.0

//! Exactly-once completion for asynchronous device operations
//!
//! Devices report still-capture and recording-finalize results through a
//! [`Completer`]; the session side awaits the matching [`Completion`].
//! Completing consumes the completer, so a result is delivered at most once.
//! Dropping the completer without completing resolves the completion as
//! [`Cancelled`]; dropping the completion tells the device nobody is
//! listening any more ([`Completer::is_cancelled`]).

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The operation was abandoned before it produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Operation cancelled before completion")
    }
}

impl std::error::Error for Cancelled {}

/// Create a linked completer/completion pair
pub fn completion<T>() -> (Completer<T>, Completion<T>) {
    let (tx, rx) = oneshot::channel();
    (Completer { tx }, Completion { rx })
}

/// Producer half, held by the device
#[derive(Debug)]
pub struct Completer<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Completer<T> {
    /// Deliver the result. Returns `false` if the waiting side is gone.
    pub fn complete(self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }

    /// True once the awaiting side has been dropped
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_canceled()
    }
}

/// Consumer half, awaited by the session
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct Completion<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Completion<T> {
    /// A completion that is already resolved
    pub fn ready(value: T) -> Self {
        let (completer, completion) = completion();
        completer.complete(value);
        completion
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T, Cancelled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|r| r.map_err(|_| Cancelled))
    }
}
