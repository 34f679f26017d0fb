//! Per-record operation queue.
//!
//! A ticket chain of one-shot channels: every [`SerialQueue::enqueue`] call
//! swaps itself in as the new tail and keeps the previous tail's receiver. A
//! ticket's turn starts when the previous operation's [`Turn`] is dropped, so
//! operations run strictly one at a time in the order `enqueue` was called.
//!
//! A ticket dropped before its turn does not release its successor. It sends
//! its own pending receiver down the chain, and the successor keeps waiting
//! on that instead.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

/// Wait inherited from an abandoned ticket.
#[derive(Debug)]
struct Handoff(oneshot::Receiver<Handoff>);

#[derive(Debug, Default)]
pub(crate) struct SerialQueue {
    tail: Mutex<Option<oneshot::Receiver<Handoff>>>,
}

impl SerialQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve the next position. Ordering is fixed here, synchronously.
    pub(crate) fn enqueue(&self) -> Ticket {
        let (done, next) = oneshot::channel();
        let mut tail = self.tail.lock().unwrap_or_else(PoisonError::into_inner);
        let prev = tail.replace(next);
        Ticket {
            prev,
            done: Some(done),
        }
    }
}

/// A reserved queue position.
#[derive(Debug)]
pub(crate) struct Ticket {
    prev: Option<oneshot::Receiver<Handoff>>,
    done: Option<oneshot::Sender<Handoff>>,
}

impl Ticket {
    /// Wait until every earlier ticket has finished.
    pub(crate) async fn wait(mut self) -> Turn {
        while let Some(prev) = self.prev.as_mut() {
            // A closed channel is the release signal. A handoff means the
            // predecessor was abandoned and its wait is now ours.
            self.prev = match prev.await {
                Ok(Handoff(inherited)) => Some(inherited),
                Err(_) => None,
            };
        }
        Turn {
            _done: self.done.take(),
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if let (Some(prev), Some(done)) = (self.prev.take(), self.done.take()) {
            // Err means the successor is gone too; nothing is waiting.
            let _ = done.send(Handoff(prev));
        }
    }
}

/// Exclusive turn; the next ticket proceeds once this is dropped.
#[derive(Debug)]
pub(crate) struct Turn {
    _done: Option<oneshot::Sender<Handoff>>,
}
