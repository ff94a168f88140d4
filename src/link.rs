//! Pull links: the request/response handshake between two adjacent stages.
//!
//! A link is a pair of bounded channels. The consumer side ([`Puller`]) sends
//! one request token and then waits for one [`OrderedItem`]; the producer side
//! ([`Responder`]) waits for a request and answers with exactly one item. End
//! of sequence is signalled by disconnecting the data channel, so a pending
//! request always resolves either to an item or to `None`.
//!
//! Both ends are cheap to clone: every worker of a stage holds its own clone,
//! and a link is closed once the last clone of a side is dropped.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A value tagged with its position in the producer's encounter order.
///
/// Within one producer `seq` starts at 0 and strictly increases. It is the only
/// information used to put items back in order after parallel processing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderedItem<T> {
    pub seq: u64,
    pub value: T,
}

impl<T> OrderedItem<T> {
    pub fn new(seq: u64, value: T) -> Self {
        Self { seq, value }
    }

    /// Transform the value, keeping the sequence number.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OrderedItem<U> {
        OrderedItem {
            seq: self.seq,
            value: f(self.value),
        }
    }
}

/// Allocate a fresh link whose channels hold at most `capacity` messages.
pub(crate) fn link<T>(capacity: usize) -> (Puller<T>, Responder<T>) {
    let capacity = capacity.max(1);
    let (req_tx, req_rx) = bounded(capacity);
    let (data_tx, data_rx) = bounded(capacity);
    (
        Puller {
            requests: req_tx,
            data: data_rx,
        },
        Responder {
            requests: req_rx,
            data: data_tx,
        },
    )
}

/// Consumer end of a link.
pub(crate) struct Puller<T> {
    requests: Sender<()>,
    data: Receiver<OrderedItem<T>>,
}

impl<T> Clone for Puller<T> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            data: self.data.clone(),
        }
    }
}

impl<T> Puller<T> {
    /// Issue one request and wait for its response.
    ///
    /// Returns `None` once the producer side has closed.
    pub(crate) fn pull(&self) -> Option<OrderedItem<T>> {
        self.requests.send(()).ok()?;
        self.data.recv().ok()
    }
}

/// Producer end of a link.
pub(crate) struct Responder<T> {
    requests: Receiver<()>,
    data: Sender<OrderedItem<T>>,
}

impl<T> Clone for Responder<T> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            data: self.data.clone(),
        }
    }
}

impl<T> Responder<T> {
    pub(crate) fn requests(&self) -> &Receiver<()> {
        &self.requests
    }

    /// Answer one request. Returns `false` when every consumer is gone.
    pub(crate) fn respond(&self, item: OrderedItem<T>) -> bool {
        self.data.send(item).is_ok()
    }

    /// Drop the data side and keep only the request intake, so late requests
    /// can still be accepted and discarded.
    pub(crate) fn into_intake(self) -> Receiver<()> {
        self.requests
    }
}

/// One-shot broadcast: once tripped, every `select!` on [`Tripwire::receiver`]
/// fires and [`Tripwire::is_tripped`] returns `true`.
pub(crate) struct Tripwire {
    tripped: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    watch: Receiver<()>,
}

impl Tripwire {
    pub(crate) fn new() -> Self {
        let (trigger, watch) = bounded(0);
        Self {
            tripped: AtomicBool::new(false),
            trigger: Mutex::new(Some(trigger)),
            watch,
        }
    }

    /// Trip the wire. Returns `true` for the call that actually tripped it.
    pub(crate) fn trip(&self) -> bool {
        let mut trigger = self
            .trigger
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.tripped.store(true, Ordering::Release);
        trigger.take().is_some()
    }

    pub(crate) fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.watch
    }
}
