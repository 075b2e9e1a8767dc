//! Request/response transport between roles.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use pagesmith_protocols::{Envelope, Reply, RouterError};

const MAILBOX_CAPACITY: usize = 32;

/// Whether a handler answered inline or kept the responder for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The responder was used before `handle` returned.
    Done,
    /// The responder moved into a spawned task that answers later.
    Pending,
}

/// One-shot answer callback.
///
/// Sending consumes the responder so it fires at most once. A responder
/// dropped without an answer replies with an error, so every caller hears
/// back exactly once.
pub struct Responder {
    tx: Option<oneshot::Sender<Reply>>,
    kind: String,
}

impl Responder {
    pub fn send(mut self, reply: Reply) {
        if let Some(tx) = self.tx.take() {
            if tx.send(reply).is_err() {
                debug!("Caller stopped waiting for {} reply", self.kind);
            }
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("{} handled without a reply", self.kind);
            let _ = tx.send(Reply::error(format!("No response for {}", self.kind)));
        }
    }
}

/// A message plus the way to answer it.
pub struct Request {
    pub envelope: Envelope,
    pub responder: Responder,
}

/// Message handler of one role.
///
/// `handle` is synchronous so the dispatch decision is made before the next
/// message is taken; long work is spawned and returns [`Dispatch::Pending`].
pub trait Handler: Send {
    fn handle(&mut self, request: Request) -> Dispatch;
}

/// Sending side of a mailbox.
#[derive(Clone)]
pub struct Address {
    name: String,
    tx: mpsc::Sender<Request>,
}

impl Address {
    /// Whether the receiving task is still running.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Deliver `envelope` and wait for the reply.
    pub async fn send(&self, envelope: Envelope) -> Result<Reply, RouterError> {
        let kind = envelope.message.type_name().to_string();
        let (tx, rx) = oneshot::channel();
        let request = Request {
            envelope,
            responder: Responder {
                tx: Some(tx),
                kind: kind.clone(),
            },
        };

        debug!("Sending {} to {}", kind, self.name);
        self.tx
            .send(request)
            .await
            .map_err(|_| RouterError::Unreachable(self.name.clone()))?;
        rx.await.map_err(|_| RouterError::ChannelClosed)
    }

    /// Deliver `envelope` without waiting for the reply.
    pub async fn post(&self, envelope: Envelope) -> Result<(), RouterError> {
        let kind = envelope.message.type_name().to_string();
        let request = Request {
            envelope,
            responder: Responder { tx: None, kind },
        };
        self.tx
            .send(request)
            .await
            .map_err(|_| RouterError::Unreachable(self.name.clone()))
    }
}

/// Receiving side of a mailbox.
pub struct Mailbox {
    name: String,
    rx: mpsc::Receiver<Request>,
}

impl Mailbox {
    pub async fn recv(&mut self) -> Option<Request> {
        self.rx.recv().await
    }

    /// Feed every request to `handler` until all addresses are dropped.
    pub async fn serve<H: Handler>(mut self, mut handler: H) {
        while let Some(request) = self.rx.recv().await {
            let kind = request.envelope.message.type_name().to_string();
            let dispatch = handler.handle(request);
            debug!("{} handled {} ({:?})", self.name, kind, dispatch);
        }
        debug!("{} mailbox closed", self.name);
    }
}

/// Create a connected address/mailbox pair.
pub fn mailbox(name: impl Into<String>) -> (Address, Mailbox) {
    let name = name.into();
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    (
        Address {
            name: name.clone(),
            tx,
        },
        Mailbox { name, rx },
    )
}
