//! Per-connection outbound queue.
//!
//! Pushing never blocks: the queue is unbounded and drained by the
//! connection's writer task, so a slow peer never stalls the sender.

use tokio::sync::mpsc;

use super::entity::ChatEvent;

/// Frame queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Event(ChatEvent),
    /// Close the connection normally with the given reason.
    Close(String),
    /// Close the connection because the server is going away.
    Shutdown,
}

/// Receiving half drained by the writer task.
pub type OutboxReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Sending half held by the registry and by the connection's own loop.
#[derive(Debug, Clone)]
pub struct Outbox(mpsc::UnboundedSender<Outbound>);

impl Outbox {
    pub fn channel() -> (Self, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    /// Queue an event. Returns `false` when the writer has already gone away.
    pub fn push(&self, event: ChatEvent) -> bool {
        self.send(Outbound::Event(event))
    }

    /// Queue a normal close with `reason`.
    pub fn close(&self, reason: impl Into<String>) -> bool {
        self.send(Outbound::Close(reason.into()))
    }

    pub fn shutdown(&self) -> bool {
        self.send(Outbound::Shutdown)
    }

    fn send(&self, frame: Outbound) -> bool {
        match self.0.send(frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Dropping frame for closed outbox: {:?}", e.0);
                false
            }
        }
    }
}
