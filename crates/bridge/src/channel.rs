//! Producer-facing half of the per-webhook message channel.

use tokio::sync::mpsc;

use crate::error::{Error, Result};

/// Sender end of a webhook's message channel.
pub type MessageSender = mpsc::Sender<String>;

/// Receiver end of a webhook's message channel.
pub type MessageReceiver = mpsc::Receiver<String>;

/// Handle a command task uses to emit progress messages.
///
/// Clones share one bounded channel. Sends suspend while the channel is full
/// (back-pressure) and fail once the delivery loop has terminated; excess
/// messages are never read.
#[derive(Clone)]
pub struct MessageSink {
    tx: MessageSender,
}

/// Build a bounded message channel and wrap its sender in a [`MessageSink`].
///
/// The bridge calls this when spawning a webhook; tests call it to drive a
/// command task directly and inspect what it pushed.
#[must_use]
pub fn message_channel(capacity: usize) -> (MessageSink, MessageReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (MessageSink::new(tx), rx)
}

impl MessageSink {
    fn new(tx: MessageSender) -> Self {
        Self { tx }
    }

    /// Queue one progress message, waiting while the channel is full.
    ///
    /// Fails with [`Error::SinkClosed`] when the delivery loop is gone; a
    /// task may treat that as a signal to stop producing output.
    pub async fn send(&self, text: impl Into<String>) -> Result<()> {
        self.tx
            .send(text.into())
            .await
            .map_err(|_| Error::SinkClosed)
    }
}
