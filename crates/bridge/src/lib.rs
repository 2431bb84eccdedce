//! Async response bridge for slash-command webhooks.
//!
//! Chat platforms demand a reply within a few seconds, while the work a
//! command triggers can run for minutes. The bridge splits the two: each
//! inbound webhook gets a bounded message channel, a *producer* task running
//! the command, and a *consumer* task POSTing every queued message to the
//! caller-supplied callback URL. The synchronous acknowledgement goes back
//! before either unit makes progress.
//!
//! Guarantees per webhook: FIFO delivery, at most `response_limit` callback
//! POSTs, producer back-pressure once the channel is full, and a hard
//! wall-clock ceiling after which both units are cancelled, with one final
//! best-effort re-delivery of the message the consumer last processed.

pub mod bridge;
pub mod channel;
pub mod delivery;
pub mod error;

pub use {
    bridge::{BridgeHandle, BridgeSettings, ResponseBridge},
    channel::{MessageSink, message_channel},
    delivery::CallbackMessage,
    error::{Error, Result},
};
