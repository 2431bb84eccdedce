//! Per-webhook producer/consumer orchestration.
//!
//! `ResponseBridge::spawn` wires one webhook end to end: a bounded channel,
//! a producer unit running the command task, a consumer unit delivering
//! messages to the callback URL, and a supervisor enforcing the wall-clock
//! ceiling on both. The caller gets a handle back immediately and never
//! waits on either unit.

use std::{future::Future, time::Duration};

use {
    tokio::{task::JoinHandle, time},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
    url::Url,
    uuid::Uuid,
};

use gantry_config::BridgeConfig;

use crate::{
    channel::{MessageReceiver, MessageSink, message_channel},
    delivery::deliver,
    error::{Error, Result},
};

/// Tuning knobs for the async response bridge.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Channel capacity, and the hard cap on deliveries per webhook.
    /// Must be at least 1.
    pub response_limit: usize,
    /// Wall-clock ceiling on the producer and consumer units.
    pub response_timeout: Duration,
    /// HTTP timeout for a single callback POST.
    pub callback_timeout: Duration,
    /// Bound on the consumer's final flush after cancellation.
    pub flush_timeout: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from(&BridgeConfig::default())
    }
}

impl From<&BridgeConfig> for BridgeSettings {
    fn from(cfg: &BridgeConfig) -> Self {
        Self {
            response_limit: cfg.response_limit,
            response_timeout: cfg.response_timeout(),
            callback_timeout: cfg.callback_timeout(),
            flush_timeout: cfg.flush_timeout(),
        }
    }
}

/// Bridges slash-command tasks to asynchronous callback deliveries.
///
/// One instance serves the whole process; each webhook gets its own channel
/// and task pair from [`ResponseBridge::spawn`].
pub struct ResponseBridge {
    http: reqwest::Client,
    settings: BridgeSettings,
}

impl ResponseBridge {
    /// Build a bridge with its own HTTP client for callback deliveries.
    ///
    /// Fails when `response_limit` is zero; the channel needs room for at
    /// least one message.
    pub fn new(settings: BridgeSettings) -> Result<Self> {
        if settings.response_limit == 0 {
            return Err(Error::InvalidResponseLimit);
        }
        let http = reqwest::Client::builder()
            .timeout(settings.callback_timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    /// Run `task` against a fresh message channel and deliver everything it
    /// pushes to `callback_url`.
    ///
    /// Returns immediately; producer, consumer, and the supervising ceiling
    /// run as detached tasks. Dropping the handle leaves them running;
    /// [`BridgeHandle::cancel`] fires the ceiling early.
    pub fn spawn<F, Fut>(
        &self,
        callback_url: Url,
        command: impl Into<String>,
        task: F,
    ) -> BridgeHandle
    where
        F: FnOnce(MessageSink) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let run_id = Uuid::new_v4();
        let command = command.into();
        let cancel = CancellationToken::new();
        let (sink, rx) = message_channel(self.settings.response_limit);

        debug!(%run_id, %command, url = %callback_url, "webhook bridge started");

        // The producer keeps a second sink for the failure notice; the
        // channel closes once both are dropped at the end of its scope.
        let failure_sink = sink.clone();
        let producer = tokio::spawn(run_producer(
            task(sink),
            failure_sink,
            command,
            cancel.clone(),
            run_id,
        ));
        let consumer = tokio::spawn(run_consumer(
            rx,
            self.http.clone(),
            callback_url,
            cancel.clone(),
            self.settings.response_limit,
            self.settings.flush_timeout,
            run_id,
        ));
        let supervisor = tokio::spawn(run_supervisor(
            producer,
            consumer,
            cancel.clone(),
            self.settings.response_timeout,
            run_id,
        ));

        BridgeHandle {
            run_id,
            cancel,
            supervisor,
        }
    }
}

/// Handle to one webhook's producer/consumer pair.
#[derive(Debug)]
pub struct BridgeHandle {
    run_id: Uuid,
    cancel: CancellationToken,
    supervisor: JoinHandle<()>,
}

impl BridgeHandle {
    /// Correlation id attached to every log line of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Fire the cancellation ceiling now (shutdown, tests).
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until both units have terminated.
    pub async fn finished(self) {
        let _ = self.supervisor.await;
    }
}

/// Producer unit: drive the command task, then close the channel.
///
/// A failing task turns into a marked message so the operator sees the
/// failure in the channel rather than only in server logs. Cancellation
/// drops the task future at its current suspension point.
async fn run_producer<Fut>(
    task: Fut,
    failure_sink: MessageSink,
    command: String,
    cancel: CancellationToken,
    run_id: Uuid,
) where
    Fut: Future<Output = anyhow::Result<()>>,
{
    tokio::select! {
        result = task => match result {
            Ok(()) => debug!(%run_id, %command, "command task completed"),
            Err(error) => {
                warn!(%run_id, %command, error = %error, "command task failed");
                let notice = format!("⚠️ {command} failed: {error}");
                if failure_sink.send(notice).await.is_err() {
                    debug!(
                        %run_id,
                        %command,
                        "delivery loop gone before failure notice could be queued"
                    );
                }
            },
        },
        () = cancel.cancelled() => {
            info!(%run_id, %command, "command task cancelled at response window ceiling");
        },
    }
}

/// Consumer unit: deliver queued messages in FIFO order, at most `limit`
/// of them, stopping when the channel closes or the ceiling cancels it.
///
/// Cancellation never abandons a message silently: an in-flight POST is
/// allowed to finish, and when the token fires while the consumer waits at
/// the take point, the message it last processed gets one bounded,
/// best-effort re-delivery before the unit terminates.
async fn run_consumer(
    mut rx: MessageReceiver,
    http: reqwest::Client,
    callback_url: Url,
    cancel: CancellationToken,
    limit: usize,
    flush_timeout: Duration,
    run_id: Uuid,
) {
    let mut delivered = 0usize;
    // Most recent message taken from the channel, kept for the final flush.
    let mut last: Option<String> = None;

    for _ in 0..limit {
        let message = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                if let Some(last) = &last {
                    flush_last(&http, &callback_url, run_id, last, flush_timeout).await;
                }
                info!(%run_id, delivered, "delivery loop cancelled at response window ceiling");
                return;
            },
            received = rx.recv() => match received {
                Some(message) => message,
                // Producer finished and the channel is drained.
                None => break,
            },
        };

        deliver(&http, &callback_url, run_id, &message).await;
        delivered += 1;
        last = Some(message);

        if cancel.is_cancelled() {
            // The in-flight send was the final one.
            info!(%run_id, delivered, "delivery loop cancelled after in-flight send");
            return;
        }
    }

    debug!(%run_id, delivered, "delivery loop finished");
}

async fn flush_last(
    http: &reqwest::Client,
    callback_url: &Url,
    run_id: Uuid,
    text: &str,
    bound: Duration,
) {
    if time::timeout(bound, deliver(http, callback_url, run_id, text))
        .await
        .is_err()
    {
        warn!(%run_id, flush_secs = bound.as_secs(), "final flush abandoned");
    }
}

/// Supervisor: let both units run to completion, or cancel them when the
/// response window elapses. Cancellation must not deadlock, so after firing
/// the token it still awaits both units: the consumer's flush is bounded
/// and the producer drops its task future at the next suspension point.
async fn run_supervisor(
    producer: JoinHandle<()>,
    consumer: JoinHandle<()>,
    cancel: CancellationToken,
    ceiling: Duration,
    run_id: Uuid,
) {
    let both = async move {
        let _ = producer.await;
        let _ = consumer.await;
    };
    tokio::pin!(both);

    tokio::select! {
        () = &mut both => {
            debug!(%run_id, "webhook bridge finished");
        },
        () = time::sleep(ceiling) => {
            info!(%run_id, ceiling_secs = ceiling.as_secs(), "response window elapsed, cancelling");
            cancel.cancel();
            both.await;
            debug!(%run_id, "webhook bridge finished after cancellation");
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let cfg = BridgeConfig {
            response_limit: 3,
            response_timeout_secs: 60,
            callback_timeout_secs: 10,
            flush_timeout_secs: 2,
        };
        let settings = BridgeSettings::from(&cfg);
        assert_eq!(settings.response_limit, 3);
        assert_eq!(settings.response_timeout, Duration::from_secs(60));
        assert_eq!(settings.callback_timeout, Duration::from_secs(10));
        assert_eq!(settings.flush_timeout, Duration::from_secs(2));
    }

    #[test]
    fn default_settings_match_service_constants() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.response_limit, 5);
        assert_eq!(settings.response_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn zero_response_limit_is_rejected() {
        let settings = BridgeSettings {
            response_limit: 0,
            ..BridgeSettings::default()
        };
        assert!(matches!(
            ResponseBridge::new(settings),
            Err(Error::InvalidResponseLimit)
        ));
    }
}
