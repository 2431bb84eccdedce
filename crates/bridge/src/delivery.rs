//! Callback delivery: one POST per message, logged, never retried.

use {
    serde::Serialize,
    tracing::{debug, warn},
    url::Url,
    uuid::Uuid,
};

/// Body POSTed to the platform's `response_url` for every follow-up message,
/// and returned as the synchronous acknowledgement body.
#[derive(Debug, Serialize)]
pub struct CallbackMessage<'a> {
    pub response_type: &'static str,
    pub text: &'a str,
}

impl<'a> CallbackMessage<'a> {
    /// Channel-visible message, the only response type this service emits.
    pub fn in_channel(text: &'a str) -> Self {
        Self {
            response_type: "in_channel",
            text,
        }
    }
}

/// POST one message to the callback URL.
///
/// Outcomes are contained here: a non-2xx status or transport error is
/// logged with the message text and never escalated; the synchronous
/// caller is long gone and retries are out of contract.
pub(crate) async fn deliver(
    client: &reqwest::Client,
    callback_url: &Url,
    run_id: Uuid,
    text: &str,
) {
    let payload = CallbackMessage::in_channel(text);
    match client.post(callback_url.clone()).json(&payload).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!(%run_id, status = %resp.status(), text, "callback delivered");
        },
        Ok(resp) => {
            warn!(
                %run_id,
                status = %resp.status(),
                text,
                url = %callback_url,
                "callback rejected"
            );
        },
        Err(error) => {
            warn!(
                %run_id,
                error = %error,
                text,
                url = %callback_url,
                "callback delivery failed"
            );
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn callback_payload_shape() {
        let msg = CallbackMessage::in_channel("Deployment complete");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "response_type": "in_channel",
                "text": "Deployment complete",
            })
        );
    }
}
