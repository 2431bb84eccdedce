//! Built-in slash commands.

use std::sync::Arc;

use {async_trait::async_trait, tracing::debug};

use gantry_bridge::MessageSink;

use crate::{
    dispatch::SlashCommand,
    remote::{RemoteOp, RemoteRunner},
};

/// Acknowledgement for `/test-hook`, fixed regardless of arguments.
pub const TEST_HOOK_ACK: &str = "OHAI! test-hook received; follow-ups are on the way";

/// Smoke-test command exercising the full webhook round trip.
///
/// Pushes six messages so that, at the default delivery cap of five, the
/// last one visibly never reaches the channel.
pub struct TestHook;

#[async_trait]
impl SlashCommand for TestHook {
    fn name(&self) -> &'static str {
        "test-hook"
    }

    fn acknowledgement(&self, _argument_text: &str) -> String {
        TEST_HOOK_ACK.to_string()
    }

    async fn run(&self, argument_text: String, sink: MessageSink) -> anyhow::Result<()> {
        let messages = [
            format!("test-hook response; the webhook round-trip works! arg: {argument_text}"),
            "another test-hook response".to_string(),
            "a third response, just to show we can".to_string(),
            "fourth response".to_string(),
            "fifth response".to_string(),
            "this sixth response should never reach the channel".to_string(),
        ];
        for message in messages {
            if sink.send(message).await.is_err() {
                // Delivery cap reached; the rest have nowhere to go.
                debug!("delivery loop closed before all test messages were queued");
                break;
            }
        }
        Ok(())
    }
}

/// Slash command backed by one remote operation.
///
/// The acknowledgement echoes the raw argument text; the task itself only
/// uses its first token as the target and forwards the rest verbatim.
pub struct RemoteCommand {
    runner: Arc<dyn RemoteRunner>,
    op: RemoteOp,
}

impl RemoteCommand {
    #[must_use]
    pub fn new(runner: Arc<dyn RemoteRunner>, op: RemoteOp) -> Self {
        Self { runner, op }
    }

    fn ack_prefix(&self) -> &'static str {
        match self.op {
            RemoteOp::Deploy => "Deploying",
            RemoteOp::Reload => "Reloading",
            RemoteOp::Rollforward => "Rolling forward",
            RemoteOp::Scheduler => "Scheduler",
            RemoteOp::Worker => "Worker",
        }
    }

    fn completion_message(&self) -> &'static str {
        match self.op {
            RemoteOp::Deploy => "Deployment complete",
            RemoteOp::Reload => "Reload complete",
            RemoteOp::Rollforward => "Roll-forward complete",
            RemoteOp::Scheduler => "Scheduling stuff complete",
            RemoteOp::Worker => "Worker stuff complete",
        }
    }
}

#[async_trait]
impl SlashCommand for RemoteCommand {
    fn name(&self) -> &'static str {
        self.op.command_name()
    }

    fn acknowledgement(&self, argument_text: &str) -> String {
        format!("{} {}", self.ack_prefix(), argument_text)
    }

    async fn run(&self, argument_text: String, sink: MessageSink) -> anyhow::Result<()> {
        let mut words = argument_text.split_whitespace();
        if let Some(target) = words.next() {
            let args: Vec<String> = words.map(str::to_string).collect();
            let output = self.runner.run(target, self.op, &args).await?;
            if !output.trim().is_empty() {
                debug!(op = %self.op, target, output = %output.trim(), "remote operation output");
            }
        }
        sink.send(self.completion_message()).await?;
        Ok(())
    }
}
