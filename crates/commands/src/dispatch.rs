//! Slash-command registry and webhook dispatch.

use std::{collections::HashMap, sync::Arc};

use {async_trait::async_trait, tracing::info, url::Url};

use gantry_bridge::{BridgeHandle, MessageSink, ResponseBridge};

use crate::{
    error::{Error, Result},
    remote::{RemoteOp, RemoteRunner},
    tasks::{RemoteCommand, TestHook},
};

/// A validated inbound slash-command webhook.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Command name, without the leading slash.
    pub command: String,
    /// Free-form text after the command, passed to the task untouched.
    pub argument_text: String,
    /// Where follow-up messages for this webhook go.
    pub callback_url: Url,
}

/// One slash command: a fixed name, a synchronous acknowledgement, and an
/// asynchronous body that pushes progress messages into the sink.
#[async_trait]
pub trait SlashCommand: Send + Sync {
    /// Name the command is registered under.
    fn name(&self) -> &'static str;

    /// Text for the synchronous reply, built before the task starts.
    fn acknowledgement(&self, argument_text: &str) -> String;

    /// The long-running body. Runs detached from the HTTP handler; every
    /// message it sends lands at the webhook's callback URL.
    async fn run(&self, argument_text: String, sink: MessageSink) -> anyhow::Result<()>;
}

/// Registry of all slash commands the service answers.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Arc<dyn SlashCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registry with the built-in command set: the test hook plus one
    /// command per remote operation, all sharing `runner`.
    pub fn builtin(runner: Arc<dyn RemoteRunner>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TestHook));
        for op in RemoteOp::ALL {
            registry.register(Arc::new(RemoteCommand::new(Arc::clone(&runner), op)));
        }
        registry
    }

    pub fn register(&mut self, command: Arc<dyn SlashCommand>) {
        self.commands.insert(command.name(), command);
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolve the request's command, hand its task to the bridge, and
    /// return the acknowledgement without waiting on the task.
    ///
    /// Unknown commands fail with [`Error::UnknownCommand`]; there is no
    /// echo fallback, so a typo in a channel is always a visible error.
    pub fn dispatch(
        &self,
        bridge: &ResponseBridge,
        request: WebhookRequest,
    ) -> Result<(String, BridgeHandle)> {
        let WebhookRequest {
            command,
            argument_text,
            callback_url,
        } = request;
        let Some(handler) = self.commands.get(command.as_str()).cloned() else {
            return Err(Error::unknown_command(command));
        };

        let ack = handler.acknowledgement(&argument_text);
        let handle = bridge.spawn(callback_url, command.clone(), move |sink| async move {
            handler.run(argument_text, sink).await
        });
        info!(%command, run_id = %handle.run_id(), "slash command dispatched");
        Ok((ack, handle))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use gantry_bridge::BridgeSettings;

    use super::*;
    use crate::remote::ProcessRunner;

    fn builtin_registry() -> CommandRegistry {
        CommandRegistry::builtin(Arc::new(ProcessRunner::new(None)))
    }

    #[test]
    fn builtin_registry_covers_all_endpoints() {
        let registry = builtin_registry();
        assert_eq!(
            registry.names(),
            vec![
                "deploy",
                "reload",
                "rollforward",
                "scheduler",
                "test-hook",
                "worker"
            ]
        );
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_command() {
        let registry = builtin_registry();
        let bridge = ResponseBridge::new(BridgeSettings::default()).unwrap();
        let request = WebhookRequest {
            command: "launch-missiles".into(),
            argument_text: String::new(),
            // Port 9 is the discard service; nothing should connect anyway.
            callback_url: Url::parse("http://127.0.0.1:9/").unwrap(),
        };

        let err = registry.dispatch(&bridge, request).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
    }

    #[tokio::test]
    async fn dispatch_returns_acknowledgement_immediately() {
        let registry = builtin_registry();
        let bridge = ResponseBridge::new(BridgeSettings::default()).unwrap();
        let request = WebhookRequest {
            command: "deploy".into(),
            argument_text: "staging".into(),
            callback_url: Url::parse("http://127.0.0.1:9/").unwrap(),
        };

        let (ack, handle) = registry.dispatch(&bridge, request).unwrap();
        assert_eq!(ack, "Deploying staging");
        handle.cancel();
        handle.finished().await;
    }
}
