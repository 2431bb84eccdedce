//! Slash-command surface of the gantry service.
//!
//! The registry maps command names to [`SlashCommand`] implementations;
//! dispatch hands each command's task to the async response bridge and
//! returns the synchronous acknowledgement. Remote operations run through
//! the [`RemoteRunner`] seam, and `/deployment-info` lookups go through
//! [`DeploymentInfoClient`].

pub mod deployment_info;
pub mod dispatch;
pub mod error;
pub mod remote;
pub mod tasks;

pub use {
    deployment_info::{DeploymentInfo, DeploymentInfoClient, parse_environment},
    dispatch::{CommandRegistry, SlashCommand, WebhookRequest},
    error::{Error, Result},
    remote::{ProcessRunner, RemoteOp, RemoteRunner},
    tasks::{RemoteCommand, TEST_HOOK_ACK, TestHook},
};
