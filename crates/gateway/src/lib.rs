//! HTTP front end: one POST route per slash command, plus the synchronous
//! `/deployment-info` query and a health endpoint.
//!
//! Handlers validate the platform's form fields, dispatch through the
//! command registry, and answer with the synchronous acknowledgement while
//! the async response bridge streams follow-ups to the callback URL.

pub mod hooks;
pub mod server;
pub mod state;

pub use {
    server::{build_app, build_state, start_server},
    state::AppState,
};
