use std::sync::Arc;

use {
    gantry_bridge::ResponseBridge,
    gantry_commands::{CommandRegistry, DeploymentInfoClient},
    gantry_config::GantryConfig,
};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<ResponseBridge>,
    pub registry: Arc<CommandRegistry>,
    pub deployment_info: Arc<DeploymentInfoClient>,
    pub config: Arc<GantryConfig>,
}
