//! Admin API request and response models

use serde::{Deserialize, Serialize};

/// Request body for POST /api/v1/plugins/install
#[derive(Debug, Deserialize)]
pub struct InstallPluginRequest {
    /// Plugin directory name under the plugins root
    pub name: String,
}

/// Response for plugin list
#[derive(Debug, Serialize)]
pub struct PluginsListResponse {
    pub plugins: Vec<crate::plugin::PluginStatus>,
    pub total: usize,
}

/// Generic acknowledgement response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
