//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::view::Views;
use crate::workflow::Workflow;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The document/QA workflow.
    pub workflow: Arc<Workflow>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Page renderer.
    pub views: Arc<Views>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(workflow: Workflow, config: ServerConfig) -> Result<Self> {
        Ok(Self {
            workflow: Arc::new(workflow),
            config: Arc::new(config),
            views: Arc::new(Views::new()?),
        })
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn views(&self) -> &Views {
        &self.views
    }
}
