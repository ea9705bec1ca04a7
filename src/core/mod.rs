//! Core system components
//!
//! Shared infrastructure for the host: configuration, logging, the error
//! taxonomy, and the synchronous event bus plugins communicate over.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod logging;

pub use config::{Config, LoggingConfig, PluginsConfig, ServerConfig};
pub use error::{BookdenError, ErrorResponse, Result};
pub use event_bus::{EventBus, EventHandler, Subscription};
pub use logging::Logger;
