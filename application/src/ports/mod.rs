//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod capabilities;
pub mod conversation_logger;
pub mod model_catalog;
pub mod notifier;
pub mod transport;
