//! Use cases
//!
//! Application-level operations that sit between the presentation layer
//! and the host capability ports.

pub mod load_models;
pub mod message_actions;
pub mod prepare_attachment;
