//! Application-level configuration.
//!
//! - [`SessionConfig`] - session manager bounds, inactivity timeout and
//!   the defaults applied to every new session

pub mod session_config;

pub use session_config::SessionConfig;
