//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - the backend model a session talks to
//! - [`string::preview`] - single-line previews for logs and listings

pub mod model;
pub mod string;
