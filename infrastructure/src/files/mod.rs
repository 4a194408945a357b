//! Local filesystem adapter for attachments.

mod local;

pub use local::LocalFileReader;
