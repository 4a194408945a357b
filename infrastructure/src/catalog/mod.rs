//! Model catalog adapters.

mod http;

pub use http::HttpModelCatalog;
