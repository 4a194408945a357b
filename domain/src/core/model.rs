//! Model value object representing a backend model

use serde::{Deserialize, Serialize};

/// Backend model name (Value Object)
///
/// The server owns the catalog, so names are free-form strings taken from
/// the `/llms` listing. An empty name means no model has been selected yet;
/// it is still sent as-is, the server decides what to do with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True until a model has been selected for the session
    pub fn is_unset(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_unset() {
            write!(f, "<no model>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::new(s.trim()))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::new(s)
    }
}

/// One entry of the model catalog (`GET <api-base>/llms`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
}

impl ModelDescriptor {
    pub fn model(&self) -> Model {
        Model::new(self.name.clone())
    }
}
