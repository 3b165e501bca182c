//! Resources addressed by provider/type/API-version rather than a typed client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Full address of a generic resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericResourceId {
    pub resource_group: String,
    pub provider_namespace: String,
    pub parent_path: String,
    pub resource_type: String,
    pub resource_name: String,
    pub api_version: String,
}

impl fmt::Display for GenericResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/",
            self.resource_group, self.provider_namespace
        )?;
        if !self.parent_path.is_empty() {
            write!(f, "{}/", self.parent_path)?;
        }
        write!(f, "{}/{}", self.resource_type, self.resource_name)
    }
}

/// A generic resource as read back from the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericResource {
    pub id: GenericResourceId,
    /// Provider-specific property bag; `provisioningState` lives here.
    pub properties: serde_json::Value,
}

impl GenericResource {
    /// The raw `provisioningState` property, if present and a string.
    pub fn provisioning_state(&self) -> Option<&str> {
        self.properties.get("provisioningState")?.as_str()
    }
}
