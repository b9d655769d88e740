use std::collections::BTreeMap;

use crate::GraphloadError;

/// Value of `labelType` on every output record.
pub const LABEL_TYPE: &str = "string";

/// Group key → output column → scalar type name (e.g. `bigint`, `double`).
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TypeMap {
    groups: BTreeMap<String, BTreeMap<String, String>>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, GraphloadError> {
        serde_json::from_str(json).map_err(|error| GraphloadError::InvalidConfig {
            message: format!("invalid type map: {error}"),
        })
    }

    pub fn insert(
        &mut self,
        group_key: impl Into<String>,
        column: impl Into<String>,
        type_name: impl Into<String>,
    ) {
        self.groups
            .entry(group_key.into())
            .or_default()
            .insert(column.into(), type_name.into());
    }

    pub fn columns(&self, group_key: &str) -> Option<&BTreeMap<String, String>> {
        self.groups.get(group_key)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Render statements with line breaks and indentation.
    pub pretty: bool,
}

impl RewriteConfig {
    pub fn from_json_str(json: &str) -> Result<Self, GraphloadError> {
        serde_json::from_str(json).map_err(|error| GraphloadError::InvalidConfig {
            message: format!("invalid rewrite config: {error}"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GroupOutput {
    pub sql: String,
    #[serde(rename = "labelType")]
    pub label_type: String,
}

impl GroupOutput {
    pub(crate) fn new(sql: String) -> Self {
        Self {
            sql,
            label_type: LABEL_TYPE.to_string(),
        }
    }
}
