use serde::{Deserialize, Serialize};

/// One `code -> display name` entry of a select list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceItem {
    pub code: String,
    pub name: String,
}

impl ReferenceItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

pub type ReferenceList = Vec<ReferenceItem>;
