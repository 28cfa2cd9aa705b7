use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: i64, // creation time in milliseconds
    pub content: String,
}

impl Task {
    pub fn new(id: i64, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }
}
