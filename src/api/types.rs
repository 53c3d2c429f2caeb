// Posts API response types.
// Defines the single domain entity deserialized from the REST endpoint.

use serde::{Deserialize, Serialize};

/// A post as served by `GET /posts` and `GET /posts/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

impl Post {
    /// Identifier in the string form used by routes and cache keys.
    pub fn route_id(&self) -> String {
        self.id.to_string()
    }
}
