//! Product record as stored in each product directory's data file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A catalog product.
///
/// Fields the storefront does not model explicitly (price, images, ...) are
/// kept in `extra` so a cache round trip or an admin save never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(
        category: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            materials: Vec::new(),
            description: String::new(),
            tags: Vec::new(),
            extra: Map::new(),
        }
    }
}
