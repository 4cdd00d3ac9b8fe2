//! Request DTOs for the storefront API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::Product;

/// Request body for an admin product save (PUT /admin/products/:category/:id)
///
/// Category and id come from the path, so the body carries everything else.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveProductRequest {
    pub title: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Any other product fields, stored as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SaveProductRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if self.extra.contains_key("id") || self.extra.contains_key("category") {
            return Some("Id and category are taken from the URL".to_string());
        }
        None
    }

    /// Builds the product stored under `category`/`id`.
    pub fn into_product(self, category: String, id: String) -> Product {
        Product {
            id,
            title: self.title,
            category,
            materials: self.materials,
            description: self.description,
            tags: self.tags,
            extra: self.extra,
        }
    }
}
