//! Cache Keys Module
//!
//! Deterministic keys for every cached payload shape, and the TTL class each
//! shape is stored with.

use std::fmt;

// == Cache Key ==
/// A cache key. Each variant holds exactly one payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Entire product collection: `all_products`
    AllProducts,
    /// Category name list: `all_categories`
    AllCategories,
    /// One category's products: `products_category_<category>`
    CategoryProducts(String),
    /// One product record: `product_<category>_<id>`
    Product { category: String, id: String },
    /// Base64 image payload: `image:<path>`
    Image(String),
}

impl CacheKey {
    pub fn category_products(category: impl Into<String>) -> Self {
        CacheKey::CategoryProducts(category.into())
    }

    pub fn product(category: impl Into<String>, id: impl Into<String>) -> Self {
        CacheKey::Product {
            category: category.into(),
            id: id.into(),
        }
    }

    pub fn image(path: impl Into<String>) -> Self {
        CacheKey::Image(path.into())
    }

    /// TTL class this key is written with.
    pub fn ttl_class(&self) -> TtlClass {
        match self {
            CacheKey::AllProducts | CacheKey::CategoryProducts(_) => TtlClass::Products,
            CacheKey::AllCategories => TtlClass::Categories,
            CacheKey::Product { .. } => TtlClass::Product,
            CacheKey::Image(_) => TtlClass::Image,
        }
    }
}

/// Escapes the characters that would make `_`-separated keys ambiguous.
fn escape_segment(segment: &str) -> String {
    segment.replace('%', "%25").replace('_', "%5F")
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::AllProducts => f.write_str("all_products"),
            CacheKey::AllCategories => f.write_str("all_categories"),
            CacheKey::CategoryProducts(category) => {
                write!(f, "products_category_{}", escape_segment(category))
            }
            CacheKey::Product { category, id } => write!(
                f,
                "product_{}_{}",
                escape_segment(category),
                escape_segment(id)
            ),
            CacheKey::Image(path) => write!(f, "image:{}", path),
        }
    }
}

// == TTL Class ==
/// How long each kind of payload stays cached.
///
/// Categories change far less often than individual products, so they live
/// longest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    Products,
    Categories,
    Product,
    Image,
}

impl TtlClass {
    pub fn seconds(&self) -> u64 {
        match self {
            TtlClass::Products => 60 * 60,
            TtlClass::Categories => 24 * 60 * 60,
            TtlClass::Product => 2 * 60 * 60,
            TtlClass::Image => 24 * 60 * 60,
        }
    }
}
