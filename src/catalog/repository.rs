//! Catalog Repository Module
//!
//! Read-through accessors over the product store, the invalidation fan-out
//! fired by admin writes, and the admin write flow itself.
//!
//! Reads never fail: a file-system error is logged and reported as an empty
//! collection or `None`, so the storefront degrades to "no products".

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info};

use crate::cache::{CacheKey, CacheService, TtlClass};
use crate::catalog::{Product, ProductStore};
use crate::error::Result;

// == Catalog ==
#[derive(Debug, Clone)]
pub struct Catalog {
    cache: Arc<CacheService>,
    store: ProductStore,
}

impl Catalog {
    pub fn new(cache: Arc<CacheService>, store: ProductStore) -> Self {
        Self { cache, store }
    }

    pub fn cache(&self) -> &Arc<CacheService> {
        &self.cache
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    // == Read-Through ==
    /// Every product in every category.
    pub async fn get_all_products(&self) -> Vec<Product> {
        let key = CacheKey::AllProducts;
        if let Some(products) = self.cached(&key).await {
            return products;
        }

        match self.store.scan_all().await {
            Ok(products) => {
                self.populate(&key, &products).await;
                products
            }
            Err(e) => {
                error!(error = %e, "Failed to read products");
                Vec::new()
            }
        }
    }

    pub async fn get_products_by_category(&self, category: &str) -> Vec<Product> {
        let key = CacheKey::category_products(category);
        if let Some(products) = self.cached(&key).await {
            return products;
        }

        match self.store.scan_category(category).await {
            Ok(products) => {
                self.populate(&key, &products).await;
                products
            }
            Err(e) => {
                error!(category, error = %e, "Failed to read category products");
                Vec::new()
            }
        }
    }

    /// Names of categories holding at least one product.
    pub async fn get_categories(&self) -> Vec<String> {
        let key = CacheKey::AllCategories;
        if let Some(categories) = self.cached(&key).await {
            return categories;
        }

        match self.store.categories_with_products().await {
            Ok(categories) => {
                self.populate(&key, &categories).await;
                categories
            }
            Err(e) => {
                error!(error = %e, "Failed to read categories");
                Vec::new()
            }
        }
    }

    /// One product. `force_refresh` skips the cache lookup and rereads the
    /// data file; the result still repopulates the cache.
    pub async fn get_product(&self, category: &str, id: &str, force_refresh: bool) -> Option<Product> {
        let key = CacheKey::product(category, id);
        if !force_refresh {
            if let Some(product) = self.cached(&key).await {
                return Some(product);
            }
        }

        match self.store.read_product(category, id).await {
            Ok(Some(product)) => {
                self.populate(&key, &product).await;
                Some(product)
            }
            Ok(None) => {
                debug!(category, id, "Product not found");
                None
            }
            Err(e) => {
                error!(category, id, error = %e, "Failed to read product");
                None
            }
        }
    }

    /// Image bytes from a product directory, cached as base64.
    pub async fn get_product_image(&self, category: &str, id: &str, file: &str) -> Option<Vec<u8>> {
        let key = image_key(category, id, file);
        if let Some(bytes) = self.cache.get_cached_image(&key).await {
            return Some(bytes);
        }

        match self.store.read_image(category, id, file).await {
            Ok(Some(bytes)) => {
                self.cache
                    .cache_image(&key, &bytes, Some(TtlClass::Image.seconds()))
                    .await;
                Some(bytes)
            }
            Ok(None) => None,
            Err(e) => {
                error!(category, id, file, error = %e, "Failed to read product image");
                None
            }
        }
    }

    // == Invalidation ==
    /// Drops the product record, its category listing and the full listing.
    pub async fn invalidate_product_cache(&self, category: &str, id: &str) {
        for key in [
            CacheKey::product(category, id),
            CacheKey::category_products(category),
            CacheKey::AllProducts,
        ] {
            self.cache.invalidate_cache(&key.to_string()).await;
        }
        info!(category, id, "Product cache invalidated");
    }

    /// Drops the category listing, the full listing and the category list.
    pub async fn invalidate_category_cache(&self, category: &str) {
        for key in [
            CacheKey::category_products(category),
            CacheKey::AllProducts,
            CacheKey::AllCategories,
        ] {
            self.cache.invalidate_cache(&key.to_string()).await;
        }
        info!(category, "Category cache invalidated");
    }

    // == Admin Writes ==
    /// Writes `product`, invalidates what it affects and returns a forced
    /// fresh read of it.
    pub async fn save_product(&self, product: &Product) -> Result<Option<Product>> {
        let created = self.store.write_product(product).await?;

        self.invalidate_product_cache(&product.category, &product.id)
            .await;
        if created {
            self.invalidate_category_cache(&product.category).await;
        }

        Ok(self.get_product(&product.category, &product.id, true).await)
    }

    /// Deletes a product and invalidates what it affects. Returns false if
    /// there was no such product.
    pub async fn delete_product(&self, category: &str, id: &str) -> Result<bool> {
        // Listed first: the files go with the directory.
        let files = match self.store.product_files(category, id).await {
            Ok(files) => files,
            Err(e) => {
                debug!(category, id, error = %e, "No product files to invalidate");
                Vec::new()
            }
        };

        let removed = self.store.delete_product(category, id).await?;

        if removed {
            self.invalidate_product_cache(category, id).await;
            self.invalidate_category_cache(category).await;
            for file in &files {
                let key = image_key(category, id, file);
                self.cache.invalidate_cache(&key).await;
            }
        }

        Ok(removed)
    }

    // == Helpers ==
    async fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.cache.get_cached_data(&key.to_string()).await
    }

    async fn populate<T: Serialize + Sync + ?Sized>(&self, key: &CacheKey, value: &T) {
        self.cache
            .cache_data(&key.to_string(), value, Some(key.ttl_class().seconds()))
            .await;
    }
}

fn image_key(category: &str, id: &str, file: &str) -> String {
    CacheKey::image(format!("{}/{}/{}", category, id, file)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, LocalCache, ManualClock};
    use crate::catalog::PRODUCT_DATA_FILE;
    use std::collections::HashSet;
    use std::path::Path;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: std::path::PathBuf,
        clock: Arc<ManualClock>,
        local: Arc<LocalCache>,
        catalog: Catalog,
    }

    fn write(root: &Path, category: &str, id: &str, title: &str) {
        let dir = root.join(category).join(id);
        std::fs::create_dir_all(&dir).unwrap();
        let product = Product::new(category, id, title);
        std::fs::write(
            dir.join(PRODUCT_DATA_FILE),
            serde_json::to_string(&product).unwrap(),
        )
        .unwrap();
    }

    /// `rings` (r1, r2) and `earrings` (e1), plus a stray directory.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("products");
        write(&root, "rings", "r1", "Gold Band");
        write(&root, "rings", "r2", "Silver Band");
        write(&root, "earrings", "e1", "Pearl Drop");
        std::fs::create_dir_all(root.join("rings").join("not-a-product")).unwrap();

        let clock = Arc::new(ManualClock::new(1_000));
        let local = Arc::new(LocalCache::new(clock.clone()));
        let cache = Arc::new(CacheService::new(local.clone()));
        let catalog = Catalog::new(cache, ProductStore::new(&root));

        Fixture {
            _dir: dir,
            root,
            clock,
            local,
            catalog,
        }
    }

    #[tokio::test]
    async fn test_get_all_products_counts_valid_directories() {
        let fx = fixture();

        assert_eq!(fx.catalog.get_all_products().await.len(), 3);
        assert!(fx.local.exists("all_products").await);
    }

    #[tokio::test]
    async fn test_get_categories() {
        let fx = fixture();
        std::fs::create_dir_all(fx.root.join("bracelets")).unwrap();

        let categories: HashSet<_> = fx.catalog.get_categories().await.into_iter().collect();
        assert_eq!(
            categories,
            HashSet::from(["rings".to_string(), "earrings".to_string()])
        );
    }

    #[tokio::test]
    async fn test_products_by_category_skips_stray_directory() {
        let fx = fixture();

        let products = fx.catalog.get_products_by_category("rings").await;
        let ids: HashSet<_> = products.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, HashSet::from(["r1".to_string(), "r2".to_string()]));
    }

    #[tokio::test]
    async fn test_product_read_hits_cache_second_time() {
        let fx = fixture();

        let first = fx.catalog.get_product("rings", "r1", false).await.unwrap();
        assert_eq!(first.title, "Gold Band");

        // Changing the file behind the cache's back is invisible within the TTL.
        write(&fx.root, "rings", "r1", "Rose Gold Band");
        let second = fx.catalog.get_product("rings", "r1", false).await.unwrap();
        assert_eq!(second.title, "Gold Band");

        let stats = fx.catalog.cache().stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.writes, 1);
    }

    #[tokio::test]
    async fn test_product_ttl_expiry_forces_reread() {
        let fx = fixture();
        fx.catalog.get_product("rings", "r1", false).await;
        write(&fx.root, "rings", "r1", "Rose Gold Band");

        fx.clock.advance(TtlClass::Product.seconds() * 1000);
        let product = fx.catalog.get_product("rings", "r1", false).await.unwrap();
        assert_eq!(product.title, "Rose Gold Band");
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_cache() {
        let fx = fixture();
        fx.catalog.get_product("rings", "r1", false).await;
        write(&fx.root, "rings", "r1", "Rose Gold Band");

        let fresh = fx.catalog.get_product("rings", "r1", true).await.unwrap();
        assert_eq!(fresh.title, "Rose Gold Band");

        // The forced read repopulated the cache.
        let cached = fx.catalog.get_product("rings", "r1", false).await.unwrap();
        assert_eq!(cached.title, "Rose Gold Band");
    }

    #[tokio::test]
    async fn test_missing_product_is_not_cached() {
        let fx = fixture();

        assert!(fx.catalog.get_product("rings", "r404", false).await.is_none());
        assert!(!fx.local.exists("product_rings_r404").await);
    }

    #[tokio::test]
    async fn test_invalidate_product_cache_fan_out() {
        let fx = fixture();
        fx.catalog.get_all_products().await;
        fx.catalog.get_products_by_category("rings").await;
        fx.catalog.get_product("rings", "r1", false).await;
        fx.catalog.get_categories().await;

        fx.catalog.invalidate_product_cache("rings", "r1").await;

        assert!(!fx.local.exists("product_rings_r1").await);
        assert!(!fx.local.exists("products_category_rings").await);
        assert!(!fx.local.exists("all_products").await);
        assert!(fx.local.exists("all_categories").await);
    }

    #[tokio::test]
    async fn test_invalidate_category_cache_fan_out() {
        let fx = fixture();
        fx.catalog.get_all_products().await;
        fx.catalog.get_products_by_category("rings").await;
        fx.catalog.get_product("rings", "r1", false).await;
        fx.catalog.get_categories().await;

        fx.catalog.invalidate_category_cache("rings").await;

        assert!(!fx.local.exists("products_category_rings").await);
        assert!(!fx.local.exists("all_products").await);
        assert!(!fx.local.exists("all_categories").await);
        assert!(fx.local.exists("product_rings_r1").await);
    }

    #[tokio::test]
    async fn test_all_products_rescanned_after_invalidation() {
        let fx = fixture();
        assert_eq!(fx.catalog.get_all_products().await.len(), 3);

        write(&fx.root, "rings", "r3", "Platinum Band");
        assert_eq!(fx.catalog.get_all_products().await.len(), 3, "Served from cache");

        fx.catalog.invalidate_product_cache("rings", "r3").await;
        assert_eq!(fx.catalog.get_all_products().await.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_root_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(LocalCache::new(Arc::new(ManualClock::new(0))));
        let catalog = Catalog::new(
            Arc::new(CacheService::new(local.clone())),
            ProductStore::new(dir.path().join("missing")),
        );

        assert!(catalog.get_all_products().await.is_empty());
        assert!(catalog.get_categories().await.is_empty());
        assert!(catalog.get_products_by_category("rings").await.is_empty());
        assert!(!local.exists("all_products").await, "Failures are not cached");
    }

    #[tokio::test]
    async fn test_invalid_segment_degrades_to_none() {
        let fx = fixture();
        assert!(fx.catalog.get_product("..", "r1", false).await.is_none());
        assert!(fx.catalog.get_products_by_category("../rings").await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_cache_entry_falls_back_to_disk() {
        let fx = fixture();
        fx.local
            .set("product_rings_r1", "garbage".to_string(), None)
            .await;

        let product = fx.catalog.get_product("rings", "r1", false).await.unwrap();
        assert_eq!(product.title, "Gold Band");
        assert_eq!(fx.catalog.cache().stats().corrupted, 1);
    }

    #[tokio::test]
    async fn test_save_existing_product_refreshes_listings() {
        let fx = fixture();
        fx.catalog.get_products_by_category("rings").await;
        fx.catalog.get_product("rings", "r1", false).await;

        let mut product = Product::new("rings", "r1", "Gold Band II");
        product.materials = vec!["gold".to_string()];
        let saved = fx.catalog.save_product(&product).await.unwrap().unwrap();
        assert_eq!(saved, product);

        let listed = fx.catalog.get_products_by_category("rings").await;
        assert!(listed.iter().any(|p| p.title == "Gold Band II"));
        assert_eq!(
            fx.catalog.get_product("rings", "r1", false).await.unwrap().title,
            "Gold Band II"
        );
    }

    #[tokio::test]
    async fn test_save_new_product_in_new_category() {
        let fx = fixture();
        assert_eq!(fx.catalog.get_categories().await.len(), 2);

        let product = Product::new("necklaces", "n1", "Locket");
        fx.catalog.save_product(&product).await.unwrap();

        let categories = fx.catalog.get_categories().await;
        assert!(categories.contains(&"necklaces".to_string()));
        assert_eq!(fx.catalog.get_all_products().await.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_product_invalidates() {
        let fx = fixture();
        fx.catalog.get_categories().await;
        fx.catalog.get_product("earrings", "e1", false).await;

        assert!(fx.catalog.delete_product("earrings", "e1").await.unwrap());
        assert!(fx.catalog.get_product("earrings", "e1", false).await.is_none());
        assert_eq!(fx.catalog.get_categories().await, vec!["rings".to_string()]);

        assert!(!fx.catalog.delete_product("earrings", "e1").await.unwrap());
    }

    #[tokio::test]
    async fn test_product_image_is_cached() {
        let fx = fixture();
        let path = fx.root.join("rings/r1/main.jpg");
        std::fs::write(&path, [9u8, 8, 7]).unwrap();

        assert_eq!(
            fx.catalog.get_product_image("rings", "r1", "main.jpg").await,
            Some(vec![9, 8, 7])
        );
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            fx.catalog.get_product_image("rings", "r1", "main.jpg").await,
            Some(vec![9, 8, 7])
        );
        assert!(fx.catalog.cache().is_image_cached("image:rings/r1/main.jpg").await);
    }

    #[tokio::test]
    async fn test_delete_product_drops_cached_images() {
        let fx = fixture();
        std::fs::write(fx.root.join("rings/r1/main.jpg"), [1u8, 2, 3]).unwrap();
        assert!(fx.catalog.get_product_image("rings", "r1", "main.jpg").await.is_some());

        assert!(fx.catalog.delete_product("rings", "r1").await.unwrap());

        assert!(!fx.root.join("rings/r1").exists());
        assert!(!fx.catalog.cache().is_image_cached("image:rings/r1/main.jpg").await);
        assert_eq!(fx.catalog.get_product_image("rings", "r1", "main.jpg").await, None);
    }
}
