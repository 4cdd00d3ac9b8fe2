//! Product Store Module
//!
//! File-backed catalog: `<root>/<category>/<id>/product.json`. This is the
//! source of truth that the cache is derived from.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::catalog::Product;
use crate::error::{CacheError, Result};

/// Name of the data file that marks a directory as a product.
pub const PRODUCT_DATA_FILE: &str = "product.json";

// == Product Store ==
#[derive(Debug, Clone)]
pub struct ProductStore {
    root: PathBuf,
}

impl ProductStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // == Paths ==
    fn category_dir(&self, category: &str) -> Result<PathBuf> {
        validate_segment(category)?;
        Ok(self.root.join(category))
    }

    fn product_dir(&self, category: &str, id: &str) -> Result<PathBuf> {
        validate_segment(id)?;
        Ok(self.category_dir(category)?.join(id))
    }

    // == Enumeration ==
    /// Top-level directories, whether or not they hold products.
    pub async fn category_names(&self) -> Result<Vec<String>> {
        subdirectories(&self.root).await
    }

    /// Subdirectories of `category` that contain a data file.
    ///
    /// Directories without one are skipped.
    pub async fn product_ids(&self, category: &str) -> Result<Vec<String>> {
        let dir = self.category_dir(category)?;
        let mut ids = Vec::new();

        for id in subdirectories(&dir).await? {
            if is_file(&dir.join(&id).join(PRODUCT_DATA_FILE)).await {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Categories with at least one valid product directory.
    pub async fn categories_with_products(&self) -> Result<Vec<String>> {
        let mut categories = Vec::new();

        for category in self.category_names().await? {
            match self.product_ids(&category).await {
                Ok(ids) if !ids.is_empty() => categories.push(category),
                Ok(_) => {}
                Err(e) => warn!(category = %category, error = %e, "Skipping unreadable category"),
            }
        }

        Ok(categories)
    }

    // == Reads ==
    /// Reads one product; `Ok(None)` if it has no data file.
    pub async fn read_product(&self, category: &str, id: &str) -> Result<Option<Product>> {
        let path = self.product_dir(category, id)?.join(PRODUCT_DATA_FILE);

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Reads every product in `category`. Malformed data files are logged
    /// and skipped.
    pub async fn scan_category(&self, category: &str) -> Result<Vec<Product>> {
        let mut products = Vec::new();

        for id in self.product_ids(category).await? {
            match self.read_product(category, &id).await {
                Ok(Some(product)) => products.push(product),
                Ok(None) => {}
                Err(e) => {
                    warn!(category, id = %id, error = %e, "Skipping unreadable product")
                }
            }
        }

        Ok(products)
    }

    /// Reads every product in every category.
    pub async fn scan_all(&self) -> Result<Vec<Product>> {
        let mut products = Vec::new();

        for category in self.category_names().await? {
            match self.scan_category(&category).await {
                Ok(found) => products.extend(found),
                Err(e) => warn!(category = %category, error = %e, "Skipping unreadable category"),
            }
        }

        Ok(products)
    }

    /// Reads a file stored inside a product directory.
    pub async fn read_image(&self, category: &str, id: &str, file: &str) -> Result<Option<Vec<u8>>> {
        validate_segment(file)?;
        let path = self.product_dir(category, id)?.join(file);

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of the regular files in a product directory other than its
    /// data file.
    pub async fn product_files(&self, category: &str, id: &str) -> Result<Vec<String>> {
        let dir = self.product_dir(category, id)?;
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name != PRODUCT_DATA_FILE => files.push(name),
                Ok(_) => {}
                Err(name) => warn!(dir = %dir.display(), name = ?name, "Skipping non UTF-8 file"),
            }
        }

        Ok(files)
    }

    // == Writes ==
    /// Writes `product` to `<category>/<id>/product.json`.
    ///
    /// Returns true if the product did not exist before.
    pub async fn write_product(&self, product: &Product) -> Result<bool> {
        let dir = self.product_dir(&product.category, &product.id)?;
        let path = dir.join(PRODUCT_DATA_FILE);
        let created = !is_file(&path).await;

        fs::create_dir_all(&dir).await?;
        let contents = serde_json::to_vec_pretty(product)?;

        // Each writer gets its own temporary file; the last rename wins.
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(".product")
                .suffix(".tmp")
                .tempfile_in(&dir)?;
            tmp.write_all(&contents)?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Io(std::io::Error::other(e)))??;

        Ok(created)
    }

    /// Removes a product directory. Returns false if there was no product.
    pub async fn delete_product(&self, category: &str, id: &str) -> Result<bool> {
        let dir = self.product_dir(category, id)?;
        if !is_file(&dir.join(PRODUCT_DATA_FILE)).await {
            return Ok(false);
        }

        fs::remove_dir_all(&dir).await?;
        Ok(true)
    }
}

// == Helpers ==
/// Accepts only a single, non-traversing path component.
fn validate_segment(segment: &str) -> Result<()> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);

    if invalid {
        Err(CacheError::InvalidPath(segment.to_string()))
    } else {
        Ok(())
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

async fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!(dir = %dir.display(), name = ?name, "Skipping non UTF-8 directory"),
        }
    }

    Ok(names)
}
