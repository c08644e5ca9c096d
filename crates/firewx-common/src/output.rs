//! Output directory conventions.
//!
//! Frames land in `{root}/NWS Forecasts/{category}/{product}/{region}/{reference system}`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FireWxResult;
use crate::region::ReferenceSystem;

const FORECASTS_DIR: &str = "NWS Forecasts";

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the frames of one product.
    pub fn product_dir(
        &self,
        category: &str,
        product: &str,
        region: &str,
        reference_system: ReferenceSystem,
    ) -> PathBuf {
        self.root
            .join(FORECASTS_DIR)
            .join(sanitize(category))
            .join(sanitize(product))
            .join(sanitize(region))
            .join(sanitize(reference_system.dir_name()))
    }

    /// Delete any previous contents of the product directory and recreate it.
    pub fn prepare(
        &self,
        category: &str,
        product: &str,
        region: &str,
        reference_system: ReferenceSystem,
    ) -> FireWxResult<PathBuf> {
        let dir = self.product_dir(category, product, region, reference_system);
        if dir.exists() {
            debug!(path = %dir.display(), "Clearing previous output");
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Path of the animation inside a product directory.
pub fn gif_path(dir: &Path, product: &str) -> PathBuf {
    dir.join(format!("{}.gif", sanitize(product)))
}

/// Make a string usable as a single path component.
pub fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("States & Counties"), "States & Counties");
        assert_eq!(sanitize("a/b"), "a_b");
        assert_eq!(sanitize(".."), "_");
    }
}
