//! Locating real NDFD files for tests that can use them.

use std::path::PathBuf;

/// Workspace root, two levels above this crate.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .map(|p| p.to_path_buf())
        .unwrap_or(manifest_dir)
}

/// Find a data file such as `ds.maxrh.bin`.
///
/// Looks in `$TEST_DATA_DIR`, then `crates/ndfd-parser/testdata`, then
/// `testdata/` at the root, then the `$FIREWX_DATA_DIR` download cache.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let root = workspace_root();
    let env_dir = |var: &str| std::env::var(var).ok().map(PathBuf::from);

    env_dir("TEST_DATA_DIR")
        .into_iter()
        .chain([
            root.join("crates").join("ndfd-parser").join("testdata"),
            root.join("testdata"),
        ])
        .chain(env_dir("FIREWX_DATA_DIR"))
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_find_test_file_missing() {
        assert!(find_test_file("ds.nonexistent.bin").is_none());
    }
}
