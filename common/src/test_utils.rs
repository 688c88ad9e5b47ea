use std::path::PathBuf;

/// Workspace root: the parent of the calling crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Path of a checked-in fixture under `test_resources/`.
pub fn test_resource_path(name: &str) -> PathBuf {
    workspace_root().join("test_resources").join(name)
}

/// Path of a generated file under `test_output/`.
///
/// Parent directories are created, so `name` may contain subdirectories.
pub fn test_output_path(name: &str) -> PathBuf {
    let path = workspace_root().join("test_output").join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create test_output directory");
    }
    path
}
