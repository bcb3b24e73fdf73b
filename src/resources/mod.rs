use std::path::{Path, PathBuf};

use anyhow::Context;

/**
 * This module contains all logic for loading textures and other files from the asset directory.
 */
pub mod texture;

/// Environment variable that overrides where assets are looked up.
pub const ASSET_DIR_ENV: &str = "ORRERY_ASSETS";

/// The asset directory: `$ORRERY_ASSETS` if set and non-empty, `./assets` otherwise.
pub fn default_asset_dir() -> PathBuf {
    asset_dir_from(std::env::var_os(ASSET_DIR_ENV).map(PathBuf::from))
}

fn asset_dir_from(configured: Option<PathBuf>) -> PathBuf {
    configured
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("./").join("assets"))
}

pub async fn load_binary(asset_dir: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = asset_dir.join(file_name);
    let data = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_local_assets() {
        assert_eq!(asset_dir_from(None), Path::new("./assets"));
        assert_eq!(asset_dir_from(Some(PathBuf::new())), Path::new("./assets"));
        assert_eq!(
            asset_dir_from(Some(PathBuf::from("/opt/orrery"))),
            Path::new("/opt/orrery")
        );
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = load_binary(Path::new("/nonexistent-orrery-dir"), "sun.jpg")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("sun.jpg"));
    }
}
