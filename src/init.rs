use crate::config::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const POSTERS_DIR: &str = "posters";

fn required_dirs(cfg: &Config) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from(POSTERS_DIR)];
    if let Some(parent) = cfg.gallery_path.parent() {
        if !parent.as_os_str().is_empty() && !dirs.iter().any(|d| d == parent) {
            dirs.push(parent.to_path_buf());
        }
    }
    dirs
}

pub async fn ensure_directories(cfg: &Config) -> Result<()> {
    for dir in required_dirs(cfg) {
        if !Path::new(&dir).exists() {
            fs::create_dir_all(&dir).await?;
            tracing::info!("Created directory: {}", dir.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_parent_is_not_duplicated() {
        let cfg = Config::default();
        assert_eq!(required_dirs(&cfg), vec![PathBuf::from("posters")]);

        let cfg = Config {
            gallery_path: PathBuf::from("data/gallery.json"),
            ..Config::default()
        };
        assert_eq!(
            required_dirs(&cfg),
            vec![PathBuf::from("posters"), PathBuf::from("data")]
        );
    }
}
