use crate::generator::GeneratedPoster;
use crate::logok;
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Saved posters, kept as one JSON array on disk.
#[derive(Debug, Clone)]
pub struct Gallery {
    path: PathBuf,
}

impl Gallery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<GeneratedPoster>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read gallery: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid gallery: {}", self.path.display()))
    }

    pub async fn save(&self, poster: &GeneratedPoster) -> Result<usize> {
        let mut posters = self.list().await?;
        posters.push(poster.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create dir {}", parent.display()))?;
        }

        let json = serde_json::to_vec_pretty(&posters)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        logok(format!("Poster saved to gallery ({} total)", posters.len()));
        Ok(posters.len())
    }
}

/// Splits a `data:<mime>;base64,<payload>` reference into mime and bytes.
pub fn decode_data_url(reference: &str) -> Option<(String, Vec<u8>)> {
    let rest = reference.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = BASE64.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// Writes the poster behind `reference` to `out_path`.
pub async fn download_poster(client: &Client, reference: &str, out_path: &Path) -> Result<u64> {
    let bytes = if reference.starts_with("data:") {
        decode_data_url(reference)
            .map(|(_, bytes)| bytes)
            .context("Poster data URL is not valid base64")?
    } else {
        let resp = client
            .get(reference)
            .timeout(Duration::from_secs(120))
            .send()
            .await
            .context("Poster download failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("Poster download failed HTTP {}", resp.status().as_u16());
        }
        resp.bytes()
            .await
            .context("Poster response read failed")?
            .to_vec()
    };

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create dir {}", parent.display()))?;
    }
    fs::write(out_path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Genre, MovieFormData, PosterStyle};
    use crate::generator::PosterSource;

    fn poster(title: &str) -> GeneratedPoster {
        let form = MovieFormData::new(title, Genre::Horror, "", PosterStyle::Noir).unwrap();
        GeneratedPoster::new(
            "https://images.unsplash.com/photo-1?w=400".to_string(),
            form,
            PosterSource::Catalog,
        )
    }

    #[tokio::test]
    async fn empty_gallery_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = Gallery::new(dir.path().join("posters/saved.json"));
        assert!(gallery.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saved_posters_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = Gallery::new(dir.path().join("posters/saved.json"));

        assert_eq!(gallery.save(&poster("First Night")).await.unwrap(), 1);
        assert_eq!(gallery.save(&poster("Second Night")).await.unwrap(), 2);

        let posters = gallery.list().await.unwrap();
        assert_eq!(posters.len(), 2);
        assert_eq!(posters[0].source_form.title(), "First Night");
        assert_eq!(posters[1].source_form.title(), "Second Night");
        assert_eq!(posters[1].source, PosterSource::Catalog);
    }

    #[tokio::test]
    async fn reads_entries_without_source_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        std::fs::write(
            &path,
            r#"[{"id":1700000000000,"posterUrl":"https://a.example/p.jpg","movieData":{"title":"Old One","genre":"drama","description":"","style":"vintage"},"createdAt":"2023-11-14T22:13:20Z"}]"#,
        )
        .unwrap();

        let posters = Gallery::new(&path).list().await.unwrap();
        assert_eq!(posters[0].source, PosterSource::Catalog);
        assert_eq!(posters[0].source_form.style(), PosterStyle::Vintage);
    }

    #[test]
    fn decodes_data_urls() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,YWJj").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"abc");
        assert!(decode_data_url("https://a.example/p.jpg").is_none());
        assert!(decode_data_url("data:image/png,plain").is_none());
    }

    #[tokio::test]
    async fn downloads_data_url_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out/movie-poster.png");
        let written = download_poster(&Client::new(), "data:image/png;base64,YWJj", &out)
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&out).unwrap(), b"abc");
    }
}
