use crate::error::PosterError;
use crate::form::Genre;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// Genre whose images stand in for any genre the catalog does not list.
pub const DEFAULT_GENRE: &str = "drama";

/// Last-resort poster used when neither a catalog nor a search is available.
pub const ULTIMATE_FALLBACK_URL: &str =
    "https://images.unsplash.com/photo-1489599588768-057deb1c59c8?w=400&h=600&fit=crop";

const BUILTIN_TABLE: &[(&str, &[&str])] = &[
    (
        "action",
        &[
            "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1516450360452-9312f5e86fc7?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1534447677768-be436bb09401?w=400&h=600&fit=crop",
        ],
    ),
    (
        "drama",
        &[
            "https://images.unsplash.com/photo-1489599588768-057deb1c59c8?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1485846234645-a62644f84728?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1440404653325-ab127d49abc1?w=400&h=600&fit=crop",
        ],
    ),
    (
        "horror",
        &[
            "https://images.unsplash.com/photo-1520637736862-4d197d17c15a?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1509909756405-be0199881695?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1445208493220-5ff17e5aac89?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1539571696142-afce887d60d0?w=400&h=600&fit=crop",
        ],
    ),
    (
        "comedy",
        &[
            "https://images.unsplash.com/photo-1514905552197-0610a4d8fd73?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1533174072545-7a4b6ad7a6c3?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1492684223066-81342ee5ff30?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1513475382585-d06e58bcb0e0?w=400&h=600&fit=crop",
        ],
    ),
    (
        "sci-fi",
        &[
            "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1446776877081-d282a0f896e2?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1514905552197-0610a4d8fd73?w=400&h=600&fit=crop",
        ],
    ),
    (
        "romance",
        &[
            "https://images.unsplash.com/photo-1518709268805-4e9042af2176?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1470071459604-3b5ec3a7fe05?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=600&fit=crop",
        ],
    ),
    (
        "thriller",
        &[
            "https://images.unsplash.com/photo-1520637836862-4d197d17c15a?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1485846234645-a62644f84728?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1509909756405-be0199881695?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1539571696142-afce887d60d0?w=400&h=600&fit=crop",
        ],
    ),
    (
        "fantasy",
        &[
            "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1470071459604-3b5ec3a7fe05?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1441974231531-c6227db76b6e?w=400&h=600&fit=crop",
            "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=400&h=600&fit=crop",
        ],
    ),
];

/// Per-genre substitute poster images.
///
/// The default genre's list is guaranteed non-empty, which is what lets
/// [`select_fallback`] always produce a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile", into = "CatalogFile")]
pub struct FallbackCatalog {
    default_genre: String,
    entries: HashMap<String, Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default = "default_genre_name")]
    default_genre: String,
    genres: HashMap<String, Vec<String>>,
}

fn default_genre_name() -> String {
    DEFAULT_GENRE.to_string()
}

impl TryFrom<CatalogFile> for FallbackCatalog {
    type Error = PosterError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        FallbackCatalog::new(file.default_genre, file.genres)
    }
}

impl From<FallbackCatalog> for CatalogFile {
    fn from(catalog: FallbackCatalog) -> Self {
        CatalogFile {
            default_genre: catalog.default_genre,
            genres: catalog.entries,
        }
    }
}

impl FallbackCatalog {
    pub fn new(
        default_genre: impl Into<String>,
        entries: HashMap<String, Vec<String>>,
    ) -> Result<Self, PosterError> {
        let default_genre = default_genre.into().trim().to_ascii_lowercase();
        let entries: HashMap<String, Vec<String>> = entries
            .into_iter()
            .map(|(genre, urls)| {
                let urls = urls
                    .into_iter()
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty())
                    .collect::<Vec<String>>();
                (genre.trim().to_ascii_lowercase(), urls)
            })
            .filter(|(_, urls)| !urls.is_empty())
            .collect();

        if !entries.contains_key(&default_genre) {
            return Err(PosterError::Catalog(format!(
                "default genre '{}' has no images",
                default_genre
            )));
        }

        Ok(Self {
            default_genre,
            entries,
        })
    }

    /// The table shipped with the poster generator block.
    pub fn builtin() -> Self {
        let entries = BUILTIN_TABLE
            .iter()
            .map(|(genre, urls)| {
                (
                    genre.to_string(),
                    urls.iter().map(|url| url.to_string()).collect(),
                )
            })
            .collect();

        Self {
            default_genre: DEFAULT_GENRE.to_string(),
            entries,
        }
    }

    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", path.as_ref().display()))?;
        let catalog: FallbackCatalog = serde_json::from_str(&content)
            .with_context(|| format!("Invalid catalog: {}", path.as_ref().display()))?;
        Ok(catalog)
    }

    pub fn default_genre(&self) -> &str {
        &self.default_genre
    }

    /// Images for `genre`, or the default genre's images if it is not listed.
    pub fn images_for(&self, genre: &Genre) -> &[String] {
        self.entries
            .get(genre.as_str())
            .or_else(|| self.entries.get(&self.default_genre))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, genre: &Genre) -> bool {
        self.entries.contains_key(genre.as_str())
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Picks a substitute poster for `genre` using the supplied random source.
pub fn select_fallback<R: Rng + ?Sized>(
    genre: &Genre,
    catalog: &FallbackCatalog,
    rng: &mut R,
) -> String {
    let images = catalog.images_for(genre);
    if images.is_empty() {
        return ULTIMATE_FALLBACK_URL.to_string();
    }
    images[rng.gen_range(0..images.len())].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn builtin_covers_every_known_genre() {
        let catalog = FallbackCatalog::builtin();
        for genre in Genre::KNOWN.iter() {
            assert!(catalog.contains(genre), "missing {}", genre);
            assert_eq!(catalog.images_for(genre).len(), 4);
        }
        assert_eq!(catalog.default_genre(), DEFAULT_GENRE);
    }

    #[test]
    fn unknown_genre_uses_drama_list() {
        let catalog = FallbackCatalog::builtin();
        let musical = Genre::Other("musical".to_string());
        let drama = catalog.images_for(&Genre::Drama).to_vec();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            let picked = select_fallback(&musical, &catalog, &mut rng);
            assert!(drama.contains(&picked));
        }
    }

    #[test]
    fn selection_never_empty_and_stays_in_genre() {
        let catalog = FallbackCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(42);
        for genre in Genre::KNOWN.iter() {
            let images = catalog.images_for(genre);
            for _ in 0..16 {
                let picked = select_fallback(genre, &catalog, &mut rng);
                assert!(!picked.is_empty());
                assert!(images.contains(&picked));
            }
        }
    }

    #[test]
    fn same_seed_same_pick() {
        let catalog = FallbackCatalog::builtin();
        let a = select_fallback(&Genre::Horror, &catalog, &mut StdRng::seed_from_u64(3));
        let b = select_fallback(&Genre::Horror, &catalog, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn new_rejects_empty_default_list() {
        let mut entries = HashMap::new();
        entries.insert("drama".to_string(), vec!["  ".to_string()]);
        entries.insert("action".to_string(), vec!["https://a.example/1.jpg".to_string()]);
        let err = FallbackCatalog::new("drama", entries).unwrap_err();
        assert!(matches!(err, PosterError::Catalog(_)));
    }

    #[test]
    fn custom_default_genre_is_honoured() {
        let mut entries = HashMap::new();
        entries.insert("Comedy".to_string(), vec!["https://a.example/laugh.jpg".to_string()]);
        let catalog = FallbackCatalog::new("comedy", entries).unwrap();
        let picked = select_fallback(
            &Genre::Thriller,
            &catalog,
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(picked, "https://a.example/laugh.jpg");
    }

    #[tokio::test]
    async fn loads_catalog_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"genres":{"drama":["https://a.example/d.jpg"],"horror":[]}}"#,
        )
        .unwrap();

        let catalog = FallbackCatalog::from_json_file(&path).await.unwrap();
        assert_eq!(catalog.default_genre(), "drama");
        assert!(!catalog.contains(&Genre::Horror));
        assert_eq!(
            catalog.images_for(&Genre::Horror).to_vec(),
            vec!["https://a.example/d.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn rejects_catalog_file_without_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"genres":{"action":["https://a.example/a.jpg"]}}"#).unwrap();
        assert!(FallbackCatalog::from_json_file(&path).await.is_err());
    }
}
