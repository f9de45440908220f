use crate::error::PosterError;
use crate::generator::RemoteGenerator;
use crate::logi;
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use regex::Regex;
use reqwest::{Client, Url};
use std::sync::Mutex;

const SERVICE: &str = "stock photo";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("title pattern"));
static GENRE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\w-]+) genre").expect("genre pattern"));
static STYLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+) style").expect("style pattern"));
static UNSPLASH_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://source.unsplash.com/400x600/").expect("unsplash base url")
});

fn genre_terms(genre: &str) -> &'static [&'static str] {
    match genre {
        "action" => &["explosion", "fire", "warrior", "battle", "superhero", "car chase"],
        "horror" => &["dark", "scary", "night", "fog", "shadow", "mystery"],
        "comedy" => &["colorful", "fun", "bright", "party", "celebration", "happy"],
        "sci-fi" => &["space", "future", "robot", "technology", "stars", "alien"],
        "romance" => &["couple", "love", "sunset", "romantic", "flowers", "wedding"],
        "thriller" => &["dark", "suspense", "noir", "detective", "crime", "chase"],
        "fantasy" => &["magic", "castle", "dragon", "mystical", "adventure", "sword"],
        _ => &["emotional", "portrait", "sunset", "rain", "city", "relationship"],
    }
}

/// Title, genre and style as they appear in a generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParts {
    pub title: String,
    pub genre: String,
    pub style: String,
}

impl PromptParts {
    pub fn parse(prompt: &str) -> Self {
        let capture = |re: &Regex, default: &str| {
            re.captures(prompt)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            title: capture(&TITLE_RE, "movie"),
            genre: capture(&GENRE_RE, "drama"),
            style: capture(&STYLE_RE, "cinematic"),
        }
    }
}

/// Builds one dynamic stock-photo URL for `prompt`.
///
/// The first title word longer than three letters drives the search, with a
/// random genre term as the alternative.
pub fn plan_stock_url<R: Rng + ?Sized>(prompt: &str, rng: &mut R, timestamp_ms: i64) -> String {
    let parts = PromptParts::parse(prompt);
    let terms = genre_terms(&parts.genre);
    let random_term = terms.choose(rng).copied().unwrap_or("cinema");

    let title_lower = parts.title.to_lowercase();
    let search_term = title_lower
        .split(' ')
        .find(|word| word.chars().count() > 3)
        .unwrap_or(random_term);

    let genre = parts.genre.as_str();
    let style = parts.style.as_str();
    let variations = [
        format!("{search_term}+movie+poster"),
        format!("{random_term}+{genre}+film"),
        format!("{search_term}+{style}+cinema"),
        format!("{genre}+movie+{random_term}"),
        format!("{search_term}+film+poster"),
    ];
    let selected = variations[rng.gen_range(0..variations.len())].replace('+', ",");
    let seed: u32 = rng.gen_range(0..1000);

    let urls = [
        unsplash_url(&selected, timestamp_ms),
        unsplash_url(&format!("{random_term},movie,poster"), timestamp_ms),
        unsplash_url(&format!("{genre},cinematic"), timestamp_ms),
        format!("https://picsum.photos/seed/{seed}/400/600"),
    ];
    urls[rng.gen_range(0..urls.len())].clone()
}

/// `terms` is form-encoded as a bare query key so title text can never
/// leak into the path or fragment.
fn unsplash_url(terms: &str, timestamp_ms: i64) -> String {
    let mut url = UNSPLASH_BASE.clone();
    url.query_pairs_mut()
        .append_key_only(terms)
        .append_pair("t", &timestamp_ms.to_string());
    url.into()
}

async fn check_stock_url(client: &Client, url: &str) -> Result<String, PosterError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PosterError::Status {
            service: SERVICE,
            status: status.as_u16(),
        });
    }

    // Redirecting services hand out a stable URL for the picked image.
    Ok(resp.url().to_string())
}

/// Stock-photo stand-in for a text-to-image model: derives a themed image
/// URL from the prompt and keeps it only if the URL actually serves.
pub struct StockPhotoGenerator {
    client: Client,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl StockPhotoGenerator {
    pub fn new(client: Client) -> Self {
        Self::with_rng(client, Box::new(StdRng::from_entropy()))
    }

    pub fn with_rng(client: Client, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            client,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl RemoteGenerator for StockPhotoGenerator {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, prompt: &str) -> Result<String, PosterError> {
        let url = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            plan_stock_url(prompt, &mut **rng, Utc::now().timestamp_millis())
        };
        logi(format!("Checking stock image {}", url));
        check_stock_url(&self.client, &url).await
    }
}
