use crate::error::PosterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Movie genre as picked in the form's genre tags.
///
/// Values outside the known set are kept verbatim in `Other` so that the
/// fallback catalog can substitute its default genre for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Genre {
    Action,
    #[default]
    Drama,
    Horror,
    Comedy,
    SciFi,
    Romance,
    Thriller,
    Fantasy,
    Other(String),
}

impl Genre {
    pub const KNOWN: [Genre; 8] = [
        Genre::Action,
        Genre::Drama,
        Genre::Horror,
        Genre::Comedy,
        Genre::SciFi,
        Genre::Romance,
        Genre::Thriller,
        Genre::Fantasy,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Genre::Action => "action",
            Genre::Drama => "drama",
            Genre::Horror => "horror",
            Genre::Comedy => "comedy",
            Genre::SciFi => "sci-fi",
            Genre::Romance => "romance",
            Genre::Thriller => "thriller",
            Genre::Fantasy => "fantasy",
            Genre::Other(name) => name.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Genre::Other(_))
    }
}

impl From<&str> for Genre {
    fn from(value: &str) -> Self {
        let name = value.trim().to_ascii_lowercase();
        match name.as_str() {
            "action" => Genre::Action,
            "drama" => Genre::Drama,
            "horror" => Genre::Horror,
            "comedy" => Genre::Comedy,
            "sci-fi" | "scifi" => Genre::SciFi,
            "romance" => Genre::Romance,
            "thriller" => Genre::Thriller,
            "fantasy" => Genre::Fantasy,
            "" => Genre::default(),
            _ => Genre::Other(name),
        }
    }
}

impl From<String> for Genre {
    fn from(value: String) -> Self {
        Genre::from(value.as_str())
    }
}

impl From<Genre> for String {
    fn from(value: Genre) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosterStyle {
    #[default]
    Cinematic,
    Vintage,
    Modern,
    Noir,
    Minimalist,
    Blockbuster,
}

impl PosterStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosterStyle::Cinematic => "cinematic",
            PosterStyle::Vintage => "vintage",
            PosterStyle::Modern => "modern",
            PosterStyle::Noir => "noir",
            PosterStyle::Minimalist => "minimalist",
            PosterStyle::Blockbuster => "blockbuster",
        }
    }
}

impl FromStr for PosterStyle {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cinematic" => Ok(PosterStyle::Cinematic),
            "vintage" => Ok(PosterStyle::Vintage),
            "modern" => Ok(PosterStyle::Modern),
            "noir" => Ok(PosterStyle::Noir),
            "minimalist" => Ok(PosterStyle::Minimalist),
            "blockbuster" => Ok(PosterStyle::Blockbuster),
            other => Err(PosterError::Validation(format!("unknown poster style '{}'", other))),
        }
    }
}

impl fmt::Display for PosterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form fields collected for one poster generation.
///
/// Only constructible through [`MovieFormData::new`] (or deserialization,
/// which runs the same checks), so a value in hand always has a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMovieForm")]
pub struct MovieFormData {
    title: String,
    genre: Genre,
    description: String,
    style: PosterStyle,
}

#[derive(Deserialize)]
struct RawMovieForm {
    title: String,
    #[serde(default)]
    genre: Genre,
    #[serde(default)]
    description: String,
    #[serde(default)]
    style: PosterStyle,
}

impl TryFrom<RawMovieForm> for MovieFormData {
    type Error = PosterError;

    fn try_from(raw: RawMovieForm) -> Result<Self, Self::Error> {
        MovieFormData::new(raw.title, raw.genre, raw.description, raw.style)
    }
}

impl MovieFormData {
    pub fn new(
        title: impl Into<String>,
        genre: Genre,
        description: impl Into<String>,
        style: PosterStyle,
    ) -> Result<Self, PosterError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(PosterError::Validation(
                "Please enter a movie title!".to_string(),
            ));
        }

        let genre = match genre {
            Genre::Other(name) if name.trim().is_empty() => Genre::default(),
            genre => genre,
        };

        Ok(Self {
            title,
            genre,
            description: description.into().trim().to_string(),
            style,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn genre(&self) -> &Genre {
        &self.genre
    }

    pub fn description(&self) -> Option<&str> {
        if self.description.is_empty() {
            None
        } else {
            Some(&self.description)
        }
    }

    pub fn style(&self) -> PosterStyle {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_is_rejected() {
        let err = MovieFormData::new("   ", Genre::Action, "", PosterStyle::Modern).unwrap_err();
        assert!(matches!(err, PosterError::Validation(_)));
    }

    #[test]
    fn title_and_description_are_trimmed() {
        let form = MovieFormData::new("  Deep Space ", Genre::SciFi, "  ", PosterStyle::Noir).unwrap();
        assert_eq!(form.title(), "Deep Space");
        assert_eq!(form.description(), None);
    }

    #[test]
    fn unknown_genre_is_preserved() {
        let genre = Genre::from("Musical");
        assert_eq!(genre, Genre::Other("musical".to_string()));
        assert!(!genre.is_known());
        assert_eq!(genre.as_str(), "musical");
        assert_eq!(Genre::from("sci-fi"), Genre::SciFi);
    }

    #[test]
    fn blank_genre_means_no_genre_picked() {
        assert_eq!(Genre::from(""), Genre::Drama);
        assert_eq!(Genre::from("   "), Genre::Drama);

        let form: MovieFormData =
            serde_json::from_str(r#"{"title":"Gangnam Style Cinematic Design","genre":""}"#).unwrap();
        assert_eq!(form.genre(), &Genre::Drama);

        let form = MovieFormData::new(
            "Gangnam Style Cinematic Design",
            Genre::Other(" ".to_string()),
            "",
            PosterStyle::Noir,
        )
        .unwrap();
        assert_eq!(form.genre(), &Genre::Drama);
        assert!(crate::build_prompt(&form).contains(", drama genre, noir style"));
    }

    #[test]
    fn deserialize_applies_defaults_and_validation() {
        let form: MovieFormData = serde_json::from_str(r#"{"title":"Night Shift"}"#).unwrap();
        assert_eq!(form.genre(), &Genre::Drama);
        assert_eq!(form.style(), PosterStyle::Cinematic);

        let bad = serde_json::from_str::<MovieFormData>(r#"{"title":"","genre":"horror"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serializes_wire_names() {
        let form = MovieFormData::new("Deep Space", Genre::SciFi, "", PosterStyle::Blockbuster).unwrap();
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["genre"], "sci-fi");
        assert_eq!(value["style"], "blockbuster");
    }

    #[test]
    fn style_parse_rejects_unknown() {
        assert_eq!("Noir".parse::<PosterStyle>().unwrap(), PosterStyle::Noir);
        assert!("pastel".parse::<PosterStyle>().is_err());
    }
}
