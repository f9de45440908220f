use crate::form::MovieFormData;
use once_cell::sync::Lazy;
use regex::Regex;

const PROMPT_SUFFIX: &str =
    ", professional movie poster design, cinematic lighting, high quality, detailed";

static TECHNICAL_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)professional|poster|design|cinematic|lighting|high quality|detailed")
        .expect("technical terms pattern")
});
static PROMPT_SCAFFOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)movie poster for|genre|style").expect("scaffold pattern"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Builds the text-to-image prompt for a poster.
pub fn build_prompt(form: &MovieFormData) -> String {
    let mut prompt = format!(
        "Movie poster for \"{}\", {} genre, {} style",
        form.title(),
        form.genre(),
        form.style()
    );

    if let Some(description) = form.description() {
        prompt.push_str(", ");
        prompt.push_str(description);
    }

    prompt.push_str(PROMPT_SUFFIX);
    prompt
}

/// Reduces a generation prompt to plain search keywords for stock-photo
/// lookups.
pub fn extract_keywords(prompt: &str) -> String {
    let prompt = prompt.strip_suffix(PROMPT_SUFFIX).unwrap_or(prompt);
    let stripped = PROMPT_SCAFFOLD_RE.replace_all(prompt, "");
    let stripped = TECHNICAL_TERMS_RE.replace_all(&stripped, "");
    let stripped = stripped.replace(['"', ','], "");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}
