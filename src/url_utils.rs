//! URL helpers shared by the retriever and the CLI.

use url::Url;

/// Resolve `link` against the page it was found on. Absolute links pass through.
pub fn convert_to_absolute_url(link: &str, base_url: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(base_url)?;
    let absolute_url = base.join(link.trim())?;
    Ok(absolute_url.to_string())
}

/// Add https:// prefix for bare hosts (CLI convenience).
pub fn normalize_url_for_cli(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }

    format!("https://{}", trimmed)
}
