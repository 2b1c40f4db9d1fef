use scraper::Html;

use crate::extract::{selector, ExtractError};

/// Anchor text that marks the link to the next listing page
pub const NEXT_PAGE_TEXT: &str = "Next »";

/// Links found on one catalog listing page, hrefs as they appear in the markup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPage {
    pub film_links: Vec<String>,
    pub next_url: Option<String>,
}

/// Parse a listing page for film detail links and the "next page" link
///
/// # Examples
/// ```
/// use movie_scraper::parser::parse_listing;
///
/// let html = r#"<div><h3><a href="/title/tt01/">A</a></h3></div><a href="/search?start=51">Next »</a>"#;
/// let page = parse_listing(html).unwrap();
/// assert_eq!(page.film_links, vec!["/title/tt01/"]);
/// assert_eq!(page.next_url.as_deref(), Some("/search?start=51"));
/// ```
pub fn parse_listing(html_body: &str) -> Result<ListingPage, ExtractError> {
    let document = Html::parse_document(html_body);
    Ok(ListingPage {
        film_links: extract_film_links(&document)?,
        next_url: extract_next_url(&document)?,
    })
}

pub fn extract_film_links(document: &Html) -> Result<Vec<String>, ExtractError> {
    let film_selector = selector(r#"div > h3 > a[href*="/title/"]"#)?;

    Ok(document
        .select(&film_selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .collect())
}

pub fn extract_next_url(document: &Html) -> Result<Option<String>, ExtractError> {
    let anchor_selector = selector("a[href]")?;

    Ok(document
        .select(&anchor_selector)
        .find(|a| a.text().collect::<String>().trim() == NEXT_PAGE_TEXT)
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string()))
}
