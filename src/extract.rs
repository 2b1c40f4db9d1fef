//! Film detail page extraction.
//!
//! Required fields are pulled with dedicated selectors. Every optional field is
//! described by one row of [`FIELD_RULES`]: the `txt-block` heading that
//! identifies it, which text to take from the block, and how to clean it up.

use scraper::{ElementRef, Html, Selector};

use crate::models::{FieldGroup, FieldValue, FilmRecord};

/// Heading of the block listing a film's official sites
pub const SITES_HEADING: &str = "Official Sites:";

/// Errors raised while reading markup
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("required field '{0}' not found on page")]
    MissingField(&'static str),

    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Compile a CSS selector, reporting failures as extraction errors
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Details,
    BoxOffice,
    TechnicalSpecs,
}

/// Which text of a heading block makes up the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Text of every anchor directly inside the block, as a list
    AnchorTexts,
    /// Text of the first anchor directly inside the block
    FirstAnchorText,
    /// Text nodes that are direct children of the block
    OwnText,
    /// Text of `time` elements directly inside the block
    TimeText,
    /// Every text node in the block except the heading itself
    BlockText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Trim surrounding whitespace
    Trim,
    /// Trim, then strip leading and trailing commas
    TrimCommas,
    /// Collapse every whitespace run into a single space
    Collapse,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub group: Group,
    pub key: &'static str,
    pub heading: &'static str,
    pub query: Query,
    pub post: PostProcess,
}

const fn rule(
    group: Group,
    key: &'static str,
    heading: &'static str,
    query: Query,
    post: PostProcess,
) -> FieldRule {
    FieldRule {
        group,
        key,
        heading,
        query,
        post,
    }
}

pub const FIELD_RULES: &[FieldRule] = &[
    rule(Group::Details, "country", "Country:", Query::AnchorTexts, PostProcess::Trim),
    rule(Group::Details, "language", "Language:", Query::AnchorTexts, PostProcess::Trim),
    rule(Group::Details, "release date", "Release Date:", Query::OwnText, PostProcess::Trim),
    rule(Group::Details, "other name", "Also Known As:", Query::OwnText, PostProcess::Trim),
    rule(Group::Details, "locations", "Filming Locations:", Query::FirstAnchorText, PostProcess::Trim),
    rule(Group::BoxOffice, "Budget", "Budget:", Query::OwnText, PostProcess::Trim),
    rule(Group::BoxOffice, "Opening Weekend USA", "Opening Weekend USA:", Query::OwnText, PostProcess::TrimCommas),
    rule(Group::BoxOffice, "Gross USA", "Gross USA:", Query::OwnText, PostProcess::Trim),
    rule(Group::BoxOffice, "Cumulative Worldwide Gross", "Cumulative Worldwide Gross:", Query::OwnText, PostProcess::Trim),
    rule(Group::TechnicalSpecs, "Runtime", "Runtime:", Query::TimeText, PostProcess::Trim),
    rule(Group::TechnicalSpecs, "Sound Mix", "Sound Mix:", Query::BlockText, PostProcess::Collapse),
    rule(Group::TechnicalSpecs, "Color", "Color:", Query::BlockText, PostProcess::Collapse),
    rule(Group::TechnicalSpecs, "Aspect Ratio", "Aspect Ratio:", Query::OwnText, PostProcess::Trim),
];

impl FieldRule {
    pub fn extract(&self, block: ElementRef<'_>) -> FieldValue {
        let raw = match self.query {
            Query::AnchorTexts => FieldValue::List(
                child_elements(block, "a").map(own_text).collect(),
            ),
            Query::FirstAnchorText => FieldValue::Text(
                child_elements(block, "a").next().map(own_text).unwrap_or_default(),
            ),
            Query::OwnText => FieldValue::Text(own_text(block)),
            Query::TimeText => {
                FieldValue::Text(child_elements(block, "time").map(own_text).collect())
            }
            Query::BlockText => FieldValue::Text(text_without_heading(block)),
        };
        self.post.apply(raw)
    }
}

impl PostProcess {
    pub fn apply(&self, value: FieldValue) -> FieldValue {
        match value {
            FieldValue::Text(text) => FieldValue::Text(self.clean(&text)),
            FieldValue::List(items) => FieldValue::List(
                items
                    .iter()
                    .map(|item| self.clean(item))
                    .filter(|item| !item.is_empty())
                    .collect(),
            ),
            links @ FieldValue::Links(_) => links,
        }
    }

    fn clean(&self, text: &str) -> String {
        let text = normalize_nbsp(text);
        match self {
            PostProcess::Trim => text.trim().to_string(),
            PostProcess::TrimCommas => text.trim().trim_matches(',').trim().to_string(),
            PostProcess::Collapse => collapse_whitespace(&text),
        }
    }
}

/// An official site anchor, before its target has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLink {
    pub label: String,
    pub href: String,
}

/// A detail page turned into a record, with site links still to be resolved
#[derive(Debug, Clone)]
pub struct ParsedFilmPage {
    pub record: FilmRecord,
    pub site_links: Vec<SiteLink>,
}

/// Extract a film record from the markup of its detail page.
///
/// Fails when the title or the rating is missing; every other field is
/// best-effort.
pub fn parse_film_page(url: &str, html_body: &str) -> Result<ParsedFilmPage, ExtractError> {
    let document = Html::parse_document(html_body);

    let mut record = FilmRecord::new(
        url.to_string(),
        extract_name(&document)?,
        extract_rating(&document)?,
    );
    record.genres = extract_genres(&document)?;
    record.stars = extract_stars(&document)?;

    for field in FIELD_RULES {
        if let Some(block) = find_block(&document, "txt-block", field.heading)? {
            group_mut(&mut record, field.group).insert_nonempty(field.key, field.extract(block));
        }
    }

    Ok(ParsedFilmPage {
        record,
        site_links: extract_site_links(&document)?,
    })
}

pub fn group_mut(record: &mut FilmRecord, group: Group) -> &mut FieldGroup {
    match group {
        Group::Details => &mut record.details,
        Group::BoxOffice => &mut record.box_office,
        Group::TechnicalSpecs => &mut record.technical_specs,
    }
}

fn extract_name(document: &Html) -> Result<String, ExtractError> {
    let title_selector = selector(r#"div[class="title_wrapper"] > h1"#)?;

    document
        .select(&title_selector)
        .next()
        .and_then(|h1| {
            h1.children()
                .filter_map(|node| node.value().as_text())
                .map(|text| normalize_nbsp(text).trim().to_string())
                .find(|text| !text.is_empty())
        })
        .ok_or(ExtractError::MissingField("name"))
}

fn extract_rating(document: &Html) -> Result<String, ExtractError> {
    let rating_selector = selector(r#"span[itemprop="ratingValue"]"#)?;

    document
        .select(&rating_selector)
        .next()
        .map(|span| span.text().collect::<String>().trim().to_string())
        .filter(|rating| !rating.is_empty())
        .ok_or(ExtractError::MissingField("rating"))
}

fn extract_genres(document: &Html) -> Result<Vec<String>, ExtractError> {
    let genre_selector = selector(r#"div[class="subtext"] > a[href*="genres"]"#)?;

    Ok(document
        .select(&genre_selector)
        .map(own_text)
        .map(|genre| normalize_nbsp(&genre).trim().to_string())
        .filter(|genre| !genre.is_empty())
        .collect())
}

fn extract_stars(document: &Html) -> Result<Vec<String>, ExtractError> {
    let Some(block) = find_block(document, "credit_summary_item", "Stars:")? else {
        return Ok(Vec::new());
    };

    Ok(child_elements(block, "a")
        .filter(|a| a.value().attr("href").is_some_and(|href| href.contains("/name/nm")))
        .map(own_text)
        .map(|star| normalize_nbsp(&star).trim().to_string())
        .filter(|star| !star.is_empty())
        .collect())
}

fn extract_site_links(document: &Html) -> Result<Vec<SiteLink>, ExtractError> {
    let Some(block) = find_block(document, "txt-block", SITES_HEADING)? else {
        return Ok(Vec::new());
    };

    Ok(child_elements(block, "a")
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            let label = normalize_nbsp(&a.text().collect::<String>()).trim().to_string();
            let label = if label.is_empty() { href.clone() } else { label };
            Some(SiteLink { label, href })
        })
        .collect())
}

/// Find the first `div` whose class is exactly `class` and whose `h4` child reads `heading`
fn find_block<'a>(
    document: &'a Html,
    class: &str,
    heading: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let block_selector = selector(&format!(r#"div[class="{}"]"#, class))?;

    Ok(document.select(&block_selector).find(|block| {
        child_elements(*block, "h4").any(|h4| normalize_nbsp(&own_text(h4)).trim() == heading)
    }))
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// Concatenated text nodes that are direct children of `element`
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn text_without_heading(block: ElementRef<'_>) -> String {
    block
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            (parent.value().name() != "h4").then_some(&**text)
        })
        .collect()
}

pub fn normalize_nbsp(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILM_URL: &str = "https://www.imdb.com/title/tt1234567/";

    const FULL_PAGE: &str = r#"
    <html><body>
      <div class="title_wrapper">
        <h1 class="">Some&nbsp;Comedy&nbsp;<span id="titleYear">(<a href="/year/2015/">2015</a>)</span></h1>
        <div class="subtext">
          PG-13 <span class="ghost">|</span>
          <time datetime="PT101M">1h 41min</time> <span class="ghost">|</span>
          <a href="/search/title?genres=comedy&explore=title_type,genres">Comedy</a>,
          <a href="/search/title?genres=romance&explore=title_type,genres">Romance</a>
          <span class="ghost">|</span>
          <a href="/title/tt1234567/releaseinfo" title="See more release dates">15 May 2015 (USA)</a>
        </div>
      </div>
      <div class="ratingValue">
        <strong title="6.4 based on 12,345 user ratings"><span itemprop="ratingValue">6.4</span></strong>
      </div>
      <div class="credit_summary_item">
        <h4 class="inline">Director:</h4>
        <a href="/name/nm0000009/">Some Director</a>
      </div>
      <div class="credit_summary_item">
        <h4 class="inline">Stars:</h4>
        <a href="/name/nm0000001/">Jane Doe</a>,
        <a href="/name/nm0000002/">John Roe</a>
        <span class="ghost">|</span>
        <a href="/title/tt1234567/fullcredits/">See full cast &amp; crew</a>&nbsp;»
      </div>
      <div id="titleDetails" class="article">
        <div class="txt-block">
          <h4 class="inline">Official Sites:</h4>
          <a href="/offsite/?page-action=offsite-facebook&token=abc" rel="nofollow">Official Facebook</a>
          <span class="ghost">|</span>
          <a href="/offsite/?page-action=offsite-site&token=def" rel="nofollow">Official site</a>
        </div>
        <div class="txt-block">
          <h4 class="inline">Country:</h4>
          <a href="/search/title?country_of_origin=us">USA</a>
          <span class="ghost">|</span>
          <a href="/search/title?country_of_origin=ca">Canada</a>
        </div>
        <div class="txt-block">
          <h4 class="inline">Language:</h4>
          <a href="/search/title?title_type=feature&primary_language=en">English</a>
        </div>
        <div class="txt-block">
          <h4 class="inline">Release Date:</h4> 15 May 2015 (USA)
          <span class="see-more inline"><a href="/title/tt1234567/releaseinfo">See more</a>&nbsp;»</span>
        </div>
        <div class="txt-block">
          <h4 class="inline">Also Known As:</h4> Una Comedia
          <span class="see-more inline"><a href="/title/tt1234567/releaseinfo#akas">See more</a>&nbsp;»</span>
        </div>
        <div class="txt-block">
          <h4 class="inline">Filming Locations:</h4>
          <a href="/search/title?locations=Los%20Angeles">Los Angeles, California, USA</a>
          <span class="see-more inline"><a href="/title/tt1234567/locations">See more</a>&nbsp;»</span>
        </div>
        <h3 class="subheading">Box Office</h3>
        <div class="txt-block">
          <h4 class="inline">Budget:</h4>$25,000,000
          <span class="attribute">(estimated)</span>
        </div>
        <div class="txt-block">
          <h4 class="inline">Opening Weekend USA:</h4> $10,000,000,
          <span class="attribute">17 May 2015</span>
        </div>
        <div class="txt-block">
          <h4 class="inline">Gross USA:</h4> $40,123,456
        </div>
        <div class="txt-block">
          <h4 class="inline">Cumulative Worldwide Gross:</h4> $80,654,321
        </div>
        <h3 class="subheading">Technical Specs</h3>
        <div class="txt-block">
          <h4 class="inline">Runtime:</h4>
          <time datetime="PT101M">101 min</time>
        </div>
        <div class="txt-block">
          <h4 class="inline">Sound Mix:</h4>
          <a href="/search/title?sound_mixes=dolby_digital">Dolby Digital</a>
          <span class="ghost">|</span>
          <a href="/search/title?sound_mixes=sdds">SDDS</a>&nbsp;(Sony)
        </div>
        <div class="txt-block">
          <h4 class="inline">Color:</h4>
          <a href="/search/title?colors=color">Color</a>
        </div>
        <div class="txt-block">
          <h4 class="inline">Aspect Ratio:</h4> 2.39 : 1
        </div>
      </div>
    </body></html>
    "#;

    fn text(value: Option<&FieldValue>) -> &str {
        match value {
            Some(FieldValue::Text(s)) => s,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_required_fields() {
        let page = parse_film_page(FILM_URL, FULL_PAGE).unwrap();
        let record = page.record;
        assert_eq!(record.imdb_url, FILM_URL);
        assert_eq!(record.name, "Some Comedy");
        assert_eq!(record.rating, "6.4");
        assert_eq!(record.genres, vec!["Comedy", "Romance"]);
        assert_eq!(record.stars, vec!["Jane Doe", "John Roe"]);
    }

    #[test]
    fn test_details_group() {
        let record = parse_film_page(FILM_URL, FULL_PAGE).unwrap().record;
        assert_eq!(
            record.details.get("country"),
            Some(&FieldValue::List(vec!["USA".to_string(), "Canada".to_string()]))
        );
        assert_eq!(
            record.details.get("language"),
            Some(&FieldValue::List(vec!["English".to_string()]))
        );
        assert_eq!(text(record.details.get("release date")), "15 May 2015 (USA)");
        assert_eq!(text(record.details.get("other name")), "Una Comedia");
        assert_eq!(text(record.details.get("locations")), "Los Angeles, California, USA");
        assert!(record.details.get("sites").is_none());
    }

    #[test]
    fn test_box_office_group() {
        let record = parse_film_page(FILM_URL, FULL_PAGE).unwrap().record;
        assert_eq!(text(record.box_office.get("Budget")), "$25,000,000");
        assert_eq!(text(record.box_office.get("Opening Weekend USA")), "$10,000,000");
        assert_eq!(text(record.box_office.get("Gross USA")), "$40,123,456");
        assert_eq!(
            text(record.box_office.get("Cumulative Worldwide Gross")),
            "$80,654,321"
        );
    }

    #[test]
    fn test_technical_specs_group() {
        let record = parse_film_page(FILM_URL, FULL_PAGE).unwrap().record;
        assert_eq!(text(record.technical_specs.get("Runtime")), "101 min");
        assert_eq!(
            text(record.technical_specs.get("Sound Mix")),
            "Dolby Digital | SDDS (Sony)"
        );
        assert_eq!(text(record.technical_specs.get("Color")), "Color");
        assert_eq!(text(record.technical_specs.get("Aspect Ratio")), "2.39 : 1");
    }

    #[test]
    fn test_official_site_links() {
        let page = parse_film_page(FILM_URL, FULL_PAGE).unwrap();
        assert_eq!(
            page.site_links,
            vec![
                SiteLink {
                    label: "Official Facebook".to_string(),
                    href: "/offsite/?page-action=offsite-facebook&token=abc".to_string(),
                },
                SiteLink {
                    label: "Official site".to_string(),
                    href: "/offsite/?page-action=offsite-site&token=def".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_rating_is_an_error() {
        let html = r#"<div class="title_wrapper"><h1>No Rating Yet</h1></div>"#;
        let err = parse_film_page(FILM_URL, html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField("rating")));
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let html = r#"<span itemprop="ratingValue">7.0</span>"#;
        let err = parse_film_page(FILM_URL, html).unwrap_err();
        assert!(matches!(err, ExtractError::MissingField("name")));
    }

    #[test]
    fn test_minimal_page_omits_optional_groups() {
        let html = r#"
            <div class="title_wrapper"><h1>Bare Film</h1></div>
            <span itemprop="ratingValue">5.5</span>
            <div class="txt-block"><h4 class="inline">Budget:</h4>   </div>
            <div class="txt-block"><h4 class="inline">Country:</h4></div>
        "#;
        let page = parse_film_page(FILM_URL, html).unwrap();
        assert!(page.record.genres.is_empty());
        assert!(page.record.stars.is_empty());
        assert!(page.record.details.is_empty());
        assert!(page.record.box_office.is_empty());
        assert!(page.record.technical_specs.is_empty());
        assert!(page.site_links.is_empty());

        let json = serde_json::to_value(&page.record).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("box office").is_none());
        assert!(json.get("technical specs").is_none());
    }

    #[test]
    fn test_single_field_makes_group_present() {
        let html = r#"
            <div class="title_wrapper"><h1>Short</h1></div>
            <span itemprop="ratingValue">8.0</span>
            <div class="txt-block"><h4 class="inline">Runtime:</h4><time>12 min</time></div>
        "#;
        let record = parse_film_page(FILM_URL, html).unwrap().record;
        assert_eq!(record.technical_specs.len(), 1);
        assert!(record.box_office.is_empty());
    }

    #[test]
    fn test_heading_must_match_exactly() {
        let html = r#"
            <div class="title_wrapper"><h1>Film</h1></div>
            <span itemprop="ratingValue">6.0</span>
            <div class="txt-block"><h4>Gross USA (est.):</h4> $1</div>
        "#;
        let record = parse_film_page(FILM_URL, html).unwrap().record;
        assert!(record.box_office.get("Gross USA").is_none());
    }

    #[test]
    fn test_post_processing_rules() {
        assert_eq!(
            PostProcess::TrimCommas.apply(FieldValue::Text(" ,$5, \n".to_string())),
            FieldValue::Text("$5".to_string())
        );
        assert_eq!(
            PostProcess::Collapse.apply(FieldValue::Text("a\n   b\u{a0}\u{a0}c ".to_string())),
            FieldValue::Text("a b c".to_string())
        );
        assert_eq!(
            PostProcess::Trim.apply(FieldValue::List(vec![" x ".to_string(), "  ".to_string()])),
            FieldValue::List(vec!["x".to_string()])
        );
    }

    #[test]
    fn test_every_rule_has_a_heading() {
        for field in FIELD_RULES {
            assert!(field.heading.ends_with(':'), "{}", field.key);
            assert!(!field.key.is_empty());
        }
    }
}
