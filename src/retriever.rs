//! Sequential catalog crawl: listing pages, film detail pages, official sites.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;
use crate::dump::{PageDumper, RequestLabel};
use crate::export::{save_records, ExportError, OutputFormat};
use crate::extract::{parse_film_page, ExtractError, SiteLink};
use crate::models::{FieldValue, FilmRecord};
use crate::network::{FetchError, FetchResult, HttpClient};
use crate::parser::parse_listing;
use crate::session::{CrawlStats, Session};
use crate::url_utils::convert_to_absolute_url;

/// Errors of a crawl run or of a single film within it
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("{url} unreachable after {attempts} attempt(s): {last_error}")]
    Connectivity {
        url: String,
        attempts: u32,
        last_error: FetchError,
    },

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Invalid link '{link}': {source}")]
    InvalidLink {
        link: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    Client(FetchError),

    #[error("Dump error: {0}")]
    Dump(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Outcome of a finished crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub start_url: String,
    pub films_extracted: usize,
    pub pages_dumped: u64,
    pub duration_secs: u64,
    #[serde(flatten)]
    pub stats: CrawlStats,
}

impl std::fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} films extracted, {} skipped, {} listing pages, {} requests ({} failed), {} pages dumped, {}s",
            self.films_extracted,
            self.stats.films_skipped,
            self.stats.listing_pages,
            self.stats.requests,
            self.stats.failed_attempts,
            self.pages_dumped,
            self.duration_secs
        )
    }
}

/// Drives one crawl. Owns the HTTP client, the page dumper and the session.
#[derive(Debug)]
pub struct Retriever {
    config: ScraperConfig,
    http: HttpClient,
    dumper: PageDumper,
    session: Session,
}

impl Retriever {
    /// Build the retriever and clear the dump directory left by a previous run
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        info!(max_films = config.max_films, "Init retriever");

        let http = HttpClient::new(
            config.user_agent.clone(),
            config.timeout,
            config.max_redirects,
        )
        .map_err(ScrapeError::Client)?;

        let dumper = PageDumper::new(&config.dump_dir)?;
        let removed = dumper.clear()?;
        info!(dir = %dumper.dir().display(), removed, "Cleared dump directory");

        let session = Session::new(config.initial_referer.clone(), config.max_films);

        Ok(Self {
            config,
            http,
            dumper,
            session,
        })
    }

    pub fn records(&self) -> &[FilmRecord] {
        self.session.records()
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.session.stats
    }

    pub fn pages_dumped(&self) -> u64 {
        self.dumper.written()
    }

    /// GET `url` with the session referer, retrying transport failures.
    ///
    /// Every attempt is followed by a random delay; a failed attempt is also
    /// followed by the fixed backoff unless it was the last one. The body of
    /// the successful response is dumped under `label`.
    pub async fn fetch(&mut self, url: &str, label: RequestLabel) -> Result<FetchResult, ScrapeError> {
        let policy = self.config.retry.clone();
        let referer = self.session.referer().to_string();
        info!(url, %label, "send_get");

        let mut last_error = None;
        for attempt in 1..=policy.max_attempts {
            self.session.stats.requests += 1;
            let outcome = self.http.fetch_once(url, &referer).await;

            match &outcome {
                Ok(response) => {
                    info!(url, attempt, status = response.status_code, "send_get result=true");
                    if !response.is_success() {
                        warn!(url, status = response.status_code, "Non-success HTTP status");
                    }
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "send_get result=false");
                    self.session.stats.failed_attempts += 1;
                    if policy.should_back_off(attempt) {
                        debug!(wait_ms = policy.error_wait.as_millis() as u64, "Backing off before retry");
                        self.session.stats.backoffs += 1;
                        sleep(policy.error_wait).await;
                    }
                }
            }

            sleep(policy.jitter()).await;

            match outcome {
                Ok(response) => {
                    let path = self.dumper.write(label, &response.body)?;
                    debug!(path = %path.display(), bytes = response.body.len(), "Dumped page");
                    return Ok(response);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(ScrapeError::Connectivity {
            url: url.to_string(),
            attempts: policy.max_attempts,
            last_error: last_error.unwrap_or(FetchError::NetworkError("no attempt made".to_string())),
        })
    }

    /// Walk the listing chain from `start_url` until it ends or the quota is reached.
    ///
    /// A failed listing page aborts the run; a failed film is logged and skipped.
    #[tracing::instrument(skip(self), fields(max_films = self.session.max_films()))]
    pub async fn run(&mut self, start_url: &str) -> Result<CrawlSummary, ScrapeError> {
        let started = Instant::now();
        let mut next_page = Some(start_url.to_string());

        while let Some(page_url) = next_page.take() {
            if self.session.quota_reached() {
                info!(films = self.session.records().len(), "Film quota reached");
                return Ok(self.summary(start_url, started));
            }

            let response = self.fetch(&page_url, RequestLabel::FilmList).await?;
            self.session.stats.listing_pages += 1;
            let listing = parse_listing(&response.text())?;
            info!(
                url = %page_url,
                films = listing.film_links.len(),
                has_next = listing.next_url.is_some(),
                "Parsed listing page"
            );

            self.session.set_referer(page_url.clone());

            for link in &listing.film_links {
                match self.film_from_link(&page_url, link).await {
                    Ok(record) => self.session.push(record),
                    Err(e) => {
                        error!(link = %link, listing = %page_url, error = %e, "Skipping film");
                        self.session.stats.films_skipped += 1;
                    }
                }

                if self.session.quota_reached() {
                    info!(films = self.session.records().len(), "Film quota reached");
                    return Ok(self.summary(start_url, started));
                }
            }

            next_page = match listing.next_url {
                Some(next) => match convert_to_absolute_url(&next, &page_url) {
                    Ok(url) => Some(url),
                    Err(e) => {
                        error!(link = %next, error = %e, "Unusable next page link, ending crawl");
                        None
                    }
                },
                None => None,
            };
        }

        info!(films = self.session.records().len(), "Listing exhausted");
        Ok(self.summary(start_url, started))
    }

    async fn film_from_link(&mut self, listing_url: &str, link: &str) -> Result<FilmRecord, ScrapeError> {
        let film_url = convert_to_absolute_url(link, listing_url).map_err(|source| {
            ScrapeError::InvalidLink {
                link: link.to_string(),
                source,
            }
        })?;
        self.film_info(&film_url).await
    }

    /// Fetch one film detail page and build its record, resolving official sites.
    pub async fn film_info(&mut self, film_url: &str) -> Result<FilmRecord, ScrapeError> {
        let response = self.fetch(film_url, RequestLabel::FilmPage).await?;
        let page = parse_film_page(film_url, &response.text())?;
        let mut record = page.record;

        if !page.site_links.is_empty() {
            let sites = self.resolve_sites(film_url, &page.site_links).await?;
            record.details.insert_nonempty("sites", FieldValue::Links(sites));
        }

        match serde_json::to_string(&record) {
            Ok(json) => info!(record = %json, "Extracted film"),
            Err(e) => warn!(url = film_url, error = %e, "Could not serialize record for the log"),
        }
        Ok(record)
    }

    /// Follow each official site link to its final destination.
    /// Unreachable sites are logged and left out.
    async fn resolve_sites(
        &mut self,
        film_url: &str,
        links: &[SiteLink],
    ) -> Result<IndexMap<String, String>, ScrapeError> {
        let mut sites = IndexMap::new();

        for link in links {
            debug!(site = %link.label, "Looking for external link");
            let target = match convert_to_absolute_url(&link.href, film_url) {
                Ok(target) => target,
                Err(e) => {
                    error!(href = %link.href, error = %e, "Invalid official site link");
                    continue;
                }
            };

            match self.fetch(&target, RequestLabel::External).await {
                Ok(response) => {
                    sites.insert(link.label.clone(), response.final_url);
                }
                Err(e @ ScrapeError::Connectivity { .. }) => {
                    error!(site = %link.label, error = %e, "Official site unreachable");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(sites)
    }

    /// Write every collected record to `path` in one go
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<usize, ScrapeError> {
        let path = path.as_ref();
        info!(path = %path.display(), films = self.records().len(), "Save to file");
        save_records(path, self.records(), format)?;
        Ok(self.records().len())
    }

    fn summary(&self, start_url: &str, started: Instant) -> CrawlSummary {
        CrawlSummary {
            start_url: start_url.to_string(),
            films_extracted: self.session.records().len(),
            pages_dumped: self.dumper.written(),
            duration_secs: started.elapsed().as_secs(),
            stats: self.session.stats.clone(),
        }
    }
}
