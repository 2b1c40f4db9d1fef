use serde::{Deserialize, Serialize};

use crate::models::FilmRecord;

/// Counters kept for the run summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub listing_pages: usize,
    pub films_skipped: usize,
    pub requests: u64,
    pub failed_attempts: u64,
    pub backoffs: u64,
}

/// Mutable state of one run: navigation referer, collected films and quota
#[derive(Debug)]
pub struct Session {
    referer: String,
    records: Vec<FilmRecord>,
    max_films: usize,
    pub stats: CrawlStats,
}

impl Session {
    pub fn new(initial_referer: String, max_films: usize) -> Self {
        Self {
            referer: initial_referer,
            records: Vec::new(),
            max_films,
            stats: CrawlStats::default(),
        }
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }

    pub fn set_referer(&mut self, referer: String) {
        self.referer = referer;
    }

    pub fn max_films(&self) -> usize {
        self.max_films
    }

    pub fn quota_reached(&self) -> bool {
        self.records.len() >= self.max_films
    }

    /// Append a record in traversal order. Callers stop once `quota_reached` holds.
    pub fn push(&mut self, record: FilmRecord) {
        debug_assert!(!self.quota_reached(), "record pushed past the film quota");
        self.records.push(record);
    }

    pub fn records(&self) -> &[FilmRecord] {
        &self.records
    }
}
