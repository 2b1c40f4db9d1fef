//! Mirror of every fetched page, one numbered file per successful request.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Purpose of a request; names the dump file it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLabel {
    FilmList,
    FilmPage,
    External,
}

impl RequestLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestLabel::FilmList => "filmlist",
            RequestLabel::FilmPage => "filmpage",
            RequestLabel::External => "external",
        }
    }
}

impl std::fmt::Display for RequestLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes raw response bodies as `<seq>-<label>.html`
#[derive(Debug)]
pub struct PageDumper {
    dir: PathBuf,
    next_seq: u64,
}

impl PageDumper {
    /// Open the dump directory, creating it if missing. Numbering starts at 1.
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, next_seq: 1 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of pages written so far
    pub fn written(&self) -> u64 {
        self.next_seq - 1
    }

    /// Remove every regular file left in the directory by a previous run.
    pub fn clear(&self) -> io::Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn write(&mut self, label: RequestLabel, body: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(dump_file_name(self.next_seq, label));
        fs::write(&path, body)?;
        self.next_seq += 1;
        Ok(path)
    }
}

pub fn dump_file_name(seq: u64, label: RequestLabel) -> String {
    format!("{:05}-{}.html", seq, label.as_str())
}
