//! HMMER hmmsearch plain-text report parsing
//!
//! A report holds one query profile, a "Scores for complete sequences" table,
//! one domain table per reported sequence and the pipeline statistics footer.
//! The layout is checked strictly: anything that differs from the expected
//! banners, column headers or separators is a parse error.

mod domain;
mod parser;
mod report;
mod score;

pub use domain::{Coordinates, DomainAnnotation};
pub use parser::SearchReportParser;
pub use report::{PipelineStatistics, ReportHeader, SearchReport};
pub use score::SequenceScore;

use crate::error::{ParseErr, Result};
use crate::input;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

impl SearchReport {
    /// Parse a (possibly BGZF-compressed) report file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source_name = path.as_ref().display().to_string();
        let rdr = input::open_path(path)?;
        SearchReportParser::new(rdr, source_name).parse()
    }

    /// Parse a report from any buffered reader; `source_name` only labels errors.
    pub fn from_reader<R: BufRead>(rdr: R, source_name: &str) -> Result<Self> {
        SearchReportParser::new(rdr, source_name).parse()
    }
}

impl FromStr for SearchReport {
    type Err = ParseErr;

    fn from_str(s: &str) -> Result<Self> {
        SearchReport::from_reader(s.as_bytes(), "<string>")
    }
}
