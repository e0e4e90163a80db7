//! BLAST tabular (outfmt 6/7) parsing
//!
//! Each non-comment line holds exactly 12 tab-separated fields:
//! qseqid, sseqid, pident, length, mismatch, gapopen, qstart, qend, sstart, send,
//! evalue, bitscore. Lines starting with `#` (outfmt 7 comments) are skipped.

use crate::error::{parse_float, parse_int, LineErr, ParseErr, Result, ValueErr};
use crate::input;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

const BLAST_FIELDS: usize = 12;

/// A single query/subject alignment from a BLAST tabular report.
///
/// Coordinates are 1-based and inclusive, exactly as written by BLAST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlastHit {
    pub query_id: String,
    pub subject_id: String,
    pub identity: f64,
    pub length: u64,
    pub mismatches: u64,
    pub gap_opens: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub subject_start: u64,
    pub subject_end: u64,
    pub evalue: f64,
    pub bit_score: f64,
    /// Length of the query sequence, when attached by the caller
    pub query_length: Option<u64>,
}

/// Where to take a query length from.
#[derive(Debug, Clone, Copy)]
pub enum QueryLength<'a> {
    /// The same length for any hit
    Literal(i64),
    /// Lengths keyed by query id, e.g. a JSON object loaded by the caller
    Lookup(&'a Map<String, Value>),
}

impl BlastHit {
    /// Attach the query length, either given directly or looked up by query id.
    ///
    /// On error the record is left untouched.
    pub fn set_query_length(&mut self, source: QueryLength<'_>) -> std::result::Result<(), ValueErr> {
        let length = match source {
            QueryLength::Literal(length) => length,
            QueryLength::Lookup(lengths) => {
                let value = lengths
                    .get(&self.query_id)
                    .ok_or_else(|| ValueErr::UnknownQuery(self.query_id.clone()))?;
                integer_length(&self.query_id, value)?
            }
        };

        let length = u64::try_from(length).map_err(|_| ValueErr::NegativeLength(length))?;
        self.query_length = Some(length);
        Ok(())
    }
}

fn integer_length(query: &str, value: &Value) -> std::result::Result<i64, ValueErr> {
    // values above i64::MAX are not lengths we can represent either
    value.as_i64().ok_or_else(|| ValueErr::NotAnInteger {
        query: query.to_string(),
        value: value.to_string(),
    })
}

impl FromStr for BlastHit {
    type Err = LineErr;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() != BLAST_FIELDS {
            return Err(LineErr::FieldCount {
                expected: BLAST_FIELDS,
                found: fields.len(),
            });
        }

        Ok(BlastHit {
            query_id: fields[0].to_string(),
            subject_id: fields[1].to_string(),
            identity: parse_float(fields[2], "pident")?,
            length: parse_int(fields[3], "length")?,
            mismatches: parse_int(fields[4], "mismatch")?,
            gap_opens: parse_int(fields[5], "gapopen")?,
            query_start: parse_int(fields[6], "qstart")?,
            query_end: parse_int(fields[7], "qend")?,
            subject_start: parse_int(fields[8], "sstart")?,
            subject_end: parse_int(fields[9], "send")?,
            evalue: parse_float(fields[10], "evalue")?,
            bit_score: parse_float(fields[11], "bitscore")?,
            query_length: None,
        })
    }
}

/// Writes the 12 outfmt 6 columns; an attached query length is not part of the format.
impl fmt::Display for BlastHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{:?}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:?}\t{:?}",
            self.query_id,
            self.subject_id,
            self.identity,
            self.length,
            self.mismatches,
            self.gap_opens,
            self.query_start,
            self.query_end,
            self.subject_start,
            self.subject_end,
            self.evalue,
            self.bit_score
        )
    }
}

/// Streaming reader over the hits of a BLAST tabular file.
pub struct Reader<R> {
    rdr: R,
    source_name: String,
    line: usize,
}

impl Reader<Box<dyn BufRead>> {
    /// Open a (possibly BGZF-compressed) tabular file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source_name = path.as_ref().display().to_string();
        Ok(Reader::with_source_name(input::open_path(path)?, source_name))
    }
}

impl<R: BufRead> Reader<R> {
    pub fn new(rdr: R) -> Reader<R> {
        Reader::with_source_name(rdr, "<reader>")
    }

    /// Like [`Reader::new`], naming the input in error messages.
    pub fn with_source_name<S: Into<String>>(rdr: R, source_name: S) -> Reader<R> {
        Reader {
            rdr,
            source_name: source_name.into(),
            line: 0,
        }
    }

    /// Number of lines consumed so far, comments included.
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// A borrowed iterator over the hits.
    pub fn records(&mut self) -> RecordsIter<'_, R> {
        RecordsIter { rdr: self }
    }

    /// An owned iterator over the hits.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr: self }
    }

    fn read_record(&mut self) -> Result<Option<BlastHit>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.rdr.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            if line.starts_with('#') {
                continue;
            }

            return line
                .parse::<BlastHit>()
                .map(Some)
                .map_err(|err| ParseErr::InvalidLine {
                    source_name: self.source_name.clone(),
                    line_number: self.line,
                    line: line.trim_end_matches(['\r', '\n']).to_string(),
                    err,
                });
        }
    }
}

/// A borrowed iterator over the hits of a tabular file.
pub struct RecordsIter<'r, R> {
    rdr: &'r mut Reader<R>,
}

impl<R> RecordsIter<'_, R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        self.rdr
    }
}

impl<R: BufRead> Iterator for RecordsIter<'_, R> {
    type Item = Result<BlastHit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rdr.read_record().transpose()
    }
}

/// An owned iterator over the hits of a tabular file.
pub struct RecordsIntoIter<R> {
    rdr: Reader<R>,
}

impl<R> RecordsIntoIter<R> {
    /// Return a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: BufRead> Iterator for RecordsIntoIter<R> {
    type Item = Result<BlastHit>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rdr.read_record().transpose()
    }
}
