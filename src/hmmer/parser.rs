//! Section-by-section scanner for hmmsearch plain-text output
//!
//! The report is walked as a fixed sequence of [`Section`]s. Each section checks
//! its own preconditions against the current line and hands over to the next
//! one; any mismatch aborts the whole parse.

use super::{DomainAnnotation, PipelineStatistics, SearchReport, SequenceScore};
use crate::error::{LineErr, ParseErr, Result};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;

static QUERY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Query:\s+(?P<name>\S+)\s+\[M=(?P<length>\d+)\]\s*$")
        .expect("query line pattern is valid")
});

const SCORES_TITLE: &str = "Scores for complete sequences (score includes all domains):";
const SCORES_GROUPS: [&str; 3] = ["full sequence", "best 1 domain", "#dom"];
const SCORES_COLUMNS: [&str; 10] = [
    "E-value",
    "score",
    "bias",
    "E-value",
    "score",
    "bias",
    "exp",
    "N",
    "Sequence",
    "Description",
];
const NO_HITS: &str = "[No hits detected that satisfy reporting thresholds]";
const INCLUSION_THRESHOLD: &str = "inclusion threshold";

const DOMAINS_TITLE: &str = "Domain annotation for each sequence (and alignments):";
const DOMAIN_BLOCK_PREFIX: &str = ">>";
const NO_DOMAINS: &str =
    "[No individual domains that satisfy reporting thresholds (although complete target did)]";
const DOMAIN_COLUMNS: [&str; 15] = [
    "#", "score", "bias", "c-Evalue", "i-Evalue", "hmmfrom", "hmm", "to", "alifrom", "ali",
    "to", "envfrom", "env", "to", "acc",
];

const STATISTICS_TITLE: &str = "Internal pipeline statistics summary:";
const STATISTICS_LINES: [&str; 12] = [
    "Query model(s):",
    "Target sequences:",
    "Passed MSV filter:",
    "Passed bias filter:",
    "Passed Vit filter:",
    "Passed Fwd filter:",
    "Initial search space (Z):",
    "Domain search space  (domZ):",
    "# CPU time:",
    "# Mc/sec:",
    "//",
    "[ok]",
];
/// The last two footer lines are bare terminators, not statistics.
const STATISTICS_VALUES: usize = 10;

/// Parser position within the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Query,
    ScoreTableHeader,
    ScoreTableBody,
    SectionGap,
    DomainHeader,
    DomainBlock,
    DomainCountCheck,
    Footer,
    EndOfFile,
    Done,
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// A table rule such as `  ------- ------ -----`.
fn is_column_rule(line: &str) -> bool {
    line.contains('-') && line.contains(' ') && line.chars().all(|c| c == '-' || c == ' ')
}

/// Like [`is_column_rule`] but any mix of dashes and spaces (or nothing) is accepted.
fn is_rule(line: &str) -> bool {
    line.chars().all(|c| c == '-' || c == ' ')
}

fn tokens_match(line: &str, expected: &[&str]) -> bool {
    line.split_whitespace().eq(expected.iter().copied())
}

/// Drives a line source through the sections of a hmmsearch report.
pub struct SearchReportParser<R> {
    lines: std::io::Lines<R>,
    source_name: String,
    line_number: usize,
    /// The line under inspection
    current: String,
    report: SearchReport,
}

impl<R: BufRead> SearchReportParser<R> {
    pub fn new<S: Into<String>>(rdr: R, source_name: S) -> Self {
        SearchReportParser {
            lines: rdr.lines(),
            source_name: source_name.into(),
            line_number: 0,
            current: String::new(),
            report: SearchReport::default(),
        }
    }

    /// Run every section and return the finished report.
    pub fn parse(mut self) -> Result<SearchReport> {
        let mut section = Section::Header;
        while section != Section::Done {
            trace!("{}:{}: entering {:?}", self.source_name, self.line_number, section);
            section = match section {
                Section::Header => self.header()?,
                Section::Query => self.query()?,
                Section::ScoreTableHeader => self.score_table_header()?,
                Section::ScoreTableBody => self.score_table_body()?,
                Section::SectionGap => self.section_gap()?,
                Section::DomainHeader => self.domain_header()?,
                Section::DomainBlock => self.domain_block()?,
                Section::DomainCountCheck => self.domain_count_check()?,
                Section::Footer => self.footer()?,
                Section::EndOfFile => self.end_of_file()?,
                Section::Done => Section::Done,
            };
        }

        debug!(
            "Parsed {} sequences with {} domains for query {} from {}",
            self.report.len(),
            self.report.domain_count(),
            self.report.query_name,
            self.source_name
        );
        Ok(self.report)
    }

    /// Read the next line into `current`, failing at end of input.
    fn advance(&mut self, expected: &str) -> Result<()> {
        match self.lines.next() {
            Some(line) => {
                self.current = line?;
                self.line_number += 1;
                Ok(())
            }
            None => Err(ParseErr::InvalidFormat {
                source_name: self.source_name.clone(),
                line_number: self.line_number + 1,
                line: None,
                expected: expected.to_string(),
            }),
        }
    }

    /// Fail unless `ok` holds for the current line.
    fn require(&self, ok: bool, expected: &str) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseErr {
        ParseErr::InvalidFormat {
            source_name: self.source_name.clone(),
            line_number: self.line_number,
            line: Some(self.current.clone()),
            expected: expected.to_string(),
        }
    }

    fn invalid_line(&self, err: LineErr) -> ParseErr {
        ParseErr::InvalidLine {
            source_name: self.source_name.clone(),
            line_number: self.line_number,
            line: self.current.clone(),
            err,
        }
    }

    /// `#` comment lines followed by one blank line.
    fn header(&mut self) -> Result<Section> {
        self.advance("a header line")?;
        while self.current.starts_with('#') {
            self.report.header.push_line(&self.current);
            self.advance("a blank line after the header")?;
        }
        self.require(is_blank(&self.current), "a blank line after the header")?;
        Ok(Section::Query)
    }

    /// `Query:  <name>  [M=<length>]`
    fn query(&mut self) -> Result<Section> {
        const EXPECTED: &str = "'Query: <name> [M=<length>]'";
        self.advance(EXPECTED)?;
        let caps = QUERY_LINE
            .captures(&self.current)
            .ok_or_else(|| self.unexpected(EXPECTED))?;
        let model_length = caps["length"]
            .parse::<usize>()
            .map_err(|_| self.unexpected(EXPECTED))?;
        self.report.query_name = caps["name"].to_string();
        self.report.model_length = model_length;
        Ok(Section::ScoreTableHeader)
    }

    fn score_table_header(&mut self) -> Result<Section> {
        let title = format!("'{SCORES_TITLE}'");
        self.advance(&title)?;
        self.require(self.current.starts_with(SCORES_TITLE), &title)?;

        let groups = "the 'full sequence' / 'best 1 domain' / '#dom' column groups";
        self.advance(groups)?;
        self.require(
            SCORES_GROUPS.iter().all(|g| self.current.contains(g)),
            groups,
        )?;

        let columns = format!("the columns '{}'", SCORES_COLUMNS.join(" "));
        self.advance(&columns)?;
        self.require(tokens_match(&self.current, &SCORES_COLUMNS), &columns)?;

        self.advance("a column rule")?;
        self.require(is_column_rule(&self.current), "a column rule")?;
        Ok(Section::ScoreTableBody)
    }

    fn score_table_body(&mut self) -> Result<Section> {
        self.advance("a sequence score or a blank line")?;

        if is_blank(&self.current) {
            let no_hits = format!("'{NO_HITS}'");
            self.advance(&no_hits)?;
            self.require(self.current.contains(NO_HITS), &no_hits)?;
            debug!("No hits for query {} in {}", self.report.query_name, self.source_name);
            return Ok(Section::Done);
        }

        while !is_blank(&self.current) {
            if self.current.contains(INCLUSION_THRESHOLD) {
                self.advance("a sequence score")?;
            }
            let score = self
                .current
                .parse::<SequenceScore>()
                .map_err(|err| self.invalid_line(err))?;
            let name = score.name.clone();
            if !self.report.insert_sequence(score) {
                return Err(self.unexpected(&format!("a sequence other than '{name}'")));
            }
            self.advance("a sequence score or a blank line")?;
        }
        Ok(Section::SectionGap)
    }

    fn section_gap(&mut self) -> Result<Section> {
        while is_blank(&self.current) {
            self.advance("the domain annotation section")?;
        }
        Ok(Section::DomainHeader)
    }

    fn domain_header(&mut self) -> Result<Section> {
        let title = format!("'{DOMAINS_TITLE}'");
        self.require(self.current.starts_with(DOMAINS_TITLE), &title)?;
        self.advance("a '>>' sequence line")?;
        self.require(
            self.current.starts_with(DOMAIN_BLOCK_PREFIX),
            "a '>>' sequence line",
        )?;
        Ok(Section::DomainBlock)
    }

    /// One `>> name` block: either the no-domains sentinel or a domain table,
    /// followed by alignment lines up to the next unindented line.
    fn domain_block(&mut self) -> Result<Section> {
        if !self.current.starts_with(DOMAIN_BLOCK_PREFIX) {
            return Ok(Section::DomainCountCheck);
        }

        let fields: Vec<&str> = self.current.split_whitespace().collect();
        self.require(
            fields.len() == 2 && fields[0] == DOMAIN_BLOCK_PREFIX,
            "'>> <sequence name>'",
        )?;
        let seq_name = fields[1].to_string();
        self.require(
            self.report.domains(&seq_name).is_some(),
            "a sequence listed in the score table",
        )?;

        self.advance("a domain table header")?;
        if !self.current.trim().starts_with(NO_DOMAINS) {
            let columns = format!("the columns '{}'", DOMAIN_COLUMNS.join(" "));
            self.require(tokens_match(&self.current, &DOMAIN_COLUMNS), &columns)?;
            self.advance("a column rule")?;
            self.require(is_column_rule(&self.current), "a column rule")?;

            self.advance("a domain line or a blank line")?;
            while !is_blank(&self.current) {
                let domain = DomainAnnotation::from_line(&seq_name, &self.current)
                    .map_err(|err| self.invalid_line(err))?;
                if let Some(domains) = self.report.domains_mut(&seq_name) {
                    domains.push(domain);
                }
                self.advance("a domain line or a blank line")?;
            }
        }

        while self.current.starts_with(' ') || is_blank(&self.current) {
            self.advance("the end of the alignment block")?;
        }
        trace!("{}: closed domain block for {}", self.source_name, seq_name);
        Ok(Section::DomainBlock)
    }

    fn domain_count_check(&mut self) -> Result<Section> {
        for seq_name in self.report.sequence_names() {
            let expected = self
                .report
                .sequence_score(seq_name)
                .map_or(0, |s| s.domain_count);
            let found = self.report.domains(seq_name).map_or(0, <[_]>::len);
            if expected != found {
                return Err(ParseErr::DomainCountMismatch {
                    source_name: self.source_name.clone(),
                    seq_name: seq_name.to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(Section::Footer)
    }

    fn footer(&mut self) -> Result<Section> {
        let title = format!("'{STATISTICS_TITLE}'");
        self.require(self.current.starts_with(STATISTICS_TITLE), &title)?;
        self.advance("a rule line")?;
        self.require(is_rule(&self.current), "a rule line")?;

        let mut statistics = PipelineStatistics::default();
        for (i, label) in STATISTICS_LINES.iter().enumerate() {
            let expected = format!("a line starting with '{label}'");
            self.advance(&expected)?;
            self.require(self.current.starts_with(label), &expected)?;
            if i < STATISTICS_VALUES {
                statistics.push(label, &self.current);
            }
        }
        self.report.statistics = Some(statistics);
        Ok(Section::EndOfFile)
    }

    fn end_of_file(&mut self) -> Result<Section> {
        match self.lines.next() {
            None => Ok(Section::Done),
            Some(line) => {
                self.current = line?;
                self.line_number += 1;
                Err(self.unexpected("end of input"))
            }
        }
    }
}
