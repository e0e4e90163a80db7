use super::{DomainAnnotation, SequenceScore};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Metadata from the `#` comment block at the top of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportHeader {
    /// All header lines, verbatim
    pub lines: Vec<String>,
    /// Program name, e.g. `hmmsearch`
    pub program: Option<String>,
    /// HMMER version, e.g. `3.3.2`
    pub version: Option<String>,
    /// `key: value` settings such as `query HMM file`
    pub settings: Vec<(String, String)>,
}

impl ReportHeader {
    pub(crate) fn push_line(&mut self, line: &str) {
        self.lines.push(line.to_string());

        let content = line.trim_start_matches('#').trim();
        if content.is_empty() || content.starts_with("- -") {
            return;
        }
        if let Some((program, _)) = content.split_once(" :: ") {
            self.program = Some(program.trim().to_string());
        } else if let Some(rest) = content.strip_prefix("HMMER ") {
            self.version = rest
                .split(|c: char| c.is_whitespace() || c == ';')
                .next()
                .map(str::to_string);
        } else if let Some((key, value)) = content.split_once(':') {
            let value = value.trim();
            // "Copyright (C) ..." and url lines carry no setting
            if !key.contains("http") && !value.is_empty() {
                self.settings
                    .push((key.trim().to_string(), value.to_string()));
            }
        }
    }

    /// Value of a header setting, e.g. `setting("query HMM file")`.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The labelled lines of the "Internal pipeline statistics summary" footer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatistics {
    /// `(label, value)` pairs in file order; the label keeps its trailing colon
    pub entries: Vec<(String, String)>,
}

impl PipelineStatistics {
    pub(crate) fn push(&mut self, label: &str, line: &str) {
        let value = line[label.len()..].trim().to_string();
        self.entries.push((label.to_string(), value));
    }

    /// Text following `label`, e.g. `value("# Mc/sec:")`.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// Leading integer of the value, e.g. `count("Target sequences:")`.
    pub fn count(&self, label: &str) -> Option<u64> {
        self.value(label)?.split_whitespace().next()?.parse().ok()
    }
}

/// A parsed hmmsearch report for a single query model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub header: ReportHeader,
    /// Name of the query profile
    pub query_name: String,
    /// Number of match states in the query profile (`M`)
    pub model_length: usize,
    /// Sequence names in score-table order
    sequence_order: Vec<String>,
    sequence_scores: FxHashMap<String, SequenceScore>,
    domains: FxHashMap<String, Vec<DomainAnnotation>>,
    /// Footer statistics; absent when the report has no hits
    pub statistics: Option<PipelineStatistics>,
}

impl SearchReport {
    /// Register a score-table row. Returns `false` if the name was already present.
    pub(crate) fn insert_sequence(&mut self, score: SequenceScore) -> bool {
        if self.sequence_scores.contains_key(&score.name) {
            return false;
        }
        self.sequence_order.push(score.name.clone());
        self.domains.insert(score.name.clone(), Vec::new());
        self.sequence_scores.insert(score.name.clone(), score);
        true
    }

    pub(crate) fn domains_mut(&mut self, seq_name: &str) -> Option<&mut Vec<DomainAnnotation>> {
        self.domains.get_mut(seq_name)
    }

    pub fn is_empty(&self) -> bool {
        self.sequence_scores.is_empty()
    }

    /// Number of sequences in the score table
    pub fn len(&self) -> usize {
        self.sequence_order.len()
    }

    /// Sequence names in the order they appear in the report
    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.sequence_order.iter().map(String::as_str)
    }

    pub fn sequence_scores(&self) -> &FxHashMap<String, SequenceScore> {
        &self.sequence_scores
    }

    pub fn sequence_score(&self, seq_name: &str) -> Option<&SequenceScore> {
        self.sequence_scores.get(seq_name)
    }

    pub fn domain_annotations(&self) -> &FxHashMap<String, Vec<DomainAnnotation>> {
        &self.domains
    }

    /// Domains of one sequence, in file order
    pub fn domains(&self, seq_name: &str) -> Option<&[DomainAnnotation]> {
        self.domains.get(seq_name).map(Vec::as_slice)
    }

    /// Total number of annotated domains over all sequences
    pub fn domain_count(&self) -> usize {
        self.domains.values().map(Vec::len).sum()
    }

    /// All domains, sequence by sequence in report order.
    pub fn iter_domains(&self) -> impl Iterator<Item = &DomainAnnotation> {
        self.sequence_order
            .iter()
            .filter_map(|name| self.domains.get(name))
            .flatten()
    }

    /// The domain with the highest score over all sequences.
    ///
    /// Ties go to the domain seen first in report order.
    pub fn best_domain(&self) -> Option<&DomainAnnotation> {
        self.iter_domains().fold(None, |best, domain| match best {
            Some(b) if b.score >= domain.score => Some(b),
            // NaN scores never win over a real one
            Some(b) if domain.score.is_nan() => Some(b),
            _ => Some(domain),
        })
    }
}
