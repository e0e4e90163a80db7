use crate::error::{parse_float, parse_int, LineErr};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One row of the "Scores for complete sequences" table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceScore {
    pub name: String,
    pub evalue: f64,
    pub score: f64,
    pub bias: f64,
    pub best_domain_evalue: f64,
    pub best_domain_score: f64,
    pub best_domain_bias: f64,
    /// Expected number of domains (`exp`)
    pub expected_domains: f64,
    /// Number of domains reported for this sequence (`N`)
    pub domain_count: usize,
    /// First token of the description column, empty when the column is blank
    pub description: String,
}

const MIN_FIELDS: usize = 9;

impl FromStr for SequenceScore {
    type Err = LineErr;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(LineErr::TooFewFields {
                min: MIN_FIELDS,
                found: fields.len(),
            });
        }

        Ok(SequenceScore {
            evalue: parse_float(fields[0], "full sequence E-value")?,
            score: parse_float(fields[1], "full sequence score")?,
            bias: parse_float(fields[2], "full sequence bias")?,
            best_domain_evalue: parse_float(fields[3], "best 1 domain E-value")?,
            best_domain_score: parse_float(fields[4], "best 1 domain score")?,
            best_domain_bias: parse_float(fields[5], "best 1 domain bias")?,
            expected_domains: parse_float(fields[6], "exp")?,
            domain_count: parse_int(fields[7], "N")?,
            name: fields[8].to_string(),
            description: fields.get(9).map(|s| s.to_string()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_line() {
        let line = "    1.2e-45  152.3   0.1    1.5e-45  152.0   0.1    1.0  1  seqA     ABC transporter";
        let score: SequenceScore = line.parse().unwrap();
        assert_eq!(score.name, "seqA");
        assert_eq!(score.evalue, 1.2e-45);
        assert_eq!(score.score, 152.3);
        assert_eq!(score.bias, 0.1);
        assert_eq!(score.best_domain_evalue, 1.5e-45);
        assert_eq!(score.best_domain_score, 152.0);
        assert_eq!(score.best_domain_bias, 0.1);
        assert_eq!(score.expected_domains, 1.0);
        assert_eq!(score.domain_count, 1);
        assert_eq!(score.description, "ABC");
    }

    #[test]
    fn test_parse_score_line_without_description() {
        let line = "  0.0012   15.1   0.0   0.0019   14.5   0.0   1.3  2  seqB";
        let score: SequenceScore = line.parse().unwrap();
        assert_eq!(score.name, "seqB");
        assert_eq!(score.domain_count, 2);
        assert_eq!(score.description, "");
    }

    #[test]
    fn test_parse_score_line_too_short() {
        let line = "  0.0012   15.1   0.0   0.0019   14.5   0.0   1.3  2";
        assert_eq!(
            line.parse::<SequenceScore>(),
            Err(LineErr::TooFewFields { min: 9, found: 8 })
        );
    }

    #[test]
    fn test_parse_score_line_fractional_domain_count() {
        let line = "  0.0012   15.1   0.0   0.0019   14.5   0.0   1.3  2.5  seqB";
        assert!(matches!(
            line.parse::<SequenceScore>(),
            Err(LineErr::InvalidInt { field: "N", .. })
        ));
    }
}
