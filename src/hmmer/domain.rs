use crate::error::{parse_float, parse_int, LineErr};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

const DOMAIN_FIELDS: usize = 16;

/// A span in one of the three coordinate systems HMMER reports per domain.
///
/// `from` and `to` are the 1-based inclusive values from the report; the
/// 0-based half-open view is available through [`Coordinates::start`],
/// [`Coordinates::end`] and [`Coordinates::len`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub from: usize,
    pub to: usize,
    /// Boundary annotation, e.g. `[]`, `..`, `[.`
    pub bounds: String,
}

impl Coordinates {
    fn new(field: &'static str, from: usize, to: usize, bounds: &str) -> Result<Self, LineErr> {
        if from == 0 || to + 1 < from {
            return Err(LineErr::InvalidCoordinates { field, from, to });
        }
        Ok(Coordinates {
            from,
            to,
            bounds: bounds.to_string(),
        })
    }

    /// 0-based start
    pub fn start(&self) -> usize {
        self.from - 1
    }

    /// 0-based exclusive end
    pub fn end(&self) -> usize {
        self.to
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// One row of a sequence's domain table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAnnotation {
    /// Name of the sequence this domain belongs to
    pub seq_name: String,
    /// 1-based domain number within the sequence
    pub index: usize,
    /// `!` when the domain meets the inclusion threshold, `?` otherwise
    pub significance: String,
    pub score: f64,
    pub bias: f64,
    pub c_evalue: f64,
    pub i_evalue: f64,
    pub hmm: Coordinates,
    pub ali: Coordinates,
    pub env: Coordinates,
    /// Mean posterior probability of the aligned residues
    pub acc: f64,
}

impl DomainAnnotation {
    pub fn from_line(seq_name: &str, line: &str) -> Result<Self, LineErr> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != DOMAIN_FIELDS {
            return Err(LineErr::FieldCount {
                expected: DOMAIN_FIELDS,
                found: fields.len(),
            });
        }

        Ok(DomainAnnotation {
            seq_name: seq_name.to_string(),
            index: parse_int(fields[0], "#")?,
            significance: fields[1].to_string(),
            score: parse_float(fields[2], "score")?,
            bias: parse_float(fields[3], "bias")?,
            c_evalue: parse_float(fields[4], "c-Evalue")?,
            i_evalue: parse_float(fields[5], "i-Evalue")?,
            hmm: Coordinates::new(
                "hmm",
                parse_int(fields[6], "hmmfrom")?,
                parse_int(fields[7], "hmm to")?,
                fields[8],
            )?,
            ali: Coordinates::new(
                "ali",
                parse_int(fields[9], "alifrom")?,
                parse_int(fields[10], "ali to")?,
                fields[11],
            )?,
            env: Coordinates::new(
                "env",
                parse_int(fields[12], "envfrom")?,
                parse_int(fields[13], "env to")?,
                fields[14],
            )?,
            acc: parse_float(fields[15], "acc")?,
        })
    }
}

/// Sequence name followed by the 16 domain-table columns, tab-separated,
/// with 1-based coordinates.
impl fmt::Display for DomainAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // {:?} is the shortest round-trip form and keeps exponents on tiny e-values
        write!(
            f,
            "{}\t{}\t{}\t{:?}\t{:?}\t{:?}\t{:?}",
            self.seq_name,
            self.index,
            self.significance,
            self.score,
            self.bias,
            self.c_evalue,
            self.i_evalue
        )?;
        for coords in [&self.hmm, &self.ali, &self.env] {
            write!(f, "\t{}\t{}\t{}", coords.from, coords.to, coords.bounds)?;
        }
        write!(f, "\t{:?}", self.acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str =
        "   1 !   45.3   0.2   1.1e-14   3.4e-12       5      20 ..      12      27 ..       10      30 .] 0.95";

    #[test]
    fn test_parse_domain_line() {
        let domain = DomainAnnotation::from_line("seqA", LINE).unwrap();
        assert_eq!(domain.seq_name, "seqA");
        assert_eq!(domain.index, 1);
        assert_eq!(domain.significance, "!");
        assert_eq!(domain.score, 45.3);
        assert_eq!(domain.bias, 0.2);
        assert_eq!(domain.c_evalue, 1.1e-14);
        assert_eq!(domain.i_evalue, 3.4e-12);
        assert_eq!(domain.env.bounds, ".]");
        assert_eq!(domain.acc, 0.95);
    }

    #[test]
    fn test_derived_coordinates() {
        let domain = DomainAnnotation::from_line("seqA", LINE).unwrap();

        assert_eq!((domain.hmm.from, domain.hmm.to), (5, 20));
        assert_eq!(domain.hmm.start(), 4);
        assert_eq!(domain.hmm.end(), 20);
        assert_eq!(domain.hmm.len(), 16);

        assert_eq!(domain.ali.start(), 11);
        assert_eq!(domain.ali.end(), 27);
        assert_eq!(domain.ali.len(), 16);
        assert_eq!(domain.ali.range(), 11..27);

        assert_eq!(domain.env.start(), 9);
        assert_eq!(domain.env.end(), 30);
        assert_eq!(domain.env.len(), 21);
    }

    #[test]
    fn test_single_position_domain() {
        let line = "1 ? 1.0 0.0 1.0 1.0 7 7 .. 3 3 .. 3 3 .. 0.50";
        let domain = DomainAnnotation::from_line("seqB", line).unwrap();
        assert_eq!(domain.hmm.len(), 1);
        assert!(!domain.hmm.is_empty());
    }

    #[test]
    fn test_wrong_field_count() {
        let line = "1 ! 45.3 0.2 1.1e-14 3.4e-12 5 20 .. 12 27 .. 10 30 .]";
        assert_eq!(
            DomainAnnotation::from_line("seqA", line),
            Err(LineErr::FieldCount {
                expected: 16,
                found: 15
            })
        );
    }

    #[test]
    fn test_zero_start_rejected() {
        let line = "1 ! 45.3 0.2 1.1e-14 3.4e-12 0 20 .. 12 27 .. 10 30 .] 0.95";
        assert_eq!(
            DomainAnnotation::from_line("seqA", line),
            Err(LineErr::InvalidCoordinates {
                field: "hmm",
                from: 0,
                to: 20
            })
        );
    }

    #[test]
    fn test_display_uses_source_layout() {
        let domain = DomainAnnotation::from_line("seqA", LINE).unwrap();
        assert_eq!(
            domain.to_string(),
            "seqA\t1\t!\t45.3\t0.2\t1.1e-14\t3.4e-12\t5\t20\t..\t12\t27\t..\t10\t30\t.]\t0.95"
        );

        // the columns after the name decode back to the same record
        let written = domain.to_string();
        let (name, rest) = written.split_once('\t').unwrap();
        assert_eq!(DomainAnnotation::from_line(name, rest).unwrap(), domain);
    }
}
