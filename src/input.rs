//! Opening report files
//!
//! Plain text is read through a `BufReader`; `.gz`/`.bgz` paths must be BGZF and are
//! decompressed with noodles. Regular gzip is rejected.

use crate::error::Result;
use log::debug;
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const BGZF_HEADER_SIZE: usize = 18;

/// Sniff the first block header of a `.gz`/`.bgz` input so that [`open_path`] can
/// hand BGZF to noodles and turn plain gzip away. The reader is rewound either way.
fn is_bgzf<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; BGZF_HEADER_SIZE];
    let result = match reader.read_exact(&mut header) {
        Ok(()) => {
            Ok(header[0..2] == [0x1f, 0x8b]      // gzip magic
                && header[2] == 0x08              // DEFLATE
                && header[3] == 0x04              // FEXTRA
                && header[10..12] == [0x06, 0x00] // XLEN=6
                && header[12..14] == [b'B', b'C'] // BC subfield
                && header[14..16] == [0x02, 0x00]) // SLEN=2
        }
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    };
    reader.seek(SeekFrom::Start(0))?;
    result
}

fn is_compressed_path(path: &Path) -> bool {
    let name = path.to_string_lossy();
    [".gz", ".bgz"].iter().any(|extension| name.ends_with(extension))
}

/// Open `path` for line-oriented reading, decompressing BGZF input.
///
/// The returned reader owns the file handle, so it is closed whenever the
/// reader is dropped.
pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;

    if !is_compressed_path(path) {
        return Ok(Box::new(BufReader::new(file)));
    }

    if !is_bgzf(&mut file)? {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "'{}' is regular gzip, not BGZF. Convert with: zcat '{}' | bgzip > output.gz",
                path.display(),
                path.display()
            ),
        )
        .into());
    }
    debug!("Reading {} as BGZF", path.display());
    Ok(Box::new(bgzf::io::Reader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_is_bgzf_rejects_plain_text() {
        let mut cursor = Cursor::new(b"# comment line that is long enough\n".to_vec());
        assert!(!is_bgzf(&mut cursor).unwrap());
        // the reader is rewound after the check
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_is_bgzf_short_input() {
        let mut cursor = Cursor::new(vec![0x1f, 0x8b]);
        assert!(!is_bgzf(&mut cursor).unwrap());
    }

    #[test]
    fn test_open_plain_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"first\nsecond\n").unwrap();
        f.flush().unwrap();

        let reader = open_path(f.path()).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn test_open_regular_gzip_fails() {
        let mut f = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        // gzip magic without the BGZF extra field
        f.write_all(&[
            0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ])
        .unwrap();
        f.flush().unwrap();

        let err = open_path(f.path()).err().unwrap();
        assert!(err.to_string().contains("not BGZF"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_path("/nonexistent/hits.tsv").err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
