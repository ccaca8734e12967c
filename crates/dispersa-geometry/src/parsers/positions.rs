//! Parser for sub-element position files.
//!
//! The format is one record per line, fields separated by arbitrary
//! whitespace:
//! ```text
//! <x> <y> <z> <radius>
//! <x> <y> <z> <radius>
//! ...
//! ```
//!
//! Values are plain numbers (signed, decimal or exponential) in whatever
//! unit the caller declares; every value is multiplied by the `scale`
//! argument on the way in. Any line that is not exactly four finite numbers
//! with a non-negative radius, blank lines included, is skipped and
//! reported, and reading carries on with the next line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{LoadDiagnostic, PlacementRecord, PositionLoad};

const FIELDS: [&str; 4] = ["x", "y", "z", "radius"];

/// Load a position file, scaling every value by `scale`.
///
/// Never fails: an unreadable file gives an empty list and a single
/// [`LoadDiagnostic::ResourceUnavailable`]. The file is closed before
/// returning on every path.
pub fn load_positions(path: impl AsRef<Path>, scale: f64) -> PositionLoad {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            let diagnostic = LoadDiagnostic::ResourceUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
            log::error!("{}", diagnostic);
            return PositionLoad {
                records: Vec::new(),
                diagnostics: vec![diagnostic],
            };
        }
    };

    let load = read_lines(BufReader::new(file), scale, path);
    log::info!(
        "Loaded {} positions from '{}' ({} lines skipped)",
        load.records.len(),
        path.display(),
        load.skipped_lines()
    );
    load
}

/// Read position records from any buffered reader.
pub fn read_positions<R: BufRead>(reader: R, scale: f64) -> PositionLoad {
    read_lines(reader, scale, Path::new("<reader>"))
}

/// Parse position records from an in-memory string.
pub fn parse_positions(content: &str, scale: f64) -> PositionLoad {
    read_lines(content.as_bytes(), scale, Path::new("<string>"))
}

fn read_lines<R: BufRead>(mut reader: R, scale: f64, source: &Path) -> PositionLoad {
    let mut load = PositionLoad::default();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                let diagnostic = LoadDiagnostic::ResourceUnavailable {
                    path: source.to_path_buf(),
                    reason: format!("read failed after line {}: {}", line_number, e),
                };
                log::error!("{}", diagnostic);
                load.diagnostics.push(diagnostic);
                break;
            }
        }
        line_number += 1;

        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim_end_matches(['\n', '\r']);

        match parse_record(line, scale) {
            Ok(record) => load.records.push(record),
            Err(reason) => {
                let diagnostic = LoadDiagnostic::MalformedRecord {
                    line_number,
                    line: line.to_string(),
                    reason,
                };
                log::warn!("{}", diagnostic);
                load.diagnostics.push(diagnostic);
            }
        }
    }

    load
}

fn parse_record(line: &str, scale: f64) -> Result<PlacementRecord, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != FIELDS.len() {
        return Err(format!(
            "expected 'x y z radius', got {} fields",
            tokens.len()
        ));
    }

    let mut values = [0.0_f64; 4];
    for ((slot, token), field) in values.iter_mut().zip(&tokens).zip(FIELDS) {
        let raw: f64 = token
            .parse()
            .map_err(|_| format!("invalid {} value '{}'", field, token))?;
        let scaled = raw * scale;
        if !scaled.is_finite() {
            return Err(format!("non-finite {} value '{}'", field, token));
        }
        *slot = scaled;
    }

    let [x, y, z, radius] = values;
    if radius < 0.0 {
        return Err(format!("negative radius '{}'", tokens[3]));
    }

    Ok(PlacementRecord {
        position: [x, y, z],
        radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_records_in_order() {
        let load = parse_positions("0 0 0 5\n10 -5 2.5 3\n", 1.0);
        assert!(load.diagnostics.is_empty());
        assert_eq!(
            load.records,
            vec![
                PlacementRecord { position: [0.0, 0.0, 0.0], radius: 5.0 },
                PlacementRecord { position: [10.0, -5.0, 2.5], radius: 3.0 },
            ]
        );
    }

    #[test]
    fn test_garbage_line_skipped() {
        let load = parse_positions("0 0 0 5\n10 -5 2.5 3\nabc\n", 1.0);
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.diagnostics.len(), 1);
        match &load.diagnostics[0] {
            LoadDiagnostic::MalformedRecord { line_number, line, .. } => {
                assert_eq!(*line_number, 3);
                assert_eq!(line, "abc");
            }
            other => panic!("unexpected diagnostic: {other:?}"),
        }
        assert!(load.diagnostics[0].to_string().contains("'abc'"));
    }

    #[test]
    fn test_arbitrary_whitespace_and_number_forms() {
        let load = parse_positions("  1e2\t-2.5E-1   +3   .5  \r\n", 1.0);
        assert!(load.diagnostics.is_empty());
        assert_eq!(load.records[0].position, [100.0, -0.25, 3.0]);
        assert_eq!(load.records[0].radius, 0.5);
    }

    #[test]
    fn test_wrong_field_counts() {
        let load = parse_positions("1 2 3\n1 2 3 4 5\n", 1.0);
        assert!(load.records.is_empty());
        assert_eq!(load.skipped_lines(), 2);
        assert!(load.diagnostics[0].to_string().contains("got 3 fields"));
        assert!(load.diagnostics[1].to_string().contains("got 5 fields"));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let load = parse_positions("1 2 3 4abc\n", 1.0);
        assert!(load.records.is_empty());
        assert!(load.diagnostics[0].to_string().contains("invalid radius value"));
    }

    #[test]
    fn test_non_finite_and_negative_radius_rejected() {
        let load = parse_positions("inf 0 0 1\n0 NaN 0 1\n0 0 0 -1\n0 0 0 0\n", 1.0);
        assert_eq!(load.skipped_lines(), 3);
        // Radius zero is kept; filtering it is the caller's business.
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].radius, 0.0);
        assert!(load.diagnostics[2].to_string().contains("negative radius"));
    }

    #[test]
    fn test_blank_lines_are_reported() {
        let load = parse_positions("0 0 0 5\n\n   \n1 1 1 1\n", 1.0);
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.skipped_lines(), 2);
        match &load.diagnostics[1] {
            LoadDiagnostic::MalformedRecord { line_number, line, reason } => {
                assert_eq!(*line_number, 3);
                assert_eq!(line, "   ");
                assert!(reason.contains("got 0 fields"));
            }
            other => panic!("unexpected diagnostic: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        let load = parse_positions("", 1.0);
        assert!(load.records.is_empty());
        assert!(load.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_utf8_line_is_only_that_line() {
        let bytes: &[u8] = b"1 2 3 4\n\xff\xfe 0 0 1\n5 6 7 8\n";
        let load = read_positions(bytes, 1.0);
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.skipped_lines(), 1);
    }

    /// Yields its data once, then fails every read.
    struct FailingReader<'a> {
        data: &'a [u8],
    }

    impl std::io::Read for FailingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "device lost"));
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_keeps_records_so_far() {
        let reader = BufReader::new(FailingReader { data: b"1 2 3 4\n" });
        let load = read_positions(reader, 1.0);
        assert_eq!(
            load.records,
            vec![PlacementRecord { position: [1.0, 2.0, 3.0], radius: 4.0 }]
        );
        assert_eq!(load.diagnostics.len(), 1);
        assert!(load.source_unavailable());
        let message = load.diagnostics[0].to_string();
        assert!(message.contains("read failed after line 1"), "{message}");
        assert!(message.contains("device lost"), "{message}");
    }
}
