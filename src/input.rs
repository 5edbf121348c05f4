//! Fixed-input mode: parsing of `(contextDepth, objectCount)` pair files.
//!
//! One tab-separated pair per line. Blank lines and `#`-prefixed comment
//! lines are skipped silently; a malformed line is skipped with a
//! diagnostic carrying its line number, and parsing continues.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// One parsed input pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputParams {
    /// Ambient-context depth the sample runs under.
    pub values: usize,
    /// Number of objects in the released graph.
    pub objects: usize,
}

/// Diagnostic for one skipped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong with it.
    pub reason: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Result of parsing one input file.
#[derive(Debug, Default)]
pub struct ParsedInput {
    /// Rows accepted, in file order.
    pub rows: Vec<InputParams>,
    /// Rows skipped, with their diagnostics.
    pub skipped: Vec<RowDiagnostic>,
}

/// Parses pairs from `reader`. Only I/O failures are errors; malformed
/// content lands in [`ParsedInput::skipped`].
pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<ParsedInput> {
    let mut parsed = ParsedInput::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_pair(trimmed) {
            Ok(params) => parsed.rows.push(params),
            Err(reason) => parsed.skipped.push(RowDiagnostic {
                line: number,
                reason,
            }),
        }
    }
    Ok(parsed)
}

/// Opens and parses `path`.
pub fn parse_file(path: &Path) -> io::Result<ParsedInput> {
    parse_reader(BufReader::new(File::open(path)?))
}

fn parse_pair(line: &str) -> Result<InputParams, String> {
    let mut fields = line.split('\t');
    let (Some(values), Some(objects), None) = (fields.next(), fields.next(), fields.next())
    else {
        return Err("expected exactly two tab-separated fields".to_owned());
    };
    let values = values
        .trim()
        .parse()
        .map_err(|_| format!("invalid context depth \"{}\"", values.trim()))?;
    let objects = objects
        .trim()
        .parse()
        .map_err(|_| format!("invalid object count \"{}\"", objects.trim()))?;
    Ok(InputParams { values, objects })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedInput {
        parse_reader(text.as_bytes()).unwrap()
    }

    #[test]
    fn accepts_tab_separated_pairs() {
        let parsed = parse("3\t100\n");
        assert_eq!(
            parsed.rows,
            vec![InputParams {
                values: 3,
                objects: 100
            }]
        );
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn skips_blank_and_comment_lines_silently() {
        let parsed = parse("\n# header comment\n   \n5\t10\n");
        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.skipped.is_empty());
    }

    #[test]
    fn rejects_negative_depth_with_line_pointer() {
        let parsed = parse("1\t10\n-1\t100\n2\t20\n");
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line, 2);
        assert!(parsed.skipped[0].reason.contains("-1"));
    }

    #[test]
    fn rejects_wrong_field_counts() {
        let parsed = parse("7\n1\t2\t3\n");
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].line, 1);
        assert_eq!(parsed.skipped[1].line, 2);
    }

    #[test]
    fn continues_after_malformed_rows() {
        let parsed = parse("bad\tline\n8\t800\n");
        assert_eq!(
            parsed.rows,
            vec![InputParams {
                values: 8,
                objects: 800
            }]
        );
        assert_eq!(parsed.skipped.len(), 1);
    }
}
