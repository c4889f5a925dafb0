use std::fs;
use std::io::Write;
use std::path::Path;

pub fn format_scientific_f64(value: f64, precision: usize) -> String {
    format!("{value:.precision$e}", precision = precision)
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Writes into a sibling temp file and renames it over `path`; concurrent
/// readers see the previous content or the new content, never a partial file.
pub fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(normalize_text_artifact(content).as_bytes())?;
    staged.persist(path).map_err(|error| error.error)?;
    Ok(())
}

/// Whitespace-separated rows, one line per row, in round-trippable scientific notation.
pub fn format_numeric_rows<'a>(rows: impl IntoIterator<Item = &'a [f64]>) -> String {
    let mut content = String::new();
    for row in rows {
        let line: Vec<String> = row
            .iter()
            .map(|value| format_scientific_f64(*value, 17))
            .collect();
        content.push_str(&line.join(" "));
        content.push('\n');
    }
    content
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: cannot parse '{token}' as a number")]
pub struct NumericParseError {
    pub line: usize,
    pub token: String,
}

/// Parses whitespace-separated numeric rows, skipping blank lines and `#` comments.
///
/// A non-numeric first data line is treated as a column header and skipped.
pub fn parse_numeric_rows(content: &str) -> Result<Vec<Vec<f64>>, NumericParseError> {
    let mut rows = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed: Result<Vec<f64>, NumericParseError> = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| NumericParseError {
                    line: index + 1,
                    token: token.to_string(),
                })
            })
            .collect();

        match parsed {
            Ok(row) => rows.push(row),
            Err(_) if rows.is_empty() => continue,
            Err(error) => return Err(error),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::{
        NumericParseError, format_numeric_rows, format_scientific_f64, normalize_text_artifact,
        parse_numeric_rows, write_text_artifact,
    };
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scientific_formatting_is_deterministic() {
        assert_eq!(format_scientific_f64(1.5e-20, 3), "1.500e-20");
        assert_eq!(
            format_scientific_f64(0.1, 17),
            format_scientific_f64(0.1, 17)
        );
    }

    #[test]
    fn normalize_text_artifact_uses_canonical_line_endings() {
        let normalized = normalize_text_artifact("alpha\r\nbeta\rgamma");
        assert_eq!(normalized, "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn numeric_rows_survive_a_write_read_cycle_bit_exactly() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("january").join("total_nue");
        let rows = [vec![1.0e-20, 3.3e-21], vec![0.1, 2.0 / 3.0]];

        write_text_artifact(&path, &format_numeric_rows(rows.iter().map(Vec::as_slice)))
            .expect("write should create parent directories");
        let content = fs::read_to_string(&path).expect("artifact should be readable");
        let parsed = parse_numeric_rows(&content).expect("rows should parse");

        assert_eq!(parsed, rows.to_vec());
    }

    #[test]
    fn header_and_comment_lines_are_skipped() {
        let parsed = parse_numeric_rows("# energy sigma\nE_GeV sigma_mb\n10 1.2e-11\n\n100 2e-10\n")
            .expect("rows should parse");
        assert_eq!(parsed, vec![vec![10.0, 1.2e-11], vec![100.0, 2.0e-10]]);
    }

    #[test]
    fn malformed_data_line_reports_position() {
        let error = parse_numeric_rows("1 2\n3 x\n").expect_err("bad token");
        assert_eq!(
            error,
            NumericParseError {
                line: 2,
                token: "x".to_string()
            }
        );
    }

    #[test]
    fn rewriting_an_artifact_leaves_no_staging_files() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("energy_grid.dat");

        write_text_artifact(&path, "1\n2\n").expect("first write");
        write_text_artifact(&path, "3\n4\n5").expect("second write");

        assert_eq!(fs::read_to_string(&path).expect("artifact"), "3\n4\n5\n");
        let entries = fs::read_dir(temp.path()).expect("dir").count();
        assert_eq!(entries, 1);
    }
}
