//! X-Plane flat text data files.
//!
//! Files are read line by line and every line is handed to an [`XpReader`].
//! `.dat` files start with an `I` or `A` line followed by a version line and
//! end with `99`. CIFP files have neither and separate fields by comma.

pub mod airport;
pub mod airspace;
pub mod airway;
pub mod cifp;
pub mod compiler;
pub mod fix;
pub mod mora;
pub mod msa;
pub mod nav;

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use geo::Point;
use regex::Regex;

use crate::error::{CompilerError, Result};
use crate::geometry::is_valid_position;
use crate::writer::WriteContext;

pub use compiler::XpDataCompiler;

static AIRAC_CYCLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)data cycle\s+(\d{4})").expect("valid AIRAC regex"));

// ── Lines ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct XpLine<'a> {
    fields: Vec<&'a str>,
    /// One based line number in the file.
    pub number: usize,
}

impl<'a> XpLine<'a> {
    pub fn new(text: &'a str, number: usize) -> Self {
        Self { fields: text.split_whitespace().collect(), number }
    }

    /// `APPCH:010,A,I16R,...;` becomes `APPCH`, `010`, `A`, `I16R` and so on.
    pub fn cifp(text: &'a str, number: usize) -> Self {
        let text = text.trim().trim_end_matches(';');
        let mut fields = Vec::new();
        match text.split_once(':') {
            Some((code, rest)) => {
                fields.push(code.trim());
                fields.extend(rest.split(',').map(str::trim));
            }
            None => fields.push(text),
        }
        Self { fields, number }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field or an empty string if the line is too short.
    pub fn at(&self, index: usize) -> &'a str {
        self.fields.get(index).copied().unwrap_or("")
    }

    pub fn parse<T: FromStr>(&self, index: usize) -> Option<T> {
        self.fields.get(index)?.parse().ok()
    }

    /// All fields from `index` joined by a single space. Used for names.
    pub fn rest(&self, index: usize) -> String {
        self.fields.get(index..).map(|f| f.join(" ")).unwrap_or_default()
    }

    /// Latitude and longitude fields as a valid position.
    pub fn position(&self, lat_index: usize, lon_index: usize) -> Option<Point<f64>> {
        let lat: f64 = self.parse(lat_index)?;
        let lon: f64 = self.parse(lon_index)?;
        is_valid_position(lon, lat).then(|| Point::new(lon, lat))
    }
}

// ── Readers ──────────────────────────────────────────────────────────────────

pub trait XpReader {
    fn read(&mut self, ctx: &mut WriteContext, line: &XpLine) -> Result<()>;

    /// Called at the end of every file.
    fn finish(&mut self, _ctx: &mut WriteContext) -> Result<()> {
        Ok(())
    }

    /// Clears state before the next file.
    fn reset(&mut self) {}
}

/// Logs a malformed line. The caller skips the record.
pub(crate) fn invalid_line(ctx: &mut WriteContext, line: &XpLine, message: &str) {
    tracing::warn!("{}:{}: {message}", ctx.filename, line.number);
    ctx.counters.errors += 1;
}

pub(crate) fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpFormat {
    /// Header lines and `99` terminator, whitespace separated.
    Dat,
    /// CIFP procedures.
    Cifp,
    /// No header, whitespace separated. OpenAir airspace files.
    Text,
}

pub fn airac_cycle(header: &str) -> Option<String> {
    AIRAC_CYCLE.captures(header).map(|c| c[1].to_string())
}

/// Feeds all lines of a file into the reader and returns the AIRAC cycle
/// found in the header.
pub fn read_file(ctx: &mut WriteContext, path: &Path, format: XpFormat, reader: &mut dyn XpReader) -> Result<Option<String>> {
    let file = std::fs::File::open(path).map_err(|e| CompilerError::io(path, e))?;
    let mut input = BufReader::new(file);
    let mut buf = Vec::new();
    let mut number = 0;
    let mut cycle = None;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).map_err(|e| CompilerError::io(path, e))? == 0 {
            break;
        }
        number += 1;
        let text = String::from_utf8_lossy(&buf);
        let text = text.trim();

        if format == XpFormat::Dat {
            match number {
                1 => continue,
                2 => {
                    cycle = airac_cycle(text);
                    continue;
                }
                _ if text == "99" => break,
                _ => {}
            }
        }
        if text.is_empty() {
            continue;
        }

        let line = match format {
            XpFormat::Cifp => XpLine::cifp(text, number),
            XpFormat::Dat | XpFormat::Text => XpLine::new(text, number),
        };
        reader.read(ctx, &line)?;
    }

    reader.finish(ctx)?;
    reader.reset();
    Ok(cycle)
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::path::PathBuf;

    /// Writes a data file into a temporary directory.
    pub fn data_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::testutil::test_context;

    #[test]
    fn whitespace_and_cifp_tokenizing() {
        let line = XpLine::new("  3  47.43  -122.31  400 11680 130 19.0 SEA ENRT K1 SEATTLE VORTAC", 7);
        assert_eq!(line.at(7), "SEA");
        assert_eq!(line.parse::<u32>(4), Some(11680));
        assert_eq!(line.rest(10), "SEATTLE VORTAC");
        assert_eq!(line.at(42), "");
        assert_eq!(line.parse::<f64>(42), None);
        assert!(line.position(1, 2).is_some());

        let line = XpLine::cifp("APPCH:010,A,I16R,FOURT,FOURT,K1,P,C,E  A,,,IF,, ;", 1);
        assert_eq!(line.at(0), "APPCH");
        assert_eq!(line.at(1), "010");
        assert_eq!(line.at(3), "I16R");
        assert_eq!(line.at(9), "E  A");
        assert_eq!(line.at(10), "");
    }

    #[test]
    fn invalid_position_is_rejected() {
        let line = XpLine::new("95.0 10.0 ABC", 1);
        assert_eq!(line.position(0, 1), None);
    }

    #[test]
    fn airac_from_header() {
        assert_eq!(
            airac_cycle("1100 Version - data cycle 1809, build 20180822, metadata FixXP1100."),
            Some("1809".to_string())
        );
        assert_eq!(airac_cycle("1000 Version - DAFIF data cycle"), None);
    }

    struct Collect(Vec<String>, usize);

    impl XpReader for Collect {
        fn read(&mut self, _ctx: &mut WriteContext, line: &XpLine) -> Result<()> {
            self.0.push(line.at(0).to_string());
            Ok(())
        }

        fn finish(&mut self, _ctx: &mut WriteContext) -> Result<()> {
            self.1 += 1;
            Ok(())
        }
    }

    #[test]
    fn header_and_terminator_are_skipped() {
        let (conn, options) = test_context();
        let mut ctx = WriteContext::new(&conn, &options);
        let dir = tempfile::tempdir().unwrap();
        let path = testutil::data_file(&dir, "earth_fix.dat", "I\r\n1101 Version - data cycle 2110\r\n\r\nA\r\nB\r\n99\r\nC\r\n");

        let mut reader = Collect(Vec::new(), 0);
        let cycle = read_file(&mut ctx, &path, XpFormat::Dat, &mut reader).unwrap();
        assert_eq!(cycle.as_deref(), Some("2110"));
        assert_eq!(reader.0, ["A", "B"]);
        assert_eq!(reader.1, 1);
    }
}
