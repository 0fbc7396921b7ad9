//! Flat-file storage of command history: one command per line.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::error::{Error, Result};

fn io_error(path: &Path, err: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Writes `lines` to `path`, one per line, replacing any existing file.
pub fn save_lines(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}").map_err(|e| io_error(path, e))?;
    }
    writer.flush().map_err(|e| io_error(path, e))
}

/// Reads the non-blank lines of `path`, trimmed, paired with their 1-based
/// line number in the file.
pub fn load_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut lines = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| io_error(path, e))?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push((index + 1, line.to_string()));
        }
    }
    Ok(lines)
}
