//! Zip verticals of the same corpus column-wise
//!
//! Structures and the first positional attribute (included once) come from
//! the first vertical; every vertical then contributes its remaining columns.
use crate::errors::*;
use std::io::{BufRead, Write};

/// Merge one line from each input. `line_number` is 1-based and only used for errors.
pub fn zip_line<S: AsRef<str>>(lines: &[S], line_number: u64) -> Result<String> {
    let first = match lines.first() {
        Some(first) => first.as_ref(),
        None => return Ok(String::new()),
    };
    if !lines.iter().any(|l| l.as_ref().contains('\t')) {
        return Ok(first.to_string());
    }

    let word = first.split('\t').next().unwrap_or("");
    let mut zipped = word.to_string();
    for (i, line) in lines.iter().enumerate() {
        let mut columns = line.as_ref().split('\t');
        let found = columns.next().unwrap_or("");
        if found != word {
            return Err(FormatError::new(
                line_number,
                line.as_ref(),
                FormatErrorKind::ZipMismatch {
                    expected: word.to_string(),
                    found: found.to_string(),
                    input: i + 1,
                },
            )
            .into());
        }
        for column in columns {
            zipped.push('\t');
            zipped.push_str(column);
        }
    }
    Ok(zipped)
}

/// Zip `inputs` line by line into `output`, stopping at the end of the shortest
///
/// Returns the number of lines written.
pub fn zip_verticals<R: BufRead, W: Write>(mut inputs: Vec<R>, output: &mut W) -> Result<u64> {
    if inputs.is_empty() {
        return Ok(0);
    }
    let mut lines = vec![String::new(); inputs.len()];
    let mut line_number = 0;
    loop {
        for (input, line) in inputs.iter_mut().zip(lines.iter_mut()) {
            line.clear();
            if input.read_line(line)? == 0 {
                debug!("Shortest vertical ended after {} lines", line_number);
                return Ok(line_number);
            }
            let trimmed = line.trim_matches(|c: char| c == ' ' || c == '\n' || c == '\r');
            if trimmed.len() != line.len() {
                *line = trimmed.to_string();
            }
        }
        line_number += 1;
        writeln!(output, "{}", zip_line(&lines, line_number)?)?;
    }
}
