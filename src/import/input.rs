//! Line input for the interactive session
//!
//! End of input is an answer, not an error: the engine maps `None` to the
//! safe default of whatever prompt is open.

use std::io::{self, BufRead, Write};

pub trait LineReader {
    /// Next line without its trailing newline, or `None` at end of input
    fn read_line(&mut self) -> Option<String>;
}

/// Reads answers from standard input
#[derive(Debug, Default)]
pub struct StdinReader;

impl LineReader for StdinReader {
    fn read_line(&mut self) -> Option<String> {
        // Prompts are written without a newline
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::warn!("failed to read from stdin: {}", e);
                None
            }
        }
    }
}

/// Feeds a fixed list of answers, then reports end of input
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedReader {
    lines: std::collections::VecDeque<String>,
    pub reads: usize,
}

#[cfg(test)]
impl ScriptedReader {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            reads: 0,
        }
    }
}

#[cfg(test)]
impl LineReader for ScriptedReader {
    fn read_line(&mut self) -> Option<String> {
        self.reads += 1;
        self.lines.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reader_ends_with_none() {
        let mut reader = ScriptedReader::new(&["1", ""]);
        assert_eq!(reader.read_line().as_deref(), Some("1"));
        assert_eq!(reader.read_line().as_deref(), Some(""));
        assert_eq!(reader.read_line(), None);
        assert_eq!(reader.read_line(), None);
        assert_eq!(reader.reads, 4);
    }
}
