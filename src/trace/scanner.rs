//! Line reader with one line of pushback

use std::io::BufRead;

use crate::error::{Error, Result};

/// Reads trace lines one at a time, allowing the last line to be re-delivered
#[derive(Debug)]
pub struct LineScanner<R> {
    reader: R,
    source_name: String,
    line: Vec<u8>,
    line_number: usize,
    pushed_back: bool,
}

impl<R: BufRead> LineScanner<R> {
    /// Create a scanner over a reader; `source_name` only appears in errors
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            reader,
            source_name: source_name.into(),
            line: Vec::with_capacity(128),
            line_number: 0,
            pushed_back: false,
        }
    }

    /// Move to the next line
    ///
    /// Returns `Ok(false)` at end of input. A pushed back line is delivered
    /// again without reading.
    pub fn advance(&mut self) -> Result<bool> {
        if self.pushed_back {
            self.pushed_back = false;
            return Ok(true);
        }

        self.line.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.line)
            .map_err(|source| Error::TraceRead {
                source_name: self.source_name.clone(),
                line: self.line_number + 1,
                source,
            })?;
        if read == 0 {
            return Ok(false);
        }

        self.line_number += 1;
        if self.line.last() == Some(&b'\n') {
            self.line.pop();
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
        }
        Ok(true)
    }

    /// The current line, without its terminator
    pub fn current_line(&self) -> &[u8] {
        &self.line
    }

    /// Deliver the current line again on the next [`advance`](Self::advance)
    ///
    /// Repeated calls before the line is re-read have no further effect.
    pub fn push_back(&mut self) {
        self.pushed_back = true;
    }

    /// 1-based number of the last line read from the input
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Name of the trace being read
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufReader, Read};

    fn next_text<R: BufRead>(scanner: &mut LineScanner<R>) -> Option<String> {
        if scanner.advance().unwrap() {
            Some(String::from_utf8_lossy(scanner.current_line()).into_owned())
        } else {
            None
        }
    }

    #[test]
    fn test_push_back() {
        let mut scanner = LineScanner::new("Line 1\nLine 2\nLine 3\nLine 4\n".as_bytes(), "t");

        assert_eq!(next_text(&mut scanner).as_deref(), Some("Line 1"));
        assert_eq!(next_text(&mut scanner).as_deref(), Some("Line 2"));
        scanner.push_back();
        assert_eq!(next_text(&mut scanner).as_deref(), Some("Line 2"));
        assert_eq!(next_text(&mut scanner).as_deref(), Some("Line 3"));
        scanner.push_back();
        scanner.push_back();
        assert_eq!(next_text(&mut scanner).as_deref(), Some("Line 3"));
        assert_eq!(next_text(&mut scanner).as_deref(), Some("Line 4"));
        assert_eq!(next_text(&mut scanner), None);
        assert_eq!(scanner.line_number(), 4);
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let mut scanner = LineScanner::new("a\r\nb".as_bytes(), "t");
        assert_eq!(next_text(&mut scanner).as_deref(), Some("a"));
        assert_eq!(next_text(&mut scanner).as_deref(), Some("b"));
        assert_eq!(next_text(&mut scanner), None);
    }

    #[test]
    fn test_line_number_not_advanced_by_push_back() {
        let mut scanner = LineScanner::new("x\ny\n".as_bytes(), "t");
        scanner.advance().unwrap();
        scanner.push_back();
        scanner.advance().unwrap();
        assert_eq!(scanner.line_number(), 1);
    }

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
            }
            self.served = true;
            let data = b"first\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_read_error_carries_line_number() {
        let reader = BufReader::new(FailingReader { served: false });
        let mut scanner = LineScanner::new(reader, "cli.trc");
        assert!(scanner.advance().unwrap());
        match scanner.advance() {
            Err(Error::TraceRead {
                source_name, line, ..
            }) => {
                assert_eq!(source_name, "cli.trc");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
