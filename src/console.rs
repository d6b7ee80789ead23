use crate::error::{GraphError, Result};
use std::io::{self, BufRead, Write};

/// Line-oriented operator dialogue over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Next line without its terminator, `None` once input is exhausted.
    /// Bytes that are not UTF-8 come through as U+FFFD.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        while raw.last().map_or(false, |b| *b == b'\n' || *b == b'\r') {
            raw.pop();
        }
        Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
    }

    pub fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        Ok(self.read_line()?.map(|line| line.trim().to_string()))
    }

    pub fn prompt_required(&mut self, label: &str) -> Result<String> {
        match self.prompt(label)? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(GraphError::Input(format!("{} is required", label))),
        }
    }

    /// Empty input (or end of input) picks `default`.
    pub fn prompt_with_default(&mut self, label: &str, default: &str) -> Result<String> {
        match self.prompt(&format!("{} [{}]", label, default))? {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Ok(default.to_string()),
        }
    }
}
