use crate::error::Error;

const INDENT: &str = "  ";

/// Collects emitted text as an ordered list of lines.
pub struct CodeWriter {
    lines: Vec<String>,
    indent_level: u32,
}

impl CodeWriter {
    pub fn new() -> CodeWriter {
        CodeWriter {
            lines: Vec::new(),
            indent_level: 0,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn unindent(&mut self) -> Result<(), Error> {
        if self.indent_level == 0 {
            return Err(Error::IndentUnderflow);
        }
        self.indent_level -= 1;
        Ok(())
    }

    pub fn append_newline(&mut self) {
        self.lines.push(String::new());
    }

    pub fn append_line(&mut self, s: &str) {
        let mut line = INDENT.repeat(self.indent_level as usize);
        line.push_str(s);
        self.lines.push(line);
    }

    pub fn finish(self) -> Vec<String> {
        self.lines
    }
}
