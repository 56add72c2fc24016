use std::io::Write;

use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented reader over stdin.
pub struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    pub async fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        print!("{}> ", label);
        std::io::stdout().flush()?;
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

/// Split a command line into its verb and the rest.
pub fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    }
}

/// 1-based list position as typed by the user, to a 0-based index.
pub fn parse_position(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}
