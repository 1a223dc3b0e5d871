use std::io::{self, BufRead, Write};

/// The local input/output surface each process talks to its operator
/// through. Implementations block; the protocol defines no timeout for
/// operator input.
pub trait Console {
    /// Shows `prompt` and reads one line of text.
    fn prompt_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Shows `prompt` and reads an integer, re-asking locally until the
    /// operator supplies one.
    fn prompt_int(&mut self, prompt: &str) -> io::Result<u32>;

    /// Displays a line of text.
    fn display(&mut self, text: &str);
}

/// Stdin/stdout implementation used by both binaries.
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        Ok(line.trim_end().to_string())
    }

    fn prompt_int(&mut self, prompt: &str) -> io::Result<u32> {
        loop {
            let line = self.prompt_line(prompt)?;
            match line.trim().parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.display("please enter a whole number"),
            }
        }
    }

    fn display(&mut self, text: &str) {
        println!("{text}");
    }
}
