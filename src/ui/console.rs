//! ui::console
//!
//! The console abstraction all user I/O flows through.
//!
//! # Design
//!
//! The session, opener and shell never touch stdin/stdout directly. They talk
//! to a [`Console`], so the whole dispatch path can run against [`Scripted`]
//! input in tests. [`Terminal`] is the real implementation.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::rc::Rc;

use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    Signal as ReedlineSignal,
};

/// Line-oriented user I/O.
pub trait Console {
    /// Show `prompt` and read one line. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Show `prompt` and read a line without echoing it.
    fn read_password(&mut self, prompt: &str) -> io::Result<String>;

    /// Write a line of regular output.
    fn write_out(&mut self, text: &str);

    /// Write a line of diagnostic output.
    fn write_err(&mut self, text: &str);
}

/// The process terminal.
///
/// Uses reedline for line editing when stdin is a TTY, and plain buffered
/// reads otherwise (piped scripts).
pub struct Terminal {
    editor: Option<Reedline>,
}

impl Terminal {
    pub fn new() -> Self {
        let editor = io::stdin().is_terminal().then(Reedline::create);
        Self { editor }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let Some(editor) = self.editor.as_mut() else {
            print!("{}", prompt);
            io::stdout().flush()?;
            let mut line = String::new();
            return match io::stdin().lock().read_line(&mut line)? {
                0 => Ok(None),
                _ => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
            };
        };

        let prompt = ShellPrompt(prompt.to_string());
        loop {
            match editor.read_line(&prompt) {
                Ok(ReedlineSignal::Success(line)) => return Ok(Some(line)),
                Ok(ReedlineSignal::CtrlD) => return Ok(None),
                // Ctrl-C abandons the current line only.
                Ok(ReedlineSignal::CtrlC) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }

    fn write_out(&mut self, text: &str) {
        println!("{}", text);
    }

    fn write_err(&mut self, text: &str) {
        eprintln!("{}", text);
    }
}

/// Fixed prompt text for the reedline editor.
struct ShellPrompt(String);

impl Prompt for ShellPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.0)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

/// Everything written to a [`Scripted`] console.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    inner: Rc<RefCell<TranscriptLog>>,
}

#[derive(Debug, Default)]
struct TranscriptLog {
    out: Vec<String>,
    err: Vec<String>,
    prompts: Vec<String>,
}

impl Transcript {
    /// Lines written with `write_out`.
    pub fn out(&self) -> Vec<String> {
        self.inner.borrow().out.clone()
    }

    /// Lines written with `write_err`.
    pub fn err(&self) -> Vec<String> {
        self.inner.borrow().err.clone()
    }

    /// Every prompt shown, line and password prompts alike, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.inner.borrow().prompts.clone()
    }

    /// All regular output joined with newlines.
    pub fn stdout(&self) -> String {
        self.out().join("\n")
    }

    /// All diagnostic output joined with newlines.
    pub fn stderr(&self) -> String {
        self.err().join("\n")
    }
}

/// A console fed from queued input, for tests and scripted runs.
#[derive(Debug, Default)]
pub struct Scripted {
    lines: VecDeque<String>,
    passwords: VecDeque<String>,
    transcript: Transcript,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue shell input lines.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    /// Queue responses to password prompts.
    pub fn with_passwords<I, S>(mut self, passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passwords.extend(passwords.into_iter().map(Into::into));
        self
    }

    /// A handle onto the output, usable after the console is moved away.
    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }
}

impl Console for Scripted {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.transcript
            .inner
            .borrow_mut()
            .prompts
            .push(prompt.to_string());
        Ok(self.lines.pop_front())
    }

    fn read_password(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript
            .inner
            .borrow_mut()
            .prompts
            .push(prompt.to_string());
        self.passwords.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted password left")
        })
    }

    fn write_out(&mut self, text: &str) {
        self.transcript.inner.borrow_mut().out.push(text.to_string());
    }

    fn write_err(&mut self, text: &str) {
        self.transcript.inner.borrow_mut().err.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_replays_input_in_order() {
        let mut console = Scripted::new()
            .with_lines(["ls", "quit"])
            .with_passwords(["pw"]);
        let transcript = console.transcript();

        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("ls"));
        assert_eq!(console.read_password("Password: ").unwrap(), "pw");
        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("quit"));
        assert_eq!(console.read_line("> ").unwrap(), None);
        assert_eq!(transcript.prompts(), vec!["> ", "Password: ", "> ", "> "]);
    }

    #[test]
    fn scripted_console_errors_when_passwords_run_out() {
        let mut console = Scripted::new();
        let err = console.read_password("Password: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn transcript_separates_streams() {
        let mut console = Scripted::new();
        let transcript = console.transcript();
        console.write_out("hello");
        console.write_err("oops");
        assert_eq!(transcript.stdout(), "hello");
        assert_eq!(transcript.stderr(), "oops");
    }
}
