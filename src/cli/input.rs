//! Line input for `faqbuddy chat` using rustyline
//!
//! Editing, persistent history, and the exit words.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

const PROMPT: &str = "faq> ";

/// One line read from the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    Question(String),
    Empty,
    Exit,
}

impl InputLine {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            InputLine::Empty
        } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            InputLine::Exit
        } else {
            InputLine::Question(trimmed.to_string())
        }
    }
}

pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl InputHandler {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            history_path: None,
        })
    }

    /// Handler that loads and saves history at `history_file`
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self {
            editor,
            history_path: Some(history_file),
        })
    }

    /// `~/.faqbuddy/history`, when a home directory exists
    pub fn default_history_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".faqbuddy").join("history"))
    }

    /// Ctrl-C and Ctrl-D both end the session
    pub fn read_line(&mut self) -> Result<InputLine> {
        match self.editor.readline(PROMPT) {
            Ok(line) => {
                let input = InputLine::parse(&line);
                if let InputLine::Question(q) = &input {
                    let _ = self.editor.add_history_entry(q.as_str());
                }
                Ok(input)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(InputLine::Exit),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    pub fn save_history(&mut self) -> Result<()> {
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }
}
