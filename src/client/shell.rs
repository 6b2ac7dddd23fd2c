use anyhow::Result;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::preferences::Preferences;

use super::controller::{Endpoint, SearchController, SubmitOutcome};
use super::input::{AlgorithmSelector, KeyAction, QueryInput, SearchForm};
use super::render::{TerminalSurface, Theme};

const PROMPT: &str = "query> ";

const HELP: &str = "\
commands:
  :algorithm <BM|EBM|VM>       change the retrieval model
  :endpoint <results|documents> change the route searches are sent to
  :theme <night|day>           switch and remember the colour theme
  :help                        show this help
  :quit                        leave
anything else is sent as a query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStep {
    Continue,
    Quit,
}

/// Interactive line-based front end: every line is typed into the query field followed
/// by an Enter key press.
pub struct Shell<W: Write> {
    controller: SearchController,
    input: QueryInput,
    selector: AlgorithmSelector,
    surface: TerminalSurface<W>,
    prefs_path: PathBuf,
    last_outcome: Option<SubmitOutcome>,
}

impl<W: Write> Shell<W> {
    /// Builds the shell and applies the stored theme preference.
    pub fn new(
        controller: SearchController,
        selector: AlgorithmSelector,
        out: W,
        prefs_path: PathBuf,
    ) -> Self {
        let prefs = Preferences::load(&prefs_path);
        Self {
            controller,
            input: QueryInput::new(),
            selector,
            surface: TerminalSurface::new(out, Theme::from_preferences(&prefs)),
            prefs_path,
            last_outcome: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.surface.theme()
    }

    pub fn selector(&self) -> &AlgorithmSelector {
        &self.selector
    }

    pub fn last_outcome(&self) -> Option<&SubmitOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn into_output(self) -> W {
        self.surface.into_inner()
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<()> {
        let mut lines = reader.lines();
        self.surface.prompt(PROMPT);
        while let Some(line) = lines.next_line().await? {
            if self.handle_line(&line).await? == ShellStep::Quit {
                break;
            }
            self.surface.prompt(PROMPT);
        }
        Ok(())
    }

    pub async fn handle_line(&mut self, line: &str) -> Result<ShellStep> {
        let line = line.trim();
        if let Some(command) = line.strip_prefix(':') {
            return self.handle_command(command);
        }

        self.input.set_value(line);
        if self.input.handle_key("Enter") == KeyAction::Submit {
            let form = SearchForm::collect(&self.input, &self.selector);
            let outcome = self.controller.submit(&form, &mut self.surface).await;
            log::debug!("submit finished: {:?}", outcome);
            self.last_outcome = Some(outcome);
        }
        Ok(ShellStep::Continue)
    }

    fn handle_command(&mut self, command: &str) -> Result<ShellStep> {
        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().unwrap_or_default();

        match name {
            "q" | "quit" | "exit" => return Ok(ShellStep::Quit),
            "help" | "h" => self.surface.note(HELP),
            "alg" | "algorithm" => {
                if !self.selector.select(arg) {
                    self.surface.note(&format!("unknown algorithm {arg:?}, use BM, EBM or VM"));
                }
            }
            "endpoint" => match arg.parse::<Endpoint>() {
                Ok(endpoint) => self.controller.set_endpoint(endpoint),
                Err(e) => self.surface.note(&e.to_string()),
            },
            "theme" => {
                let night = match arg {
                    "night" | "on" => true,
                    "day" | "off" => false,
                    _ => {
                        self.surface.note("usage: :theme <night|day>");
                        return Ok(ShellStep::Continue);
                    }
                };
                let prefs = Preferences { night_theme: night };
                prefs.save(&self.prefs_path)?;
                self.surface.set_theme(Theme::from_preferences(&prefs));
            }
            other => self.surface.note(&format!("unknown command :{other}, try :help")),
        }
        Ok(ShellStep::Continue)
    }
}
