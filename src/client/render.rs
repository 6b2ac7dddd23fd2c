use colored::Colorize;
use std::io::Write;

use crate::api::models::SearchResult;
use crate::preferences::Preferences;

pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// Where search results end up.
pub trait Surface {
    /// Drops whatever was rendered by the previous search.
    fn clear(&mut self);
    fn append_item(&mut self, result: &SearchResult);
    /// A message the user has to see.
    fn alert(&mut self, message: &str);
}

/// Clears `surface`, then appends one item per result, or raises the
/// no-results alert when there are none.
pub fn render_results(surface: &mut dyn Surface, results: &[SearchResult]) {
    surface.clear();
    if results.is_empty() {
        surface.alert(NO_RESULTS_MESSAGE);
        return;
    }
    for result in results {
        surface.append_item(result);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Day,
    Night,
}

impl Theme {
    pub fn from_preferences(prefs: &Preferences) -> Self {
        if prefs.night_theme {
            Theme::Night
        } else {
            Theme::Day
        }
    }
}

/// Renders results as a numbered list on any writer.
pub struct TerminalSurface<W: Write> {
    out: W,
    theme: Theme,
    rendered: usize,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, theme: Theme) -> Self {
        Self {
            out,
            theme,
            rendered: 0,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Items rendered since the last clear.
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes `text` without a trailing newline and flushes, for prompts.
    pub fn prompt(&mut self, text: &str) {
        let res = write!(self.out, "{text}").and_then(|_| self.out.flush());
        if let Err(e) = res {
            log::warn!("failed to write to terminal: {}", e);
        }
    }

    /// Writes a plain informational line.
    pub fn note(&mut self, text: &str) {
        self.write(text.to_string());
    }

    fn write(&mut self, text: String) {
        if let Err(e) = writeln!(self.out, "{text}") {
            log::warn!("failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn clear(&mut self) {
        if self.rendered > 0 {
            self.write(String::new());
        }
        self.rendered = 0;
    }

    fn append_item(&mut self, result: &SearchResult) {
        self.rendered += 1;
        let index = format!("{:>3}.", self.rendered);
        let (title, url, snippet) = match self.theme {
            Theme::Day => (
                result.title.as_str().blue().bold(),
                result.url.as_str().green(),
                result.snippet.as_str().normal(),
            ),
            Theme::Night => (
                result.title.as_str().bright_cyan().bold(),
                result.url.as_str().bright_black(),
                result.snippet.as_str().white(),
            ),
        };
        self.write(format!("{index} {title}"));
        self.write(format!("     {url}"));
        self.write(format!("     {snippet}"));
    }

    fn alert(&mut self, message: &str) {
        let styled = match self.theme {
            Theme::Day => message.red().bold(),
            Theme::Night => message.bright_yellow().bold(),
        };
        self.write(format!("! {styled}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(n: usize) -> SearchResult {
        SearchResult {
            url: format!("/documents/{n}"),
            title: format!("doc-{n}.txt"),
            snippet: format!("snippet {n}"),
        }
    }

    #[test]
    fn test_terminal_surface_numbers_items() {
        let mut surface = TerminalSurface::new(Vec::new(), Theme::Day);
        render_results(&mut surface, &[result(1), result(2)]);
        assert_eq!(surface.rendered(), 2);
        let text = String::from_utf8(surface.into_inner()).unwrap();
        assert!(text.contains("doc-1.txt"));
        assert!(text.contains("/documents/2"));
        assert!(text.contains("snippet 2"));
        assert!(!text.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_terminal_surface_alerts_on_empty() {
        let mut surface = TerminalSurface::new(Vec::new(), Theme::Night);
        render_results(&mut surface, &[]);
        assert_eq!(surface.rendered(), 0);
        let text = String::from_utf8(surface.into_inner()).unwrap();
        assert!(text.contains(NO_RESULTS_MESSAGE));
    }

    #[test]
    fn test_clear_resets_count() {
        let mut surface = TerminalSurface::new(Vec::new(), Theme::Day);
        render_results(&mut surface, &[result(1), result(2), result(3)]);
        render_results(&mut surface, &[result(4)]);
        assert_eq!(surface.rendered(), 1);
    }

    #[test]
    fn test_theme_from_preferences() {
        assert_eq!(
            Theme::from_preferences(&Preferences { night_theme: true }),
            Theme::Night
        );
        assert_eq!(Theme::from_preferences(&Preferences::default()), Theme::Day);
    }
}
