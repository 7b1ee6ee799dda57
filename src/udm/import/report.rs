//! Status lines shown to the person running the import.
//!
//! Diagnostics go through `tracing`; this module only covers the coloured
//! progress and summary lines on stdout.

use console::style;

/// Severity of a status line. Decides its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Good,
    Error,
}

/// Renders `message` for `level`. Blue, plain, green or red.
pub fn format_line(level: Level, message: &str) -> String {
    let styled = match level {
        Level::Debug => style(message).blue(),
        Level::Info => style(message),
        Level::Good => style(message).green(),
        Level::Error => style(message).red(),
    };
    styled.to_string()
}

/// Sink for status lines.
pub trait Reporter {
    fn report(&mut self, level: Level, message: &str);

    fn info(&mut self, message: &str) {
        self.report(Level::Info, message);
    }

    fn good(&mut self, message: &str) {
        self.report(Level::Good, message);
    }

    fn error(&mut self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Prints formatted lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, level: Level, message: &str) {
        println!("{}", format_line(level, message));
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingReporter {
    pub lines: Vec<(Level, String)>,
}

impl RecordingReporter {
    pub fn messages(&self, level: Level) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(line_level, _)| *line_level == level)
            .map(|(_, message)| message.as_str())
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, level: Level, message: &str) {
        self.lines.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_line_keeps_message_text() {
        for level in [Level::Debug, Level::Info, Level::Good, Level::Error] {
            assert!(format_line(level, "Loaded UDM module").contains("Loaded UDM module"));
        }
    }

    #[test]
    fn recording_reporter_filters_by_level() {
        let mut reporter = RecordingReporter::default();
        reporter.info("reading");
        reporter.error("failed");
        reporter.good("done");
        assert_eq!(reporter.messages(Level::Error), ["failed"]);
        assert_eq!(reporter.lines.len(), 3);
    }
}
