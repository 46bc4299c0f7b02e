use std::fmt::Display;

/// Collects diagnostics from every pipeline stage.
///
/// The reporter is passed explicitly to the parser and the semantic analyzer;
/// the CLI drains it to stderr once the run is over. Reporting is never
/// fatal: each problem becomes exactly one line and the pipeline keeps going.
#[derive(Debug, Default)]
pub struct Reporter {
    messages: Vec<String>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, message: impl Display) {
        self.messages.push(format!("Error: {message}"));
    }

    pub fn had_errors(&self) -> bool {
        !self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_every_message() {
        let mut reporter = Reporter::new();
        assert!(!reporter.had_errors());

        reporter.report("something went wrong on line 3");
        assert!(reporter.had_errors());
        assert_eq!(
            reporter.messages(),
            ["Error: something went wrong on line 3"]
        );
    }
}
