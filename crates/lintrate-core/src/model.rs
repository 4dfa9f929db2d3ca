/// Result of evaluating one lint against one certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Pass,
    Error,
    Warn,
    Info,
    NotApplicable,
    NotEvaluated,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::Pass,
        Outcome::Error,
        Outcome::Warn,
        Outcome::Info,
        Outcome::NotApplicable,
        Outcome::NotEvaluated,
    ];

    /// Parse the text the linter stores in the results table.
    ///
    /// The linter writes `NA`/`NE`; the long spellings are accepted too.
    pub fn parse(s: &str) -> Option<Outcome> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" => Some(Outcome::Pass),
            "error" => Some(Outcome::Error),
            "warn" => Some(Outcome::Warn),
            "info" => Some(Outcome::Info),
            "na" | "not-applicable" | "not_applicable" => Some(Outcome::NotApplicable),
            "ne" | "not-evaluated" | "not_evaluated" => Some(Outcome::NotEvaluated),
            _ => None,
        }
    }

    /// Wire form as written by the linter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Error => "error",
            Outcome::Warn => "warn",
            Outcome::Info => "info",
            Outcome::NotApplicable => "NA",
            Outcome::NotEvaluated => "NE",
        }
    }

    /// Outcomes where the lint found no violation.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Pass | Outcome::NotApplicable | Outcome::NotEvaluated)
    }
}
