//! Error types.

/// Error a rule may return from `MarkdownRule::apply`.
pub type RuleError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A rule failed and aborted the parse.
    #[error("rule `{rule}` failed: {source}")]
    Rule {
        rule: String,
        #[source]
        source: RuleError,
    },

    #[error("invalid color `{0}`, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
