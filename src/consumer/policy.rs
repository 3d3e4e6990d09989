use std::fmt;

/// Result of processing one fetched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Decoded and the downstream call went through.
    Processed,
    /// The payload is not an order. Redelivery would not help.
    Undecodable,
    /// Decoded, but the downstream call failed.
    CallFailed,
}

/// When to commit a fetched message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CommitPolicy {
    /// Commit every message once processing finishes (at-most-once).
    #[default]
    Always,
    /// Withhold the commit when the downstream call failed, so the message
    /// is delivered again after the group resumes.
    OnSuccess,
}

impl CommitPolicy {
    pub fn should_commit(self, outcome: ProcessOutcome) -> bool {
        match self {
            CommitPolicy::Always => true,
            CommitPolicy::OnSuccess => outcome != ProcessOutcome::CallFailed,
        }
    }
}

impl fmt::Display for CommitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitPolicy::Always => write!(f, "always"),
            CommitPolicy::OnSuccess => write!(f, "on-success"),
        }
    }
}
