use std::fmt;

use async_trait::async_trait;

/// Why a credential was not accepted.
///
/// Only used for logging. Every refusal leads to the same outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    /// The backend answered and said no (non-2xx or `success: false`).
    Rejected,
    /// The request never produced a usable answer (network, malformed body).
    Transport(String),
    /// No answer within the verification timeout.
    Timeout,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Refusal::Rejected => write!(f, "rejected by server"),
            Refusal::Transport(e) => write!(f, "transport failure: {}", e),
            Refusal::Timeout => write!(f, "timed out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Refused(Refusal),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Something that can ask the backend whether a bearer credential is valid.
///
/// Implementations never retry and never return an error: any failure is a
/// [`Verdict::Refused`].
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, token: &str) -> Verdict;
}
