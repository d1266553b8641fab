use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: &'static str },

    #[error("no finished phase is awaiting confirmation")]
    NotAwaitingConfirmation,

    #[error("work duration has not been configured")]
    NotConfigured,

    #[error("the cycle has already started")]
    AlreadyStarted,
}

impl CycleError {
    /// Errors the user can fix by typing something else.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CycleError::InvalidDuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, CycleError>;
