//! The questionnaire state machine.
//!
//! [`SessionController`] walks the [`SessionOrder`](crate::SessionOrder) one
//! image at a time. It loads the stored answer whenever an image is entered
//! and writes the current answer back whenever the rater leaves it, so moving
//! back and forth never loses a choice.

pub use self::{config::*, controller::*, skip::*};

use crate::{InvalidPreference, StoreError};

mod config;
mod controller;
mod skip;

/// Position of a [`SessionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    /// Showing the image at this index
    Viewing(usize),
    /// The rater left the last image; no further navigation is possible
    Completed,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SessionError {
    #[display("session has no questions")]
    Empty,
    #[display("session is already completed")]
    Completed,
    #[display("number of policies must be in 1..={}, got {num_policies}", crate::Preference::MAX_POLICIES)]
    InvalidPolicyCount { num_policies: u8 },
    #[display("question index {index} is out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },
    #[display("invalid preference")]
    InvalidPreference(InvalidPreference),
    #[display("failed to save answer")]
    Store(StoreError),
}

impl From<InvalidPreference> for SessionError {
    fn from(error: InvalidPreference) -> Self {
        Self::InvalidPreference(error)
    }
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
