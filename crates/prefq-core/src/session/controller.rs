use tracing::{debug, info};

use crate::{FeedbackStore, ImageRecord, KeyValueStore, Preference, SessionOrder};

use super::{SessionError, SessionState, SkipList};

/// Drives a rater through a [`SessionOrder`].
///
/// The controller owns the order, the [`FeedbackStore`] and the current
/// selection. Entering an image loads its stored answer. Leaving an image by
/// [`advance`](Self::advance), [`retreat`](Self::retreat) or
/// [`finish`](Self::finish) writes the current selection back first.
///
/// Images on the [`SkipList`] always carry [`Preference::SKIPPED`]: entering
/// one records the skip code, and any other choice is stored as the skip
/// code.
///
/// Once [`SessionState::Completed`] is reached every operation fails with
/// [`SessionError::Completed`].
#[derive(Debug)]
pub struct SessionController<S> {
    order: SessionOrder,
    feedback: FeedbackStore<S>,
    skip_list: SkipList,
    num_policies: u8,
    state: SessionState,
    selection: Option<Preference>,
}

impl<S> SessionController<S>
where
    S: KeyValueStore,
{
    /// Starts a session on the first image.
    pub fn new(
        order: SessionOrder,
        feedback: FeedbackStore<S>,
        skip_list: SkipList,
        num_policies: u8,
    ) -> Result<Self, SessionError> {
        if order.is_empty() {
            return Err(SessionError::Empty);
        }
        if !(1..=Preference::MAX_POLICIES).contains(&num_policies) {
            return Err(SessionError::InvalidPolicyCount { num_policies });
        }
        let mut session = Self {
            order,
            feedback,
            skip_list,
            num_policies,
            state: SessionState::Viewing(0),
            selection: None,
        };
        session.enter(0)?;
        Ok(session)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Viewing(index) => Some(index),
            SessionState::Completed => None,
        }
    }

    #[must_use]
    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.current_index().and_then(|index| self.order.get(index))
    }

    /// Answer shown for the current image.
    #[must_use]
    pub fn selection(&self) -> Option<Preference> {
        self.selection
    }

    /// Whether the current image is on the skip list.
    #[must_use]
    pub fn is_current_skip_listed(&self) -> bool {
        self.current_image()
            .is_some_and(|image| self.skip_list.contains(&image.filename))
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.current_index() == Some(0)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current_index() == Some(self.order.len() - 1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn num_policies(&self) -> u8 {
        self.num_policies
    }

    #[must_use]
    pub fn order(&self) -> &SessionOrder {
        &self.order
    }

    #[must_use]
    pub fn feedback(&self) -> &FeedbackStore<S> {
        &self.feedback
    }

    /// Number of questions with a stored answer.
    #[must_use]
    pub fn num_answered(&self) -> usize {
        self.order
            .images()
            .iter()
            .filter(|image| self.feedback.get(&image.filename).is_some())
            .count()
    }

    /// Index of the first question without a stored answer.
    #[must_use]
    pub fn first_unanswered(&self) -> Option<usize> {
        self.order
            .images()
            .iter()
            .position(|image| self.feedback.get(&image.filename).is_none())
    }

    /// Validates and stores `preference` for the current image.
    ///
    /// Returns the value actually stored, which is the skip code for
    /// skip-listed images.
    pub fn record_preference(&mut self, preference: Preference) -> Result<Preference, SessionError> {
        let index = self.viewing()?;
        let preference = preference.validate(self.num_policies)?;
        let filename = &self.order.images()[index].filename;
        let preference = if self.skip_list.contains(filename) {
            Preference::SKIPPED
        } else {
            preference
        };
        self.feedback.set(filename, preference)?;
        self.selection = Some(preference);
        debug!(%filename, %preference, "answer recorded");
        Ok(preference)
    }

    /// Moves to the next image, or completes the session after the last one.
    pub fn advance(&mut self) -> Result<SessionState, SessionError> {
        let index = self.viewing()?;
        self.commit(index)?;
        if index + 1 < self.order.len() {
            self.enter(index + 1)?;
        } else {
            self.complete();
        }
        Ok(self.state)
    }

    /// Moves to the previous image. Does nothing on the first image.
    pub fn retreat(&mut self) -> Result<SessionState, SessionError> {
        let index = self.viewing()?;
        self.commit(index)?;
        if index > 0 {
            self.enter(index - 1)?;
        }
        Ok(self.state)
    }

    /// Completes the session from any image.
    pub fn finish(&mut self) -> Result<SessionState, SessionError> {
        let index = self.viewing()?;
        self.commit(index)?;
        self.complete();
        Ok(self.state)
    }

    /// Records `preference` and moves on, as a single key press does.
    pub fn select_and_advance(
        &mut self,
        preference: Preference,
    ) -> Result<SessionState, SessionError> {
        self.record_preference(preference)?;
        self.advance()
    }

    /// Moves directly to `index`, for resuming an interrupted session.
    pub fn jump_to(&mut self, index: usize) -> Result<SessionState, SessionError> {
        let current = self.viewing()?;
        if index >= self.order.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.order.len(),
            });
        }
        self.commit(current)?;
        self.enter(index)?;
        Ok(self.state)
    }

    pub fn into_feedback(self) -> FeedbackStore<S> {
        self.feedback
    }

    fn viewing(&self) -> Result<usize, SessionError> {
        self.current_index().ok_or(SessionError::Completed)
    }

    fn enter(&mut self, index: usize) -> Result<(), SessionError> {
        let filename = &self.order.images()[index].filename;
        self.state = SessionState::Viewing(index);
        self.selection = self.feedback.get(filename);
        if self.skip_list.contains(filename) && self.selection != Some(Preference::SKIPPED) {
            self.feedback.set(filename, Preference::SKIPPED)?;
            self.selection = Some(Preference::SKIPPED);
            debug!(%filename, "skip-listed image marked as skipped");
        }
        Ok(())
    }

    fn commit(&mut self, index: usize) -> Result<(), SessionError> {
        if let Some(preference) = self.selection {
            let filename = &self.order.images()[index].filename;
            self.feedback.set(filename, preference)?;
        }
        Ok(())
    }

    fn complete(&mut self) {
        self.state = SessionState::Completed;
        self.selection = None;
        info!(
            answered = self.num_answered(),
            questions = self.order.len(),
            "questionnaire completed"
        );
    }
}
