//! Per-request submission guard.
//!
//! ```text
//! Idle ──begin──► InFlight ──► Done
//!                    │
//!                    └───────► Failed
//! ```
//!
//! A request cannot re-enter `InFlight` once it has finished, so a redemption
//! is attempted at most once per request.

use crate::domain::foundation::{StateMachine, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Done,
    Failed,
}

impl StateMachine for SubmissionState {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            SubmissionState::Idle => vec![SubmissionState::InFlight],
            SubmissionState::InFlight => vec![SubmissionState::Done, SubmissionState::Failed],
            SubmissionState::Done | SubmissionState::Failed => vec![],
        }
    }
}

/// Tracks one submission through its states.
#[derive(Debug, Default)]
pub struct Submission {
    state: SubmissionState,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn begin(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(SubmissionState::InFlight)?;
        Ok(())
    }

    pub fn succeed(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(SubmissionState::Done)?;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(SubmissionState::Failed)?;
        Ok(())
    }

    /// Records the outcome of `result` and passes it through.
    ///
    /// Finishing a submission that is not `InFlight` is an error in its own
    /// right and replaces `result`.
    pub fn finish<T, E>(&mut self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<ValidationError>,
    {
        match &result {
            Ok(_) => self.succeed()?,
            Err(_) => self.fail()?,
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_runs_idle_inflight_done() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        assert_eq!(submission.state(), SubmissionState::InFlight);
        submission.succeed().unwrap();
        assert!(submission.state().is_terminal());
    }

    #[test]
    fn finished_submission_cannot_restart() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        submission.fail().unwrap();
        assert!(submission.begin().is_err());
        assert_eq!(submission.state(), SubmissionState::Failed);
    }

    #[test]
    fn cannot_finish_without_starting() {
        let mut submission = Submission::new();
        assert!(submission.succeed().is_err());
    }

    #[test]
    fn finish_records_outcome() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        let result: Result<u8, ValidationError> =
            submission.finish(Err(ValidationError::empty_field("name")));
        assert!(result.is_err());
        assert_eq!(submission.state(), SubmissionState::Failed);
    }

    #[test]
    fn finish_without_begin_reports_the_transition_error() {
        let mut submission = Submission::new();

        let result: Result<u8, ValidationError> = submission.finish(Ok(7));

        assert!(result.is_err());
        assert_eq!(submission.state(), SubmissionState::Idle);
    }

    #[test]
    fn second_finish_is_rejected() {
        let mut submission = Submission::new();
        submission.begin().unwrap();
        let first: Result<u8, ValidationError> = submission.finish(Ok(1));
        assert_eq!(first.unwrap(), 1);

        let second: Result<u8, ValidationError> = submission.finish(Ok(2));

        assert!(second.is_err());
        assert_eq!(submission.state(), SubmissionState::Done);
    }
}
