//! Per-UI-client board session: optimistic moves and reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use monteo_types::error::EngineError;
use monteo_types::job::{Job, JobId};
use monteo_types::process::StageId;

use crate::process::ProcessDefinition;

use super::view::BoardView;

/// An in-flight optimistic move awaiting the server outcome.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub job_id: JobId,
    pub from: StageId,
    pub to: StageId,
}

/// Board state owned by one UI session.
///
/// Holds the current snapshot behind an `Arc` so handing the view out is a
/// pointer copy; every mutation produces the next snapshot with a bumped
/// version. Only one in-flight move is authoritative from the UI's
/// perspective; a second drag started while the first is pending resolves
/// independently, and whichever reconciliation rebuilds from canonical
/// state last wins, discarding any unconfirmed optimistic effect.
pub struct BoardSession {
    current: Arc<BoardView>,
    pending: HashMap<Uuid, PendingMove>,
}

impl BoardSession {
    /// Open a session over the canonical job set.
    pub fn new(process: &ProcessDefinition, jobs: &[Job]) -> Self {
        Self {
            current: Arc::new(BoardView::partition(process, jobs, 1)),
            pending: HashMap::new(),
        }
    }

    /// The current snapshot (cheap pointer copy).
    pub fn view(&self) -> Arc<BoardView> {
        Arc::clone(&self.current)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Apply a move to the local view before the server confirms.
    ///
    /// Returns a pending-operation token to resolve later. Fails with
    /// `NotFound` when the job is not currently shown under `from`.
    pub fn begin_move(
        &mut self,
        job_id: JobId,
        from: StageId,
        to: StageId,
    ) -> Result<Uuid, EngineError> {
        let mut next = (*self.current).clone();
        if !next.apply_move(job_id, from, to) {
            return Err(EngineError::NotFound(format!(
                "job {job_id} in column {from}"
            )));
        }
        next.version = self.current.version + 1;
        self.current = Arc::new(next);

        let token = Uuid::new_v4();
        self.pending.insert(token, PendingMove { job_id, from, to });
        Ok(token)
    }

    /// The server accepted the move: keep the optimistic view, clear the
    /// pending flag. Unknown (orphaned) tokens are tolerated; returns
    /// whether the token was known.
    pub fn confirm_move(&mut self, token: &Uuid) -> bool {
        let Some(done) = self.pending.remove(token) else {
            return false;
        };
        let mut next = (*self.current).clone();
        next.clear_pending(done.job_id);
        next.version = self.current.version + 1;
        self.current = Arc::new(next);
        true
    }

    /// The server rejected the move: discard the optimistic view and
    /// replace it wholesale with a fresh partition of the canonical job
    /// set. All other pending moves are discarded with it ("last
    /// reconciliation wins"). Unknown tokens still trigger the rebuild --
    /// the caller has canonical state in hand and the view must converge.
    pub fn reject_move(
        &mut self,
        token: &Uuid,
        process: &ProcessDefinition,
        canonical: &[Job],
    ) -> Arc<BoardView> {
        self.pending.remove(token);
        self.pending.clear();
        self.current = Arc::new(BoardView::partition(
            process,
            canonical,
            self.current.version + 1,
        ));
        self.view()
    }

    /// Full refresh from canonical state (e.g. on reconnect).
    pub fn refresh(&mut self, process: &ProcessDefinition, canonical: &[Job]) -> Arc<BoardView> {
        self.pending.clear();
        self.current = Arc::new(BoardView::partition(
            process,
            canonical,
            self.current.version + 1,
        ));
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monteo_types::job::JobStatus;

    fn process() -> &'static ProcessDefinition {
        ProcessDefinition::get()
    }

    fn job_in(stage: StageId, name: &str) -> Job {
        let mut job = Job::new(name.to_string());
        job.status = JobStatus::Stage(stage);
        job
    }

    #[test]
    fn begin_move_is_applied_locally_before_confirmation() {
        let lead = job_in(StageId::Lead, "Novak");
        let jobs = vec![lead.clone()];
        let mut session = BoardSession::new(process(), &jobs);
        let v1 = session.view().version;

        let token = session
            .begin_move(lead.id, StageId::Lead, StageId::BeforeMeasurement)
            .unwrap();

        let view = session.view();
        assert_eq!(view.version, v1 + 1);
        assert!(view.column(StageId::Lead).cards.is_empty());
        assert!(view.column(StageId::BeforeMeasurement).cards[0].pending);
        assert!(session.has_pending());

        assert!(session.confirm_move(&token));
        let view = session.view();
        assert!(!view.column(StageId::BeforeMeasurement).cards[0].pending);
        assert!(!session.has_pending());
    }

    #[test]
    fn reject_move_rolls_back_to_canonical() {
        let lead = job_in(StageId::Lead, "Novak");
        let jobs = vec![lead.clone()];
        let mut session = BoardSession::new(process(), &jobs);

        let token = session
            .begin_move(lead.id, StageId::Lead, StageId::BeforeMeasurement)
            .unwrap();

        // Server said no (e.g. policy violation); canonical still has the
        // job under lead.
        let view = session.reject_move(&token, process(), &jobs);
        assert_eq!(view.column(StageId::Lead).cards.len(), 1);
        assert_eq!(view.column(StageId::Lead).cards[0].job_id, lead.id);
        assert!(view.column(StageId::BeforeMeasurement).cards.is_empty());
        assert!(!session.has_pending());
    }

    #[test]
    fn rejection_discards_the_other_unconfirmed_move_too() {
        let a = job_in(StageId::Lead, "Novak");
        let b = job_in(StageId::Lead, "Svoboda");
        let jobs = vec![a.clone(), b.clone()];
        let mut session = BoardSession::new(process(), &jobs);

        let token_a = session
            .begin_move(a.id, StageId::Lead, StageId::BeforeMeasurement)
            .unwrap();
        let _token_b = session
            .begin_move(b.id, StageId::Lead, StageId::BeforeMeasurement)
            .unwrap();

        let view = session.reject_move(&token_a, process(), &jobs);
        // Both optimistic effects are gone.
        assert_eq!(view.column(StageId::Lead).cards.len(), 2);
        assert!(!session.has_pending());
    }

    #[test]
    fn versions_are_monotonic() {
        let a = job_in(StageId::Lead, "Novak");
        let jobs = vec![a.clone()];
        let mut session = BoardSession::new(process(), &jobs);

        let mut last = session.view().version;
        let token = session
            .begin_move(a.id, StageId::Lead, StageId::BeforeMeasurement)
            .unwrap();
        assert!(session.view().version > last);
        last = session.view().version;

        session.confirm_move(&token);
        assert!(session.view().version > last);
        last = session.view().version;

        session.refresh(process(), &jobs);
        assert!(session.view().version > last);
    }

    #[test]
    fn orphaned_tokens_are_tolerated() {
        let jobs = vec![job_in(StageId::Lead, "Novak")];
        let mut session = BoardSession::new(process(), &jobs);

        assert!(!session.confirm_move(&Uuid::new_v4()));
        let view = session.reject_move(&Uuid::new_v4(), process(), &jobs);
        assert_eq!(view.column(StageId::Lead).cards.len(), 1);
    }

    #[test]
    fn begin_move_for_absent_card_fails() {
        let jobs = vec![job_in(StageId::Lead, "Novak")];
        let mut session = BoardSession::new(process(), &jobs);

        let err = session
            .begin_move(JobId::new(), StageId::Lead, StageId::BeforeMeasurement)
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(!session.has_pending());
    }
}
