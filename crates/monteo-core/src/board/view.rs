//! Versioned board snapshots.

use serde::Serialize;

use monteo_types::job::{Job, JobId, JobStatus};
use monteo_types::process::StageId;

use crate::process::ProcessDefinition;

/// One job card on the board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardCard {
    pub job_id: JobId,
    pub client_name: String,
    pub status: JobStatus,
    /// Interaction is disabled while a move of this card is in flight.
    pub pending: bool,
}

/// One stage column with its cards in display order.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub stage: StageId,
    pub label: &'static str,
    pub cards: Vec<BoardCard>,
}

/// Immutable snapshot of the board, keyed by a version counter.
///
/// Mutations produce a fresh snapshot (copy-on-write) with a bumped
/// version; reconciliation swaps snapshots instead of patching in place.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub version: u64,
    pub columns: Vec<BoardColumn>,
}

impl BoardView {
    /// Build the canonical view by partitioning jobs by status.
    ///
    /// Terminal jobs are not on the board. Jobs with each status keep their
    /// given order (callers list newest first).
    pub fn partition(process: &ProcessDefinition, jobs: &[Job], version: u64) -> Self {
        let columns = process
            .stages()
            .iter()
            .map(|stage| BoardColumn {
                stage: stage.id,
                label: stage.label,
                cards: jobs
                    .iter()
                    .filter(|job| job.status.stage() == Some(stage.id))
                    .map(|job| BoardCard {
                        job_id: job.id,
                        client_name: job.client_name.clone(),
                        status: job.status,
                        pending: false,
                    })
                    .collect(),
            })
            .collect();

        Self { version, columns }
    }

    pub fn column(&self, stage: StageId) -> &BoardColumn {
        &self.columns[stage.position()]
    }

    fn column_mut(&mut self, stage: StageId) -> &mut BoardColumn {
        &mut self.columns[stage.position()]
    }

    /// Remove a card from `from` and prepend it to `to`, marking it
    /// pending. Returns `false` when the card is not in `from`.
    pub(super) fn apply_move(&mut self, job_id: JobId, from: StageId, to: StageId) -> bool {
        let source = self.column_mut(from);
        let Some(index) = source.cards.iter().position(|c| c.job_id == job_id) else {
            return false;
        };
        let mut card = source.cards.remove(index);
        card.pending = true;
        card.status = JobStatus::Stage(to);
        self.column_mut(to).cards.insert(0, card);
        true
    }

    /// Clear the pending flag on a card, wherever it sits.
    pub(super) fn clear_pending(&mut self, job_id: JobId) {
        for column in &mut self.columns {
            for card in &mut column.cards {
                if card.job_id == job_id {
                    card.pending = false;
                }
            }
        }
    }
}
