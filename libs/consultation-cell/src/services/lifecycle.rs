use tracing::{debug, warn};

use shared_models::auth::Actor;
use shared_models::error::ScheduleError;

use crate::models::ConsultationStatus;

pub struct ConsultationLifecycleService {
    strict: bool,
}

impl ConsultationLifecycleService {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Same-state writes always pass. Admins may override the table; with
    /// strict mode off any move is accepted.
    pub fn validate_status_transition(
        &self,
        current: ConsultationStatus,
        next: ConsultationStatus,
        actor: &Actor,
    ) -> Result<(), ScheduleError> {
        debug!("Validating status transition from {} to {}", current, next);

        if current == next || !self.strict {
            return Ok(());
        }

        if self.get_valid_transitions(current).contains(&next) {
            return Ok(());
        }

        if actor.is_admin() {
            warn!("Admin {} overriding status transition {} -> {}", actor.id, current, next);
            return Ok(());
        }

        warn!("Invalid status transition attempted: {} -> {}", current, next);
        Err(ScheduleError::InvalidInput(format!(
            "Cannot change status from {} to {}",
            current, next
        )))
    }

    pub fn get_valid_transitions(&self, current: ConsultationStatus) -> &'static [ConsultationStatus] {
        use ConsultationStatus::*;

        match current {
            Scheduled => &[Ongoing, Cancelled, NoShow, Completed],
            Ongoing => &[Completed, Cancelled, NoShow],
            Completed | Cancelled | NoShow => &[Refunded],
            Refunded => &[],
        }
    }
}
