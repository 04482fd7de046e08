//! Project transition rules.
//!
//! Entering `completed` stamps `actual_completion_date`; leaving it clears
//! the date. No target needs extra input.

use std::convert::Infallible;

use chrono::{DateTime, Utc};

use super::{Lifecycle, LifecyclePolicy, TransitionResult};
use crate::model::{FieldUpdate, Project, ProjectPatch, ProjectStatus};

impl Lifecycle for Project {
    type Status = ProjectStatus;
    type Payload = Infallible;

    fn status(&self) -> ProjectStatus {
        self.status
    }

    fn plan(
        &self,
        target: ProjectStatus,
        _payload: Option<Infallible>,
        now: DateTime<Utc>,
        _policy: &LifecyclePolicy,
    ) -> TransitionResult<ProjectPatch> {
        let mut patch = ProjectPatch::touch(now);
        patch.status = Some(target);

        let was_completed =
            self.status == ProjectStatus::Completed || self.actual_completion_date.is_some();

        if target == ProjectStatus::Completed {
            // Re-completing keeps the original completion date.
            if self.status != ProjectStatus::Completed || self.actual_completion_date.is_none() {
                patch.actual_completion_date = FieldUpdate::Set(now);
            }
        } else if was_completed {
            patch.actual_completion_date = FieldUpdate::Clear;
        }

        TransitionResult::Patch(patch)
    }
}
