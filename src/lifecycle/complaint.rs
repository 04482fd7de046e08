//! Complaint transition rules.
//!
//! | target       | needs                              | derived                               |
//! |--------------|------------------------------------|---------------------------------------|
//! | submitted    | -                                  | clear schedule                        |
//! | under_review | -                                  | clear schedule                        |
//! | scheduled    | existing schedule or schedule date | schedule = payload date, else now     |
//! | in_progress  | -                                  | clear schedule only if policy says so |
//! | resolved     | existing details or details        | resolved_at = now, details = payload  |
//! | dismissed    | -                                  | clear schedule                        |
//!
//! Leaving `resolved` for any target clears `resolved_at` and
//! `resolution_details`. Entering `resolved` clears the schedule.

use chrono::{DateTime, Utc};

use super::{ComplaintPayload, InputKind, Lifecycle, LifecyclePolicy, TransitionResult};
use crate::model::{Complaint, ComplaintPatch, ComplaintStatus, FieldUpdate};

impl Lifecycle for Complaint {
    type Status = ComplaintStatus;
    type Payload = ComplaintPayload;

    fn status(&self) -> ComplaintStatus {
        self.status
    }

    fn plan(
        &self,
        target: ComplaintStatus,
        payload: Option<ComplaintPayload>,
        now: DateTime<Utc>,
        policy: &LifecyclePolicy,
    ) -> TransitionResult<ComplaintPatch> {
        if let Some(Err(rejection)) = payload.as_ref().map(|p| p.validate(target)) {
            return TransitionResult::Rejected(rejection);
        }

        let mut patch = ComplaintPatch::new(target, now);

        match (target, payload) {
            (ComplaintStatus::Scheduled, Some(ComplaintPayload::Schedule { scheduled_date })) => {
                patch.scheduled_at = FieldUpdate::Set(scheduled_date);
            }
            (ComplaintStatus::Scheduled, _) => {
                if self.scheduled_at.is_none() {
                    return TransitionResult::NeedsInput(InputKind::ScheduledDate);
                }
                patch.scheduled_at = FieldUpdate::Set(now);
            }
            (ComplaintStatus::Resolved, Some(ComplaintPayload::Resolve(details))) => {
                patch.resolved_at = FieldUpdate::Set(now);
                patch.resolution_details = FieldUpdate::Set(details);
                patch.scheduled_at = FieldUpdate::Clear;
            }
            (ComplaintStatus::Resolved, _) => {
                if self.resolution_details.is_none() {
                    return TransitionResult::NeedsInput(InputKind::ResolutionDetails);
                }
                patch.resolved_at = FieldUpdate::Set(now);
                patch.scheduled_at = FieldUpdate::Clear;
            }
            (ComplaintStatus::InProgress, _) => {
                if policy.clear_schedule_on_progress {
                    patch.scheduled_at = FieldUpdate::Clear;
                }
            }
            (
                ComplaintStatus::Submitted | ComplaintStatus::UnderReview | ComplaintStatus::Dismissed,
                _,
            ) => {
                patch.scheduled_at = FieldUpdate::Clear;
            }
        }

        if target != ComplaintStatus::Resolved && self.carries_resolution() {
            patch.resolved_at = FieldUpdate::Clear;
            patch.resolution_details = FieldUpdate::Clear;
        }

        TransitionResult::Patch(patch)
    }
}

impl Complaint {
    /// Resolved now, or still holding resolution fields from legacy data.
    fn carries_resolution(&self) -> bool {
        self.status == ComplaintStatus::Resolved
            || self.resolved_at.is_some()
            || self.resolution_details.is_some()
    }
}
