//! Tests for the status lifecycle engine: transition rules, derived-field
//! invariants, and progress operations.

use barangay::lifecycle::*;
use barangay::model::*;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
}

fn engine() -> LifecycleEngine<FixedClock> {
    LifecycleEngine::with_clock(FixedClock(now()), LifecyclePolicy::default())
}

fn strict_engine() -> LifecycleEngine<FixedClock> {
    LifecycleEngine::with_clock(
        FixedClock(now()),
        LifecyclePolicy {
            clear_schedule_on_progress: true,
        },
    )
}

fn earlier() -> DateTime<Utc> {
    now() - Duration::days(3)
}

fn complaint(status: ComplaintStatus) -> Complaint {
    let mut c = NewComplaint::new("Baradong kanal", "Maria Santos")
        .category("drainage")
        .build(earlier());
    c.status = status;
    match status {
        ComplaintStatus::Scheduled => c.scheduled_at = Some(earlier() + Duration::days(7)),
        ComplaintStatus::Resolved => {
            c.resolved_at = Some(earlier());
            c.resolution_details = Some(ResolutionDetails::new("fixed"));
        }
        _ => {}
    }
    c
}

fn project(status: ProjectStatus) -> Project {
    let mut p = NewProject::new("Covered court roofing")
        .budget(850_000.0)
        .build(earlier());
    p.status = status;
    if status == ProjectStatus::Completed {
        p.actual_completion_date = Some(earlier());
        p.progress_percentage = 100;
    }
    p
}

fn schedule(date: DateTime<Utc>) -> ComplaintPayload {
    ComplaintPayload::Schedule {
        scheduled_date: date,
    }
}

fn resolve(description: &str) -> ComplaintPayload {
    ComplaintPayload::Resolve(ResolutionDetails::new(description))
}

/// Payload that satisfies `target`, if it needs one.
fn payload_for(target: ComplaintStatus) -> Option<ComplaintPayload> {
    match target {
        ComplaintStatus::Scheduled => Some(schedule(now() + Duration::days(2))),
        ComplaintStatus::Resolved => Some(resolve("patched")),
        _ => None,
    }
}

fn expect_patch<P: std::fmt::Debug>(result: TransitionResult<P>) -> P {
    match result {
        TransitionResult::Patch(patch) => patch,
        other => panic!("expected Patch, got {other:?}"),
    }
}

fn assert_complaint_invariants(c: &Complaint, strict_schedule: bool) {
    let scheduled = c.status == ComplaintStatus::Scheduled;
    if strict_schedule || c.status != ComplaintStatus::InProgress {
        assert_eq!(
            c.scheduled_at.is_some(),
            scheduled,
            "scheduled_at vs status {}",
            c.status
        );
    }
    let resolved = c.status == ComplaintStatus::Resolved;
    assert_eq!(c.resolved_at.is_some(), resolved, "resolved_at vs {}", c.status);
    assert_eq!(
        c.resolution_details.is_some(),
        resolved,
        "resolution_details vs {}",
        c.status
    );
}

// ---------------------------------------------------------------------------
// Complaint transitions
// ---------------------------------------------------------------------------

#[test]
fn no_op_transition_only_touches_updated_at() {
    let engine = engine();
    for status in [
        ComplaintStatus::Submitted,
        ComplaintStatus::UnderReview,
        ComplaintStatus::InProgress,
        ComplaintStatus::Dismissed,
    ] {
        let before = complaint(status);
        let mut after = before.clone();
        after.apply(expect_patch(engine.plan_transition(&before, status, None)));

        assert_eq!(after.updated_at, now());
        after.updated_at = before.updated_at;
        assert_eq!(after, before, "status {status}");
    }
}

#[test]
fn every_transition_keeps_derived_fields_consistent() {
    let strict = strict_engine();
    for from in ComplaintStatus::ALL {
        for to in ComplaintStatus::ALL {
            let mut c = complaint(from);
            c.apply(expect_patch(strict.plan_transition(&c, to, payload_for(to))));
            assert_eq!(c.status, to);
            assert_complaint_invariants(&c, true);
        }
    }
}

#[test]
fn default_policy_keeps_schedule_when_work_starts() {
    let c = complaint(ComplaintStatus::Scheduled);
    let scheduled_at = c.scheduled_at;

    let patch = expect_patch(engine().plan_transition(&c, ComplaintStatus::InProgress, None));
    assert_eq!(patch.scheduled_at, FieldUpdate::Keep);

    let mut c = c;
    c.apply(patch);
    assert_eq!(c.status, ComplaintStatus::InProgress);
    assert_eq!(c.scheduled_at, scheduled_at);
    assert_complaint_invariants(&c, false);
}

#[test]
fn strict_policy_clears_schedule_when_work_starts() {
    let c = complaint(ComplaintStatus::Scheduled);
    let patch = expect_patch(strict_engine().plan_transition(&c, ComplaintStatus::InProgress, None));
    assert_eq!(patch.scheduled_at, FieldUpdate::Clear);
}

#[test]
fn resolving_without_details_needs_input() {
    let c = complaint(ComplaintStatus::InProgress);
    let before = c.clone();

    let result = engine().plan_transition(&c, ComplaintStatus::Resolved, None);
    assert_eq!(
        result,
        TransitionResult::NeedsInput(InputKind::ResolutionDetails)
    );
    assert_eq!(c, before);
}

#[test]
fn scheduling_without_date_needs_input() {
    let c = complaint(ComplaintStatus::UnderReview);
    let result = engine().plan_transition(&c, ComplaintStatus::Scheduled, None);
    assert_eq!(result, TransitionResult::NeedsInput(InputKind::ScheduledDate));
}

#[test]
fn leaving_resolved_clears_resolution_fields() {
    let c = complaint(ComplaintStatus::Resolved);
    let patch = expect_patch(engine().plan_transition(&c, ComplaintStatus::UnderReview, None));

    assert_eq!(patch.status, ComplaintStatus::UnderReview);
    assert_eq!(patch.resolution_details, FieldUpdate::Clear);
    assert_eq!(patch.resolved_at, FieldUpdate::Clear);
    assert_eq!(patch.updated_at, now());

    let json = serde_json::to_value(&patch).unwrap();
    assert!(json["resolution_details"].is_null());
    assert!(json["resolved_at"].is_null());
    assert_eq!(json["status"], "under_review");
}

#[test]
fn scheduling_takes_date_from_payload() {
    let c = complaint(ComplaintStatus::Submitted);
    let date = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

    let patch = expect_patch(engine().plan_transition(
        &c,
        ComplaintStatus::Scheduled,
        Some(schedule(date)),
    ));

    assert_eq!(patch.status, ComplaintStatus::Scheduled);
    assert_eq!(patch.scheduled_at, FieldUpdate::Set(date));
    assert_eq!(patch.updated_at, now());
    assert_eq!(patch.resolved_at, FieldUpdate::Keep);
    assert_eq!(patch.resolution_details, FieldUpdate::Keep);
}

#[test]
fn rescheduling_without_payload_stamps_now() {
    let c = complaint(ComplaintStatus::Scheduled);
    let patch = expect_patch(engine().plan_transition(&c, ComplaintStatus::Scheduled, None));
    assert_eq!(patch.scheduled_at, FieldUpdate::Set(now()));
}

#[test]
fn resolving_sets_timestamp_and_details_and_drops_schedule() {
    let c = complaint(ComplaintStatus::Scheduled);
    let details = ResolutionDetails::new("Canal dredged")
        .budget(3200.0)
        .image(Image::new("https://example.invalid/after.jpg"));

    let patch = expect_patch(engine().plan_transition(
        &c,
        ComplaintStatus::Resolved,
        Some(ComplaintPayload::Resolve(details.clone())),
    ));

    assert_eq!(patch.resolved_at, FieldUpdate::Set(now()));
    assert_eq!(patch.resolution_details, FieldUpdate::Set(details));
    assert_eq!(patch.scheduled_at, FieldUpdate::Clear);
}

#[test]
fn re_resolving_keeps_existing_details() {
    let c = complaint(ComplaintStatus::Resolved);
    let patch = expect_patch(engine().plan_transition(&c, ComplaintStatus::Resolved, None));
    assert_eq!(patch.resolved_at, FieldUpdate::Set(now()));
    assert_eq!(patch.resolution_details, FieldUpdate::Keep);
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn unknown_target_is_rejected() {
    let c = complaint(ComplaintStatus::Submitted);
    let before = c.clone();

    let result = engine().plan_transition_str(&c, "not_a_real_status", None);
    match result {
        TransitionResult::Rejected(rejection) => {
            assert_eq!(rejection.code(), "invalid_target");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(c, before);

    let p = project(ProjectStatus::Planned);
    let result = engine().plan_transition_str(&p, "finished", None);
    assert!(matches!(
        result,
        TransitionResult::Rejected(Rejection::InvalidTarget(_))
    ));
}

#[test]
fn known_target_by_name_is_planned() {
    let c = complaint(ComplaintStatus::Submitted);
    let patch = expect_patch(engine().plan_transition_str(&c, "under_review", None));
    assert_eq!(patch.status, ComplaintStatus::UnderReview);
}

#[test]
fn empty_resolution_description_is_rejected() {
    let c = complaint(ComplaintStatus::InProgress);
    let result = engine().plan_transition(&c, ComplaintStatus::Resolved, Some(resolve("   ")));
    match result {
        TransitionResult::Rejected(Rejection::InvalidPayload(detail)) => {
            assert!(detail.contains("description"));
        }
        other => panic!("expected invalid payload, got {other:?}"),
    }
}

#[test]
fn negative_budget_is_rejected() {
    let c = complaint(ComplaintStatus::InProgress);
    let payload = ComplaintPayload::Resolve(ResolutionDetails::new("done").budget(-10.0));
    let result = engine().plan_transition(&c, ComplaintStatus::Resolved, Some(payload));
    assert!(matches!(
        result,
        TransitionResult::Rejected(Rejection::InvalidPayload(_))
    ));
}

#[test]
fn payload_for_another_target_is_rejected() {
    let c = complaint(ComplaintStatus::Submitted);
    let result = engine().plan_transition(&c, ComplaintStatus::Resolved, Some(schedule(now())));
    assert!(matches!(
        result,
        TransitionResult::Rejected(Rejection::InvalidPayload(_))
    ));

    // Validation runs before the needs-input check.
    let result = engine().plan_transition(&c, ComplaintStatus::Scheduled, Some(resolve("")));
    assert!(matches!(result, TransitionResult::Rejected(_)));
}

// ---------------------------------------------------------------------------
// Form boundary
// ---------------------------------------------------------------------------

#[test]
fn form_date_parses_to_midnight_utc() {
    let form = FormInput {
        scheduled_date: Some("2026-03-01".to_string()),
        ..Default::default()
    };
    let payload = form.into_payload(ComplaintStatus::Scheduled).unwrap();
    assert_eq!(
        payload,
        Some(schedule(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()))
    );
}

#[test]
fn form_accepts_rfc3339_with_offset() {
    let parsed = parse_date("2026-03-01T09:00:00+08:00").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 3, 1, 1, 0, 0).unwrap());
}

#[test]
fn unparsable_form_date_is_rejected() {
    let form = FormInput {
        scheduled_date: Some("next tuesday".to_string()),
        ..Default::default()
    };
    let err = form.into_payload(ComplaintStatus::Scheduled).unwrap_err();
    assert_eq!(err.code(), "invalid_payload");
}

#[test]
fn empty_form_yields_no_payload() {
    let payload = FormInput::default()
        .into_payload(ComplaintStatus::Resolved)
        .unwrap();
    assert!(payload.is_none());
}

#[test]
fn form_fields_for_wrong_target_are_rejected() {
    let form = FormInput {
        description: Some("fixed".to_string()),
        ..Default::default()
    };
    assert!(form.into_payload(ComplaintStatus::Dismissed).is_err());
}

#[test]
fn resolution_form_builds_details() {
    let form = FormInput {
        description: Some("Replaced bulb".to_string()),
        budget: Some(250.0),
        images: vec!["https://example.invalid/lamp.jpg".to_string()],
        ..Default::default()
    };
    match form.into_payload(ComplaintStatus::Resolved).unwrap() {
        Some(ComplaintPayload::Resolve(details)) => {
            assert_eq!(details.description, "Replaced bulb");
            assert_eq!(details.budget, Some(250.0));
            assert_eq!(details.images.len(), 1);
        }
        other => panic!("expected resolve payload, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Project transitions
// ---------------------------------------------------------------------------

#[test]
fn completing_stamps_actual_completion_date() {
    let p = project(ProjectStatus::Ongoing);
    let patch = expect_patch(engine().plan_transition(&p, ProjectStatus::Completed, None));
    assert_eq!(patch.status, Some(ProjectStatus::Completed));
    assert_eq!(patch.actual_completion_date, FieldUpdate::Set(now()));
}

#[test]
fn re_completing_keeps_original_date() {
    let p = project(ProjectStatus::Completed);
    let patch = expect_patch(engine().plan_transition(&p, ProjectStatus::Completed, None));
    assert_eq!(patch.actual_completion_date, FieldUpdate::Keep);
}

#[test]
fn cancelling_completed_project_clears_completion_date() {
    let p = project(ProjectStatus::Completed);
    let patch = expect_patch(engine().plan_transition(&p, ProjectStatus::Cancelled, None));
    assert_eq!(patch.status, Some(ProjectStatus::Cancelled));
    assert_eq!(patch.actual_completion_date, FieldUpdate::Clear);

    let json = serde_json::to_value(&patch).unwrap();
    assert!(json["actual_completion_date"].is_null());
}

#[test]
fn every_project_transition_keeps_completion_date_consistent() {
    let engine = engine();
    for from in ProjectStatus::ALL {
        for to in ProjectStatus::ALL {
            let mut p = project(from);
            p.apply(expect_patch(engine.plan_transition(&p, to, None)));
            assert_eq!(p.status, to);
            assert_eq!(
                p.actual_completion_date.is_some(),
                to == ProjectStatus::Completed,
                "{from} -> {to}"
            );
        }
    }
}

#[test]
fn project_status_does_not_touch_progress_percentage() {
    let mut p = project(ProjectStatus::Ongoing);
    p.progress_percentage = 40;
    p.apply(expect_patch(engine().plan_transition(&p, ProjectStatus::Completed, None)));
    assert_eq!(p.progress_percentage, 40);
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

fn project_with_updates(n: usize) -> Project {
    let mut p = project(ProjectStatus::Ongoing);
    for i in 0..n {
        p.progress_updates.push(ProgressUpdate {
            timestamp: earlier() + Duration::hours(i as i64),
            description: Some(format!("update {i}")),
            image: None,
        });
    }
    p
}

fn descriptions(p: &Project) -> Vec<String> {
    p.progress_updates
        .iter()
        .filter_map(|u| u.description.clone())
        .collect()
}

#[test]
fn appending_progress_adds_timestamped_entry() {
    let mut p = project_with_updates(1);
    let patch = engine().append_progress_update(
        &p,
        ProgressInput::description("Trusses delivered")
            .image(Image::new("https://example.invalid/trusses.jpg")),
    );
    assert_eq!(patch.status, None);

    p.apply(patch);
    assert_eq!(p.status, ProjectStatus::Ongoing);
    assert_eq!(p.progress_updates.len(), 2);
    let last = &p.progress_updates[1];
    assert_eq!(last.timestamp, now());
    assert_eq!(last.description.as_deref(), Some("Trusses delivered"));
    assert!(last.image.is_some());
}

#[test]
fn batch_deletion_removes_marked_entries_in_order() {
    let mut p = project_with_updates(5);

    let mut deletion = ProgressDeletion::new();
    deletion.mark(0);
    deletion.mark(2);
    deletion.mark(4);
    deletion.unmark(4);
    assert_eq!(deletion.len(), 2);

    p.apply(engine().remove_progress_updates(&p, &deletion).unwrap());
    assert_eq!(descriptions(&p), vec!["update 1", "update 3", "update 4"]);
}

#[test]
fn batch_deletion_with_bad_index_removes_nothing() {
    let p = project_with_updates(3);
    let deletion: ProgressDeletion = [0, 7].into_iter().collect();

    let err = engine().remove_progress_updates(&p, &deletion).unwrap_err();
    assert_eq!(err.code(), "invalid_payload");
    assert_eq!(p.progress_updates.len(), 3);
}

#[test]
fn progress_percentage_is_bounded() {
    let engine = engine();
    let patch = engine.set_progress_percentage(75).unwrap();
    assert_eq!(patch.progress_percentage, Some(75));
    assert_eq!(patch.status, None);

    assert!(engine.set_progress_percentage(101).is_err());
}
