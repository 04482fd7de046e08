//! Dashboard service. The public API for filing, listing and changing
//! complaints and projects.
//!
//! The dashboard owns the stores, the lifecycle engine and the event log.
//! Every status change is planned by the engine; the dashboard applies the
//! resulting patch, or leaves the record untouched when the engine asks for
//! input or refuses.

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::event::{EventKind, EventLog};
use crate::lifecycle::{
    Clock, ComplaintPayload, FormInput, InputKind, Lifecycle, LifecycleEngine, LifecyclePolicy,
    ProgressDeletion, ProgressInput, Rejection, SystemClock, TransitionResult,
};
use crate::model::*;
use crate::seed::Seed;
use crate::store::{EntityStore, InMemoryStore, Record};
use crate::telemetry::lifecycle::{record_outcome, start_progress_span, start_transition_span};
use crate::telemetry::metrics;

/// The dashboard. Routes all mutations through the lifecycle engine.
pub struct Dashboard<CS = InMemoryStore<Complaint>, PS = InMemoryStore<Project>, C = SystemClock> {
    complaints: CS,
    projects: PS,
    engine: LifecycleEngine<C>,
    events: EventLog,
}

/// What happened when a change was requested.
#[derive(Debug)]
pub enum TransitionOutcome<E> {
    /// The patch was applied. Holds the updated record.
    Applied(E),
    /// Nothing changed; prompt for this input and retry.
    NeedsInput(InputKind),
    /// Nothing changed.
    Rejected(Rejection),
}

impl<E> TransitionOutcome<E> {
    pub fn applied(self) -> Option<E> {
        match self {
            TransitionOutcome::Applied(entity) => Some(entity),
            _ => None,
        }
    }
}

impl Dashboard {
    /// Empty dashboard on the wall clock.
    pub fn in_memory(policy: LifecyclePolicy) -> Self {
        Self::new(
            InMemoryStore::new(),
            InMemoryStore::new(),
            LifecycleEngine::new(policy),
        )
    }

    /// Dashboard whose stores start with the seed's records.
    pub fn from_seed(seed: Seed, policy: LifecyclePolicy) -> Result<Self> {
        Ok(Self::new(
            InMemoryStore::from_records(seed.complaints)?,
            InMemoryStore::from_records(seed.projects)?,
            LifecycleEngine::new(policy),
        ))
    }
}

impl<CS, PS, C> Dashboard<CS, PS, C>
where
    CS: EntityStore<Complaint>,
    PS: EntityStore<Project>,
    C: Clock,
{
    pub fn new(complaints: CS, projects: PS, engine: LifecycleEngine<C>) -> Self {
        Self {
            complaints,
            projects,
            engine,
            events: EventLog::new(),
        }
    }

    pub fn engine(&self) -> &LifecycleEngine<C> {
        &self.engine
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Complaints
    // -----------------------------------------------------------------------

    /// File a new complaint. It starts `submitted`.
    pub fn file_complaint(&mut self, new: NewComplaint) -> Result<Complaint> {
        let now = self.engine.now();
        let complaint = new.build(now);
        self.complaints.insert(complaint.clone())?;

        info!(complaint = %complaint.id, title = %complaint.title, "complaint filed");
        self.events.record(
            now,
            EventKind::EntityCreated {
                entity: Complaint::KIND,
                id: complaint.uuid(),
                status: complaint.status.to_string(),
            },
        );

        Ok(complaint)
    }

    pub fn complaint(&self, id: ComplaintId) -> Result<Complaint> {
        self.complaints.get(id)
    }

    /// Look up a complaint by full UUID or unique prefix.
    pub fn find_complaint(&self, prefix: &str) -> Result<Complaint> {
        self.complaints.find_by_prefix(prefix)
    }

    /// Complaints in filing order, optionally filtered by status.
    pub fn complaints(&self, status: Option<ComplaintStatus>) -> Vec<Complaint> {
        self.complaints
            .list()
            .into_iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .collect()
    }

    /// Move a complaint to `target`.
    pub fn change_complaint_status(
        &mut self,
        id: ComplaintId,
        target: ComplaintStatus,
        payload: Option<ComplaintPayload>,
    ) -> Result<TransitionOutcome<Complaint>> {
        let complaint = self.complaints.get(id)?;
        let engine = &self.engine;
        run_transition(
            &mut self.complaints,
            &mut self.events,
            engine.now(),
            &complaint,
            target.as_str(),
            |c| engine.plan_transition(c, target, payload),
        )
    }

    /// Move a complaint using raw form values: a status name and whatever
    /// fields the form collected.
    pub fn submit_complaint_form(
        &mut self,
        id: ComplaintId,
        target: &str,
        form: FormInput,
    ) -> Result<TransitionOutcome<Complaint>> {
        let complaint = self.complaints.get(id)?;
        let engine = &self.engine;
        run_transition(
            &mut self.complaints,
            &mut self.events,
            engine.now(),
            &complaint,
            target,
            |c| match target.parse::<ComplaintStatus>() {
                Err(err) => TransitionResult::Rejected(err.into()),
                Ok(status) => match form.into_payload(status) {
                    Ok(payload) => engine.plan_transition(c, status, payload),
                    Err(rejection) => TransitionResult::Rejected(rejection),
                },
            },
        )
    }

    /// Physically delete a complaint.
    pub fn delete_complaint(&mut self, id: ComplaintId) -> Result<Complaint> {
        let removed = self.complaints.remove(id)?;
        info!(complaint = %id, "complaint deleted");
        self.events.record(
            self.engine.now(),
            EventKind::EntityDeleted {
                entity: Complaint::KIND,
                id: removed.uuid(),
            },
        );
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Register a new project. It starts `planned`.
    pub fn register_project(&mut self, new: NewProject) -> Result<Project> {
        let now = self.engine.now();
        let project = new.build(now);
        self.projects.insert(project.clone())?;

        info!(project = %project.id, title = %project.title, "project registered");
        self.events.record(
            now,
            EventKind::EntityCreated {
                entity: Project::KIND,
                id: project.uuid(),
                status: project.status.to_string(),
            },
        );

        Ok(project)
    }

    pub fn project(&self, id: ProjectId) -> Result<Project> {
        self.projects.get(id)
    }

    /// Look up a project by full UUID or unique prefix.
    pub fn find_project(&self, prefix: &str) -> Result<Project> {
        self.projects.find_by_prefix(prefix)
    }

    /// Projects in registration order, optionally filtered by status.
    pub fn projects(&self, status: Option<ProjectStatus>) -> Vec<Project> {
        self.projects
            .list()
            .into_iter()
            .filter(|p| status.is_none_or(|s| p.status == s))
            .collect()
    }

    pub fn change_project_status(
        &mut self,
        id: ProjectId,
        target: ProjectStatus,
    ) -> Result<TransitionOutcome<Project>> {
        let project = self.projects.get(id)?;
        let engine = &self.engine;
        run_transition(
            &mut self.projects,
            &mut self.events,
            engine.now(),
            &project,
            target.as_str(),
            |p| engine.plan_transition(p, target, None),
        )
    }

    /// Move a project to a status given by name.
    pub fn change_project_status_str(
        &mut self,
        id: ProjectId,
        target: &str,
    ) -> Result<TransitionOutcome<Project>> {
        let project = self.projects.get(id)?;
        let engine = &self.engine;
        run_transition(
            &mut self.projects,
            &mut self.events,
            engine.now(),
            &project,
            target,
            |p| engine.plan_transition_str(p, target, None),
        )
    }

    /// Append a progress entry. Status is untouched.
    pub fn append_progress(&mut self, id: ProjectId, input: ProgressInput) -> Result<Project> {
        let project = self.projects.get(id)?;
        let span = start_progress_span("append", &project.uuid());
        let _enter = span.enter();

        let patch = self.engine.append_progress_update(&project, input);
        let updated = self.projects.update(id, patch)?;
        let count = updated.progress_updates.len();

        metrics::progress_operations().add(
            1,
            &[KeyValue::new("operation", "append"), KeyValue::new("result", "ok")],
        );
        info!(count, "progress update appended");
        self.events.record(
            updated.updated_at,
            EventKind::ProgressAppended {
                id: updated.uuid(),
                count,
            },
        );

        Ok(updated)
    }

    /// Remove every marked progress entry at once, or none.
    pub fn remove_progress(
        &mut self,
        id: ProjectId,
        deletion: &ProgressDeletion,
    ) -> Result<TransitionOutcome<Project>> {
        let project = self.projects.get(id)?;
        let span = start_progress_span("remove", &project.uuid());
        let _enter = span.enter();

        let result = self.engine.remove_progress_updates(&project, deletion);
        self.apply_progress("remove", id, result, |_| EventKind::ProgressRemoved {
            id: project.uuid(),
            indices: deletion.indices().collect(),
        })
    }

    /// Set the progress percentage. Status is untouched.
    pub fn set_progress_percentage(
        &mut self,
        id: ProjectId,
        percentage: u8,
    ) -> Result<TransitionOutcome<Project>> {
        let project = self.projects.get(id)?;
        let span = start_progress_span("percentage", &project.uuid());
        let _enter = span.enter();

        let result = self.engine.set_progress_percentage(percentage);
        self.apply_progress("percentage", id, result, |updated| {
            EventKind::ProgressPercentageSet {
                id: updated.uuid(),
                percentage: updated.progress_percentage,
            }
        })
    }

    /// Physically delete a project.
    pub fn delete_project(&mut self, id: ProjectId) -> Result<Project> {
        let removed = self.projects.remove(id)?;
        info!(project = %id, "project deleted");
        self.events.record(
            self.engine.now(),
            EventKind::EntityDeleted {
                entity: Project::KIND,
                id: removed.uuid(),
            },
        );
        Ok(removed)
    }

    fn apply_progress(
        &mut self,
        operation: &'static str,
        id: ProjectId,
        result: std::result::Result<ProjectPatch, Rejection>,
        event: impl FnOnce(&Project) -> EventKind,
    ) -> Result<TransitionOutcome<Project>> {
        match result {
            Ok(patch) => {
                let updated = self.projects.update(id, patch)?;
                metrics::progress_operations().add(
                    1,
                    &[KeyValue::new("operation", operation), KeyValue::new("result", "ok")],
                );
                info!(operation, "project progress updated");
                self.events.record(updated.updated_at, event(&updated));
                Ok(TransitionOutcome::Applied(updated))
            }
            Err(rejection) => {
                metrics::progress_operations().add(
                    1,
                    &[
                        KeyValue::new("operation", operation),
                        KeyValue::new("result", rejection.code()),
                    ],
                );
                info!(operation, %rejection, "project progress change rejected");
                Ok(TransitionOutcome::Rejected(rejection))
            }
        }
    }
}

/// Plan a transition, then apply, defer or refuse it, logging and recording
/// the outcome either way.
fn run_transition<E, S>(
    store: &mut S,
    events: &mut EventLog,
    now: DateTime<Utc>,
    entity: &E,
    target: &str,
    plan: impl FnOnce(&E) -> TransitionResult<E::Patch>,
) -> Result<TransitionOutcome<E>>
where
    E: Lifecycle,
    S: EntityStore<E>,
{
    let kind = E::KIND;
    let id = entity.uuid();
    let from = entity.status().to_string();

    let span = start_transition_span(kind.as_str(), &id, target);
    let _enter = span.enter();

    match plan(entity) {
        TransitionResult::Patch(patch) => {
            let updated = store.update(entity.id(), patch)?;
            let to = updated.status().to_string();

            record_outcome(&span, &from, "applied");
            metrics::transitions_applied().add(
                1,
                &[
                    KeyValue::new("entity", kind.as_str()),
                    KeyValue::new("from", from.clone()),
                    KeyValue::new("to", to.clone()),
                ],
            );
            info!(%from, %to, "status changed");
            events.record(
                now,
                EventKind::StatusChanged {
                    entity: kind,
                    id,
                    from,
                    to,
                },
            );

            Ok(TransitionOutcome::Applied(updated))
        }
        TransitionResult::NeedsInput(needs) => {
            record_outcome(&span, &from, "needs_input");
            metrics::transitions_deferred().add(
                1,
                &[
                    KeyValue::new("entity", kind.as_str()),
                    KeyValue::new("needs", needs.to_string()),
                ],
            );
            debug!(%needs, "transition needs input");
            events.record(
                now,
                EventKind::TransitionDeferred {
                    entity: kind,
                    id,
                    target: target.to_string(),
                    needs,
                },
            );

            Ok(TransitionOutcome::NeedsInput(needs))
        }
        TransitionResult::Rejected(rejection) => {
            record_outcome(&span, &from, "rejected");
            metrics::transitions_rejected().add(
                1,
                &[
                    KeyValue::new("entity", kind.as_str()),
                    KeyValue::new("reason", rejection.code()),
                ],
            );
            match rejection {
                // Callers should only offer statuses from the set.
                Rejection::InvalidTarget(_) => error!(%rejection, "transition to unknown status"),
                Rejection::InvalidPayload(_) => info!(%rejection, "transition input rejected"),
            }
            events.record(
                now,
                EventKind::TransitionRejected {
                    entity: kind,
                    id,
                    target: target.to_string(),
                    rejection: rejection.clone(),
                },
            );

            Ok(TransitionOutcome::Rejected(rejection))
        }
    }
}
