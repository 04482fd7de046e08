//! Status lifecycle engine.
//!
//! Given an entity snapshot, a requested target status, and an optional
//! payload, the engine produces one of three outcomes: a patch that keeps
//! every derived field consistent with the new status, a request for more
//! input, or a rejection. It never touches a store; callers apply the patch.
//!
//! All status changes must route through here. The clear/set rules for
//! `scheduled_at`, `resolved_at`, `resolution_details` and
//! `actual_completion_date` live in exactly one place.

pub mod complaint;
pub mod payload;
pub mod progress;
pub mod project;

pub use payload::{ComplaintPayload, FormInput, parse_date};
pub use progress::{ProgressDeletion, ProgressInput};

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Project, ProjectPatch, UnknownStatus};
use crate::store::Record;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Which piece of user input a transition is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    ScheduledDate,
    ResolutionDetails,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InputKind::ScheduledDate => "scheduled_date",
            InputKind::ResolutionDetails => "resolution_details",
        };
        write!(f, "{s}")
    }
}

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum Rejection {
    /// The target is not in the entity's status set. A caller bug.
    InvalidTarget(String),
    /// User-supplied input failed validation. Surface as a form error.
    InvalidPayload(String),
}

impl Rejection {
    /// Stable reason code: `invalid_target` or `invalid_payload`.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InvalidTarget(_) => "invalid_target",
            Rejection::InvalidPayload(_) => "invalid_payload",
        }
    }

    pub(crate) fn payload(detail: impl Into<String>) -> Self {
        Rejection::InvalidPayload(detail.into())
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::InvalidTarget(detail) | Rejection::InvalidPayload(detail) => {
                write!(f, "{}: {detail}", self.code())
            }
        }
    }
}

impl From<UnknownStatus> for Rejection {
    fn from(err: UnknownStatus) -> Self {
        Rejection::InvalidTarget(err.to_string())
    }
}

/// Outcome of planning a transition.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum TransitionResult<P> {
    /// The target needs user input first. Prompt for it and call again.
    NeedsInput(InputKind),
    /// The transition is valid. Merge the patch into the entity.
    Patch(P),
    /// The transition is refused. The entity must stay as it is.
    Rejected(Rejection),
}

impl<P> TransitionResult<P> {
    pub fn is_patch(&self) -> bool {
        matches!(self, TransitionResult::Patch(_))
    }

    /// The patch, if the transition was accepted.
    pub fn into_patch(self) -> Option<P> {
        match self {
            TransitionResult::Patch(patch) => Some(patch),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for derived timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant. Used in tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Product decisions the rules leave open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Clear `scheduled_at` when a complaint moves to `in_progress`.
    ///
    /// Off by default: the scheduled date is kept as history of when the
    /// work was booked. Turning it on makes `scheduled_at` present iff the
    /// complaint is `scheduled`, with no exception.
    pub clear_schedule_on_progress: bool,
}

// ---------------------------------------------------------------------------
// Lifecycle trait
// ---------------------------------------------------------------------------

/// An entity with a closed status set and status-derived fields.
pub trait Lifecycle: Record {
    type Status: FromStr<Err = UnknownStatus> + Copy + PartialEq + std::fmt::Display;
    /// Extra input some targets require.
    type Payload;

    fn status(&self) -> Self::Status;

    /// Pure transition planning. `now` stamps every derived timestamp.
    fn plan(
        &self,
        target: Self::Status,
        payload: Option<Self::Payload>,
        now: DateTime<Utc>,
        policy: &LifecyclePolicy,
    ) -> TransitionResult<Self::Patch>;
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The status lifecycle engine. Stateless apart from its clock and policy.
#[derive(Debug, Clone, Default)]
pub struct LifecycleEngine<C = SystemClock> {
    clock: C,
    policy: LifecyclePolicy,
}

impl LifecycleEngine<SystemClock> {
    pub fn new(policy: LifecyclePolicy) -> Self {
        Self {
            clock: SystemClock,
            policy,
        }
    }
}

impl<C: Clock> LifecycleEngine<C> {
    pub fn with_clock(clock: C, policy: LifecyclePolicy) -> Self {
        Self { clock, policy }
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Plan a transition of `entity` to `target`.
    pub fn plan_transition<E: Lifecycle>(
        &self,
        entity: &E,
        target: E::Status,
        payload: Option<E::Payload>,
    ) -> TransitionResult<E::Patch> {
        entity.plan(target, payload, self.clock.now(), &self.policy)
    }

    /// Plan a transition from an untyped status name.
    ///
    /// Unknown names are rejected with `invalid_target`.
    pub fn plan_transition_str<E: Lifecycle>(
        &self,
        entity: &E,
        target: &str,
        payload: Option<E::Payload>,
    ) -> TransitionResult<E::Patch> {
        match target.parse::<E::Status>() {
            Ok(target) => self.plan_transition(entity, target, payload),
            Err(err) => TransitionResult::Rejected(err.into()),
        }
    }

    /// Append a timestamped progress entry. Never changes status.
    pub fn append_progress_update(&self, project: &Project, input: ProgressInput) -> ProjectPatch {
        progress::append(project, input, self.clock.now())
    }

    /// Remove every marked progress entry in one patch, or none at all.
    pub fn remove_progress_updates(
        &self,
        project: &Project,
        deletion: &ProgressDeletion,
    ) -> Result<ProjectPatch, Rejection> {
        progress::remove(project, deletion, self.clock.now())
    }

    /// Set the independent progress percentage.
    pub fn set_progress_percentage(&self, percentage: u8) -> Result<ProjectPatch, Rejection> {
        progress::set_percentage(percentage, self.clock.now())
    }
}
