//! Complaint records filed by residents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ComplaintId, FieldUpdate, ResolutionDetails, UnknownStatus};

/// A resident's complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    #[serde(default)]
    pub id: ComplaintId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Free-form category (e.g., "road", "drainage", "noise").
    #[serde(default)]
    pub category: String,

    /// Street address or landmark as reported.
    #[serde(default)]
    pub location: String,

    /// Name of the resident who filed it.
    #[serde(default)]
    pub reporter: String,

    #[serde(default)]
    pub status: ComplaintStatus,

    /// When work is scheduled. Present only while `scheduled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,

    /// Present only while `resolved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Present only while `resolved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_details: Option<ResolutionDetails>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Merge a lifecycle patch into this complaint.
    pub fn apply(&mut self, patch: ComplaintPatch) {
        self.status = patch.status;
        self.updated_at = patch.updated_at;
        patch.scheduled_at.apply_to(&mut self.scheduled_at);
        patch.resolved_at.apply_to(&mut self.resolved_at);
        patch.resolution_details.apply_to(&mut self.resolution_details);
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a complaint. Every status is reachable from every
/// other by direct admin action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Filed, not yet looked at.
    #[default]
    Submitted,
    UnderReview,
    /// Work has a date on the calendar.
    Scheduled,
    InProgress,
    /// Fixed; carries resolution details.
    Resolved,
    /// Closed without action.
    Dismissed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 6] = [
        ComplaintStatus::Submitted,
        ComplaintStatus::UnderReview,
        ComplaintStatus::Scheduled,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Dismissed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "submitted",
            ComplaintStatus::UnderReview => "under_review",
            ComplaintStatus::Scheduled => "scheduled",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Dismissed => "dismissed",
        }
    }
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComplaintStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus {
                entity: "complaint",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// Field updates produced by a complaint status transition.
///
/// Always carries the target status and the mutation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintPatch {
    pub status: ComplaintStatus,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub scheduled_at: FieldUpdate<DateTime<Utc>>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub resolved_at: FieldUpdate<DateTime<Utc>>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub resolution_details: FieldUpdate<ResolutionDetails>,
}

impl ComplaintPatch {
    pub(crate) fn new(status: ComplaintStatus, updated_at: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at,
            scheduled_at: FieldUpdate::Keep,
            resolved_at: FieldUpdate::Keep,
            resolution_details: FieldUpdate::Keep,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for filing a new complaint. New complaints start `submitted`.
pub struct NewComplaint {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) location: String,
    pub(crate) reporter: String,
}

impl NewComplaint {
    pub fn new(title: impl Into<String>, reporter: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: String::new(),
            location: String::new(),
            reporter: reporter.into(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Materialize the complaint at time `now`.
    pub fn build(self, now: DateTime<Utc>) -> Complaint {
        Complaint {
            id: ComplaintId::new(),
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            reporter: self.reporter,
            status: ComplaintStatus::default(),
            scheduled_at: None,
            resolved_at: None,
            resolution_details: None,
            created_at: now,
            updated_at: now,
        }
    }
}
