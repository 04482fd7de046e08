//! Public works projects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldUpdate, ProgressUpdate, ProjectId, UnknownStatus};

/// A public works project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: ProjectId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Free-form category (e.g., "infrastructure", "health").
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub location: String,

    /// Approved budget, in pesos.
    #[serde(default)]
    pub budget: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_completion_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: ProjectStatus,

    /// Present only while `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_completion_date: Option<DateTime<Utc>>,

    /// 0 to 100. Not coupled to `status`.
    #[serde(default)]
    pub progress_percentage: u8,

    #[serde(default)]
    pub progress_updates: Vec<ProgressUpdate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Merge a lifecycle or progress patch into this project.
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = patch.updated_at;
        patch
            .actual_completion_date
            .apply_to(&mut self.actual_completion_date);
        if let Some(pct) = patch.progress_percentage {
            self.progress_percentage = pct;
        }
        if let Some(updates) = patch.progress_updates {
            self.progress_updates = updates;
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Approved,
    Ongoing,
    OnHold,
    /// Done; carries the actual completion date.
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 6] = [
        ProjectStatus::Planned,
        ProjectStatus::Approved,
        ProjectStatus::Ongoing,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Ongoing => "ongoing",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus {
                entity: "project",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// Field updates for a project.
///
/// Status transitions set `status`; progress operations leave it `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub actual_completion_date: FieldUpdate<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_updates: Option<Vec<ProgressUpdate>>,
}

impl ProjectPatch {
    pub(crate) fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            updated_at,
            actual_completion_date: FieldUpdate::Keep,
            progress_percentage: None,
            progress_updates: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for registering a new project. New projects start `planned`.
pub struct NewProject {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) location: String,
    pub(crate) budget: f64,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) expected_completion_date: Option<NaiveDate>,
}

impl NewProject {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: String::new(),
            location: String::new(),
            budget: 0.0,
            start_date: None,
            expected_completion_date: None,
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

    pub fn budget(mut self, budget: f64) -> Self {
        self.budget = budget;
        self
    }

    pub fn schedule(mut self, start: NaiveDate, expected_completion: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.expected_completion_date = Some(expected_completion);
        self
    }

    /// Materialize the project at time `now`.
    pub fn build(self, now: DateTime<Utc>) -> Project {
        Project {
            id: ProjectId::new(),
            title: self.title,
            description: self.description,
            category: self.category,
            location: self.location,
            budget: self.budget,
            start_date: self.start_date,
            expected_completion_date: self.expected_completion_date,
            status: ProjectStatus::default(),
            actual_completion_date: None,
            progress_percentage: 0,
            progress_updates: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
