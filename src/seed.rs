//! Fixture records for the in-memory stores.
//!
//! A seed is a TOML file with `[[complaints]]` and `[[projects]]` tables.
//! Timestamps are quoted RFC 3339 strings; omitted IDs are generated.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Complaint, ComplaintStatus, Project, ProjectStatus};

#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub complaints: Vec<Complaint>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Seed {
    /// Read and validate a seed file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Seed(format!("cannot read {}: {e}", path.display())))?;
        let seed = Self::from_toml_str(&content)
            .map_err(|e| Error::Seed(format!("{}: {e}", path.display())))?;

        debug!(
            path = %path.display(),
            complaints = seed.complaints.len(),
            projects = seed.projects.len(),
            "seed loaded"
        );

        Ok(seed)
    }

    /// Parse and validate seed TOML.
    ///
    /// Hard errors: malformed TOML, progress above 100. Records whose derived
    /// fields disagree with their status are accepted with a warning; the
    /// next transition through the lifecycle engine repairs them.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let seed: Seed = toml::from_str(content).map_err(|e| Error::Seed(e.to_string()))?;

        for project in &seed.projects {
            if project.progress_percentage > 100 {
                return Err(Error::Seed(format!(
                    "project {} has progress_percentage {}",
                    project.id, project.progress_percentage
                )));
            }
        }

        for complaint in &seed.complaints {
            let scheduled = complaint.status == ComplaintStatus::Scheduled;
            let resolved = complaint.status == ComplaintStatus::Resolved;
            // in_progress may keep its schedule, depending on policy
            let schedule_mismatch = scheduled != complaint.scheduled_at.is_some()
                && complaint.status != ComplaintStatus::InProgress;
            if schedule_mismatch
                || resolved != complaint.resolved_at.is_some()
                || resolved != complaint.resolution_details.is_some()
            {
                warn!(
                    complaint = %complaint.id,
                    status = %complaint.status,
                    "seed complaint has derived fields inconsistent with its status"
                );
            }
        }

        for project in &seed.projects {
            let completed = project.status == ProjectStatus::Completed;
            if completed != project.actual_completion_date.is_some() {
                warn!(
                    project = %project.id,
                    status = %project.status,
                    "seed project has completion date inconsistent with its status"
                );
            }
        }

        Ok(seed)
    }
}
