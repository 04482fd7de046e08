//! Project progress operations. None of these change status.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::Rejection;
use crate::model::{Image, ProgressUpdate, Project, ProjectPatch};

/// A progress entry as entered in the project form.
#[derive(Debug, Clone, Default)]
pub struct ProgressInput {
    pub description: Option<String>,
    pub image: Option<Image>,
}

impl ProgressInput {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            image: None,
        }
    }

    pub fn image(mut self, image: Image) -> Self {
        self.image = Some(image);
        self
    }
}

/// Progress entries marked for removal, applied together when the form
/// is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDeletion {
    marked: BTreeSet<usize>,
}

impl ProgressDeletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark entry `index`. Returns false if it was already marked.
    pub fn mark(&mut self, index: usize) -> bool {
        self.marked.insert(index)
    }

    /// Undo a mark. Returns false if it was not marked.
    pub fn unmark(&mut self, index: usize) -> bool {
        self.marked.remove(&index)
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    /// Marked indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.marked.iter().copied()
    }
}

impl FromIterator<usize> for ProgressDeletion {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            marked: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn append(project: &Project, input: ProgressInput, now: DateTime<Utc>) -> ProjectPatch {
    let mut updates = project.progress_updates.clone();
    updates.push(ProgressUpdate {
        timestamp: now,
        description: input.description.filter(|d| !d.trim().is_empty()),
        image: input.image,
    });

    let mut patch = ProjectPatch::touch(now);
    patch.progress_updates = Some(updates);
    patch
}

pub(crate) fn remove(
    project: &Project,
    deletion: &ProgressDeletion,
    now: DateTime<Utc>,
) -> Result<ProjectPatch, Rejection> {
    let count = project.progress_updates.len();
    if let Some(highest) = deletion.marked.last().copied().filter(|&i| i >= count) {
        return Err(Rejection::payload(format!(
            "progress update {highest} does not exist ({count} recorded)"
        )));
    }

    let kept = project
        .progress_updates
        .iter()
        .enumerate()
        .filter(|(index, _)| !deletion.is_marked(*index))
        .map(|(_, update)| update.clone())
        .collect();

    let mut patch = ProjectPatch::touch(now);
    patch.progress_updates = Some(kept);
    Ok(patch)
}

pub(crate) fn set_percentage(
    percentage: u8,
    now: DateTime<Utc>,
) -> Result<ProjectPatch, Rejection> {
    if percentage > 100 {
        return Err(Rejection::payload(format!(
            "progress percentage must be 0-100, got {percentage}"
        )));
    }

    let mut patch = ProjectPatch::touch(now);
    patch.progress_percentage = Some(percentage);
    Ok(patch)
}
