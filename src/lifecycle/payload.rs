//! Transition payloads and the form boundary that produces them.
//!
//! One payload variant per payload-bearing target. Raw form fields are
//! converted and validated here before they reach the rules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::Rejection;
use crate::model::{ComplaintStatus, Image, ResolutionDetails};

/// Extra input for a complaint transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ComplaintPayload {
    /// For `scheduled`.
    Schedule { scheduled_date: DateTime<Utc> },
    /// For `resolved`.
    Resolve(ResolutionDetails),
}

impl ComplaintPayload {
    /// The only target this payload applies to.
    pub fn target(&self) -> ComplaintStatus {
        match self {
            ComplaintPayload::Schedule { .. } => ComplaintStatus::Scheduled,
            ComplaintPayload::Resolve(_) => ComplaintStatus::Resolved,
        }
    }

    pub(crate) fn validate(&self, target: ComplaintStatus) -> Result<(), Rejection> {
        if self.target() != target {
            return Err(Rejection::payload(format!(
                "{} payload does not apply to target {target}",
                self.target()
            )));
        }

        if let ComplaintPayload::Resolve(details) = self {
            if details.description.trim().is_empty() {
                return Err(Rejection::payload("resolution description is empty"));
            }
            if let Some(budget) = details.budget.filter(|b| !b.is_finite() || *b < 0.0) {
                return Err(Rejection::payload(format!(
                    "resolution budget must be a non-negative amount, got {budget}"
                )));
            }
            if details.images.iter().any(|image| image.url.trim().is_empty()) {
                return Err(Rejection::payload("resolution image has an empty url"));
            }
        }

        Ok(())
    }
}

/// Raw fields collected by a status-change form.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub scheduled_date: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub images: Vec<String>,
}

impl FormInput {
    pub fn is_empty(&self) -> bool {
        self.scheduled_date.is_none()
            && self.description.is_none()
            && self.budget.is_none()
            && self.images.is_empty()
    }

    /// Convert the form into the payload for `target`.
    ///
    /// Returns `Ok(None)` when the form is empty; the engine then decides
    /// whether input is needed. Fields that do not belong to `target` are
    /// rejected rather than dropped.
    pub fn into_payload(
        self,
        target: ComplaintStatus,
    ) -> Result<Option<ComplaintPayload>, Rejection> {
        if self.is_empty() {
            return Ok(None);
        }

        match target {
            ComplaintStatus::Scheduled => {
                if self.description.is_some() || self.budget.is_some() || !self.images.is_empty() {
                    return Err(Rejection::payload("scheduled takes only a scheduled date"));
                }
                let Some(raw) = self.scheduled_date else {
                    return Ok(None);
                };
                Ok(Some(ComplaintPayload::Schedule {
                    scheduled_date: parse_date(&raw)?,
                }))
            }
            ComplaintStatus::Resolved => {
                if self.scheduled_date.is_some() {
                    return Err(Rejection::payload("resolved does not take a scheduled date"));
                }
                Ok(Some(ComplaintPayload::Resolve(ResolutionDetails {
                    description: self.description.unwrap_or_default(),
                    budget: self.budget,
                    images: self.images.into_iter().map(Image::new).collect(),
                })))
            }
            other => Err(Rejection::payload(format!("{other} takes no input"))),
        }
    }
}

/// Parse a date as entered in a form.
///
/// Accepts RFC 3339 (`2026-03-01T09:00:00+08:00`), a naive date-time
/// (`2026-03-01T09:00`, `2026-03-01 09:00:00`, read as UTC), or a bare
/// date (`2026-03-01`, midnight UTC).
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, Rejection> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(Rejection::payload(format!("unparsable date: {raw:?}")))
}
