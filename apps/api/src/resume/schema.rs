//! Form schema: field-level validation of the structured resume form.
//!
//! Every field is optional; present values must be well formed. Failures are
//! keyed by the form path of the offending input (`contactInfo.email`,
//! `experience.0.endDate`) so they can be shown beneath that input.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::resume::sections::{Entry, EntryKind, ResumeSections};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/?#]+\.[^\s/?#]+([/?#]\S*)?$").expect("url pattern is valid")
});

/// Field path → message, in stable path order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        // First failure per field wins, the way one message is shown per input.
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(path, msg)| format!("{path}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Validates the form before a submission is accepted.
pub fn validate_sections(sections: &ResumeSections) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    let contact = &sections.contact_info;

    if let Some(email) = contact.email() {
        if !EMAIL_RE.is_match(email) {
            errors.insert("contactInfo.email", "Invalid email address");
        }
    }
    if let Some(linkedin) = contact.linkedin() {
        if !URL_RE.is_match(linkedin) {
            errors.insert("contactInfo.linkedin", "Invalid URL");
        }
    }
    if let Some(twitter) = contact.twitter() {
        if !URL_RE.is_match(twitter) {
            errors.insert("contactInfo.twitter", "Invalid URL");
        }
    }

    for kind in EntryKind::ALL {
        for (index, entry) in sections.entries(kind).iter().enumerate() {
            validate_entry(&format!("{}.{index}", kind.field()), entry, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_entry(prefix: &str, entry: &Entry, errors: &mut FieldErrors) {
    if entry.title.trim().is_empty() {
        errors.insert(format!("{prefix}.title"), "Title is required");
    }
    if entry.organization.trim().is_empty() {
        errors.insert(format!("{prefix}.organization"), "Organization is required");
    }
    if entry.start_date.trim().is_empty() {
        errors.insert(format!("{prefix}.startDate"), "Start date is required");
    }
    if !entry.current && entry.end_date.trim().is_empty() {
        errors.insert(
            format!("{prefix}.endDate"),
            "End date is required unless this is your current position",
        );
    }
}
