use serde::{Deserialize, Serialize};

/// Contact methods shown under the resume heading.
/// Every field is optional; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

impl ContactInfo {
    pub fn email(&self) -> Option<&str> {
        present(&self.email)
    }

    pub fn mobile(&self) -> Option<&str> {
        present(&self.mobile)
    }

    pub fn linkedin(&self) -> Option<&str> {
        present(&self.linkedin)
    }

    pub fn twitter(&self) -> Option<&str> {
        present(&self.twitter)
    }
}

/// One item of the experience, education or projects lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entry {
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

impl Entry {
    /// End marker as it appears on the resume. `None` when the entry is
    /// finished but no end date was recorded.
    pub fn end_marker(&self) -> Option<&str> {
        if self.current {
            Some("Present")
        } else {
            let end = self.end_date.trim();
            (!end.is_empty()).then_some(end)
        }
    }

    /// Clears the end date of a current position.
    pub fn normalize(&mut self) {
        if self.current {
            self.end_date.clear();
        }
    }
}

/// The three entry lists, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Experience,
    Education,
    Project,
}

impl EntryKind {
    pub const ALL: [EntryKind; 3] = [EntryKind::Experience, EntryKind::Education, EntryKind::Project];

    /// Section heading used in the composed markdown.
    pub fn heading(self) -> &'static str {
        match self {
            EntryKind::Experience => "Work Experience",
            EntryKind::Education => "Education",
            EntryKind::Project => "Projects",
        }
    }

    /// Form field name, used for field-level validation paths.
    pub fn field(self) -> &'static str {
        match self {
            EntryKind::Experience => "experience",
            EntryKind::Education => "education",
            EntryKind::Project => "projects",
        }
    }
}

/// The structured resume form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeSections {
    pub contact_info: ContactInfo,
    pub summary: String,
    pub skills: String,
    pub experience: Vec<Entry>,
    pub education: Vec<Entry>,
    pub projects: Vec<Entry>,
}

impl ResumeSections {
    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Experience => &self.experience,
            EntryKind::Education => &self.education,
            EntryKind::Project => &self.projects,
        }
    }

    /// Applies the entry invariants (current positions carry no end date).
    pub fn normalized(mut self) -> Self {
        for entry in self
            .experience
            .iter_mut()
            .chain(self.education.iter_mut())
            .chain(self.projects.iter_mut())
        {
            entry.normalize();
        }
        self
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_deserialize_from_camel_case_form_payload() {
        let json = serde_json::json!({
            "contactInfo": { "email": "ada@example.com" },
            "summary": "Engineer",
            "experience": [{
                "title": "Engineer",
                "organization": "Analytical Engines",
                "startDate": "1842",
                "current": true
            }]
        });
        let sections: ResumeSections = serde_json::from_value(json).unwrap();
        assert_eq!(sections.contact_info.email(), Some("ada@example.com"));
        assert_eq!(sections.experience[0].start_date, "1842");
        assert!(sections.experience[0].current);
        assert!(sections.education.is_empty());
        assert_eq!(sections.skills, "");
    }

    #[test]
    fn test_blank_contact_fields_count_as_absent() {
        let contact = ContactInfo {
            email: Some("   ".to_string()),
            mobile: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(contact.email(), None);
        assert_eq!(contact.mobile(), None);
    }

    #[test]
    fn test_current_entry_ends_at_present_and_clears_end_date() {
        let mut entry = Entry {
            start_date: "2020".to_string(),
            end_date: "2022".to_string(),
            current: true,
            ..Default::default()
        };
        assert_eq!(entry.end_marker(), Some("Present"));
        entry.normalize();
        assert!(entry.end_date.is_empty());
    }

    #[test]
    fn test_finished_entry_without_end_date_has_no_marker() {
        let entry = Entry {
            start_date: "2020".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.end_marker(), None);
    }
}
