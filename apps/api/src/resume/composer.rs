//! Markdown Composer: turns the structured resume form into one markdown document.
//!
//! Pure and deterministic: the same sections and display name always yield
//! byte-identical output. Fragment order is fixed:
//! contact, summary, skills, experience, education, projects.

use crate::resume::sections::{ContactInfo, Entry, EntryKind, ResumeSections};

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Composes the full resume document.
pub fn compose_resume(sections: &ResumeSections, display_name: Option<&str>) -> String {
    let fragments = [
        contact_markdown(&sections.contact_info, display_name),
        section_markdown("Professional Summary", &sections.summary),
        section_markdown("Skills", &sections.skills),
        entries_to_markdown(&sections.experience, EntryKind::Experience.heading()),
        entries_to_markdown(&sections.education, EntryKind::Education.heading()),
        entries_to_markdown(&sections.projects, EntryKind::Project.heading()),
    ];

    fragments
        .into_iter()
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR)
}

/// Centered name heading plus a pipe-separated line of the contact methods present.
///
/// The heading needs a display name and the line needs at least one contact
/// method; with neither the block is empty.
pub fn contact_markdown(contact: &ContactInfo, display_name: Option<&str>) -> String {
    let mut parts = Vec::new();
    if let Some(email) = contact.email() {
        parts.push(format!("📧 {email}"));
    }
    if let Some(mobile) = contact.mobile() {
        parts.push(format!("📱 {mobile}"));
    }
    if let Some(linkedin) = contact.linkedin() {
        parts.push(format!("💼 [LinkedIn]({linkedin})"));
    }
    if let Some(twitter) = contact.twitter() {
        parts.push(format!("🐦 [Twitter]({twitter})"));
    }

    let mut blocks = Vec::new();
    if let Some(name) = display_name.map(str::trim).filter(|n| !n.is_empty()) {
        blocks.push(format!(
            "## <div align=\"center\">{}</div>",
            html_escape::encode_text(name)
        ));
    }
    if !parts.is_empty() {
        blocks.push(format!(
            "<div align=\"center\">\n\n{}\n\n</div>",
            parts.join(" | ")
        ));
    }
    blocks.join(FRAGMENT_SEPARATOR)
}

/// `## Title` followed by the text, or nothing when the text is blank.
pub fn section_markdown(title: &str, text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    format!("## {title}\n\n{text}")
}

/// Renders an entry list under its heading. Empty lists render nothing.
pub fn entries_to_markdown(entries: &[Entry], heading: &str) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let body = entries
        .iter()
        .map(entry_markdown)
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR);

    format!("## {heading}\n\n{body}")
}

fn entry_markdown(entry: &Entry) -> String {
    let title = entry.title.trim();
    let organization = entry.organization.trim();

    let mut md = if organization.is_empty() {
        format!("### {title}")
    } else {
        format!("### {title} @ {organization}")
    };

    let start = entry.start_date.trim();
    let date_range = match entry.end_marker() {
        Some(end) => format!("{start} - {end}"),
        None => start.to_string(),
    };
    if !date_range.is_empty() {
        md.push('\n');
        md.push_str(&date_range);
    }

    let description = entry.description.trim();
    if !description.is_empty() {
        md.push_str(FRAGMENT_SEPARATOR);
        md.push_str(description);
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, org: &str, start: &str, end: &str, current: bool, desc: &str) -> Entry {
        Entry {
            title: title.to_string(),
            organization: org.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            current,
            description: desc.to_string(),
        }
    }

    fn full_contact() -> ContactInfo {
        ContactInfo {
            email: Some("ada@example.com".to_string()),
            mobile: Some("+44 20 7946 0000".to_string()),
            linkedin: Some("https://linkedin.com/in/ada".to_string()),
            twitter: Some("https://twitter.com/ada".to_string()),
        }
    }

    #[test]
    fn test_summary_only_scenario() {
        let sections = ResumeSections {
            summary: "Engineer".to_string(),
            ..Default::default()
        };
        let md = compose_resume(&sections, Some("Ada"));

        assert_eq!(
            md,
            "## <div align=\"center\">Ada</div>\n\n## Professional Summary\n\nEngineer"
        );
        assert!(!md.contains('|'));
        for heading in ["## Skills", "## Work Experience", "## Education", "## Projects"] {
            assert!(!md.contains(heading), "unexpected {heading}");
        }
    }

    #[test]
    fn test_contact_line_order_is_fixed() {
        let md = contact_markdown(&full_contact(), Some("Ada"));
        let line = md.lines().find(|l| l.contains('|')).unwrap();
        assert_eq!(
            line,
            "📧 ada@example.com | 📱 +44 20 7946 0000 | 💼 [LinkedIn](https://linkedin.com/in/ada) | 🐦 [Twitter](https://twitter.com/ada)"
        );
    }

    #[test]
    fn test_contact_line_only_lists_present_methods() {
        let contact = ContactInfo {
            mobile: Some("555".to_string()),
            twitter: Some("https://x.com/ada".to_string()),
            ..Default::default()
        };
        let md = contact_markdown(&contact, Some("Ada"));
        assert!(md.contains("📱 555 | 🐦 [Twitter](https://x.com/ada)"));
        assert!(!md.contains("📧"));
        assert!(!md.contains("LinkedIn"));
    }

    #[test]
    fn test_missing_display_name_degrades_to_contact_line() {
        let md = contact_markdown(&full_contact(), None);
        assert!(md.starts_with("<div align=\"center\">"));
        assert!(!md.contains("##"));

        assert_eq!(contact_markdown(&full_contact(), Some("   ")), md);
    }

    #[test]
    fn test_contact_block_empty_without_name_or_methods() {
        assert_eq!(contact_markdown(&ContactInfo::default(), None), "");
        let md = compose_resume(&ResumeSections::default(), None);
        assert_eq!(md, "");
    }

    #[test]
    fn test_display_name_is_html_escaped() {
        let md = contact_markdown(&ContactInfo::default(), Some("Ada <Byron> & Co"));
        assert_eq!(md, "## <div align=\"center\">Ada &lt;Byron&gt; &amp; Co</div>");
    }

    #[test]
    fn test_blank_sections_are_omitted() {
        assert_eq!(section_markdown("Skills", "  \n "), "");
        assert_eq!(section_markdown("Skills", "Rust"), "## Skills\n\nRust");
    }

    #[test]
    fn test_section_text_keeps_leading_indentation() {
        assert_eq!(
            section_markdown("Skills", "    cargo build"),
            "## Skills\n\n    cargo build"
        );
    }

    #[test]
    fn test_empty_entry_list_produces_nothing() {
        assert_eq!(entries_to_markdown(&[], "Work Experience"), "");
    }

    #[test]
    fn test_entry_block_layout() {
        let entries = vec![
            entry("Engineer", "Acme", "Jan 2020", "Dec 2021", false, "Built things."),
            entry("Lead", "Globex", "Jan 2022", "", true, "Led things."),
        ];
        let md = entries_to_markdown(&entries, "Work Experience");
        assert_eq!(
            md,
            "## Work Experience\n\n\
             ### Engineer @ Acme\nJan 2020 - Dec 2021\n\nBuilt things.\n\n\
             ### Lead @ Globex\nJan 2022 - Present\n\nLed things."
        );
    }

    #[test]
    fn test_current_entry_renders_present_despite_end_date() {
        let entries = vec![entry("Lead", "Globex", "2022", "2023", true, "")];
        let md = entries_to_markdown(&entries, "Work Experience");
        assert!(md.contains("2022 - Present"));
        assert!(!md.contains("2023"));
    }

    #[test]
    fn test_entry_without_description_keeps_heading_and_dates() {
        let entries = vec![entry("BSc", "MIT", "2015", "2019", false, "")];
        let md = entries_to_markdown(&entries, "Education");
        assert_eq!(md, "## Education\n\n### BSc @ MIT\n2015 - 2019");
    }

    #[test]
    fn test_entry_without_organization_or_end_date() {
        let entries = vec![entry("Side project", "", "2021", "", false, "A tool.")];
        let md = entries_to_markdown(&entries, "Projects");
        assert_eq!(md, "## Projects\n\n### Side project\n2021\n\nA tool.");
    }

    #[test]
    fn test_fragment_order_is_fixed() {
        let sections = ResumeSections {
            contact_info: full_contact(),
            summary: "Summary".to_string(),
            skills: "Rust".to_string(),
            experience: vec![entry("E", "O", "1", "2", false, "")],
            education: vec![entry("D", "U", "1", "2", false, "")],
            projects: vec![entry("P", "", "1", "", true, "")],
        };
        let md = compose_resume(&sections, Some("Ada"));
        let positions: Vec<usize> = [
            "<div align=\"center\">Ada",
            "📧",
            "## Professional Summary",
            "## Skills",
            "## Work Experience",
            "## Education",
            "## Projects",
        ]
        .iter()
        .map(|needle| md.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let sections = ResumeSections {
            contact_info: full_contact(),
            summary: "Summary".to_string(),
            experience: vec![entry("E", "O", "1", "2", false, "d")],
            ..Default::default()
        };
        assert_eq!(
            compose_resume(&sections, Some("Ada")),
            compose_resume(&sections.clone(), Some("Ada"))
        );
    }
}
