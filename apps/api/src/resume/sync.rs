//! Form/Preview Synchronizer: keeps the structured form and the markdown preview consistent.
//!
//! The preview is derived one way from the form. Editing the preview directly
//! flips `SyncMode` to `Manual`; what a later form change does to those edits is
//! decided by `OverwritePolicy` rather than by whichever write lands last.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resume::composer::compose_resume;
use crate::resume::sections::ResumeSections;

pub const OVERWRITE_WARNING: &str = "You will lose edited markdown if you update the form data.";

/// Whether the preview is currently derived from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    Auto,
    Manual,
}

/// The editor tab in front of the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveView {
    Form,
    Markdown,
}

/// How the markdown tab shows the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    Preview,
    Edit,
}

/// What a form change made from the form view does to a manually edited preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Regenerate and discard manual edits. Matches the shipped editor.
    #[default]
    DiscardManualEdits,
    /// Keep manual edits until an explicit resync.
    PreserveManualEdits,
}

impl std::str::FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discard" | "discard_manual_edits" => Ok(OverwritePolicy::DiscardManualEdits),
            "preserve" | "preserve_manual_edits" => Ok(OverwritePolicy::PreserveManualEdits),
            other => Err(format!("unknown overwrite policy '{other}'")),
        }
    }
}

/// Result of applying a form change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormChangeOutcome {
    /// Preview replaced by freshly composed markdown.
    Regenerated,
    /// Preview replaced and manual edits were thrown away.
    DiscardedManualEdits,
    /// Form stored; preview left alone because the markdown view is active.
    Deferred,
    /// Form stored; preview left alone because manual edits are preserved.
    PreservedManualEdits,
}

/// Serializable view of the editor, returned by the session endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub sections: ResumeSections,
    pub preview: String,
    pub sync_mode: SyncMode,
    pub active_view: ActiveView,
    pub preview_mode: PreviewMode,
    pub overwrite_policy: OverwritePolicy,
    pub warning: Option<&'static str>,
}

/// The editor state machine behind one resume builder.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    sections: ResumeSections,
    display_name: Option<String>,
    initial_content: String,
    preview: String,
    sync_mode: SyncMode,
    active_view: ActiveView,
    preview_mode: PreviewMode,
    policy: OverwritePolicy,
}

impl Synchronizer {
    /// Starts an editor from previously saved markdown (possibly empty).
    ///
    /// Saved content is shown as-is in the markdown view; the form starts empty.
    pub fn new(
        initial_content: impl Into<String>,
        display_name: Option<String>,
        policy: OverwritePolicy,
    ) -> Self {
        let initial_content = initial_content.into();
        let active_view = if initial_content.trim().is_empty() {
            ActiveView::Form
        } else {
            ActiveView::Markdown
        };

        Self {
            sections: ResumeSections::default(),
            display_name,
            preview: initial_content.clone(),
            initial_content,
            sync_mode: SyncMode::Auto,
            active_view,
            preview_mode: PreviewMode::Preview,
            policy,
        }
    }

    pub fn sections(&self) -> &ResumeSections {
        &self.sections
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    pub fn active_view(&self) -> ActiveView {
        self.active_view
    }

    pub fn preview_mode(&self) -> PreviewMode {
        self.preview_mode
    }

    /// Applies a structured form change.
    pub fn update_sections(&mut self, sections: ResumeSections) -> FormChangeOutcome {
        self.sections = sections.normalized();

        if self.active_view != ActiveView::Form {
            return FormChangeOutcome::Deferred;
        }

        match (self.sync_mode, self.policy) {
            (SyncMode::Manual, OverwritePolicy::PreserveManualEdits) => {
                FormChangeOutcome::PreservedManualEdits
            }
            (SyncMode::Manual, OverwritePolicy::DiscardManualEdits) => {
                debug!("Form change discards manually edited markdown");
                self.regenerate();
                FormChangeOutcome::DiscardedManualEdits
            }
            (SyncMode::Auto, _) => {
                self.regenerate();
                FormChangeOutcome::Regenerated
            }
        }
    }

    /// Direct edit of the preview surface.
    pub fn edit_markdown(&mut self, markdown: impl Into<String>) {
        self.preview = markdown.into();
        self.sync_mode = SyncMode::Manual;
    }

    /// Switches tabs. Never touches the preview.
    pub fn set_active_view(&mut self, view: ActiveView) {
        self.active_view = view;
    }

    /// Flips the markdown tab between preview and edit. Entering edit mode
    /// returns the overwrite warning; nothing is locked.
    pub fn toggle_preview_mode(&mut self) -> Option<&'static str> {
        self.preview_mode = match self.preview_mode {
            PreviewMode::Preview => PreviewMode::Edit,
            PreviewMode::Edit => PreviewMode::Preview,
        };
        self.warning()
    }

    /// Drops any manual edits and derives the preview from the form again.
    pub fn resync(&mut self) {
        self.regenerate();
    }

    /// The exact markdown to persist on submit: whatever the preview shows.
    pub fn submission_snapshot(&self) -> String {
        self.preview.clone()
    }

    pub fn warning(&self) -> Option<&'static str> {
        (self.active_view == ActiveView::Markdown && self.preview_mode == PreviewMode::Edit)
            .then_some(OVERWRITE_WARNING)
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            sections: self.sections.clone(),
            preview: self.preview.clone(),
            sync_mode: self.sync_mode(),
            active_view: self.active_view(),
            preview_mode: self.preview_mode(),
            overwrite_policy: self.policy,
            warning: self.warning(),
        }
    }

    fn regenerate(&mut self) {
        // The name heading alone is not content; an empty form shows the saved resume.
        self.preview = if compose_resume(&self.sections, None).is_empty() {
            self.initial_content.clone()
        } else {
            compose_resume(&self.sections, self.display_name.as_deref())
        };
        self.sync_mode = SyncMode::Auto;
    }
}
