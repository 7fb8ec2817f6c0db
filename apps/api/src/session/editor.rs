//! One user's editing session: document history, section layout, template choice.
//!
//! Every change goes through here so the revision counter moves exactly when the
//! visible state does. Only document edits are undoable; layout and template
//! changes are not recorded in history.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::document::{apply_all, CVDocument, EditCommand};
use crate::export::ExportSnapshot;
use crate::history::History;
use crate::render::{
    render, render_cover_letter, DateFormatter, PreviewFrame, RenderMode, RenderOptions,
    TemplateId,
};
use crate::sections::{Section, SectionRegistry};

pub struct EditSession {
    id: Uuid,
    history: History<CVDocument>,
    registry: SectionRegistry,
    template: TemplateId,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Unix millis of the last read or write. Drives idle expiry.
    last_active: AtomicI64,
}

/// Full session state as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub revision: u64,
    pub document: CVDocument,
    pub template: TemplateId,
    pub sections: Vec<Section>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EditSession {
    /// `history_limit` of 0 keeps every snapshot.
    pub fn new(
        document: CVDocument,
        template: TemplateId,
        registry: SectionRegistry,
        history_limit: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            history: History::with_limit(document, history_limit),
            registry,
            template,
            revision: 0,
            created_at: now,
            updated_at: now,
            last_active: AtomicI64::new(now.timestamp_millis()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> &CVDocument {
        self.history.current()
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Records that a client used the session. Takes `&self` so readers can call it
    /// under a shared lock.
    pub fn mark_active(&self) {
        self.last_active
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active.load(Ordering::Relaxed))
            .unwrap_or(self.updated_at)
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    /// Applies a batch of commands as a single history step. A batch that leaves
    /// the document unchanged records nothing. Returns whether anything changed.
    pub fn apply(&mut self, commands: &[EditCommand]) -> bool {
        let next = apply_all(self.document(), commands);
        if &next == self.document() {
            return false;
        }
        debug!(
            session_id = %self.id,
            ops = ?commands.iter().map(EditCommand::label).collect::<Vec<_>>(),
            "edit applied"
        );
        self.history.push(next);
        self.touch();
        true
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo().is_some();
        if moved {
            self.touch();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo().is_some();
        if moved {
            self.touch();
        }
        moved
    }

    pub fn reorder_sections(&mut self, from: usize, to: usize) -> bool {
        let moved = from != to && self.registry.reorder(from, to);
        if moved {
            self.touch();
        }
        moved
    }

    /// Returns the new enabled flag, or `None` for an unknown section id.
    pub fn toggle_section(&mut self, id: &str) -> Option<bool> {
        let enabled = self.registry.toggle_enabled(id)?;
        self.touch();
        Some(enabled)
    }

    pub fn set_template(&mut self, template: TemplateId) -> bool {
        if self.template == template {
            return false;
        }
        self.template = template;
        self.touch();
        true
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            revision: self.revision,
            document: self.document().clone(),
            template: self.template,
            sections: self.registry.sections().to_vec(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn preview(
        &self,
        mode: RenderMode,
        dates: &dyn DateFormatter,
        language: &str,
    ) -> PreviewFrame {
        let options = RenderOptions {
            mode,
            dates,
            language,
        };
        let markup = render(self.document(), self.template, &self.registry, &options);
        PreviewFrame::from_markup(markup, self.revision)
    }

    pub fn cover_letter_preview(
        &self,
        mode: RenderMode,
        dates: &dyn DateFormatter,
        language: &str,
    ) -> PreviewFrame {
        let options = RenderOptions {
            mode,
            dates,
            language,
        };
        let markup = render_cover_letter(self.document(), self.template, &options);
        PreviewFrame::from_markup(markup, self.revision)
    }

    /// Owned copy of the current state for a background export.
    pub fn export_snapshot(&self) -> ExportSnapshot {
        ExportSnapshot {
            document: self.document().clone(),
            template: self.template,
            sections: self.registry.clone(),
            revision: self.revision,
        }
    }
}
