//! # Builder session
//!
//! A [`BuilderSession`] owns the section states of one VAL document while it
//! is open in the builder. Saving computes the document-wide change list,
//! hands it to a [`SaveCoordinator`] in a single call, and only advances the
//! baselines once the coordinator reports success.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::aggregate::aggregate_all_changes;
use crate::changes::{ChangeAction, ChangeRecord, ChangeSummary};
use crate::detail::DetailRecord;
use crate::display_order::{check_display_order, DisplayOrderError};
use crate::section_state::SectionStates;

/// Authoritative details per section, as returned by a successful save
pub type SavedSections = BTreeMap<i64, Vec<DetailRecord>>;

/// Errors reported by a save coordinator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// An update or delete referenced a detail the store does not have
    #[error("Detail '{id}' not found in section {group_id}")]
    DetailNotFound {
        /// Section the change was scoped to
        group_id: i64,
        /// Missing detail id
        id: String,
    },

    /// A change record without enough information to apply it
    #[error("Invalid change record: {0}")]
    InvalidChange(String),

    /// The store refused the request as a whole
    #[error("Save rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur when saving a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A section still has colliding display orders
    #[error(transparent)]
    DuplicateDisplayOrder(#[from] DisplayOrderError),

    /// Persisting the changes failed; baselines are unchanged
    #[error("Failed to save document {val_id}: {source}")]
    Save {
        /// Document being saved
        val_id: i64,
        /// Error from the coordinator
        source: SaveError,
    },
}

/// Persists a document's change list in one request
///
/// Implementations must apply the changes all-or-nothing.
pub trait SaveCoordinator {
    /// Persist `changes` for document `val_id`
    ///
    /// # Returns
    /// * `Ok(SavedSections)` - Server state of every section the changes touched
    /// * `Err(SaveError)` - Nothing was persisted
    fn save(&mut self, val_id: i64, changes: &[ChangeRecord]) -> Result<SavedSections, SaveError>;
}

/// What a successful save did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Counts of the persisted changes
    pub summary: ChangeSummary,
    /// Sections whose baselines were advanced
    pub sections_saved: Vec<i64>,
}

/// Edit session for one document
#[derive(Debug, Clone)]
pub struct BuilderSession {
    val_id: i64,
    sections: SectionStates,
}

impl BuilderSession {
    /// Start an empty session for document `val_id`
    pub fn new(val_id: i64) -> Self {
        Self::with_sections(val_id, SectionStates::new())
    }

    /// Resume a session from existing section states
    pub fn with_sections(val_id: i64, sections: SectionStates) -> Self {
        Self { val_id, sections }
    }

    /// Document being edited
    pub fn val_id(&self) -> i64 {
        self.val_id
    }

    /// Section states held by the session
    pub fn sections(&self) -> &SectionStates {
        &self.sections
    }

    /// Mutable section states
    pub fn sections_mut(&mut self) -> &mut SectionStates {
        &mut self.sections
    }

    /// Load a section fetched from the server
    pub fn load_section(&mut self, group_id: i64, details: Vec<DetailRecord>) {
        self.sections.load(group_id, details);
    }

    /// Replace the current details of a loaded section
    pub fn edit_section(&mut self, group_id: i64, details: Vec<DetailRecord>) -> bool {
        self.sections.edit(group_id, details)
    }

    /// Discard a section and its unsaved edits
    pub fn unload_section(&mut self, group_id: i64) {
        self.sections.unload(group_id);
    }

    /// Changes a save would send right now
    pub fn pending_changes(&self) -> Vec<ChangeRecord> {
        aggregate_all_changes(self.val_id, &self.sections)
    }

    /// Whether a save would send anything
    pub fn has_unsaved_changes(&self) -> bool {
        !self.pending_changes().is_empty()
    }

    /// Check that no section taking part in a save has colliding display orders
    ///
    /// Sections the aggregator skips (either list missing) are not checked.
    pub fn validate(&self) -> Result<(), DisplayOrderError> {
        for (&group_id, state) in &self.sections {
            if !state.is_diffable() {
                continue;
            }
            if let Some(details) = &state.details {
                check_display_order(group_id, details)?;
            }
        }
        Ok(())
    }

    /// Persist all pending changes through `coordinator`
    ///
    /// The coordinator is not called when there is nothing to save. On
    /// failure every baseline is left as it was, so a retry recomputes the
    /// same changes.
    ///
    /// # Returns
    /// * `Ok(SaveOutcome)` - Changes persisted and baselines advanced
    /// * `Err(SessionError)` - Validation or persistence failed
    pub fn save<C: SaveCoordinator + ?Sized>(
        &mut self,
        coordinator: &mut C,
    ) -> Result<SaveOutcome, SessionError> {
        self.validate()?;

        let changes = self.pending_changes();
        let summary = ChangeSummary::of(&changes);
        if summary.is_empty() {
            log::info!("Document {}: nothing to save", self.val_id);
            return Ok(SaveOutcome::default());
        }

        log::info!("Saving document {}: {}", self.val_id, summary);

        let saved = coordinator
            .save(self.val_id, &changes)
            .map_err(|source| {
                log::warn!("Save of document {} failed: {}", self.val_id, source);
                SessionError::Save {
                    val_id: self.val_id,
                    source,
                }
            })?;

        for group_id in self.sections.dirty_sections() {
            if !saved.contains_key(&group_id) {
                log::warn!(
                    "Server returned no state for changed section {}; baseline kept",
                    group_id
                );
            }
        }

        let sections_saved: Vec<i64> = saved.keys().copied().collect();
        for (group_id, details) in saved {
            self.sections.mark_saved(group_id, details);
        }

        Ok(SaveOutcome {
            summary,
            sections_saved,
        })
    }
}

/// In-memory store applying change lists the way the server does
///
/// Creates get fresh ids; updates and deletes must name an existing detail.
/// A request that fails part way leaves the store untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sections: SavedSections,
    next_id: u64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a section, assigning ids to details that lack one
    pub fn with_section(mut self, group_id: i64, details: Vec<DetailRecord>) -> Self {
        let details = details
            .into_iter()
            .map(|mut detail| {
                if !detail.is_persisted() {
                    detail.id = Some(self.allocate_id());
                }
                detail
            })
            .collect();
        self.sections.insert(group_id, details);
        self
    }

    /// Seed a store from the baselines of `sections`
    ///
    /// Only persisted baseline details are copied; unpersisted ones are not
    /// known to the server either.
    pub fn from_baselines(sections: &SectionStates) -> Self {
        let mut store = Self::new();
        for (&group_id, state) in sections {
            if let Some(original) = &state.original_details {
                let persisted = original
                    .iter()
                    .filter(|detail| detail.is_persisted())
                    .cloned()
                    .collect();
                store = store.with_section(group_id, persisted);
            }
        }
        store
    }

    /// Stored details of a section, in display order
    pub fn section(&self, group_id: i64) -> &[DetailRecord] {
        self.sections
            .get(&group_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn allocate_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let id = format!("d{}", self.next_id);
            let taken = self
                .sections
                .values()
                .flatten()
                .any(|detail| detail.persisted_id() == Some(id.as_str()));
            if !taken {
                return id;
            }
        }
    }

    fn apply(&mut self, val_id: i64, change: &ChangeRecord) -> Result<i64, SaveError> {
        let detail = &change.detail;
        let group_id = detail.group_id.ok_or_else(|| {
            SaveError::InvalidChange(format!("{} without a section id", change.action))
        })?;
        if detail.val_id.is_some_and(|v| v != val_id) {
            return Err(SaveError::Rejected(format!(
                "change for document {:?} sent with document {}",
                detail.val_id, val_id
            )));
        }

        match change.action {
            ChangeAction::Create => {
                let mut created = detail.clone();
                created.id = Some(self.allocate_id());
                self.sections.entry(group_id).or_default().push(created);
            }
            ChangeAction::Update | ChangeAction::Delete => {
                let id = detail.persisted_id().ok_or_else(|| {
                    SaveError::InvalidChange(format!("{} without a detail id", change.action))
                })?;
                let details = self.sections.entry(group_id).or_default();
                let position = details
                    .iter()
                    .position(|d| d.persisted_id() == Some(id))
                    .ok_or_else(|| SaveError::DetailNotFound {
                        group_id,
                        id: id.to_string(),
                    })?;
                if change.action == ChangeAction::Update {
                    details[position] = detail.clone();
                } else {
                    details.remove(position);
                }
            }
        }

        Ok(group_id)
    }
}

impl SaveCoordinator for MemoryStore {
    fn save(&mut self, val_id: i64, changes: &[ChangeRecord]) -> Result<SavedSections, SaveError> {
        let mut staged = self.clone();
        let mut touched = Vec::new();
        for change in changes {
            touched.push(staged.apply(val_id, change)?);
        }

        let mut saved = SavedSections::new();
        for group_id in touched {
            if let Some(details) = staged.sections.get_mut(&group_id) {
                details.sort_by_key(|d| d.display_order);
                saved.insert(group_id, details.clone());
            }
        }

        *self = staged;
        Ok(saved)
    }
}
