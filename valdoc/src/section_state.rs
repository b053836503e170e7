//! Per-section change state held by a builder session
//!
//! Each loaded section keeps its current details alongside the baseline last
//! confirmed by the server. The baseline only moves forward through
//! [`SectionStates::mark_saved`], after a save has succeeded.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::changes::calculate_changes;
use crate::detail::DetailRecord;

/// Editable state of one section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionChangeState {
    /// Details as edited
    pub details: Option<Vec<DetailRecord>>,

    /// Details as last loaded or saved
    pub original_details: Option<Vec<DetailRecord>>,

    /// Markup of a freeform editor region, passed through without diffing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor_content: Option<String>,
}

impl SectionChangeState {
    /// Seed a freshly loaded section, current and baseline equal
    pub fn loaded(details: Vec<DetailRecord>) -> Self {
        Self {
            original_details: Some(details.clone()),
            details: Some(details),
            editor_content: None,
        }
    }

    /// Whether both lists are present and can be diffed
    pub fn is_diffable(&self) -> bool {
        self.details.is_some() && self.original_details.is_some()
    }
}

/// Section states of one document, keyed by section id
///
/// Iteration is in ascending section id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionStates {
    sections: BTreeMap<i64, SectionChangeState>,
}

impl SectionStates {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a section fetched from the server
    ///
    /// Replaces any state already held for `group_id`, discarding unsaved edits.
    pub fn load(&mut self, group_id: i64, details: Vec<DetailRecord>) {
        log::debug!("Loaded section {} with {} details", group_id, details.len());
        self.sections
            .insert(group_id, SectionChangeState::loaded(details));
    }

    /// Insert a state as-is
    pub fn insert(&mut self, group_id: i64, state: SectionChangeState) {
        self.sections.insert(group_id, state);
    }

    /// State of a section, if loaded
    pub fn get(&self, group_id: i64) -> Option<&SectionChangeState> {
        self.sections.get(&group_id)
    }

    /// Mutable state of a section, if loaded
    pub fn get_mut(&mut self, group_id: i64) -> Option<&mut SectionChangeState> {
        self.sections.get_mut(&group_id)
    }

    /// Replace the current details of a loaded section
    ///
    /// # Returns
    /// * `true` - The section was loaded and its details replaced
    /// * `false` - No such section
    pub fn edit(&mut self, group_id: i64, details: Vec<DetailRecord>) -> bool {
        match self.sections.get_mut(&group_id) {
            Some(state) => {
                state.details = Some(details);
                true
            }
            None => false,
        }
    }

    /// Set the freeform markup of a section, creating the entry if needed
    pub fn set_editor_content(&mut self, group_id: i64, content: impl Into<String>) {
        self.sections.entry(group_id).or_default().editor_content = Some(content.into());
    }

    /// Drop a section from the session without persisting anything
    pub fn unload(&mut self, group_id: i64) -> Option<SectionChangeState> {
        let state = self.sections.remove(&group_id);
        if state.as_ref().is_some_and(|s| has_pending_changes(group_id, s)) {
            log::warn!("Discarding unsaved changes in section {}", group_id);
        }
        state
    }

    /// Adopt the server's authoritative details after a successful save
    ///
    /// Both the baseline and the current details are replaced, so the
    /// section is clean afterwards. The editor content is kept.
    pub fn mark_saved(&mut self, group_id: i64, server_details: Vec<DetailRecord>) {
        let state = self.sections.entry(group_id).or_default();
        state.original_details = Some(server_details.clone());
        state.details = Some(server_details);
    }

    /// Whether a section has edits not yet reflected in its baseline
    pub fn is_dirty(&self, group_id: i64) -> bool {
        self.sections
            .get(&group_id)
            .is_some_and(|state| has_pending_changes(group_id, state))
    }

    /// Ids of all sections with pending edits, ascending
    pub fn dirty_sections(&self) -> Vec<i64> {
        self.sections
            .iter()
            .filter(|(group_id, state)| has_pending_changes(**group_id, state))
            .map(|(group_id, _)| *group_id)
            .collect()
    }

    /// Number of sections held
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section is held
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section ids in iteration order
    pub fn group_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.sections.keys().copied()
    }

    /// Iterate sections in ascending id order
    pub fn iter(&self) -> btree_map::Iter<'_, i64, SectionChangeState> {
        self.sections.iter()
    }
}

impl<'a> IntoIterator for &'a SectionStates {
    type Item = (&'a i64, &'a SectionChangeState);
    type IntoIter = btree_map::Iter<'a, i64, SectionChangeState>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

impl FromIterator<(i64, SectionChangeState)> for SectionStates {
    fn from_iter<T: IntoIterator<Item = (i64, SectionChangeState)>>(iter: T) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

fn has_pending_changes(group_id: i64, state: &SectionChangeState) -> bool {
    // Ownership stamps are irrelevant here, any id works
    state.is_diffable()
        && !calculate_changes(
            0,
            group_id,
            state.original_details.as_deref(),
            state.details.as_deref(),
        )
        .is_empty()
}
