//! Document-wide change aggregation

use crate::changes::{calculate_changes, ChangeRecord};
use crate::section_state::SectionStates;

/// Collect the changes of every section of a document
///
/// Sections are visited in ascending id order and their changes concatenated,
/// so blocks from different sections never interleave. Sections missing
/// either list are skipped.
///
/// # Parameters
/// * `val_id` - Document the changes belong to
/// * `sections` - Section states of the document
///
/// # Returns
/// * `Vec<ChangeRecord>` - Flat change list for a single save request
pub fn aggregate_all_changes(val_id: i64, sections: &SectionStates) -> Vec<ChangeRecord> {
    let mut all_changes = Vec::new();

    for (&group_id, state) in sections {
        let (Some(original), Some(current)) = (&state.original_details, &state.details) else {
            log::debug!("Skipping section {}: not loaded for diffing", group_id);
            continue;
        };

        let changes = calculate_changes(
            val_id,
            group_id,
            Some(original.as_slice()),
            Some(current.as_slice()),
        );
        if !changes.is_empty() {
            log::debug!("Section {}: {} changes", group_id, changes.len());
        }
        all_changes.extend(changes);
    }

    all_changes
}
