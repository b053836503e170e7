//! Change calculation for a single section
//!
//! Compares the baseline details of a section (as last loaded or saved) with
//! the current, edited details and produces the create/update/delete records
//! needed to bring the server in line with the editor.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detail::DetailRecord;

/// Kind of change to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Insert a new detail
    Create,
    /// Overwrite an existing detail
    Update,
    /// Remove an existing detail
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One instruction for the save coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// What to do with the detail
    pub action: ChangeAction,
    /// The detail, stamped with its document and section identifiers
    pub detail: DetailRecord,
}

impl ChangeRecord {
    fn new(action: ChangeAction, detail: DetailRecord) -> Self {
        Self { action, detail }
    }
}

/// Compute the changes between a section's baseline and its current details
///
/// Matching is by persisted id, not by position. Creates and updates follow
/// the order of `current`; deletes are appended in the order of `original`.
/// A missing list is treated as empty.
///
/// # Parameters
/// * `val_id` - Owning document, stamped into every produced detail
/// * `group_id` - Owning section, stamped into every produced detail
/// * `original` - Baseline details from the server
/// * `current` - Details as edited
///
/// # Returns
/// * `Vec<ChangeRecord>` - Ordered changes, empty when nothing differs
pub fn calculate_changes(
    val_id: i64,
    group_id: i64,
    original: Option<&[DetailRecord]>,
    current: Option<&[DetailRecord]>,
) -> Vec<ChangeRecord> {
    let original = original.unwrap_or_default();
    let current = current.unwrap_or_default();

    // First occurrence wins if the baseline repeats an id
    let mut unmatched: HashMap<&str, &DetailRecord> = HashMap::with_capacity(original.len());
    for detail in original {
        if let Some(id) = detail.persisted_id() {
            unmatched.entry(id).or_insert(detail);
        }
    }

    let mut changes = Vec::new();

    for detail in current {
        let Some(id) = detail.persisted_id() else {
            changes.push(ChangeRecord::new(
                ChangeAction::Create,
                detail.stamped(val_id, group_id),
            ));
            continue;
        };

        match unmatched.remove(id) {
            Some(baseline) => {
                if !baseline.same_fields(detail) {
                    log::debug!(
                        "Detail {} in section {} changed: {}",
                        id,
                        group_id,
                        baseline.changed_fields(detail).join(", ")
                    );
                    changes.push(ChangeRecord::new(
                        ChangeAction::Update,
                        detail.stamped(val_id, group_id),
                    ));
                }
            }
            // Unknown or already matched id: a cloned record
            None => changes.push(ChangeRecord::new(
                ChangeAction::Create,
                detail.stamped(val_id, group_id),
            )),
        }
    }

    for detail in original {
        let Some(id) = detail.persisted_id() else {
            continue;
        };
        if unmatched.remove(id).is_some() {
            changes.push(ChangeRecord::new(
                ChangeAction::Delete,
                detail.stamped(val_id, group_id),
            ));
        }
    }

    changes
}

/// Number of changes per action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    /// Creates
    pub created: usize,
    /// Updates
    pub updated: usize,
    /// Deletes
    pub deleted: usize,
}

impl ChangeSummary {
    /// Count the actions in a change list
    pub fn of(changes: &[ChangeRecord]) -> Self {
        changes
            .iter()
            .fold(Self::default(), |mut summary, change| {
                match change.action {
                    ChangeAction::Create => summary.created += 1,
                    ChangeAction::Update => summary.updated += 1,
                    ChangeAction::Delete => summary.deleted += 1,
                }
                summary
            })
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.created + self.updated + self.deleted
    }

    /// Whether the list held no changes
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted",
            self.created, self.updated, self.deleted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str, content: &str, order: i32) -> DetailRecord {
        DetailRecord::new(content, order).with_id(id)
    }

    fn actions(changes: &[ChangeRecord]) -> Vec<ChangeAction> {
        changes.iter().map(|c| c.action).collect()
    }

    #[test]
    fn test_identical_lists_produce_nothing() {
        let details = vec![detail("a", "One", 1), detail("b", "Two", 2)];
        let changes = calculate_changes(1, 10, Some(&details), Some(&details));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_reordered_lists_with_same_fields_produce_nothing() {
        let original = vec![detail("a", "One", 1), detail("b", "Two", 2)];
        let current = vec![original[1].clone(), original[0].clone()];
        assert!(calculate_changes(1, 10, Some(&original), Some(&current)).is_empty());
    }

    #[test]
    fn test_missing_lists_produce_nothing() {
        assert!(calculate_changes(1, 10, None, None).is_empty());
        assert!(calculate_changes(1, 10, Some(&[]), None).is_empty());
    }

    #[test]
    fn test_all_new_details_are_created_in_order() {
        let current = vec![
            DetailRecord::new("First", 1),
            DetailRecord::new("Second", 2),
            DetailRecord::new("Third", 3),
        ];
        let changes = calculate_changes(5, 20, None, Some(&current));

        assert_eq!(actions(&changes), vec![ChangeAction::Create; 3]);
        let contents: Vec<_> = changes.iter().map(|c| c.detail.content.as_str()).collect();
        assert_eq!(contents, vec!["First", "Second", "Third"]);
        for change in &changes {
            assert_eq!(change.detail.val_id, Some(5));
            assert_eq!(change.detail.group_id, Some(20));
        }
    }

    #[test]
    fn test_all_removed_details_are_deleted_in_baseline_order() {
        let original = vec![detail("c", "C", 1), detail("a", "A", 2), detail("b", "B", 3)];
        let changes = calculate_changes(1, 10, Some(&original), Some(&[]));

        assert_eq!(actions(&changes), vec![ChangeAction::Delete; 3]);
        let ids: Vec<_> = changes
            .iter()
            .map(|c| c.detail.persisted_id().unwrap())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_content_change_produces_single_update() {
        let original = vec![detail("a", "Hello", 1)];
        let current = vec![detail("a", "Changed", 1)];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Update);
        assert_eq!(changes[0].detail.persisted_id(), Some("a"));
        assert_eq!(changes[0].detail.content, "Changed");
        assert_eq!(changes[0].detail.display_order, 1);
    }

    #[test]
    fn test_each_tracked_field_triggers_update() {
        let base = detail("a", "Hello", 1);
        let variants = vec![
            DetailRecord { bullet: Some(true), ..base.clone() },
            DetailRecord { indent: Some(2), ..base.clone() },
            DetailRecord { bold: Some(true), ..base.clone() },
            DetailRecord { center: Some(true), ..base.clone() },
            DetailRecord { blank_line_after: Some(true), ..base.clone() },
            DetailRecord { tight_line_height: Some(true), ..base.clone() },
            DetailRecord { display_order: 9, ..base.clone() },
        ];

        for variant in variants {
            let changes = calculate_changes(
                1,
                10,
                Some(std::slice::from_ref(&base)),
                Some(std::slice::from_ref(&variant)),
            );
            assert_eq!(actions(&changes), vec![ChangeAction::Update], "{:?}", variant);
        }
    }

    #[test]
    fn test_null_and_false_flags_differ() {
        let original = vec![detail("a", "Hello", 1)];
        let current = vec![DetailRecord {
            blank_line_after: Some(false),
            ..original[0].clone()
        }];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));
        assert_eq!(actions(&changes), vec![ChangeAction::Update]);
    }

    #[test]
    fn test_ownership_differences_are_not_updates() {
        let original = vec![detail("a", "Hello", 1).stamped(1, 10)];
        let current = vec![detail("a", "Hello", 1)];
        assert!(calculate_changes(1, 10, Some(&original), Some(&current)).is_empty());
    }

    #[test]
    fn test_detail_without_id_is_created_even_if_content_matches() {
        let original = vec![detail("a", "Hello", 1)];
        let current = vec![original[0].clone(), DetailRecord::new("Hello", 1)];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));

        assert_eq!(actions(&changes), vec![ChangeAction::Create]);
        assert_eq!(changes[0].detail.id, None);
    }

    #[test]
    fn test_empty_id_is_treated_as_new() {
        let original = vec![detail("", "Ghost", 1)];
        let current = vec![detail("", "Ghost", 1)];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));

        // Unpersisted baseline entries never produce deletes
        assert_eq!(actions(&changes), vec![ChangeAction::Create]);
    }

    #[test]
    fn test_unknown_id_is_created() {
        let original = vec![detail("a", "Hello", 1)];
        let current = vec![detail("a", "Hello", 1), detail("copy-of-a", "Hello", 2)];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));

        assert_eq!(actions(&changes), vec![ChangeAction::Create]);
        assert_eq!(changes[0].detail.persisted_id(), Some("copy-of-a"));
    }

    #[test]
    fn test_repeated_current_id_creates_the_clone() {
        let original = vec![detail("a", "Hello", 1)];
        let current = vec![detail("a", "Hello", 1), detail("a", "Hello", 2)];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));

        assert_eq!(actions(&changes), vec![ChangeAction::Create]);
        assert_eq!(changes[0].detail.display_order, 2);
    }

    #[test]
    fn test_mixed_changes_keep_current_order_then_deletes() {
        let original = vec![
            detail("a", "A", 1),
            detail("b", "B", 2),
            detail("c", "C", 3),
            detail("d", "D", 4),
        ];
        let current = vec![
            DetailRecord::new("New first", 1),
            detail("c", "C edited", 2),
            detail("a", "A", 3),
        ];
        let changes = calculate_changes(1, 10, Some(&original), Some(&current));

        assert_eq!(
            actions(&changes),
            vec![
                ChangeAction::Create,
                ChangeAction::Update,
                ChangeAction::Update,
                ChangeAction::Delete,
                ChangeAction::Delete,
            ]
        );
        assert_eq!(changes[1].detail.persisted_id(), Some("c"));
        assert_eq!(changes[2].detail.persisted_id(), Some("a"));
        assert_eq!(changes[3].detail.persisted_id(), Some("b"));
        assert_eq!(changes[4].detail.persisted_id(), Some("d"));
    }

    #[test]
    fn test_duplicate_baseline_id_is_deleted_once() {
        let original = vec![detail("a", "A", 1), detail("a", "A again", 2)];
        let changes = calculate_changes(1, 10, Some(&original), None);
        assert_eq!(actions(&changes), vec![ChangeAction::Delete]);
        assert_eq!(changes[0].detail.content, "A");
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let original = vec![detail("a", "A", 1)];
        let current = vec![detail("a", "B", 1)];
        let original_copy = original.clone();
        let current_copy = current.clone();

        let _ = calculate_changes(1, 10, Some(&original), Some(&current));

        assert_eq!(original, original_copy);
        assert_eq!(current, current_copy);
    }

    #[test]
    fn test_change_record_json_shape() {
        let changes = calculate_changes(1, 10, None, Some(&[DetailRecord::new("Hi", 1)]));
        let json = serde_json::to_value(&changes[0]).unwrap();
        assert_eq!(json["action"], serde_json::json!("create"));
        assert_eq!(json["detail"]["groupId"], serde_json::json!(10));
        assert_eq!(json["detail"]["valId"], serde_json::json!(1));
    }

    #[test]
    fn test_summary_counts_actions() {
        let original = vec![detail("a", "A", 1), detail("b", "B", 2)];
        let current = vec![detail("a", "A!", 1), DetailRecord::new("C", 3)];
        let summary = ChangeSummary::of(&calculate_changes(1, 10, Some(&original), Some(&current)));

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.to_string(), "1 created, 1 updated, 1 deleted");
    }
}
