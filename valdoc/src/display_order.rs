//! Display order checks for section details
//!
//! Editing may leave two details sharing a display order for a moment
//! (for example while one is dragged over another). Those collisions have to
//! be resolved before a section is saved.

use itertools::Itertools;
use thiserror::Error;

use crate::detail::DetailRecord;

/// Display order collisions found in a section
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Section {group_id} has details sharing display order {}", join_orders(.orders))]
pub struct DisplayOrderError {
    /// Section containing the collisions
    pub group_id: i64,
    /// Display orders used more than once, ascending
    pub orders: Vec<i32>,
}

fn join_orders(orders: &[i32]) -> String {
    orders.iter().join(", ")
}

/// Display orders used by more than one detail
///
/// # Returns
/// * `Vec<i32>` - Each colliding display order once, ascending
pub fn find_duplicate_display_orders(details: &[DetailRecord]) -> Vec<i32> {
    details
        .iter()
        .map(|detail| detail.display_order)
        .sorted_unstable()
        .tuple_windows()
        .filter(|(a, b)| a == b)
        .map(|(a, _)| a)
        .dedup()
        .collect()
}

/// Fail if any two details of a section share a display order
pub fn check_display_order(
    group_id: i64,
    details: &[DetailRecord],
) -> Result<(), DisplayOrderError> {
    let orders = find_duplicate_display_orders(details);
    if orders.is_empty() {
        Ok(())
    } else {
        Err(DisplayOrderError { group_id, orders })
    }
}

/// Renumber details 1..=n by their current display order
///
/// The sort is stable, so details sharing an order keep their relative
/// position in the slice. The slice is left sorted.
pub fn normalize_display_order(details: &mut [DetailRecord]) {
    details.sort_by_key(|detail| detail.display_order);
    for (position, detail) in (1..).zip(details.iter_mut()) {
        detail.display_order = position;
    }
}
