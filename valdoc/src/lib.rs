//! valdoc - change tracking for VAL document builders
//!
//! Reconciles the editable, per-section detail lists of a VAL document with
//! their last saved state and produces the ordered create/update/delete list
//! that a single save request persists.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregate;
pub mod brackets;
pub mod builder_config;
pub mod changes;
pub mod detail;
pub mod display_order;
pub mod section_state;
pub mod session;
pub mod snapshot;

pub use aggregate::aggregate_all_changes;
pub use changes::{calculate_changes, ChangeAction, ChangeRecord, ChangeSummary};
pub use detail::{DetailFlags, DetailRecord};
pub use section_state::{SectionChangeState, SectionStates};
pub use session::{BuilderSession, MemoryStore, SaveCoordinator, SaveError, SessionError};
