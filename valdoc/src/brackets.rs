//! Bracket mappings
//!
//! Detail content may embed placeholders such as `[Company Name]` or
//! `[Plan.EffectiveDate]` which are filled from company and plan data when the
//! document is previewed or exported. Stored content always keeps the raw
//! placeholders; resolution never feeds back into the change calculator.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Placeholder name to replacement text
pub type BracketMappings = BTreeMap<String, String>;

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\[([A-Za-z0-9_.\- ]+)\]").expect("placeholder pattern is valid")
    })
}

/// Result of resolving a piece of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Content with every known placeholder replaced
    pub text: String,
    /// Placeholders without a mapping, in order of first appearance
    pub unresolved: Vec<String>,
}

impl Resolved {
    /// Whether every placeholder had a mapping
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Placeholder names in order of appearance, repeats included
pub fn placeholders(content: &str) -> Vec<String> {
    placeholder_regex()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace placeholders in `content` with their mapped values
///
/// Lookup is case-sensitive. Placeholders without a mapping are left
/// verbatim and reported in [`Resolved::unresolved`].
///
/// # Parameters
/// * `content` - Markup possibly containing placeholders
/// * `mappings` - Values for known placeholders
pub fn resolve(content: &str, mappings: &BracketMappings) -> Resolved {
    let mut unresolved: Vec<String> = Vec::new();

    let text = placeholder_regex().replace_all(content, |caps: &Captures| {
        let name = &caps[1];
        match mappings.get(name) {
            Some(value) => value.clone(),
            None => {
                if !unresolved.iter().any(|u| u == name) {
                    unresolved.push(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    Resolved {
        text: text.into_owned(),
        unresolved,
    }
}
