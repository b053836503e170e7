//! Detail record model
//!
//! A detail is one paragraph-like unit of content inside a section of a VAL
//! document. The change calculator compares these records field by field.

use serde::{Deserialize, Serialize};

/// One content unit within a section
///
/// Formatting flags are kept as `Option` so that an absent flag, an explicit
/// `null` and `false` survive a round trip and compare as distinct values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailRecord {
    /// Stable identifier, `None` or empty for records not yet persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Owning document identifier
    pub val_id: Option<i64>,

    /// Owning section identifier
    pub group_id: Option<i64>,

    /// Rich-text markup, may embed bracket placeholders
    pub content: String,

    /// Rendered as a bullet item
    pub bullet: Option<bool>,

    /// Indentation depth
    pub indent: Option<i32>,

    /// Bold formatting
    pub bold: Option<bool>,

    /// Centered alignment
    pub center: Option<bool>,

    /// Emit a blank line after this detail
    pub blank_line_after: Option<bool>,

    /// Use the reduced line height
    pub tight_line_height: Option<bool>,

    /// Position within the section (not necessarily contiguous)
    pub display_order: i32,
}

impl DetailRecord {
    /// Create an unpersisted detail with no formatting
    ///
    /// # Parameters
    /// * `content` - Markup body of the detail
    /// * `display_order` - Position within the section
    pub fn new(content: impl Into<String>, display_order: i32) -> Self {
        Self {
            content: content.into(),
            display_order,
            ..Self::default()
        }
    }

    /// Set the persisted identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Copy every formatting flag from `flags`
    pub fn with_flags(mut self, flags: &DetailFlags) -> Self {
        self.bullet = flags.bullet;
        self.indent = flags.indent;
        self.bold = flags.bold;
        self.center = flags.center;
        self.blank_line_after = flags.blank_line_after;
        self.tight_line_height = flags.tight_line_height;
        self
    }

    /// Identifier of a persisted record
    ///
    /// # Returns
    /// * `Some(id)` - The record has a non-empty identifier
    /// * `None` - The id is absent or empty, so the record is new
    pub fn persisted_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether the record has been persisted by the server
    pub fn is_persisted(&self) -> bool {
        self.persisted_id().is_some()
    }

    /// Formatting flags of this record
    pub fn flags(&self) -> DetailFlags {
        DetailFlags {
            bullet: self.bullet,
            indent: self.indent,
            bold: self.bold,
            center: self.center,
            blank_line_after: self.blank_line_after,
            tight_line_height: self.tight_line_height,
        }
    }

    /// Compare the fields the change calculator tracks
    ///
    /// Identity and ownership (`id`, `val_id`, `group_id`) are ignored.
    /// Values are compared strictly: `None` and `Some(false)` differ.
    pub fn same_fields(&self, other: &DetailRecord) -> bool {
        self.content == other.content
            && self.flags() == other.flags()
            && self.display_order == other.display_order
    }

    /// Names of tracked fields that differ between `self` and `other`
    pub fn changed_fields(&self, other: &DetailRecord) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.content != other.content {
            fields.push("content");
        }
        if self.bullet != other.bullet {
            fields.push("bullet");
        }
        if self.indent != other.indent {
            fields.push("indent");
        }
        if self.bold != other.bold {
            fields.push("bold");
        }
        if self.center != other.center {
            fields.push("center");
        }
        if self.blank_line_after != other.blank_line_after {
            fields.push("blankLineAfter");
        }
        if self.tight_line_height != other.tight_line_height {
            fields.push("tightLineHeight");
        }
        if self.display_order != other.display_order {
            fields.push("displayOrder");
        }
        fields
    }

    /// Copy of this record owned by the given document and section
    pub(crate) fn stamped(&self, val_id: i64, group_id: i64) -> DetailRecord {
        DetailRecord {
            val_id: Some(val_id),
            group_id: Some(group_id),
            ..self.clone()
        }
    }
}

/// Formatting flags of a detail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailFlags {
    /// Bullet item
    pub bullet: Option<bool>,
    /// Indentation depth
    pub indent: Option<i32>,
    /// Bold
    pub bold: Option<bool>,
    /// Centered
    pub center: Option<bool>,
    /// Blank line after
    pub blank_line_after: Option<bool>,
    /// Tight line height
    pub tight_line_height: Option<bool>,
}
