//! Declarative field rules.
//!
//! A field rule pairs a structural [`Locator`] with a list of text
//! [`Transform`]s. Rules are plain data so a site's markup can change
//! without touching extraction logic:
//!
//! ```toml
//! [[sites.evtol_news.fields]]
//! name = "model"
//! locator = { kind = "lead", block = "p", window = 2, part = "label" }
//! transforms = ["normalize_space"]
//! ```

pub(crate) mod locate;
pub(crate) mod transform;

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use transform::apply_transforms;

/// Separator used when a multi-valued field is stored as one cell.
pub const VALUE_SEPARATOR: &str = "; ";

/// One named output field and how to extract it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub locator: Locator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,
}

impl FieldRule {
    pub fn new(name: &str, locator: Locator) -> Self {
        Self {
            name: name.to_string(),
            locator,
            transforms: Vec::new(),
        }
    }

    pub fn with(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Extract this field from a parsed page.
    ///
    /// Returns `None` when the locator matched nothing or every located item
    /// was emptied by the transforms.
    pub fn extract(&self, document: &Html) -> Option<String> {
        let located = self.locator.locate(document);
        let items = apply_transforms(located, &self.transforms);
        if items.is_empty() {
            debug!(field = %self.name, "No value located");
            return None;
        }
        Some(items.join(VALUE_SEPARATOR))
    }

    /// Check that every selector in the locator parses and that no transform
    /// has an empty needle.
    pub fn validate(&self) -> Result<(), String> {
        for selector in self.locator.selectors() {
            Selector::parse(selector)
                .map_err(|e| format!("field '{}': bad selector '{}': {}", self.name, selector, e))?;
        }
        for transform in &self.transforms {
            let (kind, needle) = match transform {
                Transform::Split(s) => ("split", s),
                Transform::Select(s) => ("select", s),
                Transform::Exclude(s) => ("exclude", s),
                _ => continue,
            };
            if needle.is_empty() {
                return Err(format!("field '{}': empty {} argument", self.name, kind));
            }
        }
        Ok(())
    }
}

/// Where a field's text lives in the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Text of the `index`-th element matching `selector`.
    Text {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    /// Attribute of the first matching element that carries it.
    Attr { selector: String, attr: String },
    /// Text following the `<strong>` label of the first `block` whose label
    /// equals `label` (trailing colon and case ignored).
    Labeled { block: String, label: String },
    /// Items of the first list following the first `block` containing `label`.
    ListAfter {
        block: String,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
    },
    /// Items of the last list matching `selector`.
    LastList {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attr: Option<String>,
    },
    /// Part of the lead block: the first of the first `window` blocks that
    /// contains a `<strong>` label.
    Lead {
        block: String,
        window: usize,
        part: LeadPart,
    },
    /// Label for the position of the first `selector` match whose markup
    /// contains `require` and not `reject`.
    Stage {
        selector: String,
        require: String,
        reject: String,
        labels: Vec<String>,
    },
}

impl Locator {
    /// Selectors this locator will parse.
    fn selectors(&self) -> Vec<&str> {
        match self {
            Locator::Text { selector, .. }
            | Locator::Attr { selector, .. }
            | Locator::LastList { selector, .. }
            | Locator::Stage { selector, .. } => vec![selector.as_str()],
            Locator::Labeled { block, .. }
            | Locator::ListAfter { block, .. }
            | Locator::Lead { block, .. } => vec![block.as_str()],
        }
    }

    /// Locate raw text items in a document.
    pub fn locate(&self, document: &Html) -> Vec<String> {
        match self {
            Locator::Text { selector, index } => locate::text(document, selector, *index),
            Locator::Attr { selector, attr } => locate::attr(document, selector, attr),
            Locator::Labeled { block, label } => locate::labeled(document, block, label),
            Locator::ListAfter { block, label, attr } => {
                locate::list_after(document, block, label, attr.as_deref())
            }
            Locator::LastList { selector, attr } => {
                locate::last_list(document, selector, attr.as_deref())
            }
            Locator::Lead {
                block,
                window,
                part,
            } => locate::lead(document, block, *window, part),
            Locator::Stage {
                selector,
                require,
                reject,
                labels,
            } => locate::stage(document, selector, require, reject, labels),
        }
    }
}

/// Which part of the lead block to take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadPart {
    /// Text of the `<strong>` label.
    Label,
    /// First non-`<br>` node after the label.
    AfterLabel,
    /// `href` of the first link.
    Link,
    /// First child whose text contains any of the markers.
    Containing { any_of: Vec<String> },
    /// Text of the block right after the lead block.
    Next,
}

/// Text cleanup applied to each located item, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Replace non-breaking spaces and line breaks, collapse whitespace.
    NormalizeSpace,
    /// Drop a leading label (case-insensitive).
    StripPrefix(String),
    /// Remove every occurrence of a substring.
    Remove(String),
    /// Split each item on a delimiter.
    Split(String),
    /// Keep only items containing the substring.
    Select(String),
    /// Drop items containing the substring.
    Exclude(String),
    /// Replace the item with `present` or `absent` depending on whether it
    /// contains `contains` (case-insensitive).
    Flag {
        contains: String,
        present: String,
        absent: String,
    },
}
