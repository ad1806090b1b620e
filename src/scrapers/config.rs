//! Site definition types.
//!
//! These structs define the serde-configurable behavior for each site,
//! including listing discovery and the per-field extraction rules.

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rules::FieldRule;

/// Error in a site definition.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Unknown site: {0}")]
    UnknownSite(String),
    #[error("Site '{site}': invalid selector '{selector}'")]
    InvalidSelector { site: String, selector: String },
    #[error("Site '{site}': invalid link pattern: {source}")]
    InvalidPattern {
        site: String,
        #[source]
        source: regex::Error,
    },
    #[error("Site '{site}': {reason}")]
    InvalidRule { site: String, reason: String },
}

/// Everything needed to scrape one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Stable identifier used in file names. Taken from the table key when
    /// the site comes from a config file.
    #[serde(default)]
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Base URL used to resolve relative links.
    pub base_url: String,
    pub listing: ListingConfig,
    /// Ordered extraction rules; results columns follow this order.
    pub fields: Vec<FieldRule>,
    /// Politeness delay override in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    /// Random extra delay override in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_jitter_ms: Option<u64>,
}

impl SiteConfig {
    /// Names of the extracted fields, in output order.
    pub fn columns(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Compiled link pattern, if one is configured.
    pub fn link_pattern(&self) -> Result<Option<Regex>, SiteError> {
        self.listing
            .link_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| SiteError::InvalidPattern {
                site: self.id.clone(),
                source,
            })
    }

    /// Check selectors, patterns and field names before any request is made.
    pub fn validate(&self) -> Result<(), SiteError> {
        let mut selectors = vec![self.listing.link_selector.as_str()];
        if let Some(ref groups) = self.listing.groups {
            selectors.push(&groups.selector);
            selectors.push(&groups.label_selector);
        }
        if let Some(ref next) = self.listing.next_selector {
            selectors.push(next);
        }
        for selector in selectors {
            if Selector::parse(selector).is_err() {
                return Err(SiteError::InvalidSelector {
                    site: self.id.clone(),
                    selector: selector.to_string(),
                });
            }
        }

        self.link_pattern()?;

        let mut names = std::collections::HashSet::new();
        for rule in &self.fields {
            if matches!(rule.name.as_str(), "url" | "display_name" | "category") {
                return Err(SiteError::InvalidRule {
                    site: self.id.clone(),
                    reason: format!("field name '{}' is reserved", rule.name),
                });
            }
            if !names.insert(rule.name.as_str()) {
                return Err(SiteError::InvalidRule {
                    site: self.id.clone(),
                    reason: format!("duplicate field '{}'", rule.name),
                });
            }
            rule.validate().map_err(|reason| SiteError::InvalidRule {
                site: self.id.clone(),
                reason,
            })?;
        }
        Ok(())
    }
}

/// How to find detail links on listing pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingConfig {
    pub pages: Vec<ListingPage>,
    /// Selector for detail links (searched inside each group when grouped).
    #[serde(default = "default_link_selector")]
    pub link_selector: String,
    /// Regex the resolved link URL must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupConfig>,
    /// Selector for the "next page" link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_selector: Option<String>,
    /// Maximum pages followed per listing source, including the first.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            link_selector: default_link_selector(),
            link_pattern: None,
            groups: None,
            next_selector: None,
            max_pages: default_max_pages(),
        }
    }
}

fn default_link_selector() -> String {
    "a".to_string()
}

fn default_max_pages() -> u32 {
    1
}

/// One listing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    pub url: String,
    /// Category assigned to every link on this listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ListingPage {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            category: None,
        }
    }

    pub fn with_category(url: &str, category: &str) -> Self {
        Self {
            url: url.to_string(),
            category: Some(category.to_string()),
        }
    }
}

/// Listing pages that group links under labelled sections.
///
/// The n-th element matching `selector` takes its category from the n-th
/// element matching `label_selector`, after skipping `label_skip` labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub selector: String,
    pub label_selector: String,
    #[serde(default)]
    pub label_skip: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::rules::{Locator, Transform};

    fn site() -> SiteConfig {
        SiteConfig {
            id: "test".to_string(),
            name: "Test".to_string(),
            base_url: "https://example.com".to_string(),
            listing: ListingConfig {
                pages: vec![ListingPage::new("https://example.com/list")],
                ..Default::default()
            },
            fields: vec![FieldRule::new(
                "name",
                Locator::Text {
                    selector: "h1".to_string(),
                    index: 0,
                },
            )],
            request_delay_ms: None,
            request_jitter_ms: None,
        }
    }

    #[test]
    fn test_valid_site() {
        assert!(site().validate().is_ok());
        assert_eq!(site().columns(), vec!["name"]);
    }

    #[test]
    fn test_invalid_link_selector() {
        let mut s = site();
        s.listing.link_selector = "a[".to_string();
        assert!(matches!(
            s.validate(),
            Err(SiteError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut s = site();
        s.listing.link_pattern = Some("(unclosed".to_string());
        assert!(matches!(s.validate(), Err(SiteError::InvalidPattern { .. })));
    }

    #[test]
    fn test_reserved_and_duplicate_fields() {
        let mut s = site();
        s.fields.push(s.fields[0].clone());
        assert!(matches!(s.validate(), Err(SiteError::InvalidRule { .. })));

        let mut s = site();
        s.fields[0].name = "url".to_string();
        assert!(matches!(s.validate(), Err(SiteError::InvalidRule { .. })));
    }

    #[test]
    fn test_empty_split_delimiter_is_invalid_rule() {
        let mut s = site();
        s.fields[0].transforms.push(Transform::Split(String::new()));
        assert!(matches!(s.validate(), Err(SiteError::InvalidRule { .. })));
    }

    #[test]
    fn test_listing_defaults_from_toml() {
        let listing: ListingConfig = toml::from_str(
            r#"
            pages = [{ url = "https://example.com/a", category = "market" }]
            "#,
        )
        .unwrap();
        assert_eq!(listing.link_selector, "a");
        assert_eq!(listing.max_pages, 1);
        assert_eq!(listing.pages[0].category.as_deref(), Some("market"));
    }
}
