//! evtol.news aircraft directory.
//!
//! The directory page lists aircraft as `<ol>` lists, one per category. The
//! category names are the `<strong>` labels of the page's paragraphs, after
//! an initial "Welcome" label.
//!
//! Detail pages open with a paragraph holding the model name in `<strong>`,
//! followed by line-broken OEM name, website link and postal address. The
//! next paragraph is the narrative description. Specifications and resources
//! are bullet lists that follow "Specifications:" and "Resources:" labels.

use crate::scrapers::config::{GroupConfig, ListingConfig, ListingPage, SiteConfig};
use crate::scrapers::rules::{FieldRule, LeadPart, Locator, Transform};

pub const ID: &str = "evtol_news";

fn lead(part: LeadPart) -> Locator {
    Locator::Lead {
        block: "p".to_string(),
        window: 2,
        part,
    }
}

fn list_after(label: &str, attr: Option<&str>) -> Locator {
    Locator::ListAfter {
        block: "p".to_string(),
        label: label.to_string(),
        attr: attr.map(str::to_string),
    }
}

pub fn site() -> SiteConfig {
    let heading = || Locator::Text {
        selector: "h1".to_string(),
        index: 0,
    };

    SiteConfig {
        id: ID.to_string(),
        name: "evtol.news".to_string(),
        base_url: "https://evtol.news".to_string(),
        listing: ListingConfig {
            pages: vec![ListingPage::new("https://evtol.news/aircraft")],
            link_selector: "li a".to_string(),
            link_pattern: Some(r"^https://evtol\.news/[^/?#]+/?$".to_string()),
            groups: Some(GroupConfig {
                selector: "ol".to_string(),
                label_selector: "p strong".to_string(),
                label_skip: 1,
            }),
            next_selector: None,
            max_pages: 1,
        },
        fields: vec![
            FieldRule::new("name", heading()).with(Transform::NormalizeSpace),
            FieldRule::new("status", heading()).with(Transform::Flag {
                contains: "defunct".to_string(),
                present: "defunct".to_string(),
                absent: "active".to_string(),
            }),
            FieldRule::new("model", lead(LeadPart::Label)).with(Transform::NormalizeSpace),
            FieldRule::new("oem", lead(LeadPart::AfterLabel)).with(Transform::NormalizeSpace),
            FieldRule::new("website", lead(LeadPart::Link)),
            FieldRule::new(
                "address",
                lead(LeadPart::Containing {
                    any_of: vec![",".to_string(), "USA".to_string()],
                }),
            )
            .with(Transform::NormalizeSpace),
            FieldRule::new("about", lead(LeadPart::Next)).with(Transform::NormalizeSpace),
            FieldRule::new("specifications", list_after("Specifications:", None))
                .with(Transform::NormalizeSpace),
            FieldRule::new("resources", list_after("Resources:", Some("href"))),
        ],
        request_delay_ms: Some(7_000),
        request_jitter_ms: Some(3_000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DirectoryEntry;
    use crate::services::extractor::extract_record;
    use scraper::Html;

    const PAGE: &str = r#"
        <html><body>
        <h1>A³ Vahana by Airbus (defunct)</h1>
        <p><strong>Vahana</strong><br/>Airbus A³<br/>
           <a href="https://www.airbus-sv.com">www.airbus-sv.com</a><br/>
           San Jose, California, USA</p>
        <p>Vahana was a single-seat tilt-wing demonstrator.</p>
        <p><strong>Specifications:</strong></p>
        <ul>
          <li>Aircraft type: eVTOL tilt-wing</li>
          <li>Cruise speed:&nbsp;120 mph</li>
        </ul>
        <p><strong>Resources:</strong></p>
        <ul>
          <li><a href="https://news.example/vahana">Vahana story</a></li>
        </ul>
        </body></html>
    "#;

    fn entry() -> DirectoryEntry {
        DirectoryEntry::new(
            "https://evtol.news/a3-by-airbus/".to_string(),
            "A³ Vahana".to_string(),
            Some("Vectored Thrust".to_string()),
        )
    }

    #[test]
    fn test_builtin_site_is_valid() {
        assert!(site().validate().is_ok());
    }

    #[test]
    fn test_extracts_detail_page() {
        let record = extract_record(&site(), &entry(), &Html::parse_document(PAGE));

        assert_eq!(record.get("name"), Some("A³ Vahana by Airbus (defunct)"));
        assert_eq!(record.get("status"), Some("defunct"));
        assert_eq!(record.get("model"), Some("Vahana"));
        assert_eq!(record.get("oem"), Some("Airbus A³"));
        assert_eq!(record.get("website"), Some("https://www.airbus-sv.com"));
        assert_eq!(record.get("address"), Some("San Jose, California, USA"));
        assert_eq!(
            record.get("about"),
            Some("Vahana was a single-seat tilt-wing demonstrator.")
        );
        assert_eq!(
            record.get("specifications"),
            Some("Aircraft type: eVTOL tilt-wing; Cruise speed: 120 mph")
        );
        assert_eq!(
            record.get("resources"),
            Some("https://news.example/vahana")
        );
        assert_eq!(record.category.as_deref(), Some("Vectored Thrust"));
    }

    #[test]
    fn test_sparse_page_yields_nulls() {
        let html = "<html><body><h1>Mystery Craft</h1><p>No details yet.</p></body></html>";
        let record = extract_record(&site(), &entry(), &Html::parse_document(html));

        assert_eq!(record.get("name"), Some("Mystery Craft"));
        assert_eq!(record.get("status"), Some("active"));
        for field in ["model", "oem", "website", "address", "about", "specifications", "resources"] {
            assert_eq!(record.get(field), None, "{field} should be null");
        }
        assert_eq!(record.fields.len(), site().fields.len());
    }
}
