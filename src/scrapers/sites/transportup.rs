//! TransportUP aircraft directory.
//!
//! Each detail page has a short summary paragraph, a development stage shown
//! as a row of icons where only the current stage is coloured, a series of
//! `<strong>Label:</strong> value` paragraphs and a closing reference list.

use crate::scrapers::config::{ListingConfig, ListingPage, SiteConfig};
use crate::scrapers::rules::{FieldRule, Locator, Transform};

pub const ID: &str = "transportup";

/// Development stages in icon order.
pub const DEV_STAGES: [&str; 5] = [
    "preliminary design",
    "prototype build",
    "flight testing",
    "certification",
    "commercially operating",
];

/// Labelled detail paragraphs: (column, label on the page).
const DETAILS: [(&str, &str); 8] = [
    ("powerplant", "Powerplant"),
    ("range", "Range"),
    ("top_speed", "Top Speed"),
    ("propeller_configuration", "Propeller Configuration"),
    ("capacity", "Passenger/Payload Capacity"),
    ("autonomy_level", "Autonomy Level"),
    ("dimensions", "Wingspan/Dimensions"),
    ("key_suppliers", "Key Suppliers"),
];

pub fn site() -> SiteConfig {
    let mut fields = vec![
        FieldRule::new(
            "summary",
            Locator::Text {
                selector: "p".to_string(),
                index: 2,
            },
        )
        .with(Transform::NormalizeSpace),
        FieldRule::new(
            "dev_stage",
            Locator::Stage {
                selector: "i[data-x-icon]".to_string(),
                require: "color".to_string(),
                reject: "0%".to_string(),
                labels: DEV_STAGES.iter().map(|s| s.to_string()).collect(),
            },
        ),
    ];

    fields.extend(DETAILS.iter().map(|(column, label)| {
        FieldRule::new(
            column,
            Locator::Labeled {
                block: "p".to_string(),
                label: label.to_string(),
            },
        )
        .with(Transform::NormalizeSpace)
    }));

    fields.push(
        FieldRule::new(
            "references",
            Locator::LastList {
                selector: "ul".to_string(),
                attr: Some("href".to_string()),
            },
        )
        .with(Transform::Exclude("transportup".to_string())),
    );

    SiteConfig {
        id: ID.to_string(),
        name: "TransportUP".to_string(),
        base_url: "https://transportup.com".to_string(),
        listing: ListingConfig {
            pages: vec![
                ListingPage::with_category("https://transportup.com/evtol-aircraft/", "evtol"),
                ListingPage::with_category(
                    "https://transportup.com/hydrogen-aircraft/",
                    "hydrogen",
                ),
                ListingPage::with_category("https://transportup.com/market-aircraft/", "market"),
            ],
            link_selector: "article a, .x-entry-title a".to_string(),
            link_pattern: Some(r"^https://transportup\.com/aircraft/[^/?#]+/?$".to_string()),
            groups: None,
            next_selector: Some("a.next".to_string()),
            max_pages: 10,
        },
        fields,
        request_delay_ms: Some(5_000),
        request_jitter_ms: Some(2_000),
    }
}
