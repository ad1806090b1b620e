//! Link extraction from listing pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::config::ListingConfig;
use super::rules::locate::element_text;
use super::rules::transform::normalize_space;

/// A detail link found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    pub url: String,
    pub display_name: String,
    pub category: Option<String>,
}

/// Resolve an `href` against the page it was found on.
///
/// Returns `None` for empty, fragment-only, `javascript:`, `mailto:` and
/// `tel:` links. The fragment of the resolved URL is dropped.
pub fn resolve_href(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }

    let mut resolved = match Url::parse(href) {
        Ok(url) => url,
        Err(_) => Url::parse(page_url).ok()?.join(href).ok()?,
    };
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Label for a link without text: last path segment, dashes as spaces.
pub fn name_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .replace(['-', '_'], " ")
}

fn link_from_element(
    element: ElementRef<'_>,
    page_url: &str,
    pattern: Option<&Regex>,
    category: Option<&str>,
) -> Option<ListingLink> {
    let url = resolve_href(page_url, element.value().attr("href")?)?;
    if let Some(pattern) = pattern {
        if !pattern.is_match(&url) {
            return None;
        }
    }

    let mut display_name = normalize_space(&element_text(element));
    if display_name.is_empty() {
        display_name = name_from_url(&url);
    }

    Some(ListingLink {
        url,
        display_name,
        category: category.map(str::to_string),
    })
}

/// Extract detail links from one listing page, in document order.
///
/// Duplicate urls are kept; the directory merge decides which one wins.
pub fn extract_listing_links(
    html: &str,
    page_url: &str,
    listing: &ListingConfig,
    pattern: Option<&Regex>,
    page_category: Option<&str>,
) -> Vec<ListingLink> {
    let document = Html::parse_document(html);
    let link_sel = match Selector::parse(&listing.link_selector) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let Some(ref groups) = listing.groups else {
        return document
            .select(&link_sel)
            .filter_map(|el| link_from_element(el, page_url, pattern, page_category))
            .collect();
    };

    let (Ok(group_sel), Ok(label_sel)) = (
        Selector::parse(&groups.selector),
        Selector::parse(&groups.label_selector),
    ) else {
        return Vec::new();
    };

    let labels: Vec<String> = document
        .select(&label_sel)
        .map(|el| normalize_space(&element_text(el)))
        .skip(groups.label_skip)
        .collect();

    let mut links = Vec::new();
    for (index, group) in document.select(&group_sel).enumerate() {
        // Fall back to the listing's own category when labels run out
        let category = labels.get(index).map(String::as_str).or(page_category);
        links.extend(
            group
                .select(&link_sel)
                .filter_map(|el| link_from_element(el, page_url, pattern, category)),
        );
    }
    links
}

/// URL of the next listing page, if the page links to one.
pub fn next_page_url(html: &str, page_url: &str, next_selector: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(next_selector).ok()?;
    document
        .select(&selector)
        .find_map(|el| el.value().attr("href"))
        .and_then(|href| resolve_href(page_url, href))
        .filter(|next| next != page_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::config::GroupConfig;

    #[test]
    fn test_resolve_href() {
        let page = "https://evtol.news/aircraft";
        assert_eq!(
            resolve_href(page, "/a3-by-airbus/"),
            Some("https://evtol.news/a3-by-airbus/".to_string())
        );
        assert_eq!(
            resolve_href(page, "https://other.example/x#top"),
            Some("https://other.example/x".to_string())
        );
        assert_eq!(
            resolve_href(page, "//cdn.example/y"),
            Some("https://cdn.example/y".to_string())
        );
        assert_eq!(resolve_href(page, "#section"), None);
        assert_eq!(resolve_href(page, "mailto:a@b.c"), None);
        assert_eq!(resolve_href(page, "javascript:void(0)"), None);
        assert_eq!(resolve_href(page, ""), None);
    }

    #[test]
    fn test_name_from_url() {
        assert_eq!(name_from_url("https://evtol.news/a3-by-airbus/"), "a3 by airbus");
    }

    #[test]
    fn test_flat_listing_with_pattern() {
        let html = r#"
            <a href="/aircraft/a">Aircraft A</a>
            <a href="/about">About</a>
            <a href="/aircraft/b"><img src="b.png"></a>
        "#;
        let listing = ListingConfig::default();
        let pattern = Regex::new(r"/aircraft/[^/]+$").unwrap();
        let links = extract_listing_links(
            html,
            "https://site.example/list",
            &listing,
            Some(&pattern),
            Some("market"),
        );

        assert_eq!(
            links,
            vec![
                ListingLink {
                    url: "https://site.example/aircraft/a".to_string(),
                    display_name: "Aircraft A".to_string(),
                    category: Some("market".to_string()),
                },
                ListingLink {
                    url: "https://site.example/aircraft/b".to_string(),
                    display_name: "b".to_string(),
                    category: Some("market".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_grouped_listing_assigns_categories() {
        let html = r#"
            <p><strong>Welcome</strong></p>
            <p><strong>Vectored Thrust</strong></p>
            <ol><li><a href="/a/">A</a></li><li><a href="/b/">B</a></li></ol>
            <p><strong>Lift + Cruise</strong></p>
            <ol><li><a href="/c/">C</a></li><li>no link</li></ol>
        "#;
        let listing = ListingConfig {
            link_selector: "li a".to_string(),
            groups: Some(GroupConfig {
                selector: "ol".to_string(),
                label_selector: "p strong".to_string(),
                label_skip: 1,
            }),
            ..Default::default()
        };
        let links = extract_listing_links(html, "https://evtol.news/aircraft", &listing, None, None);

        let pairs: Vec<(&str, Option<&str>)> = links
            .iter()
            .map(|l| (l.url.as_str(), l.category.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("https://evtol.news/a/", Some("Vectored Thrust")),
                ("https://evtol.news/b/", Some("Vectored Thrust")),
                ("https://evtol.news/c/", Some("Lift + Cruise")),
            ]
        );
    }

    #[test]
    fn test_next_page_url() {
        let html = r#"<a class="next" href="?page=2">Next</a>"#;
        assert_eq!(
            next_page_url(html, "https://site.example/list", "a.next"),
            Some("https://site.example/list?page=2".to_string())
        );
        assert_eq!(next_page_url("<p>end</p>", "https://site.example/list", "a.next"), None);
    }
}
