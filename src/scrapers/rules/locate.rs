//! Locator implementations over a parsed document.
//!
//! Every function returns raw, untrimmed text items; an empty vector means
//! the locator matched nothing.

use scraper::{ElementRef, Html, Node, Selector};

use super::LeadPart;

fn parse(selector: &str) -> Option<Selector> {
    Selector::parse(selector).ok()
}

/// Concatenated text of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text of a list item or its first link's attribute.
fn list_items(list: ElementRef<'_>, attr: Option<&str>) -> Vec<String> {
    let (Some(li), Some(a)) = (parse("li"), parse("a")) else {
        return Vec::new();
    };

    list.select(&li)
        .filter_map(|item| match attr {
            Some(attr) => item
                .select(&a)
                .find_map(|link| link.value().attr(attr))
                .map(str::to_string),
            None => Some(element_text(item)),
        })
        .collect()
}

pub fn text(document: &Html, selector: &str, index: usize) -> Vec<String> {
    let Some(sel) = parse(selector) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .nth(index)
        .map(element_text)
        .into_iter()
        .collect()
}

pub fn attr(document: &Html, selector: &str, attr: &str) -> Vec<String> {
    let Some(sel) = parse(selector) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .find_map(|el| el.value().attr(attr))
        .map(str::to_string)
        .into_iter()
        .collect()
}

fn normalize_label(label: &str) -> String {
    label.trim().trim_end_matches(':').trim().to_lowercase()
}

pub fn labeled(document: &Html, block: &str, label: &str) -> Vec<String> {
    let (Some(block_sel), Some(strong_sel)) = (parse(block), parse("strong")) else {
        return Vec::new();
    };
    let wanted = normalize_label(label);

    for candidate in document.select(&block_sel) {
        let Some(strong) = candidate.select(&strong_sel).next() else {
            continue;
        };
        if normalize_label(&element_text(strong)) != wanted {
            continue;
        }

        let mut value = String::new();
        for sibling in strong.next_siblings() {
            if let Some(el) = ElementRef::wrap(sibling) {
                if el.value().name() == "br" {
                    value.push(' ');
                } else {
                    value.push_str(&element_text(el));
                }
            } else if let Node::Text(t) = sibling.value() {
                value.push_str(&t.text);
            }
        }
        return vec![value];
    }

    Vec::new()
}

pub fn list_after(document: &Html, block: &str, label: &str, attr: Option<&str>) -> Vec<String> {
    let Some(block_sel) = parse(block) else {
        return Vec::new();
    };

    let Some(anchor) = document
        .select(&block_sel)
        .find(|el| element_text(*el).contains(label))
    else {
        return Vec::new();
    };

    anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "ul" | "ol"))
        .map(|list| list_items(list, attr))
        .unwrap_or_default()
}

pub fn last_list(document: &Html, selector: &str, attr: Option<&str>) -> Vec<String> {
    let Some(sel) = parse(selector) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .last()
        .map(|list| list_items(list, attr))
        .unwrap_or_default()
}

pub fn lead(document: &Html, block: &str, window: usize, part: &LeadPart) -> Vec<String> {
    let (Some(block_sel), Some(strong_sel)) = (parse(block), parse("strong")) else {
        return Vec::new();
    };

    let blocks: Vec<ElementRef<'_>> = document.select(&block_sel).collect();
    let Some(lead_index) = blocks
        .iter()
        .take(window)
        .position(|b| b.select(&strong_sel).next().is_some())
    else {
        return Vec::new();
    };
    let lead = blocks[lead_index];

    let value = match part {
        LeadPart::Label => lead.select(&strong_sel).next().map(element_text),
        LeadPart::AfterLabel => after_label(lead, &strong_sel),
        LeadPart::Link => parse("a[href]").and_then(|a| {
            lead.select(&a)
                .find_map(|link| link.value().attr("href"))
                .map(str::to_string)
        }),
        LeadPart::Containing { any_of } => containing(lead, any_of),
        LeadPart::Next => blocks.get(lead_index + 1).map(|el| element_text(*el)),
    };

    value.into_iter().collect()
}

/// First meaningful node after the block's `<strong>` label, skipping line
/// breaks and whitespace-only text.
fn after_label(block: ElementRef<'_>, strong_sel: &Selector) -> Option<String> {
    let strong = block
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "strong")
        .or_else(|| block.select(strong_sel).next())?;

    for sibling in strong.next_siblings() {
        if let Some(el) = ElementRef::wrap(sibling) {
            if el.value().name() == "br" {
                continue;
            }
            let text = element_text(el);
            if !text.trim().is_empty() {
                return Some(text);
            }
        } else if let Node::Text(t) = sibling.value() {
            if !t.text.trim().is_empty() {
                return Some(String::from(&*t.text));
            }
        }
    }
    None
}

fn containing(block: ElementRef<'_>, markers: &[String]) -> Option<String> {
    for child in block.children() {
        let text = if let Some(el) = ElementRef::wrap(child) {
            element_text(el)
        } else if let Node::Text(t) = child.value() {
            String::from(&*t.text)
        } else {
            continue;
        };
        if markers.iter().any(|m| text.contains(m.as_str())) {
            return Some(text);
        }
    }
    None
}

pub fn stage(
    document: &Html,
    selector: &str,
    require: &str,
    reject: &str,
    labels: &[String],
) -> Vec<String> {
    let Some(sel) = parse(selector) else {
        return Vec::new();
    };
    document
        .select(&sel)
        .position(|el| {
            let markup = el.html();
            markup.contains(require) && !markup.contains(reject)
        })
        .and_then(|index| labels.get(index).cloned())
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVTOL_PAGE: &str = r#"
        <html><body>
        <h1>Skyway X2 (defunct)</h1>
        <p>Intro without label</p>
        <p><strong>Skyway X2</strong><br/>Skyway Aero&nbsp;Inc.<br/>
           <a href="https://skyway.example">www.skyway.example</a><br/>
           123 Main St, Springfield, USA</p>
        <p>The X2 is a two-seat multicopter.</p>
        <p><strong>Specifications:</strong></p>
        <ul><li>Range: 30 km</li><li>Seats: 2</li></ul>
        <p><strong>Resources:</strong></p>
        <ul>
          <li><a href="https://news.example/1">Story 1</a></li>
          <li>No link here</li>
          <li><a href="https://news.example/2">Story 2</a></li>
        </ul>
        </body></html>
    "#;

    fn doc() -> Html {
        Html::parse_document(EVTOL_PAGE)
    }

    #[test]
    fn test_text_nth() {
        assert_eq!(
            text(&doc(), "p", 2),
            vec!["The X2 is a two-seat multicopter."]
        );
        assert_eq!(text(&doc(), "h1", 0), vec!["Skyway X2 (defunct)"]);
        assert!(text(&doc(), "p", 40).is_empty());
        assert!(text(&doc(), "table", 0).is_empty());
    }

    #[test]
    fn test_lead_parts() {
        let d = doc();
        assert_eq!(lead(&d, "p", 2, &LeadPart::Label), vec!["Skyway X2"]);
        assert_eq!(
            lead(&d, "p", 2, &LeadPart::AfterLabel),
            vec!["Skyway Aero\u{a0}Inc."]
        );
        assert_eq!(
            lead(&d, "p", 2, &LeadPart::Link),
            vec!["https://skyway.example"]
        );
        let address = lead(
            &d,
            "p",
            2,
            &LeadPart::Containing {
                any_of: vec![",".to_string(), "USA".to_string()],
            },
        );
        assert_eq!(address.len(), 1);
        assert_eq!(address[0].trim(), "123 Main St, Springfield, USA");
        assert_eq!(
            lead(&d, "p", 2, &LeadPart::Next),
            vec!["The X2 is a two-seat multicopter."]
        );
    }

    #[test]
    fn test_lead_outside_window_is_missing() {
        let d = Html::parse_document("<p>a</p><p>b</p><p><strong>late</strong></p>");
        assert!(lead(&d, "p", 2, &LeadPart::Label).is_empty());
    }

    #[test]
    fn test_list_after_text_and_links() {
        let d = doc();
        assert_eq!(
            list_after(&d, "p", "Specifications:", None),
            vec!["Range: 30 km", "Seats: 2"]
        );
        assert_eq!(
            list_after(&d, "p", "Resources:", Some("href")),
            vec!["https://news.example/1", "https://news.example/2"]
        );
        assert!(list_after(&d, "p", "Gallery:", None).is_empty());
    }

    #[test]
    fn test_labeled_value() {
        let d = Html::parse_document(
            "<p><strong>Powerplant:</strong> Battery electric</p>\
             <p><strong>Range: </strong>150 km<br/>(est.)</p>",
        );
        assert_eq!(labeled(&d, "p", "Powerplant")[0].trim(), "Battery electric");
        assert_eq!(labeled(&d, "p", "range:")[0].trim(), "150 km (est.)");
        assert!(labeled(&d, "p", "Top Speed").is_empty());
    }

    #[test]
    fn test_last_list() {
        let d = Html::parse_document(
            r#"<ul><li><a href="/menu">Menu</a></li></ul>
               <ul><li><a href="https://a.example">A</a></li></ul>"#,
        );
        assert_eq!(
            last_list(&d, "ul", Some("href")),
            vec!["https://a.example"]
        );
    }

    #[test]
    fn test_stage_first_colored_marker() {
        let labels: Vec<String> = ["design", "prototype", "flight testing"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let d = Html::parse_document(
            r#"<i data-x-icon="a" style="color: rgba(0,0,0,0%)"></i>
               <i data-x-icon="b"></i>
               <i data-x-icon="c" style="color: #0a0"></i>"#,
        );
        assert_eq!(
            stage(&d, "i[data-x-icon]", "color", "0%", &labels),
            vec!["flight testing"]
        );

        let d = Html::parse_document(r#"<i data-x-icon="a"></i>"#);
        assert!(stage(&d, "i[data-x-icon]", "color", "0%", &labels).is_empty());
    }
}
