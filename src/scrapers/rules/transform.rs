//! Text cleanup transforms.

use super::Transform;

/// Collapse runs of whitespace (including non-breaking spaces and CRLF) to a
/// single space.
pub fn normalize_space(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> &'a str {
    let trimmed = text.trim_start();
    match trimmed.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &trimmed[prefix.len()..],
        _ => text,
    }
}

fn apply_one(items: Vec<String>, transform: &Transform) -> Vec<String> {
    match transform {
        Transform::NormalizeSpace => items.iter().map(|s| normalize_space(s)).collect(),
        Transform::StripPrefix(prefix) => items
            .iter()
            .map(|s| strip_prefix_ci(s, prefix).to_string())
            .collect(),
        Transform::Remove(needle) => items.iter().map(|s| s.replace(needle.as_str(), "")).collect(),
        Transform::Split(delimiter) => items
            .iter()
            .flat_map(|s| s.split(delimiter.as_str()).map(str::to_string))
            .collect(),
        Transform::Select(needle) => items
            .into_iter()
            .filter(|s| s.contains(needle.as_str()))
            .collect(),
        Transform::Exclude(needle) => items
            .into_iter()
            .filter(|s| !s.contains(needle.as_str()))
            .collect(),
        Transform::Flag {
            contains,
            present,
            absent,
        } => {
            let needle = contains.to_lowercase();
            items
                .iter()
                .map(|s| {
                    if s.to_lowercase().contains(&needle) {
                        present.clone()
                    } else {
                        absent.clone()
                    }
                })
                .collect()
        }
    }
}

/// Run transforms over located items.
///
/// Items are trimmed and empty items dropped after every step, so the result
/// holds only meaningful values.
pub fn apply_transforms(items: Vec<String>, transforms: &[Transform]) -> Vec<String> {
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };

    transforms
        .iter()
        .fold(clean(items), |items, transform| clean(apply_one(items, transform)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_space() {
        assert_eq!(
            normalize_space(" Acme\u{a0}Aero\r\n  Inc. "),
            "Acme Aero Inc."
        );
    }

    #[test]
    fn test_trim_and_drop_empty_without_transforms() {
        assert_eq!(
            apply_transforms(items(&["  a ", "   ", ""]), &[]),
            items(&["a"])
        );
    }

    #[test]
    fn test_strip_prefix_case_insensitive() {
        let out = apply_transforms(
            items(&["Range: 100 km", "range:200 km", "Seats: 4"]),
            &[Transform::StripPrefix("RANGE:".to_string())],
        );
        assert_eq!(out, items(&["100 km", "200 km", "Seats: 4"]));
    }

    #[test]
    fn test_split_select_exclude() {
        let out = apply_transforms(
            items(&["Joby, Toyota , Delta", "Uber"]),
            &[
                Transform::Split(",".to_string()),
                Transform::Exclude("Delta".to_string()),
            ],
        );
        assert_eq!(out, items(&["Joby", "Toyota", "Uber"]));

        let out = apply_transforms(
            items(&["Range: 30 km", "Seats: 2"]),
            &[Transform::Select("Seats".to_string())],
        );
        assert_eq!(out, items(&["Seats: 2"]));
    }

    #[test]
    fn test_remove_label_colon() {
        let out = apply_transforms(
            items(&["Key Suppliers:"]),
            &[Transform::Remove(":".to_string())],
        );
        assert_eq!(out, items(&["Key Suppliers"]));
    }

    #[test]
    fn test_flag() {
        let flag = Transform::Flag {
            contains: "defunct".to_string(),
            present: "defunct".to_string(),
            absent: "active".to_string(),
        };
        assert_eq!(
            apply_transforms(items(&["Skyway X2 (Defunct)"]), &[flag.clone()]),
            items(&["defunct"])
        );
        assert_eq!(
            apply_transforms(items(&["Skyway X3"]), &[flag.clone()]),
            items(&["active"])
        );
        // No heading at all stays missing rather than becoming "active"
        assert!(apply_transforms(Vec::new(), &[flag]).is_empty());
    }
}
