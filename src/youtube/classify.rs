//! Title parsing for club uploads.
//!
//! Coaches name videos as `"Technique, Label, Label"`. The first segment is the
//! display title; the rest are labels. Labels found in [`COLLECTION_KEYWORDS`]
//! become collections, everything else becomes a free-form tag.

/// Known collection keywords (lower-case) and the collection they map to.
pub const COLLECTION_KEYWORDS: &[(&str, &str)] = &[
    ("måndag", "Måndagspass"),
    ("tisdag", "Tisdagspass"),
    ("onsdag", "Onsdagspass"),
    ("torsdag", "Torsdagspass"),
    ("fredag", "Fredagspass"),
    ("lördag", "Lördagspass"),
    ("söndag", "Söndagspass"),
    ("gi", "Gi (Dräkt)"),
    ("nogi", "No-Gi"),
    ("no-gi", "No-Gi"),
    ("seminarium", "Seminarier"),
];

/// A raw title split into its display title and derived labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTitle {
    pub title: String,
    pub original_title: String,
    pub collections: Vec<String>,
    pub tags: Vec<String>,
}

/// Classify a raw playlist title.
///
/// Never fails: malformed input produces a best-effort result.
#[must_use]
pub fn classify_title(raw: &str) -> ClassifiedTitle {
    let mut parts = raw.split(',').map(str::trim);

    let base = parts.next().unwrap_or_default();
    let title = if base.is_empty() {
        raw.to_string()
    } else {
        capitalize_first(base)
    };

    let mut collections = Vec::new();
    let mut tags = Vec::new();

    for part in parts.filter(|p| !p.is_empty()) {
        if let Some(collection) = lookup_collection(part) {
            push_unique(&mut collections, collection.to_string());
        } else {
            push_unique(&mut tags, capitalize_first(part));
        }
    }

    ClassifiedTitle {
        title,
        original_title: raw.to_string(),
        collections,
        tags,
    }
}

/// Resolve a label to its collection, matching either a keyword or the
/// collection name itself, case-insensitively.
#[must_use]
pub fn lookup_collection(label: &str) -> Option<&'static str> {
    let lower = label.trim().to_lowercase();
    COLLECTION_KEYWORDS
        .iter()
        .find(|(keyword, collection)| *keyword == lower || collection.to_lowercase() == lower)
        .map(|(_, collection)| *collection)
}

/// Upper-case the first character, leaving the rest untouched.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_with_collection_and_duplicate_tag() {
        let classified = classify_title("Armbar från Guard, Måndag, Armbar, armbar");

        assert_eq!(classified.title, "Armbar från Guard");
        assert_eq!(classified.original_title, "Armbar från Guard, Måndag, Armbar, armbar");
        assert_eq!(classified.collections, vec!["Måndagspass"]);
        assert_eq!(classified.tags, vec!["Armbar"]);
    }

    #[test]
    fn test_title_without_commas() {
        let classified = classify_title("kimura från side control");

        assert_eq!(classified.title, "Kimura från side control");
        assert!(classified.collections.is_empty());
        assert!(classified.tags.is_empty());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let classified = classify_title("Sweep, GI, No-Gi, NOGI, Seminarium, TORSDAG");

        assert_eq!(
            classified.collections,
            vec!["Gi (Dräkt)", "No-Gi", "Seminarier", "Torsdagspass"]
        );
        assert!(classified.tags.is_empty());
    }

    #[test]
    fn test_tags_are_capitalized() {
        let classified = classify_title("Passning, closed guard, öppen guard");

        assert_eq!(classified.tags, vec!["Closed guard", "Öppen guard"]);
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let classified = classify_title("Triangle,, ,  Lördag ,");

        assert_eq!(classified.title, "Triangle");
        assert_eq!(classified.collections, vec!["Lördagspass"]);
        assert!(classified.tags.is_empty());
    }

    #[test]
    fn test_empty_base_title_falls_back_to_raw() {
        let classified = classify_title(" , Fredag");

        assert_eq!(classified.title, " , Fredag");
        assert_eq!(classified.collections, vec!["Fredagspass"]);

        let empty = classify_title("");
        assert_eq!(empty.title, "");
        assert!(empty.collections.is_empty());
        assert!(empty.tags.is_empty());
    }

    #[test]
    fn test_sentinel_titles_pass_through() {
        assert_eq!(classify_title("Private video").title, "Private video");
        assert_eq!(classify_title("Deleted video").title, "Deleted video");
    }

    #[test]
    fn test_collection_name_as_label_stays_a_collection() {
        let classified = classify_title("Rygg, Måndagspass, måndag, gi (dräkt)");

        assert_eq!(classified.collections, vec!["Måndagspass", "Gi (Dräkt)"]);
        assert!(classified.tags.is_empty());
    }

    #[test]
    fn test_collections_and_tags_are_disjoint() {
        let inputs = [
            "Armbar, Armbar, Måndag",
            ",,,,",
            "No-Gi, no-gi, No-gi, NOGI",
            "x, Gi, gi, Gi (Dräkt), GI (DRÄKT)",
            "Ålder, ß, ǆ, 🥋, Söndag, söndagspass",
            "   ",
            "Seminarier, Seminarium",
        ];

        for input in inputs {
            let classified = classify_title(input);
            for collection in &classified.collections {
                assert!(
                    !classified.tags.contains(collection),
                    "{collection:?} is both a tag and a collection for {input:?}"
                );
            }
        }
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("armbar"), "Armbar");
        assert_eq!(capitalize_first("ärm"), "Ärm");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("1 step"), "1 step");
    }
}
