/*!
 * Inflection helpers for deriving default property and junction names
 * from table aliases.
 *
 * Only the suffix of the alias is singularized, so compound aliases such as
 * `ArticlesTags` become `ArticlesTag` before underscoring.
 */

use convert_case::{Case, Casing};

/// Words whose singular and plural forms are identical
const UNCOUNTABLE: &[&str] = &[
    "data", "equipment", "information", "media", "metadata", "news", "series", "sheep", "species",
];

/// Irregular plural -> singular pairs, matched on the trailing word
const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("criteria", "criterion"),
];

/// Singularize the last word of an alias (`Countries` -> `Country`)
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }
    for (plural, singular) in IRREGULAR {
        if lower.ends_with(plural) {
            let stem = &word[..word.len() - plural.len()];
            return format!("{stem}{}", match_case(&word[word.len() - plural.len()..], singular));
        }
    }

    let rules: &[(&str, &str)] = &[
        ("ies", "y"),
        ("sses", "ss"),
        ("shes", "sh"),
        ("ches", "ch"),
        ("xes", "x"),
    ];
    for (suffix, replacement) in rules {
        if lower.ends_with(suffix) && word.len() > suffix.len() {
            return format!("{}{replacement}", &word[..word.len() - suffix.len()]);
        }
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Keep the capitalization of the first letter of the replaced segment
fn match_case(original: &str, replacement: &str) -> String {
    match original.chars().next() {
        Some(c) if c.is_uppercase() => {
            let mut chars = replacement.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => replacement.to_string(),
    }
}

/// `ArticlesTags` -> `articles_tags`
pub fn underscore(word: &str) -> String {
    word.to_case(Case::Snake)
}

/// Default property for a to-one association (`Users` -> `user`)
pub fn singular_property(alias: &str) -> String {
    underscore(&singularize(alias))
}

/// Default property for a to-many association (`Comments` -> `comments`)
pub fn plural_property(alias: &str) -> String {
    underscore(alias)
}
