use proptest::prelude::*;

/// Strategy for generating alias names
pub fn alias_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{0,15}"
}

/// Strategy for generating field names, which may themselves contain `__`
pub fn field_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,15}"
}

/// Strategy for generating placeholder prefixes
pub fn prefix_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,10}"
}

/// Strategy for generating `(article_id, comment_id)` join rows.
///
/// A comment always belongs to the same article; repeated comment ids model
/// rows multiplied by other joins.
pub fn article_comment_pairs_strategy() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec(1i64..=30, 1..40).prop_map(|comments| {
        comments
            .into_iter()
            .map(|comment| (comment % 5 + 1, comment))
            .collect()
    })
}

/// Strategy for nullable float scores, biased towards values JSON cannot represent
pub fn score_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    let score = prop_oneof![
        Just(None),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
        Just(Some(f64::NEG_INFINITY)),
        (-1_000i32..1_000).prop_map(|n| Some(f64::from(n) / 4.0)),
    ];
    prop::collection::vec(score, 1..12)
}
