/// Canonical form used for every organizational name comparison.
pub(crate) fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase()
}

pub(crate) fn names_match(left: &str, normalized_right: &str) -> bool {
    normalize_name(left) == normalized_right
}
