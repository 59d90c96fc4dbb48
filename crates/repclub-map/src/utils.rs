/// Lowercase alphanumerics only, so `First Name`, `first_name` and
/// `FIRST-NAME` all compare equal.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
