//! Phone normalization to a simple E.164 form (+52##########).

/// Normalize a Mexican phone number. Strips spaces and hyphens, then:
/// a leading `+` is kept as-is, a leading `52` gets a `+` prefix, a bare
/// 10-digit number gets `+52`. Anything else is returned unchanged for the
/// identity provider to validate. Empty input yields None.
pub fn normalize(phone: &str) -> Option<String> {
    let p: String = phone.trim().chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    if p.is_empty() {
        return None;
    }
    if p.starts_with('+') {
        return Some(p);
    }
    if p.starts_with("52") {
        return Some(format!("+{p}"));
    }
    if p.len() == 10 && p.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("+52{p}"));
    }
    Some(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_prefixed_passes_through() {
        assert_eq!(normalize("+5215512345678"), Some("+5215512345678".into()));
    }

    #[test]
    fn ten_digits_get_country_code() {
        assert_eq!(normalize("5512345678"), Some("+525512345678".into()));
    }

    #[test]
    fn fifty_two_prefix_gets_plus() {
        assert_eq!(normalize("525512345678"), Some("+525512345678".into()));
    }

    #[test]
    fn spaces_and_hyphens_are_stripped() {
        assert_eq!(normalize(" 55 1234-5678 "), Some("+525512345678".into()));
    }

    #[test]
    fn unrecognized_shapes_pass_through() {
        assert_eq!(normalize("12345"), Some("12345".into()));
        assert_eq!(normalize("919876543210"), Some("919876543210".into()));
    }

    #[test]
    fn empty_is_none() {
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize(""), None);
    }
}
