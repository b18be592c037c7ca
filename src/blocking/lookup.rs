//! Domain name normalization.
//!
//! A blocklist entry is accepted only once it has been lowercased,
//! trimmed, and stripped of a leading `www.`; this module is the single
//! place that decision is made so the loader, the overrides store, and the
//! admin `uLoad`/`vLoad`/`wLoad` commands all agree on one normal form.

/// Normalize `raw` per the blocklist entry contract. Returns `None` if the
/// result is empty or `>= max_len` bytes.
pub fn normalize(raw: &str, max_len: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    let stripped = lower.strip_prefix("www.").unwrap_or(&lower);

    if stripped.is_empty() || stripped.len() >= max_len {
        return None;
    }
    Some(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_www_and_lowercases() {
        assert_eq!(
            normalize("  WWW.Example.COM  ", 255),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn rejects_empty_and_overlong() {
        assert_eq!(normalize("", 255), None);
        assert_eq!(normalize("   ", 255), None);
        let long = "a".repeat(300);
        assert_eq!(normalize(&long, 255), None);
    }

    #[test]
    fn is_idempotent() {
        let once = normalize("WWW.Ads.Example.com", 255).unwrap();
        let twice = normalize(&once, 255).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn bare_www_domain_keeps_its_own_label() {
        assert_eq!(normalize("www.com", 255), Some("com".to_string()));
    }
}
