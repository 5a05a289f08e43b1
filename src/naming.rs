//! Identifier rules shared by the HTTP handlers and the importers.

const MAX_SLUG_LEN: usize = 100;
const MAX_DOMAIN_LEN: usize = 253;

/// Derives a site key from a domain: trimmed, lowercased, dots replaced with dashes.
///
/// ```
/// assert_eq!(toplist_cms::naming::domain_to_site_key(" Cazinou.IO "), "cazinou-io");
/// ```
#[must_use]
pub fn domain_to_site_key(domain: &str) -> String {
    domain.trim().to_lowercase().replace('.', "-")
}

/// Builds a display title from a slug: `best-casinos-2024` becomes `Best Casinos 2024`.
#[must_use]
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Lowercase ascii letters, digits and inner hyphens.
pub fn validate_slug(slug: &str, entity: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err(format!("{entity} cannot be empty"));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(format!("{entity} cannot exceed {MAX_SLUG_LEN} characters"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "{entity} can only contain lowercase letters, digits, and hyphens"
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(format!("{entity} cannot start or end with a hyphen"));
    }
    Ok(())
}

pub fn validate_domain(domain: &str) -> Result<(), String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err("domain cannot be empty".to_string());
    }
    if domain.len() > MAX_DOMAIN_LEN {
        return Err(format!("domain cannot exceed {MAX_DOMAIN_LEN} characters"));
    }
    if !domain.contains('.') {
        return Err("domain must contain at least one dot".to_string());
    }
    for label in domain.split('.') {
        if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
            return Err(format!("domain '{domain}' has an invalid label"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(format!("domain '{domain}' contains invalid characters"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_to_site_key() {
        assert_eq!(domain_to_site_key("cazinou.io"), "cazinou-io");
        assert_eq!(domain_to_site_key("Best.Casino.co.uk"), "best-casino-co-uk");
        assert_eq!(domain_to_site_key("  cazinou.io\n"), "cazinou-io");
        assert_eq!(
            domain_to_site_key("cazinou.io"),
            domain_to_site_key("cazinou.io")
        );
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("best-casinos-2024"), "Best Casinos 2024");
        assert_eq!(title_from_slug("home"), "Home");
        assert_eq!(title_from_slug("new--slots"), "New Slots");
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("betano", "brandId").is_ok());
        assert!(validate_slug("top-10-casinos", "slug").is_ok());
        assert!(validate_slug("", "slug").is_err());
        assert!(validate_slug("Betano", "slug").is_err());
        assert!(validate_slug("-lead", "slug").is_err());
        assert!(validate_slug("with space", "slug").is_err());
        assert!(validate_slug(&"a".repeat(101), "slug").is_err());
    }

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("cazinou.io").is_ok());
        assert!(validate_domain("sub.example-site.com").is_ok());
        assert!(validate_domain("localhost").is_err());
        assert!(validate_domain("bad..com").is_err());
        assert!(validate_domain("exa mple.com").is_err());
    }
}
