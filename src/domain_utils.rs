/// Minimal address and domain utilities
pub struct DomainUtils;

impl DomainUtils {
    /// Extract the bare address from a From-style header value, handling
    /// both `"Display Name" <user@example.com>` and plain `user@example.com`.
    pub fn extract_address(from_header: &str) -> Option<String> {
        if let Some(start) = from_header.find('<') {
            let rest = &from_header[start + 1..];
            let end = rest.find('>')?;
            let address = rest[..end].trim();
            if address.contains('@') {
                return Some(address.to_lowercase());
            }
            return None;
        }
        let trimmed = from_header.trim();
        if trimmed.contains('@') {
            Some(trimmed.to_lowercase())
        } else {
            None
        }
    }

    /// Extract the quoted display name from a From-style header value.
    pub fn extract_display_name(from_header: &str) -> Option<String> {
        let trimmed = from_header.trim_start();
        let rest = trimmed.strip_prefix('"')?;
        let end = rest.find('"')?;
        if end == 0 {
            None
        } else {
            Some(rest[..end].to_string())
        }
    }

    /// Extract domain from email address
    pub fn extract_domain(email: &str) -> Option<String> {
        email.split('@').nth(1).map(|s| s.to_lowercase())
    }

    /// First label of a domain ("example" for "example.com")
    pub fn first_label(domain: &str) -> &str {
        domain.split('.').next().unwrap_or(domain)
    }

    /// Registered domain: the last two labels ("mail.example.com" -> "example.com")
    pub fn registered_domain(domain: &str) -> Option<String> {
        let parts: Vec<&str> = domain.split('.').collect();
        if parts.len() >= 2 {
            Some(format!(
                "{}.{}",
                parts[parts.len() - 2],
                parts[parts.len() - 1]
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_address() {
        assert_eq!(
            DomainUtils::extract_address("\"Google Support\" <help@example.com>"),
            Some("help@example.com".to_string())
        );
        assert_eq!(
            DomainUtils::extract_address("user@example.com"),
            Some("user@example.com".to_string())
        );
        assert_eq!(DomainUtils::extract_address("no address here"), None);
    }

    #[test]
    fn test_extract_display_name() {
        assert_eq!(
            DomainUtils::extract_display_name("\"Google Support\" <x@y.com>"),
            Some("Google Support".to_string())
        );
        assert_eq!(DomainUtils::extract_display_name("x@y.com"), None);
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            DomainUtils::extract_domain("user@Example.COM"),
            Some("example.com".to_string())
        );
        assert_eq!(DomainUtils::extract_domain("invalid"), None);
    }

    #[test]
    fn test_registered_domain() {
        assert_eq!(
            DomainUtils::registered_domain("mail.example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(DomainUtils::registered_domain("localhost"), None);
    }

    #[test]
    fn test_first_label() {
        assert_eq!(DomainUtils::first_label("example.com"), "example");
    }
}
