use serde::{Deserialize, Serialize};

/// Everything we know about an account at analysis time, bundled from the
/// upstream providers. Every section is optional: a provider that failed or
/// was never queried simply leaves its section absent, and downstream code
/// treats absence as "missing" rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSnapshot {
    pub profile: Option<OauthProfile>,
    pub gmail_metadata: Option<GmailMetadata>,
    pub gmail_settings: Option<GmailSettings>,
    pub network: Option<NetworkInfo>,
    pub phone_validation: Option<PhoneValidation>,
    pub device: Option<DeviceInfo>,
    pub device_fingerprint: Option<String>,
}

impl AccountSnapshot {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Identity fields returned by the OAuth userinfo endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OauthProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    pub email_verified: Option<bool>,
    pub account_creation_time: Option<String>,
    pub recovery_email_status: Option<bool>,
}

/// Mailbox counts and sender metadata. No message bodies here; the content
/// sweep fetches those separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GmailMetadata {
    pub total_inbox_count: u64,
    pub total_spam_count: u64,
    pub total_unread_count: u64,
    pub unique_senders: Vec<String>,
    pub suspicious_domains: Vec<String>,
    pub last_message_timestamps: Vec<String>,
    pub labels: Vec<GmailLabel>,
    pub auth_failures: Option<AuthFailureCounts>,
    pub bulk_sender_count: u32,
    pub suspicious_url_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GmailLabel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub label_type: String,
}

/// SPF/DKIM/DMARC failure tallies across the sampled messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthFailureCounts {
    pub spf: u32,
    pub dkim: u32,
    pub dmarc: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GmailSettings {
    pub forwarding_enabled: bool,
    pub forwarding_address: Option<String>,
    pub pop_enabled: bool,
    pub imap_enabled: bool,
    pub auto_reply_enabled: bool,
    pub delegated_accounts: Vec<String>,
}

/// IP geolocation and reputation flags from the network intelligence
/// provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInfo {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub isp: Option<String>,
    pub asn: Option<String>,
    pub organization: Option<String>,
    pub is_proxy: bool,
    pub is_vpn: bool,
    pub is_tor: bool,
    pub is_hosting: bool,
    pub threat_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneValidation {
    pub is_valid: Option<bool>,
    pub risk_score: Option<u8>,
    pub carrier: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
}

/// A single fetched message, decoded and ready for content analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailMessage {
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_parses_to_default() {
        let snapshot = AccountSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, AccountSnapshot::default());
        assert!(snapshot.profile.is_none());
        assert!(snapshot.gmail_metadata.is_none());
    }

    #[test]
    fn partial_sections_parse() {
        let raw = r#"{
            "profile": {"email": "user@example.com", "emailVerified": true},
            "gmailSettings": {"forwardingEnabled": true, "delegatedAccounts": ["a@b.com"]}
        }"#;
        let snapshot = AccountSnapshot::from_json(raw).unwrap();
        let profile = snapshot.profile.unwrap();
        assert_eq!(profile.email.as_deref(), Some("user@example.com"));
        assert_eq!(profile.email_verified, Some(true));
        assert!(profile.name.is_none());
        let settings = snapshot.gmail_settings.unwrap();
        assert!(settings.forwarding_enabled);
        assert_eq!(settings.delegated_accounts.len(), 1);
        assert!(!settings.pop_enabled);
    }

    #[test]
    fn unknown_counts_default_to_zero() {
        let raw = r#"{"gmailMetadata": {"totalSpamCount": 150}}"#;
        let snapshot = AccountSnapshot::from_json(raw).unwrap();
        let metadata = snapshot.gmail_metadata.unwrap();
        assert_eq!(metadata.total_spam_count, 150);
        assert_eq!(metadata.total_inbox_count, 0);
        assert!(metadata.suspicious_domains.is_empty());
    }
}
