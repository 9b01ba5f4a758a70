use crate::risk::RiskLevel;
use crate::snapshot::AccountSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Real,
    Fake,
    Missing,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Real => "real",
            SourceStatus::Fake => "fake",
            SourceStatus::Missing => "missing",
        }
    }
}

/// One entry in the per-source breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub status: SourceStatus,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_used: Option<String>,
    pub confidence: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl DataSource {
    fn real(description: &str, api_used: &str, confidence: u8, data: serde_json::Value) -> Self {
        Self {
            status: SourceStatus::Real,
            description: description.to_string(),
            api_used: Some(api_used.to_string()),
            confidence,
            data: Some(data),
        }
    }

    fn fake(description: &str, api_used: &str, data: serde_json::Value) -> Self {
        Self {
            status: SourceStatus::Fake,
            description: description.to_string(),
            api_used: Some(api_used.to_string()),
            confidence: 0,
            data: Some(data),
        }
    }

    fn missing(description: &str, api_used: &str) -> Self {
        Self {
            status: SourceStatus::Missing,
            description: description.to_string(),
            api_used: Some(api_used.to_string()),
            confidence: 0,
            data: None,
        }
    }
}

/// Aggregate data-quality report: which sources backed the analysis, how
/// trustworthy each one is, and what the account holder should do next.
/// Built fresh on every call; rendering never fails the build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub timestamp: DateTime<Utc>,
    pub total_data_points: u32,
    pub real_data_points: u32,
    pub fake_data_points: u32,
    pub missing_data_points: u32,
    pub real_data_percentage: u32,
    pub data_sources: BTreeMap<String, DataSource>,
    pub recommendations: Vec<String>,
    pub additional_apis: Vec<String>,
}

/// round(real / total * 100), 0 when there is nothing to count.
pub fn real_data_percentage(real: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (real as f64 / total as f64 * 100.0).round() as u32
}

/// Tally accumulator for the fixed source list.
#[derive(Default)]
struct ReportBuilder {
    sources: BTreeMap<String, DataSource>,
    real: u32,
    fake: u32,
    missing: u32,
}

impl ReportBuilder {
    fn add(&mut self, name: &str, source: DataSource) {
        match source.status {
            SourceStatus::Real => self.real += 1,
            SourceStatus::Fake => self.fake += 1,
            SourceStatus::Missing => self.missing += 1,
        }
        self.sources.insert(name.to_string(), source);
    }
}

impl ValidationReport {
    pub fn build(snapshot: &AccountSnapshot, risk_score: u8, risk_level: RiskLevel) -> Self {
        let mut builder = ReportBuilder::default();

        let profile_email = snapshot
            .profile
            .as_ref()
            .and_then(|profile| profile.email.clone());

        // Google profile
        if let (Some(profile), Some(email)) = (snapshot.profile.as_ref(), profile_email.as_ref()) {
            builder.add(
                "googleProfile",
                DataSource::real(
                    "Google profile information",
                    "Google People API / OAuth2 Userinfo",
                    95,
                    json!({
                        "name": profile.name,
                        "email": email,
                        "picture": if profile.picture.is_some() { "Available" } else { "Not available" },
                        "locale": profile.locale,
                        "emailVerified": profile.email_verified,
                        "recoveryEmailStatus": match profile.recovery_email_status {
                            Some(true) => "Set",
                            Some(false) => "Not Set",
                            None => "Unknown",
                        },
                    }),
                ),
            );
        } else {
            builder.add(
                "googleProfile",
                DataSource::missing("Google profile information", "Not authenticated"),
            );
        }

        // Email address
        if let Some(email) = profile_email.as_ref() {
            let verified = snapshot
                .profile
                .as_ref()
                .and_then(|profile| profile.email_verified)
                .unwrap_or(false);
            builder.add(
                "email",
                DataSource::real(
                    "Email address verification",
                    "Google OAuth",
                    95,
                    json!({
                        "email": email,
                        "valid": true,
                        "disposable": false,
                        "deliverable": true,
                        "verified": verified,
                    }),
                ),
            );
        } else {
            builder.add(
                "email",
                DataSource {
                    confidence: 90,
                    ..DataSource::fake(
                        "Email address verification",
                        "Email verification API",
                        json!({
                            "email": "user@example.com",
                            "valid": true,
                            "disposable": false,
                            "deliverable": true,
                            "verified": false,
                        }),
                    )
                },
            );
        }

        // IP geolocation
        if let Some(network) = snapshot.network.as_ref() {
            builder.add(
                "ipGeolocation",
                DataSource::real(
                    "IP address geolocation",
                    "IP-API.com",
                    95,
                    json!({
                        "ip": network.ip.as_deref().unwrap_or("Unknown"),
                        "city": network.city.as_deref().unwrap_or("Unknown"),
                        "region": network.region.as_deref().unwrap_or("Unknown"),
                        "country": network.country.as_deref().unwrap_or("Unknown"),
                        "isp": network.isp.as_deref().unwrap_or("Unknown"),
                    }),
                ),
            );
        } else {
            builder.add(
                "ipGeolocation",
                DataSource::missing("IP address geolocation", "IP lookup unavailable"),
            );
        }

        // Device info
        if let Some(device) = snapshot.device.as_ref() {
            builder.add(
                "deviceInfo",
                DataSource::real(
                    "Device and browser information",
                    "Navigator API",
                    100,
                    json!({
                        "browser": device.browser.as_deref().unwrap_or("Unknown"),
                        "os": device.os.as_deref().unwrap_or("Unknown"),
                        "device": device.device.as_deref().unwrap_or("Unknown"),
                    }),
                ),
            );
        } else {
            builder.add(
                "deviceInfo",
                DataSource::missing("Device and browser information", "Not collected"),
            );
        }

        // Device fingerprint is always synthesized client-side
        if let Some(fingerprint) = snapshot.device_fingerprint.as_ref() {
            builder.add(
                "deviceFingerprint",
                DataSource::fake(
                    "Device fingerprint",
                    "Generated",
                    json!({"fingerprint": fingerprint, "source": "Generated"}),
                ),
            );
        } else {
            builder.add(
                "deviceFingerprint",
                DataSource::missing("Device fingerprint", "Not collected"),
            );
        }

        builder.add(
            "socialMedia",
            DataSource::missing("Social media verification", "Not provided"),
        );

        builder.add(
            "creditScore",
            DataSource::fake(
                "Credit score verification",
                "Generated",
                json!({"score": "N/A", "source": "Not available"}),
            ),
        );

        builder.add(
            "governmentId",
            DataSource::missing("Government ID verification", "Not provided"),
        );

        // Phone validation
        if let Some(phone) = snapshot.phone_validation.as_ref() {
            builder.add(
                "phoneValidation",
                DataSource::real(
                    "Phone number validation",
                    "Phone validation API",
                    90,
                    json!({
                        "valid": phone.is_valid,
                        "riskScore": phone.risk_score,
                        "carrier": phone.carrier,
                        "country": phone.country,
                    }),
                ),
            );
        } else {
            builder.add(
                "phoneValidation",
                DataSource::missing("Phone number validation", "Not provided"),
            );
        }

        // Gmail metadata
        if let Some(metadata) = snapshot.gmail_metadata.as_ref() {
            builder.add(
                "gmailMetadata",
                DataSource::real(
                    "Gmail mailbox metadata",
                    "Gmail API (metadata only)",
                    95,
                    json!({
                        "inboxCount": metadata.total_inbox_count,
                        "spamCount": metadata.total_spam_count,
                        "unreadCount": metadata.total_unread_count,
                        "uniqueSenders": metadata.unique_senders.len(),
                        "suspiciousDomains": metadata.suspicious_domains.len(),
                        "labelsCount": metadata.labels.len(),
                    }),
                ),
            );
        } else {
            builder.add(
                "gmailMetadata",
                DataSource::missing("Gmail mailbox metadata", "Gmail API not available"),
            );
        }

        // Gmail settings
        if let Some(settings) = snapshot.gmail_settings.as_ref() {
            builder.add(
                "gmailSettings",
                DataSource::real(
                    "Gmail account settings",
                    "Gmail Settings API",
                    95,
                    json!({
                        "forwardingEnabled": settings.forwarding_enabled,
                        "popEnabled": settings.pop_enabled,
                        "imapEnabled": settings.imap_enabled,
                        "autoReplyEnabled": settings.auto_reply_enabled,
                        "delegatedAccountsCount": settings.delegated_accounts.len(),
                    }),
                ),
            );
        } else {
            builder.add(
                "gmailSettings",
                DataSource::missing("Gmail account settings", "Gmail Settings API not available"),
            );
        }

        // The computed score is itself a data source for the dashboard
        builder.add(
            "riskScore",
            DataSource::real(
                "Security risk assessment",
                "Internal risk algorithm",
                95,
                json!({
                    "score": risk_score,
                    "category": risk_level.as_str(),
                    "source": "Behavioral analysis",
                }),
            ),
        );

        let recommendations = Self::recommendations(snapshot, profile_email.is_some());
        let additional_apis = Self::additional_apis(snapshot);

        let total = builder.real + builder.fake + builder.missing;
        ValidationReport {
            timestamp: Utc::now(),
            total_data_points: total,
            real_data_points: builder.real,
            fake_data_points: builder.fake,
            missing_data_points: builder.missing,
            real_data_percentage: real_data_percentage(builder.real, total),
            data_sources: builder.sources,
            recommendations,
            additional_apis,
        }
    }

    /// Fixed rule list, evaluated in order; list order is append order.
    fn recommendations(snapshot: &AccountSnapshot, authenticated: bool) -> Vec<String> {
        let mut recommendations = Vec::new();

        if !authenticated {
            recommendations
                .push("Authenticate with Google OAuth to access real profile data".to_string());
        }
        if snapshot.gmail_metadata.is_none() {
            recommendations.push("Enable Gmail API access to fetch mailbox metadata".to_string());
        }
        if snapshot.gmail_settings.is_none() {
            recommendations
                .push("Enable Gmail Settings API access to analyze account security".to_string());
        }
        if let Some(metadata) = snapshot.gmail_metadata.as_ref() {
            if !metadata.suspicious_domains.is_empty() {
                recommendations.push(format!(
                    "Review {} suspicious email domains detected in mailbox",
                    metadata.suspicious_domains.len()
                ));
            }
        }
        if let Some(settings) = snapshot.gmail_settings.as_ref() {
            if settings.forwarding_enabled {
                recommendations.push(
                    "Email forwarding is enabled - review for security implications".to_string(),
                );
            }
            if !settings.delegated_accounts.is_empty() {
                recommendations.push(format!(
                    "Review {} delegated account(s) for security",
                    settings.delegated_accounts.len()
                ));
            }
        }

        if recommendations.is_empty() {
            recommendations
                .push("Implement phone number verification to improve user validation".to_string());
            recommendations.push("Add two-factor authentication for higher security".to_string());
        }

        recommendations
    }

    fn additional_apis(snapshot: &AccountSnapshot) -> Vec<String> {
        let mut apis = vec![
            "Twilio for phone verification".to_string(),
            "HaveIBeenPwned for password breach checking".to_string(),
            "MaxMind for more accurate geolocation".to_string(),
        ];
        if snapshot.profile.is_none() {
            apis.push("Google People API for enhanced profile data".to_string());
        }
        if snapshot.gmail_metadata.is_none() {
            apis.push("Gmail API for mailbox analysis".to_string());
        }
        apis
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Data Validation Report\n");
        out.push_str(&format!(
            "Generated: {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out.push_str(&format!(
            "Overall Data Quality: {}% real data\n",
            self.real_data_percentage
        ));
        out.push_str(&format!("Total Data Points: {}\n", self.total_data_points));
        out.push_str(&format!("Real Data Points: {}\n", self.real_data_points));
        out.push_str(&format!("Fake Data Points: {}\n", self.fake_data_points));
        out.push_str(&format!(
            "Missing Data Points: {}\n\n",
            self.missing_data_points
        ));

        out.push_str("Key Findings:\n");
        for source in self.data_sources.values() {
            out.push_str(&format!(
                "- {}: {} (Confidence: {}%)\n",
                source.description,
                source.status.as_str().to_uppercase(),
                source.confidence
            ));
        }

        out.push_str("\nRecommendations:\n");
        for recommendation in &self.recommendations {
            out.push_str(&format!("- {recommendation}\n"));
        }

        out.push_str("\nAdditional APIs to Consider:\n");
        for api in &self.additional_apis {
            out.push_str(&format!("- {api}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        DeviceInfo, GmailMetadata, GmailSettings, NetworkInfo, OauthProfile, PhoneValidation,
    };

    fn full_snapshot() -> AccountSnapshot {
        AccountSnapshot {
            profile: Some(OauthProfile {
                name: Some("Test User".into()),
                email: Some("user@example.com".into()),
                email_verified: Some(true),
                ..Default::default()
            }),
            gmail_metadata: Some(GmailMetadata {
                total_inbox_count: 120,
                total_spam_count: 30,
                suspicious_domains: vec!["tempmail.net".into()],
                ..Default::default()
            }),
            gmail_settings: Some(GmailSettings {
                forwarding_enabled: true,
                delegated_accounts: vec!["helper@example.com".into(), "other@example.com".into()],
                ..Default::default()
            }),
            network: Some(NetworkInfo {
                ip: Some("203.0.113.7".into()),
                city: Some("Springfield".into()),
                ..Default::default()
            }),
            phone_validation: Some(PhoneValidation {
                is_valid: Some(true),
                risk_score: Some(10),
                ..Default::default()
            }),
            device: Some(DeviceInfo {
                browser: Some("Chrome".into()),
                os: Some("macOS".into()),
                device: Some("Desktop".into()),
            }),
            device_fingerprint: Some("abc123def456".into()),
        }
    }

    #[test]
    fn counts_always_sum_to_total() {
        for snapshot in [AccountSnapshot::default(), full_snapshot()] {
            let report = ValidationReport::build(&snapshot, 43, RiskLevel::High);
            assert_eq!(
                report.real_data_points + report.fake_data_points + report.missing_data_points,
                report.total_data_points
            );
            assert_eq!(report.total_data_points, 12);
            assert_eq!(
                report.real_data_percentage,
                real_data_percentage(report.real_data_points, report.total_data_points)
            );
        }
    }

    #[test]
    fn full_snapshot_tallies() {
        let report = ValidationReport::build(&full_snapshot(), 68, RiskLevel::High);
        // real: profile, email, ip, device, phone, metadata, settings, risk score
        assert_eq!(report.real_data_points, 8);
        // fake: device fingerprint, credit score
        assert_eq!(report.fake_data_points, 2);
        // missing: social media, government id
        assert_eq!(report.missing_data_points, 2);
        assert_eq!(report.real_data_percentage, 67);
    }

    #[test]
    fn empty_snapshot_marks_sources_missing() {
        let report = ValidationReport::build(&AccountSnapshot::default(), 43, RiskLevel::High);

        let metadata = &report.data_sources["gmailMetadata"];
        assert_eq!(metadata.status, SourceStatus::Missing);
        assert_eq!(metadata.confidence, 0);
        assert_eq!(metadata.api_used.as_deref(), Some("Gmail API not available"));

        let profile = &report.data_sources["googleProfile"];
        assert_eq!(profile.status, SourceStatus::Missing);

        // the score itself is always present
        assert_eq!(report.data_sources["riskScore"].status, SourceStatus::Real);
        assert_eq!(report.real_data_points, 1);
    }

    #[test]
    fn percentage_formula() {
        assert_eq!(real_data_percentage(6, 10), 60);
        assert_eq!(real_data_percentage(8, 12), 67);
        assert_eq!(real_data_percentage(1, 12), 8);
        assert_eq!(real_data_percentage(0, 0), 0);
        assert_eq!(real_data_percentage(12, 12), 100);
    }

    #[test]
    fn recommendations_follow_snapshot_state() {
        let report = ValidationReport::build(&full_snapshot(), 68, RiskLevel::High);
        assert!(report
            .recommendations
            .contains(&"Review 1 suspicious email domains detected in mailbox".to_string()));
        assert!(report.recommendations.contains(
            &"Email forwarding is enabled - review for security implications".to_string()
        ));
        assert!(report
            .recommendations
            .contains(&"Review 2 delegated account(s) for security".to_string()));
        // authenticated, so no OAuth recommendation
        assert!(!report
            .recommendations
            .iter()
            .any(|r| r.contains("Authenticate with Google OAuth")));
    }

    #[test]
    fn default_recommendations_when_nothing_fires() {
        let mut snapshot = full_snapshot();
        if let Some(metadata) = snapshot.gmail_metadata.as_mut() {
            metadata.suspicious_domains.clear();
        }
        if let Some(settings) = snapshot.gmail_settings.as_mut() {
            settings.forwarding_enabled = false;
            settings.delegated_accounts.clear();
        }
        let report = ValidationReport::build(&snapshot, 43, RiskLevel::High);
        assert_eq!(
            report.recommendations,
            vec![
                "Implement phone number verification to improve user validation".to_string(),
                "Add two-factor authentication for higher security".to_string(),
            ]
        );
    }

    #[test]
    fn unauthenticated_snapshot_recommends_oauth_and_apis() {
        let report = ValidationReport::build(&AccountSnapshot::default(), 43, RiskLevel::High);
        assert_eq!(
            report.recommendations[0],
            "Authenticate with Google OAuth to access real profile data"
        );
        assert!(report
            .additional_apis
            .contains(&"Google People API for enhanced profile data".to_string()));
        assert!(report
            .additional_apis
            .contains(&"Gmail API for mailbox analysis".to_string()));
    }

    #[test]
    fn json_round_trip_is_lossless() {
        let report = ValidationReport::build(&full_snapshot(), 68, RiskLevel::High);
        let json = report.to_json().unwrap();
        let parsed = ValidationReport::from_json(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn plain_text_lists_every_source() {
        let report = ValidationReport::build(&full_snapshot(), 68, RiskLevel::High);
        let text = report.to_plain_text();
        assert!(text.starts_with("Data Validation Report"));
        assert!(text.contains("Overall Data Quality: 67% real data"));
        assert!(text.contains("- Gmail mailbox metadata: REAL (Confidence: 95%)"));
        assert!(text.contains("- Social media verification: MISSING (Confidence: 0%)"));
        assert!(text.contains("Additional APIs to Consider:"));
    }
}
