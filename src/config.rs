use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Keyword lists and thresholds driving the content classifiers and the
/// risk aggregator. The defaults are usable as-is; a YAML file can override
/// any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub max_emails_to_analyze: usize,
    pub phishing_keywords: Vec<String>,
    pub suspicious_link_patterns: Vec<String>,
    pub spam_keywords: Vec<String>,
    pub excessive_punctuation_threshold: usize,
    pub excessive_capitalization_threshold: usize,
    pub min_link_to_text_ratio: usize,
    pub positive_keywords: Vec<String>,
    pub negative_keywords: Vec<String>,
    pub language_keywords: Vec<LanguageKeywords>,
    pub min_keyword_length: usize,
    pub top_keywords_count: usize,
    pub suspicious_domain_pattern: String,
    pub risk: RiskWeights,
}

/// Keyword set for one language. Checked in list order; first hit wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageKeywords {
    pub language: String,
    pub keywords: Vec<String>,
}

/// Additive score increments. Every field only ever adds to the score, so
/// the aggregate stays monotone and order-independent before the final
/// clamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskWeights {
    pub base_score: u32,
    pub per_suspicious_domain: u32,
    pub per_suspicious_url: u32,
    pub per_auth_failure: u32,
    pub high_spam: u32,
    pub high_spam_threshold: u64,
    pub bulk_senders: u32,
    pub bulk_sender_threshold: u32,
    pub forwarding_enabled: u32,
    pub per_delegated_account: u32,
    pub proxy: u32,
    pub vpn: u32,
    pub tor: u32,
    pub hosting: u32,
    pub risky_phone: u32,
    pub phone_risk_threshold: u8,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            base_score: 43,
            per_suspicious_domain: 5,
            per_suspicious_url: 2,
            per_auth_failure: 2,
            high_spam: 10,
            high_spam_threshold: 100,
            bulk_senders: 5,
            bulk_sender_threshold: 50,
            forwarding_enabled: 5,
            per_delegated_account: 3,
            proxy: 10,
            vpn: 10,
            tor: 20,
            hosting: 5,
            risky_phone: 10,
            phone_risk_threshold: 70,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_emails_to_analyze: 50,
            phishing_keywords: to_strings(&[
                "account suspended",
                "verify your account",
                "unusual activity",
                "urgent security alert",
                "click here to renew",
                "failed delivery attempt",
                "update your payment",
                "password reset request",
                "security notification",
                "confirm your identity",
                "blocked account",
                "compromised account",
                "deactivated account",
                "action required",
            ]),
            suspicious_link_patterns: to_strings(&[
                r"(?i)g00gle",
                r"(?i)micr0soft",
                r"(?i)paypa1",
                r"(?i)amaz0n",
                r"(?i)appleid",
                // login subdomains on non-official sites
                r"(?i)login\.[a-z0-9-]+\.com",
                // throwaway verification sites
                r"(?i)verify-[a-z0-9-]+\.info",
            ]),
            spam_keywords: to_strings(&[
                "free money",
                "win now",
                "guaranteed income",
                "exclusive offer",
                "limited time",
                "sex",
                "viagra",
                "cialis",
                "debt relief",
                "congratulations",
                "lose weight",
                "get rich",
                "miracle cure",
                "no obligation",
                "bulk email",
                "opportunity",
            ]),
            excessive_punctuation_threshold: 5,
            excessive_capitalization_threshold: 3,
            min_link_to_text_ratio: 50,
            positive_keywords: to_strings(&[
                "great",
                "happy",
                "success",
                "opportunity",
                "win",
                "good",
                "excellent",
                "fantastic",
                "amazing",
                "best",
            ]),
            negative_keywords: to_strings(&[
                "problem",
                "issue",
                "urgent",
                "warning",
                "failed",
                "threat",
                "scam",
                "compromised",
                "error",
                "bad",
                "lost",
                "suspicious",
            ]),
            language_keywords: vec![
                LanguageKeywords {
                    language: "Russian".to_string(),
                    keywords: to_strings(&["привет", "спасибо", "как дела"]),
                },
                LanguageKeywords {
                    language: "Korean".to_string(),
                    keywords: to_strings(&["안녕하세요", "감사합니다"]),
                },
                LanguageKeywords {
                    language: "Spanish".to_string(),
                    keywords: to_strings(&["hola", "gracias", "por favor"]),
                },
                LanguageKeywords {
                    language: "French".to_string(),
                    keywords: to_strings(&["bonjour", "merci", "s'il vous plaît"]),
                },
                LanguageKeywords {
                    language: "German".to_string(),
                    keywords: to_strings(&["hallo", "danke", "bitte"]),
                },
            ],
            min_keyword_length: 4,
            top_keywords_count: 10,
            suspicious_domain_pattern:
                r"(?i)(temp|fake|throwaway|10min|guerrillamail|mailinator|trashmail)".to_string(),
            risk: RiskWeights::default(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl AnalysisConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AnalysisConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            log::info!("Config file {path} not found, using built-in defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write config file: {path}"))?;
        Ok(())
    }

    /// Check that every configured pattern compiles.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.suspicious_link_patterns {
            Regex::new(pattern)
                .with_context(|| format!("Invalid suspicious link pattern: {pattern}"))?;
        }
        Regex::new(&self.suspicious_domain_pattern)
            .context("Invalid suspicious domain pattern")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_expected_thresholds() {
        let config = AnalysisConfig::default();
        assert_eq!(config.excessive_punctuation_threshold, 5);
        assert_eq!(config.excessive_capitalization_threshold, 3);
        assert_eq!(config.min_link_to_text_ratio, 50);
        assert_eq!(config.min_keyword_length, 4);
        assert_eq!(config.top_keywords_count, 10);
        assert_eq!(config.risk.base_score, 43);
        assert_eq!(config.risk.per_suspicious_domain, 5);
        assert_eq!(config.risk.high_spam_threshold, 100);
    }

    #[test]
    fn defaults_validate() {
        AnalysisConfig::default().validate().unwrap();
    }

    #[test]
    fn yaml_round_trip_preserves_keywords() {
        let config = AnalysisConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AnalysisConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.phishing_keywords, config.phishing_keywords);
        assert_eq!(parsed.spam_keywords, config.spam_keywords);
        assert_eq!(parsed.risk.per_delegated_account, 3);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "min_keyword_length: 6\nrisk:\n  base_score: 10\n";
        let config: AnalysisConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.min_keyword_length, 6);
        assert_eq!(config.risk.base_score, 10);
        // untouched fields keep their defaults
        assert_eq!(config.top_keywords_count, 10);
        assert_eq!(config.risk.per_suspicious_domain, 5);
    }

    #[test]
    fn bad_pattern_fails_validation() {
        let mut config = AnalysisConfig::default();
        config.suspicious_link_patterns.push("(unclosed".to_string());
        assert!(config.validate().is_err());
    }
}
