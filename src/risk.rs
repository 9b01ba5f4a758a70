use crate::config::RiskWeights;
use crate::signals::RawSignals;
use serde::{Deserialize, Serialize};

/// Discrete risk tier derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Threshold ladder, evaluated highest first. One canonical table for
    /// the whole crate.
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s > 70 => RiskLevel::Critical,
            s if s > 40 => RiskLevel::High,
            s if s > 20 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

/// Display badge for UI consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Benign,
    Suspicious,
    Malicious,
    Unknown,
}

impl Classification {
    pub fn from_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Classification::Benign,
            RiskLevel::Medium | RiskLevel::High => Classification::Suspicious,
            RiskLevel::Critical => Classification::Malicious,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Benign => "benign",
            Classification::Suspicious => "suspicious",
            Classification::Malicious => "malicious",
            Classification::Unknown => "unknown",
        }
    }
}

/// Fold the signal bundle into a single bounded score. Pure addition with a
/// final clamp to 100, so application order is irrelevant and adding any
/// negative signal can only raise the result.
pub fn aggregate(signals: &RawSignals, weights: &RiskWeights) -> u8 {
    let mut score = weights.base_score;

    score += signals.suspicious_domain_count * weights.per_suspicious_domain;
    score += signals.suspicious_url_count * weights.per_suspicious_url;

    let auth_failures =
        signals.spf_fail_count + signals.dkim_fail_count + signals.dmarc_fail_count;
    score += auth_failures * weights.per_auth_failure;

    if signals.spam_count > weights.high_spam_threshold {
        score += weights.high_spam;
    }
    if signals.bulk_sender_count > weights.bulk_sender_threshold {
        score += weights.bulk_senders;
    }

    if signals.forwarding_enabled {
        score += weights.forwarding_enabled;
    }
    score += signals.delegated_account_count * weights.per_delegated_account;

    if signals.is_proxy {
        score += weights.proxy;
    }
    if signals.is_vpn {
        score += weights.vpn;
    }
    if signals.is_tor {
        score += weights.tor;
    }
    if signals.is_hosting {
        score += weights.hosting;
    }

    if let Some(phone_risk) = signals.phone_risk_score {
        if phone_risk >= weights.phone_risk_threshold {
            score += weights.risky_phone;
        }
    }

    score.min(100) as u8
}
