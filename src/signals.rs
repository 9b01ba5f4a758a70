use crate::snapshot::AccountSnapshot;
use serde::{Deserialize, Serialize};

/// Normalized counts and flags pulled out of an account snapshot. This is
/// the only input the risk aggregator sees. Extraction never fails: any
/// absent snapshot section contributes zeros and false flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSignals {
    pub spf_fail_count: u32,
    pub dkim_fail_count: u32,
    pub dmarc_fail_count: u32,
    pub suspicious_domain_count: u32,
    pub suspicious_url_count: u32,
    pub inbox_count: u64,
    pub spam_count: u64,
    pub unread_count: u64,
    pub unique_sender_count: u32,
    pub bulk_sender_count: u32,
    pub forwarding_enabled: bool,
    pub delegated_account_count: u32,
    pub pop_enabled: bool,
    pub imap_enabled: bool,
    pub is_proxy: bool,
    pub is_vpn: bool,
    pub is_tor: bool,
    pub is_hosting: bool,
    pub phone_risk_score: Option<u8>,
}

impl RawSignals {
    pub fn from_snapshot(snapshot: &AccountSnapshot) -> Self {
        let mut signals = RawSignals::default();

        if let Some(metadata) = &snapshot.gmail_metadata {
            signals.inbox_count = metadata.total_inbox_count;
            signals.spam_count = metadata.total_spam_count;
            signals.unread_count = metadata.total_unread_count;
            signals.unique_sender_count = metadata.unique_senders.len() as u32;
            signals.suspicious_domain_count = metadata.suspicious_domains.len() as u32;
            signals.bulk_sender_count = metadata.bulk_sender_count;
            signals.suspicious_url_count = metadata.suspicious_url_count;
            if let Some(auth) = &metadata.auth_failures {
                signals.spf_fail_count = auth.spf;
                signals.dkim_fail_count = auth.dkim;
                signals.dmarc_fail_count = auth.dmarc;
            }
        }

        if let Some(settings) = &snapshot.gmail_settings {
            signals.forwarding_enabled = settings.forwarding_enabled;
            signals.delegated_account_count = settings.delegated_accounts.len() as u32;
            signals.pop_enabled = settings.pop_enabled;
            signals.imap_enabled = settings.imap_enabled;
        }

        if let Some(network) = &snapshot.network {
            signals.is_proxy = network.is_proxy;
            signals.is_vpn = network.is_vpn;
            signals.is_tor = network.is_tor;
            signals.is_hosting = network.is_hosting;
        }

        if let Some(phone) = &snapshot.phone_validation {
            signals.phone_risk_score = phone.risk_score;
        }

        signals
    }
}
