use crate::domain_utils::DomainUtils;
use crate::snapshot::{
    AccountSnapshot, EmailMessage, GmailLabel, GmailMetadata, GmailSettings, NetworkInfo,
    OauthProfile,
};
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const IP_API_URL: &str = "http://ip-api.com/json?fields=status,query,city,regionName,country,countryCode,isp,org,as,proxy,hosting";

// How many recent messages to sample for sender metadata.
const SENDER_SAMPLE: usize = 5;

fn build_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("inbox-auditor/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// IP geolocation and reputation lookup. A failed fetch is logged and
/// reported as `None`; callers mark the source missing and move on.
pub struct IpLookup {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: String,
    query: Option<String>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    asn: Option<String>,
    #[serde(default)]
    proxy: bool,
    #[serde(default)]
    hosting: bool,
}

impl IpApiResponse {
    fn into_network_info(self) -> NetworkInfo {
        NetworkInfo {
            ip: self.query,
            city: self.city,
            region: self.region_name,
            country: self.country,
            country_code: self.country_code,
            isp: self.isp,
            asn: self.asn,
            organization: self.org,
            is_proxy: self.proxy,
            // ip-api does not distinguish VPN/Tor from generic proxies
            is_vpn: false,
            is_tor: false,
            is_hosting: self.hosting,
            threat_level: None,
        }
    }
}

impl Default for IpLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl IpLookup {
    pub fn new() -> Self {
        Self {
            client: build_client(),
            endpoint: IP_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(endpoint: &str) -> Self {
        Self {
            client: build_client(),
            endpoint: endpoint.to_string(),
        }
    }

    pub async fn fetch(&self) -> Option<NetworkInfo> {
        let response = match self.client.get(&self.endpoint).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("IP lookup failed: {e}");
                return None;
            }
        };
        let parsed: IpApiResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Failed to parse IP lookup response: {e}");
                return None;
            }
        };
        if parsed.status == "fail" {
            log::warn!("IP lookup rejected the request");
            return None;
        }
        Some(parsed.into_network_info())
    }
}

/// Client for the Google userinfo and Gmail REST endpoints. Every fetch is
/// best-effort: errors become `None` plus a warning, never a hard failure.
pub struct GoogleClient {
    client: Client,
    access_token: String,
    gmail_base: String,
    userinfo_url: String,
}

#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
    locale: Option<String>,
    verified_email: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct LabelListResponse {
    #[serde(default)]
    labels: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize)]
struct LabelEntry {
    id: String,
    name: String,
    #[serde(rename = "type")]
    label_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    payload: Option<MessagePayload>,
    #[serde(rename = "internalDate")]
    internal_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagePayload {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    #[serde(default)]
    headers: Vec<MessageHeader>,
    body: Option<MessageBody>,
    #[serde(default)]
    parts: Vec<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessageHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    data: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ForwardingResponse {
    #[serde(rename = "forwardingAddresses", default)]
    forwarding_addresses: Vec<ForwardingAddress>,
}

#[derive(Debug, Deserialize)]
struct ForwardingAddress {
    #[serde(rename = "forwardingEmail")]
    forwarding_email: String,
}

#[derive(Debug, Default, Deserialize)]
struct PopSettings {
    #[serde(rename = "accessWindow")]
    access_window: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImapSettings {
    #[serde(default)]
    enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
struct VacationSettings {
    #[serde(rename = "enableAutoReply", default)]
    enable_auto_reply: bool,
}

#[derive(Debug, Default, Deserialize)]
struct DelegateListResponse {
    #[serde(default)]
    delegates: Vec<Delegate>,
}

#[derive(Debug, Deserialize)]
struct Delegate {
    #[serde(rename = "delegateEmail")]
    delegate_email: String,
}

impl GoogleClient {
    pub fn new(access_token: &str) -> Self {
        Self {
            client: build_client(),
            access_token: access_token.to_string(),
            gmail_base: GMAIL_BASE_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Option<T> {
        let response = match self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Request to {url} failed: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            log::warn!("Request to {url} returned {}", response.status());
            return None;
        }
        match response.json().await {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Failed to parse response from {url}: {e}");
                None
            }
        }
    }

    pub async fn fetch_profile(&self) -> Option<OauthProfile> {
        let userinfo: UserinfoResponse = self.get_json(&self.userinfo_url).await?;
        Some(OauthProfile {
            name: userinfo.name,
            email: userinfo.email,
            picture: userinfo.picture,
            locale: userinfo.locale,
            email_verified: userinfo.verified_email,
            account_creation_time: None,
            recovery_email_status: None,
        })
    }

    /// Mailbox counts plus sender metadata from the most recent messages.
    /// No message bodies are requested here.
    pub async fn fetch_metadata(&self, suspicious_domains: &Regex) -> Option<GmailMetadata> {
        let inbox: MessageListResponse = self
            .get_json(&format!(
                "{}/messages?q=in:inbox&maxResults=500",
                self.gmail_base
            ))
            .await?;
        let spam: MessageListResponse = self
            .get_json(&format!(
                "{}/messages?q=in:spam&maxResults=500",
                self.gmail_base
            ))
            .await
            .unwrap_or_default();
        let unread: MessageListResponse = self
            .get_json(&format!(
                "{}/messages?q=is:unread&maxResults=500",
                self.gmail_base
            ))
            .await
            .unwrap_or_default();
        let labels: LabelListResponse = self
            .get_json(&format!("{}/labels", self.gmail_base))
            .await
            .unwrap_or_default();

        let mut unique_senders = BTreeSet::new();
        let mut suspicious = BTreeSet::new();
        let mut timestamps = Vec::new();

        for message_ref in inbox.messages.iter().take(SENDER_SAMPLE) {
            let message: Option<MessageResponse> = self
                .get_json(&format!(
                    "{}/messages/{}?format=metadata&metadataHeaders=From",
                    self.gmail_base, message_ref.id
                ))
                .await;
            let Some(message) = message else { continue };

            if let Some(payload) = &message.payload {
                if let Some(from) = header_value(&payload.headers, "From") {
                    if let Some(address) = DomainUtils::extract_address(from) {
                        if let Some(domain) = DomainUtils::extract_domain(&address) {
                            if suspicious_domains.is_match(&domain) {
                                suspicious.insert(domain);
                            }
                        }
                        unique_senders.insert(address);
                    }
                }
            }
            if let Some(formatted) = message.internal_date.as_deref().and_then(format_timestamp) {
                timestamps.push(formatted);
            }
        }

        Some(GmailMetadata {
            total_inbox_count: inbox.messages.len() as u64,
            total_spam_count: spam.messages.len() as u64,
            total_unread_count: unread.messages.len() as u64,
            unique_senders: unique_senders.into_iter().collect(),
            suspicious_domains: suspicious.into_iter().collect(),
            last_message_timestamps: timestamps,
            labels: labels
                .labels
                .into_iter()
                .map(|label| GmailLabel {
                    id: label.id,
                    name: label.name,
                    label_type: label.label_type.unwrap_or_else(|| "user".to_string()),
                })
                .collect(),
            auth_failures: None,
            bulk_sender_count: 0,
            suspicious_url_count: 0,
        })
    }

    pub async fn fetch_settings(&self) -> Option<GmailSettings> {
        let forwarding: ForwardingResponse = self
            .get_json(&format!(
                "{}/settings/forwardingAddresses",
                self.gmail_base
            ))
            .await?;
        let pop: PopSettings = self
            .get_json(&format!("{}/settings/pop", self.gmail_base))
            .await
            .unwrap_or_default();
        let imap: ImapSettings = self
            .get_json(&format!("{}/settings/imap", self.gmail_base))
            .await
            .unwrap_or_default();
        let vacation: VacationSettings = self
            .get_json(&format!("{}/settings/vacation", self.gmail_base))
            .await
            .unwrap_or_default();
        let delegates: DelegateListResponse = self
            .get_json(&format!("{}/settings/delegates", self.gmail_base))
            .await
            .unwrap_or_default();

        Some(GmailSettings {
            forwarding_enabled: !forwarding.forwarding_addresses.is_empty(),
            forwarding_address: forwarding
                .forwarding_addresses
                .first()
                .map(|address| address.forwarding_email.clone()),
            pop_enabled: pop
                .access_window
                .map(|window| window != "disabled")
                .unwrap_or(false),
            imap_enabled: imap.enabled,
            auto_reply_enabled: vacation.enable_auto_reply,
            delegated_accounts: delegates
                .delegates
                .into_iter()
                .map(|delegate| delegate.delegate_email)
                .collect(),
        })
    }

    /// Full messages for the content sweep, bodies decoded from base64url.
    pub async fn fetch_recent_messages(&self, max: usize) -> Vec<EmailMessage> {
        let list: MessageListResponse = match self
            .get_json(&format!("{}/messages?maxResults={max}", self.gmail_base))
            .await
        {
            Some(list) => list,
            None => return Vec::new(),
        };

        let mut messages = Vec::new();
        for message_ref in list.messages.iter().take(max) {
            let response: Option<MessageResponse> = self
                .get_json(&format!(
                    "{}/messages/{}?format=full",
                    self.gmail_base, message_ref.id
                ))
                .await;
            let Some(response) = response else { continue };
            let Some(payload) = response.payload else { continue };

            messages.push(EmailMessage {
                subject: header_value(&payload.headers, "Subject")
                    .unwrap_or("")
                    .to_string(),
                sender: header_value(&payload.headers, "From")
                    .unwrap_or("")
                    .to_string(),
                body: payload_text(&payload),
                date: header_value(&payload.headers, "Date").map(|s| s.to_string()),
            });
        }
        messages
    }
}

/// Fetch every independent section concurrently and bundle whatever
/// succeeded. Sections that failed stay `None` and end up "missing" in the
/// validation report.
pub async fn collect_snapshot(
    ip_lookup: &IpLookup,
    google: Option<&GoogleClient>,
    suspicious_domains: &Regex,
) -> AccountSnapshot {
    match google {
        Some(client) => {
            let (network, profile, metadata, settings) = tokio::join!(
                ip_lookup.fetch(),
                client.fetch_profile(),
                client.fetch_metadata(suspicious_domains),
                client.fetch_settings(),
            );
            AccountSnapshot {
                profile,
                gmail_metadata: metadata,
                gmail_settings: settings,
                network,
                ..Default::default()
            }
        }
        None => AccountSnapshot {
            network: ip_lookup.fetch().await,
            ..Default::default()
        },
    }
}

fn header_value<'a>(headers: &'a [MessageHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str())
}

/// Millisecond epoch string to RFC 3339.
fn format_timestamp(millis: &str) -> Option<String> {
    let millis: i64 = millis.parse().ok()?;
    chrono::DateTime::from_timestamp_millis(millis).map(|timestamp| timestamp.to_rfc3339())
}

/// Gmail encodes body data as base64url, with and without padding.
fn decode_body_data(data: &str) -> Option<String> {
    let engine = &base64::engine::general_purpose::URL_SAFE;
    let no_pad = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let bytes = engine
        .decode(data)
        .or_else(|_| no_pad.decode(data))
        .ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Concatenated text/plain content of a message payload tree.
fn payload_text(payload: &MessagePayload) -> String {
    let mut text = String::new();
    collect_text(payload, &mut text);
    text
}

fn collect_text(payload: &MessagePayload, out: &mut String) {
    let is_text = payload
        .mime_type
        .as_deref()
        .map(|mime| mime.starts_with("text/plain"))
        // treat untyped single-part bodies as text
        .unwrap_or(payload.parts.is_empty());

    if is_text {
        if let Some(data) = payload.body.as_ref().and_then(|body| body.data.as_deref()) {
            if let Some(decoded) = decode_body_data(data) {
                out.push_str(&decoded);
            }
        }
    }
    for part in &payload.parts {
        collect_text(part, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_padded_and_unpadded_base64url() {
        let engine = &base64::engine::general_purpose::URL_SAFE;
        let encoded = engine.encode("Hello, world!");
        assert_eq!(decode_body_data(&encoded).as_deref(), Some("Hello, world!"));

        let trimmed = encoded.trim_end_matches('=');
        assert_eq!(decode_body_data(trimmed).as_deref(), Some("Hello, world!"));

        assert!(decode_body_data("!!! not base64 !!!").is_none());
    }

    #[test]
    fn payload_text_walks_nested_parts() {
        let engine = &base64::engine::general_purpose::URL_SAFE;
        let payload = MessagePayload {
            mime_type: Some("multipart/alternative".to_string()),
            headers: Vec::new(),
            body: None,
            parts: vec![
                MessagePayload {
                    mime_type: Some("text/plain".to_string()),
                    body: Some(MessageBody {
                        data: Some(engine.encode("first part ")),
                    }),
                    ..Default::default()
                },
                MessagePayload {
                    mime_type: Some("text/html".to_string()),
                    body: Some(MessageBody {
                        data: Some(engine.encode("<b>ignored</b>")),
                    }),
                    ..Default::default()
                },
                MessagePayload {
                    mime_type: Some("multipart/mixed".to_string()),
                    parts: vec![MessagePayload {
                        mime_type: Some("text/plain; charset=utf-8".to_string()),
                        body: Some(MessageBody {
                            data: Some(engine.encode("second part")),
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
        };
        assert_eq!(payload_text(&payload), "first part second part");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers = vec![MessageHeader {
            name: "FROM".to_string(),
            value: "user@example.com".to_string(),
        }];
        assert_eq!(header_value(&headers, "From"), Some("user@example.com"));
        assert_eq!(header_value(&headers, "Subject"), None);
    }

    #[test]
    fn ip_api_response_maps_to_network_info() {
        let raw = r#"{
            "status": "success",
            "query": "203.0.113.7",
            "city": "Springfield",
            "regionName": "Oregon",
            "country": "United States",
            "countryCode": "US",
            "isp": "ExampleNet",
            "org": "Example Org",
            "as": "AS64496 ExampleNet",
            "proxy": true,
            "hosting": false
        }"#;
        let parsed: IpApiResponse = serde_json::from_str(raw).unwrap();
        let info = parsed.into_network_info();
        assert_eq!(info.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.region.as_deref(), Some("Oregon"));
        assert!(info.is_proxy);
        assert!(!info.is_hosting);
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(
            format_timestamp("1700000000000").as_deref(),
            Some("2023-11-14T22:13:20+00:00")
        );
        assert!(format_timestamp("not-a-number").is_none());
    }
}
