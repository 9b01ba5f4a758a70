use crate::config::AnalysisConfig;
use crate::domain_utils::DomainUtils;
use crate::language::LanguageDetector;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

// Language detection only looks at the start of the message.
const LANGUAGE_WINDOW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Per-message verdict bundle. Computed once per fetched message, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysisResult {
    pub is_phishing: bool,
    pub phishing_reason: String,
    pub is_spam: bool,
    pub spam_reason: String,
    pub sentiment: Sentiment,
    pub language: String,
    pub extracted_keywords: Vec<String>,
    pub extracted_links: Vec<String>,
}

/// Keyword/pattern classifiers for individual email content. All rules are
/// pure functions of (text, config); triggered rule reasons are
/// concatenated, space separated, in rule order.
pub struct ContentAnalyzer {
    phishing_keywords: Vec<String>,
    spam_keywords: Vec<String>,
    positive_keywords: Vec<String>,
    negative_keywords: Vec<String>,
    suspicious_link_patterns: Vec<Regex>,
    url_regex: Regex,
    caps_regex: Regex,
    word_regex: Regex,
    excessive_punctuation_threshold: usize,
    excessive_capitalization_threshold: usize,
    min_link_to_text_ratio: usize,
    top_keywords_count: usize,
    detector: LanguageDetector,
}

impl ContentAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let suspicious_link_patterns = config
            .suspicious_link_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid suspicious link pattern: {pattern}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let word_regex = Regex::new(&format!(r"\b\w{{{},}}\b", config.min_keyword_length))
            .context("Invalid keyword length")?;

        Ok(Self {
            phishing_keywords: lowercased(&config.phishing_keywords),
            spam_keywords: lowercased(&config.spam_keywords),
            positive_keywords: lowercased(&config.positive_keywords),
            negative_keywords: lowercased(&config.negative_keywords),
            suspicious_link_patterns,
            url_regex: Regex::new(r#"https?://[^\s"<>]+"#).expect("static pattern"),
            caps_regex: Regex::new(r"[A-Z]{3,}").expect("static pattern"),
            word_regex,
            excessive_punctuation_threshold: config.excessive_punctuation_threshold,
            excessive_capitalization_threshold: config.excessive_capitalization_threshold,
            min_link_to_text_ratio: config.min_link_to_text_ratio,
            top_keywords_count: config.top_keywords_count,
            detector: LanguageDetector::new(&config.language_keywords),
        })
    }

    pub fn analyze(&self, subject: &str, sender: &str, body: &str) -> EmailAnalysisResult {
        let full_text = format!("{subject} {body}");
        let text_lower = full_text.to_lowercase();
        let links = self.extract_urls(&full_text);

        let mut phishing_reasons = Vec::new();
        if self
            .phishing_keywords
            .iter()
            .any(|keyword| text_lower.contains(keyword))
        {
            phishing_reasons.push("Contains phishing-related keywords.");
        }
        if self
            .suspicious_link_patterns
            .iter()
            .any(|pattern| links.iter().any(|link| pattern.is_match(link)))
        {
            phishing_reasons.push("Contains suspicious-looking links.");
        }
        if self.sender_display_mismatch(sender) {
            phishing_reasons.push("Sender display name/email mismatch.");
        }

        let mut spam_reasons = Vec::new();
        if self
            .spam_keywords
            .iter()
            .any(|keyword| text_lower.contains(keyword))
        {
            spam_reasons.push("Contains spam-related keywords.");
        }
        let exclamations = full_text.matches('!').count();
        let caps_runs = self.caps_regex.find_iter(&full_text).count();
        if exclamations > self.excessive_punctuation_threshold
            || caps_runs > self.excessive_capitalization_threshold
        {
            spam_reasons.push("Excessive punctuation/capitalization.");
        }
        if links.len() > self.min_link_to_text_ratio
            && full_text.chars().count() / links.len() < self.min_link_to_text_ratio
        {
            spam_reasons.push("High link-to-text ratio.");
        }

        let language_window: String = full_text.chars().take(LANGUAGE_WINDOW_CHARS).collect();

        EmailAnalysisResult {
            is_phishing: !phishing_reasons.is_empty(),
            phishing_reason: phishing_reasons.join(" "),
            is_spam: !spam_reasons.is_empty(),
            spam_reason: spam_reasons.join(" "),
            sentiment: self.sentiment(&text_lower),
            language: self.detector.detect(&language_window),
            extracted_keywords: self.extract_keywords(&text_lower),
            extracted_links: links,
        }
    }

    /// Pull every URL-shaped token from the text and keep the ones that
    /// actually parse.
    pub fn extract_urls(&self, text: &str) -> Vec<String> {
        self.url_regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .filter(|candidate| Url::parse(candidate).is_ok())
            .collect()
    }

    /// Flags senders like `"Google Support" <not-google@example.com>` where
    /// the display name shares nothing with the address domain.
    fn sender_display_mismatch(&self, sender: &str) -> bool {
        let display_name = match DomainUtils::extract_display_name(sender) {
            Some(name) => name.to_lowercase(),
            None => return false,
        };
        let address = match DomainUtils::extract_address(sender) {
            Some(address) => address,
            None => return false,
        };
        let domain = match DomainUtils::extract_domain(&address) {
            Some(domain) => domain,
            None => return false,
        };

        !display_name.contains(DomainUtils::first_label(&domain))
    }

    /// Presence count of positive keywords minus negative keywords.
    fn sentiment(&self, text_lower: &str) -> Sentiment {
        let mut score: i32 = 0;
        for keyword in &self.positive_keywords {
            if text_lower.contains(keyword) {
                score += 1;
            }
        }
        for keyword in &self.negative_keywords {
            if text_lower.contains(keyword) {
                score -= 1;
            }
        }

        match score {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    /// Top-K most frequent tokens. Ties order alphabetically so the output
    /// is deterministic.
    fn extract_keywords(&self, text_lower: &str) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in self.word_regex.find_iter(text_lower) {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(self.top_keywords_count)
            .map(|(word, _)| word.to_string())
            .collect()
    }
}

fn lowercased(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}
