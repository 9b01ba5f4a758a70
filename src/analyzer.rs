use crate::config::AnalysisConfig;
use crate::content::{ContentAnalyzer, EmailAnalysisResult, Sentiment};
use crate::report::ValidationReport;
use crate::risk::{self, Classification, RiskLevel};
use crate::signals::RawSignals;
use crate::snapshot::{AccountSnapshot, EmailMessage};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account-level verdict: the extracted signals plus everything derived
/// from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAssessment {
    pub signals: RawSignals,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhishingAttempt {
    pub subject: String,
    pub sender: String,
    pub reason: String,
    pub links: Vec<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamEmail {
    pub subject: String,
    pub sender: String,
    pub reason: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousLanguage {
    pub subject: String,
    pub sender: String,
    pub language: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: u32,
}

/// Rollup of per-message verdicts across a mailbox sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxReport {
    pub phishing_attempts: Vec<PhishingAttempt>,
    pub spam_emails: Vec<SpamEmail>,
    pub suspicious_language: Vec<SuspiciousLanguage>,
    pub sentiment_breakdown: SentimentBreakdown,
    pub top_keywords: Vec<KeywordCount>,
    pub total_analyzed: u32,
}

/// Front door for the whole engine: signal extraction, risk aggregation,
/// report assembly, and the mailbox content sweep.
pub struct AccountAnalyzer {
    config: AnalysisConfig,
    content: ContentAnalyzer,
}

impl AccountAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let content = ContentAnalyzer::new(&config)?;
        Ok(Self { config, content })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn assess(&self, snapshot: &AccountSnapshot) -> AccountAssessment {
        let signals = RawSignals::from_snapshot(snapshot);
        let risk_score = risk::aggregate(&signals, &self.config.risk);
        let risk_level = RiskLevel::from_score(risk_score);
        log::debug!(
            "Account assessed: score={risk_score} level={}",
            risk_level.as_str()
        );
        AccountAssessment {
            signals,
            risk_score,
            risk_level,
            classification: Classification::from_level(risk_level),
        }
    }

    pub fn validation_report(&self, snapshot: &AccountSnapshot) -> ValidationReport {
        let assessment = self.assess(snapshot);
        ValidationReport::build(snapshot, assessment.risk_score, assessment.risk_level)
    }

    pub fn analyze_message(&self, message: &EmailMessage) -> EmailAnalysisResult {
        self.content
            .analyze(&message.subject, &message.sender, &message.body)
    }

    /// Classify each message and roll the verdicts up into one report.
    pub fn sweep_mailbox(&self, messages: &[EmailMessage]) -> MailboxReport {
        let mut report = MailboxReport::default();
        let mut keyword_totals: HashMap<String, u32> = HashMap::new();

        for message in messages.iter().take(self.config.max_emails_to_analyze) {
            report.total_analyzed += 1;
            let analysis = self.analyze_message(message);

            if analysis.is_phishing {
                report.phishing_attempts.push(PhishingAttempt {
                    subject: message.subject.clone(),
                    sender: message.sender.clone(),
                    reason: analysis.phishing_reason.clone(),
                    links: analysis.extracted_links.clone(),
                    date: message.date.clone(),
                });
            }
            if analysis.is_spam {
                report.spam_emails.push(SpamEmail {
                    subject: message.subject.clone(),
                    sender: message.sender.clone(),
                    reason: analysis.spam_reason.clone(),
                    date: message.date.clone(),
                });
            }
            if analysis.language != "English" {
                report.suspicious_language.push(SuspiciousLanguage {
                    subject: message.subject.clone(),
                    sender: message.sender.clone(),
                    language: analysis.language.clone(),
                    date: message.date.clone(),
                });
            }

            match analysis.sentiment {
                Sentiment::Positive => report.sentiment_breakdown.positive += 1,
                Sentiment::Negative => report.sentiment_breakdown.negative += 1,
                Sentiment::Neutral => report.sentiment_breakdown.neutral += 1,
            }

            for keyword in analysis.extracted_keywords {
                *keyword_totals.entry(keyword).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, u32)> = keyword_totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        report.top_keywords = ranked
            .into_iter()
            .take(self.config.top_keywords_count)
            .map(|(word, count)| KeywordCount { word, count })
            .collect();

        report
    }
}
