pub mod analyzer;
pub mod cache;
pub mod config;
pub mod content;
pub mod domain_utils;
pub mod language;
pub mod providers;
pub mod report;
pub mod risk;
pub mod signals;
pub mod snapshot;

pub use analyzer::{AccountAnalyzer, AccountAssessment, MailboxReport};
pub use cache::SnapshotCache;
pub use config::AnalysisConfig;
pub use content::{ContentAnalyzer, EmailAnalysisResult};
pub use language::LanguageDetector;
pub use report::{SourceStatus, ValidationReport};
pub use risk::{Classification, RiskLevel};
pub use signals::RawSignals;
pub use snapshot::{AccountSnapshot, EmailMessage};
