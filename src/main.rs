use clap::{Arg, Command};
use inbox_auditor::analyzer::AccountAnalyzer;
use inbox_auditor::config::AnalysisConfig;
use inbox_auditor::providers::{collect_snapshot, GoogleClient, IpLookup};
use inbox_auditor::snapshot::{AccountSnapshot, EmailMessage};
use log::LevelFilter;
use regex::Regex;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("inbox-auditor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Account and mailbox risk auditing from OAuth profile and Gmail metadata")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("inbox-auditor.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("snapshot")
                .short('s')
                .long("snapshot")
                .value_name("FILE")
                .help("Account snapshot JSON file to analyze")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("mailbox")
                .long("mailbox")
                .value_name("FILE")
                .help("JSON array of messages to run the content sweep over")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("access-token")
                .long("access-token")
                .value_name("TOKEN")
                .help("OAuth access token for live Google API collection")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FORMAT")
                .help("Report output format (text, json)")
                .default_value("text"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match AnalysisConfig::load_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let analyzer = match AccountAnalyzer::new(config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error building analyzer: {e}");
            process::exit(1);
        }
    };

    let access_token = matches.get_one::<String>("access-token");
    let snapshot = match matches.get_one::<String>("snapshot") {
        Some(path) => load_snapshot(path),
        None => match access_token {
            Some(token) => fetch_snapshot(&analyzer, token).await,
            None => {
                eprintln!("Provide --snapshot FILE or --access-token TOKEN");
                process::exit(1);
            }
        },
    };

    let messages = match matches.get_one::<String>("mailbox") {
        Some(path) => load_mailbox(path),
        None => match access_token {
            Some(token) => {
                let client = GoogleClient::new(token);
                client
                    .fetch_recent_messages(analyzer.config().max_emails_to_analyze)
                    .await
            }
            None => Vec::new(),
        },
    };

    let assessment = analyzer.assess(&snapshot);
    let report = analyzer.validation_report(&snapshot);
    let mailbox_report = if messages.is_empty() {
        None
    } else {
        Some(analyzer.sweep_mailbox(&messages))
    };

    match matches.get_one::<String>("report").unwrap().as_str() {
        "json" => {
            let combined = serde_json::json!({
                "assessment": assessment,
                "validationReport": report,
                "mailboxReport": mailbox_report,
            });
            match serde_json::to_string_pretty(&combined) {
                Ok(output) => println!("{output}"),
                Err(e) => {
                    eprintln!("Error serializing report: {e}");
                    process::exit(1);
                }
            }
        }
        "text" => {
            println!(
                "Risk score: {}/100 ({}, {})",
                assessment.risk_score,
                assessment.risk_level.as_str(),
                assessment.classification.as_str()
            );
            println!();
            print!("{}", report.to_plain_text());
            if let Some(mailbox) = &mailbox_report {
                println!();
                println!("Mailbox Content Sweep:");
                println!("- Messages analyzed: {}", mailbox.total_analyzed);
                println!("- Phishing attempts: {}", mailbox.phishing_attempts.len());
                println!("- Spam messages: {}", mailbox.spam_emails.len());
                println!(
                    "- Non-English messages: {}",
                    mailbox.suspicious_language.len()
                );
                println!(
                    "- Sentiment: {} positive / {} negative / {} neutral",
                    mailbox.sentiment_breakdown.positive,
                    mailbox.sentiment_breakdown.negative,
                    mailbox.sentiment_breakdown.neutral
                );
            }
        }
        other => {
            eprintln!("Unknown report format: {other} (expected text or json)");
            process::exit(1);
        }
    }
}

fn generate_default_config(path: &str) {
    match AnalysisConfig::default().save(path) {
        Ok(()) => {
            println!("Default configuration written to: {path}");
            println!("Edit the keyword lists and risk weights, then run with -c {path}");
        }
        Err(e) => {
            eprintln!("Error generating config: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &AnalysisConfig) {
    println!("Testing configuration...");
    println!("Phishing keywords: {}", config.phishing_keywords.len());
    println!(
        "Suspicious link patterns: {}",
        config.suspicious_link_patterns.len()
    );
    println!("Spam keywords: {}", config.spam_keywords.len());
    println!("Language keyword sets: {}", config.language_keywords.len());
    match config.validate() {
        Ok(()) => println!("Configuration is valid"),
        Err(e) => {
            eprintln!("Configuration is invalid: {e}");
            process::exit(1);
        }
    }
}

fn load_snapshot(path: &str) -> AccountSnapshot {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading snapshot file {path}: {e}");
            process::exit(1);
        }
    };
    match AccountSnapshot::from_json(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error parsing snapshot file {path}: {e}");
            process::exit(1);
        }
    }
}

fn load_mailbox(path: &str) -> Vec<EmailMessage> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error reading mailbox file {path}: {e}");
            process::exit(1);
        }
    };
    match serde_json::from_str(&raw) {
        Ok(messages) => messages,
        Err(e) => {
            eprintln!("Error parsing mailbox file {path}: {e}");
            process::exit(1);
        }
    }
}

async fn fetch_snapshot(analyzer: &AccountAnalyzer, token: &str) -> AccountSnapshot {
    let pattern = match Regex::new(&analyzer.config().suspicious_domain_pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            eprintln!("Invalid suspicious domain pattern: {e}");
            process::exit(1);
        }
    };
    let ip_lookup = IpLookup::new();
    let client = GoogleClient::new(token);
    collect_snapshot(&ip_lookup, Some(&client), &pattern).await
}
