mod app;
mod client;
mod config;
mod draft;
mod form;
mod logging;
mod models;
mod tui;
mod view;

use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use app::{App, TokioDispatcher};
use client::RecommendClient;
use config::{Config, BASE_URL_ENV};
use form::FormState;
use models::{Field, RecommendationRecord, ResumeDraft};

#[derive(Parser)]
#[command(name = "internmatch")]
#[command(about = "Internship matching - describe your resume, get recommendations")]
struct Cli {
    /// Base URL of the recommendation API
    #[arg(long, global = true, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Keep the draft in memory only
    #[arg(long, global = true)]
    no_persist: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive form (default)
    Tui,

    /// Send the saved draft once and print the recommendations
    Submit {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Inspect or overwrite the saved draft
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Print the saved draft
    Show,

    /// Reset every field to empty
    Clear,

    /// Replace the draft with the built-in example
    Sample,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.base_url.as_deref(), !cli.no_persist);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            if let Err(e) = logging::init_file(&config.log_path()) {
                eprintln!("Warning: logging disabled: {:#}", e);
            }
            tracing::info!(base_url = %config.base_url, "starting interactive session");

            let form = FormState::restore(config.draft_store());
            let client = RecommendClient::new(config.base_url.clone());
            let (dispatcher, completions) = TokioDispatcher::new(runtime.handle().clone(), client);
            let mut app = App::new(form, Box::new(dispatcher));

            tui::run(&mut app, &completions)?;
        }

        Commands::Submit { json } => {
            logging::init_file_or_stderr(&config.log_path());
            let draft = config.draft_store().load();
            if !draft.is_valid() {
                return Err(anyhow!(
                    "Saved draft is empty. Fill in the form first, or run 'internmatch draft sample'."
                ));
            }

            let client = RecommendClient::new(config.base_url.clone());
            eprintln!("Requesting recommendations from {}...", client.endpoint());
            let records = runtime
                .block_on(client.fetch_recommendations(&draft))
                .map_err(|e| anyhow!("Request failed: {}", e))?;

            write_records(&mut io::stdout().lock(), &records, json)?;
        }

        Commands::Draft { command } => {
            logging::init_file_or_stderr(&config.log_path());
            let store = config.draft_store();
            match command {
                DraftCommands::Show => write_draft(&mut io::stdout().lock(), &store.load())?,
                DraftCommands::Clear => {
                    store.save(&ResumeDraft::default());
                    println!("Draft cleared.");
                }
                DraftCommands::Sample => {
                    let sample = ResumeDraft::sample();
                    store.save(&sample);
                    println!("Draft replaced with the example resume.");
                    write_draft(&mut io::stdout().lock(), &sample)?;
                }
            }
        }
    }

    Ok(())
}

fn write_draft(out: &mut impl Write, draft: &ResumeDraft) -> Result<()> {
    for field in Field::ALL {
        let value = draft.get(field);
        writeln!(
            out,
            "{:<16} {}",
            format!("{}:", field.key()),
            if value.is_empty() { "-" } else { value }
        )?;
    }
    Ok(())
}

/// Stdout carries only the records so `--json` output can be piped.
fn write_records(
    out: &mut impl Write,
    records: &[RecommendationRecord],
    json: bool,
) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(records)?)?;
        return Ok(());
    }
    if records.is_empty() {
        writeln!(out, "No recommendations found.")?;
        return Ok(());
    }
    writeln!(out, "{:<4} {:<30} {:<20} {:<20}", "#", "TITLE", "COMPANY", "LOCATION")?;
    writeln!(out, "{}", "-".repeat(76))?;
    for (i, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{:<4} {:<30} {:<20} {:<20}",
            i + 1,
            truncate(&record.title, 28),
            truncate(&record.company, 18),
            truncate(&record.location, 18)
        )?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_and_long() {
        assert_eq!(truncate("Intern", 10), "Intern");
        assert_eq!(truncate("Software Engineering Intern", 10), "Softwar...");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("Ingénieur stagiaire", 8), "Ingén...");
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["internmatch", "--no-persist", "submit", "--json"]).unwrap();
        assert!(cli.no_persist);
        assert!(matches!(cli.command, Some(Commands::Submit { json: true })));

        let cli = Cli::try_parse_from(["internmatch"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from([
            "internmatch",
            "draft",
            "sample",
            "--base-url",
            "http://localhost:9000/",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000/"));
        assert!(matches!(
            cli.command,
            Some(Commands::Draft { command: DraftCommands::Sample })
        ));
    }

    fn record(title: &str, company: &str) -> RecommendationRecord {
        RecommendationRecord {
            title: title.to_string(),
            company: company.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_json_output_is_only_records() {
        let records = vec![record("Backend Intern", "Acme"), record("Data Intern", "Globex")];
        let mut out = Vec::new();
        write_records(&mut out, &records, true).unwrap();

        let parsed: Vec<RecommendationRecord> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_json_output_for_empty_list() {
        let mut out = Vec::new();
        write_records(&mut out, &[], true).unwrap();

        let parsed: Vec<RecommendationRecord> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_table_output() {
        let mut out = Vec::new();
        write_records(&mut out, &[record("Backend Intern", "Acme")], false).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("#"));
        assert!(text.contains("Backend Intern"));
        assert!(text.contains("Acme"));
    }

    #[test]
    fn test_draft_output_uses_field_keys() {
        let mut draft = ResumeDraft::default();
        draft.skills = "Rust".to_string();
        let mut out = Vec::new();
        write_draft(&mut out, &draft).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), Field::ALL.len());
        assert!(lines[0].starts_with("summary:"));
        assert!(lines[0].ends_with(" -"));
        assert!(lines[1].starts_with("skills:"));
        assert!(lines[1].ends_with(" Rust"));
    }
}
