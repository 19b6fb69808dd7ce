mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::complete::date_picker::date_token;
use crate::complete::{EditingSession, FixedClock, KeyOutcome, PlainInput, TextInput};
use crate::io::vault::{Vault, open_vault};
use crate::model::CompletionConfig;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = resolve_dir(cli.vault_dir.as_deref())?;

    match cli.command {
        None => crate::tui::run(Some(&dir), &cli.file),
        Some(cmd) => match cmd {
            Commands::Init => cmd_init(&dir),
            Commands::Complete(args) => cmd_complete(&dir, args, json),
            Commands::Tags => cmd_tags(&dir, json),
            Commands::Date(args) => cmd_date(&dir, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The -C directory made absolute, or the working directory.
fn resolve_dir(vault_dir: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match vault_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir.display(), e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn parse_today(today: Option<&str>) -> Result<Option<NaiveDate>, Box<dyn std::error::Error>> {
    let Some(s) = today else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid --today '{}': expected YYYY-MM-DD", s))?;
    Ok(Some(date))
}

/// Load the vault and start a session on `file` within it.
fn start_session(
    dir: &Path,
    file: Option<&str>,
    today: Option<&str>,
) -> Result<(Vault, EditingSession), Box<dyn std::error::Error>> {
    let (vault, vault_config) = open_vault(dir)?;
    let config = CompletionConfig::resolve(&vault_config);
    let mut session = EditingSession::start(&vault.notes, config, file);
    if let Some(today) = parse_today(today)? {
        session = session.with_clock(FixedClock(today));
    }
    Ok((vault, session))
}

/// Feed `text` through the session one key at a time, as an editor would.
fn type_keys(session: &mut EditingSession, input: &mut PlainInput, text: &str) {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        if session.handle_key(input, key) == KeyOutcome::Forward {
            input.type_str(c.encode_utf8(&mut buf));
            session.on_text_change(input);
        }
    }
}

/// Confirm the open date picker as Enter would, and print the outcome.
fn print_date_confirm(
    session: &mut EditingSession,
    mut input: PlainInput,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(date) = session.date_picker().map(|p| p.effective_date()) else {
        return Err("no date trigger before the caret".into());
    };
    let token = date_token(date, session.config());
    session.handle_key(&mut input, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    if json {
        let out = DateJson {
            date,
            token,
            result: input.text().to_string(),
            caret: input.caret(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", input.text());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_complete(
    dir: &Path,
    args: CompleteArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_vault, mut session) = start_session(dir, args.file.as_deref(), args.today.as_deref())?;
    let input = PlainInput::with_caret(&args.text, &args.after);
    session.on_text_change(&input);

    if session.date_picker().is_some() {
        return print_date_confirm(&mut session, input, json);
    }

    let state = session.dropdown();
    let limit = args.limit.unwrap_or(usize::MAX);
    let mut items = Vec::new();
    for (i, candidate) in state.items.iter().take(limit).enumerate() {
        let Some(splice) = session.splice_for(i) else {
            continue;
        };
        let mut preview = input.clone();
        splice.apply(&mut preview);
        items.push((candidate, splice.text, preview));
    }

    if json {
        let out = CompletionJson {
            strategy: state.trigger.as_ref().map(|t| t.strategy.name()),
            query: state.trigger.as_ref().map(|t| t.query.clone()).unwrap_or_default(),
            start: state.trigger.as_ref().map_or(input.caret(), |t| t.range.start),
            end: state.trigger.as_ref().map_or(input.caret(), |t| t.splice_range().end),
            items: items
                .into_iter()
                .map(|(candidate, _, preview)| CandidateJson {
                    label: candidate.label.clone(),
                    score: candidate.score,
                    entity: candidate.entity.clone(),
                    result: preview.text().to_string(),
                    caret: preview.caret(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (candidate, inserted, _) in &items {
            println!("{}", format_candidate(candidate, inserted));
        }
    }
    Ok(())
}

fn cmd_tags(dir: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    use crate::complete::MetadataSource;

    let (vault, _) = open_vault(dir)?;
    let tags = vault.notes.tags();
    if json {
        let out: Vec<TagJson> = tags.into_iter().map(|name| TagJson { name }).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for tag in tags {
            println!("#{}", tag);
        }
    }
    Ok(())
}

fn cmd_date(dir: &Path, args: DateArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (_vault, mut session) = start_session(dir, None, args.today.as_deref())?;
    let mut input = PlainInput::new("");
    type_keys(&mut session, &mut input, &args.text);
    print_date_confirm(&mut session, input, json)
}
