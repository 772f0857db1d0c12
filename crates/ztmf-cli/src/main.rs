//! `ztmf` CLI: review Zero Trust maturity scores, manage FISMA systems, and
//! answer datacall questionnaires against the ZTMF REST API.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod questionnaire;
mod ui;

use std::collections::HashMap;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use ztmf_client::{ClientConfig, Recovery, ZtmfClient, ZtmfError, load_auth};
use ztmf_core::decommission::{
    DecommissionRequest, confirmation_text, truncate_notes, validate_date,
};
use ztmf_core::form::{FIELD_CONFIGS, SystemForm, validate_datacall_name, validate_deadline};
use ztmf_core::format::format_score;
use ztmf_core::history::ScoreHistory;
use ztmf_core::maturity::maturity;
use ztmf_core::model::NewDatacall;

use crate::ui::{
    BANNER_SMALL, bold, dim, error_line, header, kv_line, score_chip, success, table, tier_label,
    trend_glyph, trend_line, warning,
};

// ── CLI structure ────────────────────────────────────────────────────

/// ZTMF: Zero Trust maturity scoring for FISMA systems.
#[derive(Parser)]
#[command(
    name = "ztmf",
    version,
    about = "ZTMF CLI: review maturity scores, manage FISMA systems, and answer datacall questionnaires",
    long_about = None,
    after_help = "Environment variables:\n  \
         ZTMF_URL        API base URL (default: http://localhost:8080/api/v1)\n  \
         ZTMF_TOKEN      Bearer token\n  \
         ZTMF_LOG_LEVEL  Log filter when RUST_LOG is unset (default: warn)\n\n\
         Examples:\n  \
         ztmf whoami\n  \
         ztmf systems list\n  \
         ztmf scores 12\n  \
         ztmf questionnaire 12\n  \
         ztmf systems decommission 12 --date 2025-01-31 --notes 'migrated'",
)]
struct Cli {
    /// API base URL.
    #[arg(long, env = "ZTMF_URL")]
    url: Option<String>,

    /// Bearer token.
    #[arg(long, env = "ZTMF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Disable colored output.
    #[arg(long, default_value = "false")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in user.
    Whoami,
    /// FISMA system operations.
    Systems {
        #[command(subcommand)]
        action: SystemCommands,
    },
    /// Show a system's score history with trends.
    Scores {
        /// FISMA system id.
        system_id: i64,
    },
    /// Datacall operations.
    Datacalls {
        #[command(subcommand)]
        action: DatacallCommands,
    },
    /// Answer the questionnaire for a system interactively.
    Questionnaire {
        /// FISMA system id.
        system_id: i64,
        /// Datacall id (default: the latest).
        #[arg(long)]
        datacall: Option<i64>,
    },
}

#[derive(Subcommand)]
enum SystemCommands {
    /// List systems with their latest overall score.
    List {
        /// Include decommissioned systems.
        #[arg(long, default_value = "false")]
        all: bool,
    },
    /// Show one system.
    Show {
        id: i64,
    },
    /// Create a system (admin only).
    Create {
        /// JSON file with field values.
        #[arg(long)]
        from: Option<String>,
        /// Field values as key=value.
        fields: Vec<String>,
    },
    /// Edit fields of a system (admin only).
    Edit {
        id: i64,
        /// Field values as key=value.
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Mark a system decommissioned (admin only).
    Decommission {
        id: i64,
        /// Decommission date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        /// Optional notes (max 500 characters).
        #[arg(long, default_value = "")]
        notes: String,
        /// Skip the confirmation prompt.
        #[arg(long, short = 'y', default_value = "false")]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DatacallCommands {
    /// List datacalls, newest first.
    List,
    /// Create a datacall (admin only).
    Create {
        /// Name in the form `FY2025 Q1`.
        name: String,
        /// Deadline, YYYY-MM-DD.
        #[arg(long)]
        deadline: String,
    },
}

// ── Command dispatch ─────────────────────────────────────────────────

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            std::env::var("ZTMF_LOG_LEVEL").unwrap_or_else(|_| "warn".to_owned()),
        )
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();
    ui::set_color(!cli.no_color);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            report(&e);
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

/// Print an error the way its recovery asks for.
fn report(err: &anyhow::Error) {
    let Some(api) = err.downcast_ref::<ZtmfError>() else {
        error_line(&format!("{err:#}"));
        return;
    };
    debug!(error = %api, kind = ?api.kind(), "command failed");
    match api.recovery() {
        Recovery::FieldErrors(fields) => {
            error_line("The server rejected some fields:");
            let mut form = SystemForm::create();
            form.apply_server_errors(&fields);
            for (key, text) in form.errors().iter().filter(|(k, _)| fields.contains_key(*k)) {
                eprintln!("    {key}: {text}");
            }
        }
        Recovery::SignIn(message) => {
            error_line(&format!("{err:#}"));
            eprintln!("  {message}");
        }
        Recovery::Inline(message) => error_line(&message),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cfg = ClientConfig {
        base_url: cli.url.unwrap_or_default(),
        token: cli.token.unwrap_or_default(),
        timeout: Duration::from_secs(cli.timeout),
        ..ClientConfig::default()
    };
    let client = ZtmfClient::with_config(&cfg)?;

    match cli.command {
        Commands::Whoami => cmd_whoami(&client).await,
        Commands::Systems { action } => cmd_systems(&client, action).await,
        Commands::Scores { system_id } => cmd_scores(&client, system_id).await,
        Commands::Datacalls { action } => cmd_datacalls(&client, action).await,
        Commands::Questionnaire {
            system_id,
            datacall,
        } => questionnaire::run(&client, system_id, datacall).await,
    }
}

// ── Identity ─────────────────────────────────────────────────────────

async fn cmd_whoami(client: &ZtmfClient) -> Result<()> {
    let auth = load_auth(client).await;
    if !auth.ok {
        bail!(ztmf_client::ERROR_MESSAGES.login);
    }
    println!();
    header("👤", "Signed In");
    kv_line("Name", auth.user.display_name());
    kv_line("Email", &auth.user.email);
    let role: String = auth.user.role.clone().into();
    kv_line("Role", if role.is_empty() { "-" } else { &role });
    kv_line(
        "Assigned systems",
        &auth
            .user
            .assignedfismasystems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    );
    println!();
    Ok(())
}

async fn require_admin(client: &ZtmfClient) -> Result<()> {
    let auth = load_auth(client).await;
    if !auth.ok {
        bail!(ztmf_client::ERROR_MESSAGES.login);
    }
    if !auth.user.is_admin() {
        bail!("this action requires the ADMIN role");
    }
    Ok(())
}

// ── Systems ──────────────────────────────────────────────────────────

async fn cmd_systems(client: &ZtmfClient, action: SystemCommands) -> Result<()> {
    match action {
        SystemCommands::List { all } => cmd_systems_list(client, all).await,
        SystemCommands::Show { id } => cmd_systems_show(client, id).await,
        SystemCommands::Create { from, fields } => {
            cmd_systems_create(client, from.as_deref(), &fields).await
        }
        SystemCommands::Edit { id, fields } => cmd_systems_edit(client, id, &fields).await,
        SystemCommands::Decommission {
            id,
            date,
            notes,
            yes,
        } => cmd_systems_decommission(client, id, &date, &notes, yes).await,
    }
}

async fn cmd_systems_list(client: &ZtmfClient, all: bool) -> Result<()> {
    let systems = client.fisma_systems().await?;
    let scores: HashMap<i64, f64> = client
        .aggregate_scores()
        .await?
        .into_iter()
        .map(|s| (s.fismasystemid, s.systemscore))
        .collect();

    let rows: Vec<Vec<String>> = systems
        .iter()
        .filter(|s| all || !s.decommissioned)
        .map(|s| {
            let score = scores.get(&s.fismasystemid).copied().unwrap_or(0.0);
            let mut row = vec![
                s.fismasystemid.to_string(),
                s.fismaacronym.clone(),
                s.fismaname.clone(),
                format_score(score),
                maturity(score).tier.label().to_owned(),
            ];
            if all {
                row.push(if s.decommissioned { "decommissioned" } else { "active" }.to_owned());
            }
            row
        })
        .collect();

    println!();
    header("🛡", &format!("FISMA Systems ({})", rows.len()));
    if rows.is_empty() {
        println!("  {}", dim("(none)"));
    } else if all {
        table(&["ID", "ACRONYM", "NAME", "SCORE", "MATURITY", "STATUS"], &rows);
    } else {
        table(&["ID", "ACRONYM", "NAME", "SCORE", "MATURITY"], &rows);
    }
    println!();
    Ok(())
}

async fn cmd_systems_show(client: &ZtmfClient, id: i64) -> Result<()> {
    let system = client.fisma_system(id).await?;

    println!();
    header("🛡", &format!("{} ({})", system.fismaname, system.fismaacronym));
    kv_line("ID", &system.fismasystemid.to_string());
    for config in FIELD_CONFIGS {
        let value = system.field(config.key).unwrap_or("");
        kv_line(config.label, if value.is_empty() { "-" } else { value });
    }

    if system.decommissioned {
        println!();
        warning("Decommissioned");
        if let Some(date) = &system.decommissioned_date {
            kv_line("Date", date.get(..10).unwrap_or(date));
        }
        if let Some(by) = system.decommissioned_by.as_deref().filter(|b| !b.is_empty()) {
            let name = match client.user_by_id(by).await {
                Ok(user) => user.display_name().to_owned(),
                Err(e) => {
                    debug!(error = %e, user = by, "could not resolve decommissioning user");
                    by.to_owned()
                }
            };
            kv_line("By", &name);
        }
        if let Some(notes) = &system.decommissioned_notes {
            kv_line("Notes", &truncate_notes(notes));
        }
    }
    println!();
    Ok(())
}

fn parse_kv_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_owned(), v.to_owned()))
                .ok_or_else(|| anyhow::anyhow!("invalid key=value pair: '{pair}'"))
        })
        .collect()
}

fn read_fields_file(path: &str) -> Result<Vec<(String, String)>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("{path} is not valid JSON"))?;
    let Value::Object(map) = value else {
        bail!("{path} must contain a JSON object of field values");
    };
    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k, text)
        })
        .collect())
}

/// Apply edits and fail with every helper text if the form is invalid.
fn fill_form(form: &mut SystemForm, fields: &[(String, String)]) -> Result<()> {
    for (key, value) in fields {
        form.set(key, value)?;
    }
    if !form.is_valid() {
        for (key, text) in form.errors() {
            eprintln!("    {key}: {text}");
        }
        bail!("{} field(s) need attention", form.errors().len());
    }
    Ok(())
}

async fn cmd_systems_create(
    client: &ZtmfClient,
    from: Option<&str>,
    pairs: &[String],
) -> Result<()> {
    let mut fields = match from {
        Some(path) => read_fields_file(path)?,
        None => Vec::new(),
    };
    fields.extend(parse_kv_pairs(pairs)?);

    let mut form = SystemForm::create();
    fill_form(&mut form, &fields)?;
    require_admin(client).await?;

    let created = client.create_fisma_system(&form.to_payload()).await?;
    success(&format!(
        "Created {} ({}) with id {}",
        created.fismaname, created.fismaacronym, created.fismasystemid
    ));
    Ok(())
}

async fn cmd_systems_edit(client: &ZtmfClient, id: i64, pairs: &[String]) -> Result<()> {
    let fields = parse_kv_pairs(pairs)?;
    require_admin(client).await?;

    let current = client.fisma_system(id).await?;
    let mut form = SystemForm::new(current);
    fill_form(&mut form, &fields)?;
    if !form.has_unsaved_changes() {
        warning("Nothing to change.");
        return Ok(());
    }

    let saved = client.update_fisma_system(id, &form.to_payload()).await?;
    success(&format!("Updated {} ({})", saved.fismaname, saved.fismaacronym));
    Ok(())
}

async fn confirm(question: &str) -> Result<bool> {
    use tokio::io::AsyncBufReadExt;

    println!("{question}");
    print!("{} ", bold("Proceed? [y/N]"));
    std::io::Write::flush(&mut std::io::stdout()).context("failed to flush stdout")?;
    let mut line = String::new();
    tokio::io::BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read confirmation")?;
    Ok(line.trim().eq_ignore_ascii_case("y"))
}

async fn cmd_systems_decommission(
    client: &ZtmfClient,
    id: i64,
    date: &str,
    notes: &str,
    yes: bool,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let day = validate_date(date, today)?;
    let request = DecommissionRequest::for_date(day, notes)?;
    require_admin(client).await?;

    let system = client.fisma_system(id).await?;
    let prompt = confirmation_text(&system, day, notes);
    if !yes && !confirm(&prompt).await? {
        warning("Cancelled.");
        return Ok(());
    }

    client.decommission_fisma_system(id, &request).await?;
    success(&format!("{} is decommissioned as of {date}", system.fismaname));
    Ok(())
}

// ── Scores ───────────────────────────────────────────────────────────

async fn cmd_scores(client: &ZtmfClient, system_id: i64) -> Result<()> {
    let system = client.fisma_system(system_id).await?;
    let scores = client.system_scores(system_id).await?;
    let datacalls = client.datacalls().await?;

    println!();
    header("📈", &format!("{} ({})", system.fismaname, system.fismaacronym));

    let Some(view) = ScoreHistory::build(&scores, &datacalls) else {
        println!("  {}", bold("No Score Data Available"));
        println!(
            "  {}",
            dim("This system does not have any scoring data yet. Please check back after the next evaluation period.")
        );
        println!();
        return Ok(());
    };

    kv_line(
        "Overall Score",
        &score_chip(&view.overall_text, view.overall_maturity.tier),
    );
    kv_line("Maturity", &tier_label(view.overall_maturity.tier));
    println!();
    println!("  {}", bold(&format!("Pillar Scores - {} (Latest)", view.latest_quarter)));
    for card in &view.pillars {
        let mut line = format!(
            "  {:<14} {} {}",
            card.pillar,
            score_chip(&card.score_text, card.maturity.tier),
            if card.is_scored() { trend_glyph(&card.trend) } else { String::new() }
        );
        if let Some(caption) = card.caption() {
            line.push_str(&format!("  {}", dim(&caption)));
        }
        if let Some(text) = card.trend_text() {
            line.push_str(&format!("  {}", trend_line(&text, &card.trend)));
        }
        println!("{line}");
    }

    if !view.rows.is_empty() {
        println!();
        println!("  {}", bold("Historical Scores"));
        for row in &view.rows {
            let glyph = if row.score > 0.0 { trend_glyph(&row.trend) } else { String::new() };
            println!("  {}: Overall Score {} {glyph}", row.quarter, row.score_text);
            if let Some(detail) = row.detail() {
                let shown = if row.score > 0.0 {
                    trend_line(&detail, &row.trend)
                } else {
                    dim(&detail)
                };
                println!("      {shown}");
            }
        }
    }
    println!();
    Ok(())
}

// ── Datacalls ────────────────────────────────────────────────────────

async fn cmd_datacalls(client: &ZtmfClient, action: DatacallCommands) -> Result<()> {
    match action {
        DatacallCommands::List => {
            let list = client.datacalls().await?;
            println!();
            header("🗓", "Datacalls");
            println!("  {BANNER_SMALL}");
            let rows: Vec<Vec<String>> = list
                .iter()
                .map(|d| {
                    vec![
                        d.datacallid.to_string(),
                        d.datacall.clone(),
                        d.deadline.get(..10).unwrap_or(&d.deadline).to_owned(),
                    ]
                })
                .collect();
            table(&["ID", "DATACALL", "DEADLINE"], &rows);
            println!();
            Ok(())
        }
        DatacallCommands::Create { name, deadline } => {
            let name = name.trim().to_uppercase();
            if name.chars().count() != 9 {
                bail!("Invalid datacall format");
            }
            validate_datacall_name(&name).map_err(anyhow::Error::msg)?;
            let deadline = validate_deadline(&deadline).map_err(anyhow::Error::msg)?;
            require_admin(client).await?;

            let created = client
                .create_datacall(&NewDatacall {
                    datacall: name,
                    deadline: format!("{}T00:00:00.000Z", deadline.format("%Y-%m-%d")),
                })
                .await?;
            success(&format!(
                "Created datacall {} (id {})",
                created.datacall, created.datacallid
            ));
            Ok(())
        }
    }
}
