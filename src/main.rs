use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use promocast::args::CommonArgs;
use promocast::campaigns::{self, JsonCampaignSource};
use promocast::config::Config;
use promocast::groups::GroupLedger;
use promocast::interval;
use promocast::logging::{self, LogConfig};
use promocast::poster::DryRunPoster;
use promocast::promoter::Promoter;
use promocast::theme as t;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "promocast",
    version,
    about = "Promocast — scheduled promotional posting into social-network groups"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Post campaign categories into every due group
    Run(RunArgs),
    /// Post events into every group (interval policy does not apply)
    Events(EventsArgs),
    /// Inspect group ledgers
    Groups {
        #[command(subcommand)]
        command: GroupsCommands,
    },
    /// Validate group ledgers without posting
    Check {
        /// Group ledger files (default: configured list)
        #[arg(long = "groups", value_name = "FILE")]
        files: Vec<String>,
    },
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    /// Campaign names, processed in order
    #[arg(value_name = "CAMPAIGN", required = true)]
    campaigns: Vec<String>,
    /// Group ledger files (default: configured list)
    #[arg(long = "groups", value_name = "FILE")]
    files: Vec<String>,
}

#[derive(Debug, clap::Args)]
struct EventsArgs {
    /// JSON file holding the events to post
    #[arg(value_name = "EVENTS_FILE")]
    events_file: PathBuf,
    /// Group ledger files (default: configured list)
    #[arg(long = "groups", value_name = "FILE")]
    files: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum GroupsCommands {
    /// List every group with its schedule state
    List {
        /// Group ledger files (default: configured list)
        #[arg(long = "groups", value_name = "FILE")]
        files: Vec<String>,
    },
    /// Show one group's full promotion record
    Show {
        /// Group page URL to look up
        group_url: String,
        /// Group ledger files (default: configured list)
        #[arg(long = "groups", value_name = "FILE")]
        files: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.common.verbose {
        logging::init(LogConfig::debug());
    } else {
        logging::init_from_env();
    }
    t::init_color(cli.common.no_color);

    let config_path = cli.common.config_path();
    let mut config = Config::load(config_path)?;
    cli.common.apply_overrides(&mut config);

    match cli.command {
        Commands::Run(args) => run_campaigns(&config, args).await,
        Commands::Events(args) => run_events(&config, args).await,
        Commands::Groups { command } => match command {
            GroupsCommands::List { files } => list_groups(&config, &files),
            GroupsCommands::Show { group_url, files } => show_group(&config, &group_url, &files),
        },
        Commands::Check { files } => check_ledgers(&config, &files),
    }
}

// ── Promotion runs ──────────────────────────────────────────────────────────

/// Wire up the promotion engine and a Ctrl+C handler.
fn build_promoter(config: &Config) -> Result<(Promoter, CancellationToken)> {
    let catalog = config.label_catalog()?;
    let poster = DryRunPoster::new(catalog);
    let source = JsonCampaignSource::new(config.campaigns_dir.clone());

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        cancel_for_signal.cancel();
    });

    let promoter = Promoter::new(Box::new(poster), Box::new(source))
        .with_include_video(config.include_video)
        .with_cancellation(cancel.clone());
    Ok((promoter, cancel))
}

async fn run_campaigns(config: &Config, args: RunArgs) -> Result<()> {
    let group_files = config.resolved_group_files(&args.files)?;
    if group_files.is_empty() {
        println!("{}", t::icon_warn("No group ledger files to process."));
        return Ok(());
    }

    t::print_header("Campaign promotion");
    println!("{}", t::label_value("Campaigns", &args.campaigns.join(", ")));
    println!("{}", t::label_value("Ledgers", &group_files.len().to_string()));
    println!();

    let (mut promoter, cancel) = build_promoter(config)?;
    let pb = t::spinner("Posting campaigns");
    let summary = promoter.run_campaigns(&args.campaigns, &group_files).await;
    promoter.stop().await?;

    if cancel.is_cancelled() {
        t::spinner_warn(&pb, "Campaign promotion interrupted.");
    } else {
        t::spinner_ok(&pb, "Campaign promotion finished.");
    }
    println!("{}", t::label_value("Summary", &summary.to_string()));
    Ok(())
}

async fn run_events(config: &Config, args: EventsArgs) -> Result<()> {
    let group_files = config.resolved_group_files(&args.files)?;
    if group_files.is_empty() {
        println!("{}", t::icon_warn("No group ledger files to process."));
        return Ok(());
    }

    let events = campaigns::load_events(&args.events_file)?;
    if events.is_empty() {
        println!("{}", t::icon_warn("Events file holds no events."));
        return Ok(());
    }

    t::print_header("Event promotion");
    println!("{}", t::label_value("Events", &events.len().to_string()));
    println!("{}", t::label_value("Ledgers", &group_files.len().to_string()));
    println!();

    let (mut promoter, cancel) = build_promoter(config)?;
    let pb = t::spinner("Posting events");
    let summary = promoter.run_events(&events, &group_files).await;
    promoter.stop().await?;

    if cancel.is_cancelled() {
        t::spinner_warn(&pb, "Event promotion interrupted.");
    } else {
        t::spinner_ok(&pb, "Event promotion finished.");
    }
    println!("{}", t::label_value("Summary", &summary.to_string()));
    Ok(())
}

// ── Ledger inspection ───────────────────────────────────────────────────────

fn list_groups(config: &Config, files: &[String]) -> Result<()> {
    let group_files = config.resolved_group_files(files)?;
    if group_files.is_empty() {
        println!("{}", t::icon_warn("No group ledger files found."));
        return Ok(());
    }

    let now = Local::now().naive_local();
    for path in &group_files {
        let ledger = match GroupLedger::load(path) {
            Ok(ledger) => ledger,
            Err(e) => {
                println!("{}", t::icon_fail(&e.to_string()));
                continue;
            }
        };

        println!("{}", t::heading(&path.display().to_string()));
        for group in ledger.iter() {
            let due = if interval::is_due(group, now) {
                t::success("due")
            } else {
                t::muted("waiting")
            };
            println!(
                "  {} {} {}",
                t::info(&group.group_url),
                t::muted(&format!(
                    "[{}/{} every {}]",
                    group.language,
                    group.currency,
                    group.interval.as_deref().unwrap_or("-"),
                )),
                due,
            );
            println!(
                "    {}",
                t::dim(&format!(
                    "{} categories, {} events, last {}",
                    group.promoted_categories.len(),
                    group.promoted_events.len(),
                    group.last_promo_sended.as_deref().unwrap_or("never"),
                )),
            );
        }
        println!();
    }
    Ok(())
}

fn show_group(config: &Config, group_url: &str, files: &[String]) -> Result<()> {
    let group_files = config.resolved_group_files(files)?;
    for path in &group_files {
        let ledger = match GroupLedger::load(path) {
            Ok(ledger) => ledger,
            Err(e) => {
                println!("{}", t::icon_fail(&e.to_string()));
                continue;
            }
        };
        let Some(group) = ledger.get(group_url) else {
            continue;
        };

        t::print_header("Group record");
        println!("{}", t::label_value("URL", &group.group_url));
        println!("{}", t::label_value("Ledger", &path.display().to_string()));
        println!("{}", t::label_value("Language", &group.language));
        println!("{}", t::label_value("Currency", &group.currency));
        println!(
            "{}",
            t::label_value("Interval", group.interval.as_deref().unwrap_or("-"))
        );
        println!(
            "{}",
            t::label_value(
                "Last promoted",
                group.last_promo_sended.as_deref().unwrap_or("never"),
            )
        );
        let due = interval::is_due(group, Local::now().naive_local());
        println!(
            "{}",
            t::label_value("Due", if due { "yes" } else { "not yet" })
        );
        if !group.promoted_categories.is_empty() {
            println!("  {}", t::muted("Promoted categories"));
            for name in &group.promoted_categories {
                println!("    {}", t::info(name));
            }
        }
        if !group.promoted_events.is_empty() {
            println!("  {}", t::muted("Promoted events"));
            for name in &group.promoted_events {
                println!("    {}", t::info(name));
            }
        }
        return Ok(());
    }

    anyhow::bail!("group {group_url} not found in any ledger");
}

fn check_ledgers(config: &Config, files: &[String]) -> Result<()> {
    let group_files = config.resolved_group_files(files)?;
    if group_files.is_empty() {
        println!("{}", t::icon_warn("No group ledger files to check."));
        return Ok(());
    }

    let mut problems = 0usize;
    for path in &group_files {
        let ledger = match GroupLedger::load(path) {
            Ok(ledger) => ledger,
            Err(e) => {
                println!("{}", t::icon_fail(&e.to_string()));
                problems += 1;
                continue;
            }
        };

        let mut file_problems = Vec::new();
        for group in ledger.iter() {
            if group.language.is_empty() {
                file_problems.push(format!("{}: missing language", group.group_url));
            }
            if group.currency.is_empty() {
                file_problems.push(format!("{}: missing currency", group.group_url));
            }
            if let Some(token) = &group.interval {
                if let Err(e) = interval::parse_interval(token) {
                    file_problems.push(format!("{}: {}", group.group_url, e));
                }
            }
            if let Some(stamp) = &group.last_promo_sended {
                if let Err(e) = interval::parse_timestamp(stamp) {
                    file_problems.push(format!("{}: {}", group.group_url, e));
                }
            }
        }

        if file_problems.is_empty() {
            println!(
                "{}",
                t::icon_ok(&format!("{} ({} groups)", path.display(), ledger.len()))
            );
        } else {
            println!(
                "{}",
                t::icon_fail(&format!(
                    "{} ({} problems)",
                    path.display(),
                    file_problems.len()
                ))
            );
            for problem in &file_problems {
                println!("    {}", t::error(problem));
            }
            problems += file_problems.len();
        }
    }

    if problems > 0 {
        anyhow::bail!("{problems} problem(s) found");
    }
    println!("{}", t::icon_ok("All ledgers valid."));
    Ok(())
}
