use clap::{Parser, Subcommand};
use readquest_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "readquest")]
#[command(about = "Reading achievement and progression engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// User to operate on
    #[arg(long, global = true, default_value = "default")]
    user: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the catalog against current stats and award unlocks
    Check {
        /// Stats snapshot file (defaults to <data_dir>/stats.json)
        #[arg(long)]
        stats_file: Option<PathBuf>,

        /// Inline stat override, e.g. --stat booksCompleted=3 (repeatable)
        #[arg(long = "stat")]
        stats: Vec<String>,

        /// Evaluate without recording anything
        #[arg(long)]
        dry_run: bool,

        /// Print the wire-shape JSON response
        #[arg(long)]
        json: bool,
    },

    /// List all achievements with unlock status (default)
    List {
        /// Print the wire-shape JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show recently unlocked achievements
    History {
        /// Days of history to show (defaults from config)
        #[arg(long)]
        days: Option<i64>,
    },

    /// Roll up the unlock log into the CSV archive
    Rollup {
        /// Clean up processed log files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    readquest_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?} for user '{}'", data_dir, cli.user);

    match cli.command {
        Some(Commands::Check {
            stats_file,
            stats,
            dry_run,
            json,
        }) => cmd_check(data_dir, &cli.user, stats_file, stats, dry_run, json, &config),
        Some(Commands::List { json }) => cmd_list(data_dir, &cli.user, json),
        Some(Commands::History { days }) => cmd_history(data_dir, &cli.user, days, &config),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(data_dir, &cli.user, cleanup),
        None => cmd_list(data_dir, &cli.user, false),
    }
}

/// Load and validate the default catalog
fn validated_catalog() -> Result<&'static Catalog> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

/// Build the stats snapshot from a file and inline overrides
fn resolve_stats(
    data_dir: &std::path::Path,
    stats_file: Option<PathBuf>,
    inline: &[String],
    config: &Config,
) -> Result<StatsSnapshot> {
    let path = stats_file
        .or_else(|| config.stats.snapshot_file.clone())
        .unwrap_or_else(|| data_dir.join("stats.json"));

    let mut snapshot = load_stats_snapshot(&path)?.unwrap_or_default();

    for entry in inline {
        let Some((key, value)) = entry.split_once('=') else {
            eprintln!("Ignoring malformed --stat '{}', expected key=value", entry);
            continue;
        };
        let Ok(value) = value.trim().parse::<f64>() else {
            eprintln!("Ignoring --stat '{}': value is not a number", entry);
            continue;
        };
        // StatKey names match their wire spelling; unknown keys become
        // the Unknown variant, which no criterion reads
        let stat: StatKey = serde_json::from_value(serde_json::Value::String(
            key.trim().to_string(),
        ))?;
        if stat == StatKey::Unknown {
            eprintln!("Unknown statistic '{}' (kept, but nothing reads it)", key);
        }
        snapshot.totals.insert(stat, value);
    }

    Ok(snapshot)
}

fn cmd_check(
    data_dir: PathBuf,
    user: &str,
    stats_file: Option<PathBuf>,
    inline: Vec<String>,
    dry_run: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let catalog = validated_catalog()?;
    let store = FileStore::new(&data_dir);
    let stats = resolve_stats(&data_dir, stats_file, &inline, config)?;

    if dry_run {
        let state = store.load(user)?;
        let matched = matcher::newly_unlocked(catalog, &stats, &state.unlocked_codes());
        if matched.is_empty() {
            println!("No new achievements would unlock.");
        } else {
            for def in &matched {
                println!("Would unlock: {} (+{} XP)", def.name, def.xp_reward);
            }
        }
        println!("\n[Dry run - nothing recorded]");
        return Ok(());
    }

    let outcome = check_and_award(&store, catalog, user, &stats)?;
    tracing::info!(
        "Check for '{}': {} new unlocks, +{} XP",
        user,
        outcome.newly_unlocked.len(),
        outcome.total_xp_awarded
    );

    if json {
        let response = to_check_response(&outcome);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if outcome.newly_unlocked.is_empty() {
        println!("No new achievements.");
        println!("  XP: {} (level {})", outcome.new_xp, outcome.new_level);
        return Ok(());
    }

    for (def, _) in &outcome.newly_unlocked {
        println!("✓ Achievement unlocked: {} (+{} XP)", def.name, def.xp_reward);
        println!("    {}", def.description);
    }
    println!();
    println!(
        "  XP: {} -> {} (+{})",
        outcome.previous_xp, outcome.new_xp, outcome.total_xp_awarded
    );
    if outcome.leveled_up {
        println!(
            "  ★ Level up! {} -> {}",
            outcome.previous_level, outcome.new_level
        );
    } else {
        println!("  Level: {}", outcome.new_level);
    }

    Ok(())
}

fn cmd_list(data_dir: PathBuf, user: &str, json: bool) -> Result<()> {
    let catalog = validated_catalog()?;
    let store = FileStore::new(&data_dir);
    let state = store.load(user)?;

    let response = to_list_response(catalog.achievements(), &state.unlocked);

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!(
        "Achievements: {} of {} unlocked",
        response.unlocked_count, response.total_count
    );
    println!(
        "XP: {} (level {})",
        state.current_xp,
        level_for_xp(state.current_xp)
    );
    println!();

    for summary in &response.categories {
        println!("{} ({}/{})", summary.name, summary.unlocked, summary.total);
        for achievement in response
            .achievements
            .iter()
            .filter(|a| a.category.as_str() == summary.name)
        {
            let marker = if achievement.is_unlocked { "✓" } else { " " };
            println!(
                "  [{}] {} - {} ({} XP)",
                marker, achievement.name, achievement.description, achievement.xp_reward
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_history(
    data_dir: PathBuf,
    user: &str,
    days: Option<i64>,
    config: &Config,
) -> Result<()> {
    let catalog = validated_catalog()?;
    let store = FileStore::new(&data_dir);
    let days = days.unwrap_or(config.history.retention_days);

    let events = load_recent_unlocks(&store.log_path(user), &store.csv_path(user), days)?;

    if events.is_empty() {
        println!("No achievements unlocked in the last {} days.", days);
        return Ok(());
    }

    println!("Unlocked in the last {} days:", days);
    for event in &events {
        let name = catalog
            .get(&event.code)
            .map(|d| d.name.as_str())
            .unwrap_or(event.code.as_str());
        println!(
            "  {}  {}",
            event.unlocked_at.format("%Y-%m-%d %H:%M"),
            name
        );
    }

    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, user: &str, cleanup: bool) -> Result<()> {
    let store = FileStore::new(&data_dir);
    let log_path = store.log_path(user);
    let csv_path = store.csv_path(user);

    if !log_path.exists() {
        println!("No unlock log found - nothing to roll up.");
        return Ok(());
    }

    let count = store.rollup(user)?;

    println!("✓ Rolled up {} unlock events to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = csv_rollup::cleanup_processed_logs(&store.user_dir(user))?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed log files", cleaned);
        }
    }

    Ok(())
}
