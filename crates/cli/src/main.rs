use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use options_monitor_core::models::position::{PositionField, PositionInput};
use options_monitor_core::models::settings::{RefreshInterval, Settings};
use options_monitor_core::models::sort::SortColumn;
use options_monitor_core::services::market_clock::MarketEvent;
use options_monitor_core::services::refresh_service::RefreshEvent;
use options_monitor_core::OptionsMonitor;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

mod render;

#[derive(Parser)]
#[command(name = "options-monitor")]
#[command(about = "Track option positions against live underlying prices", long_about = None)]
struct Cli {
    /// Settings file (JSON). Missing file means defaults.
    #[arg(short, long, global = true, default_value = "options-monitor.json")]
    config: PathBuf,
    /// Positions CSV, overriding the settings file
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every position with its valuation
    List {
        /// Column to sort by; repeat to click the header again
        #[arg(long = "sort", value_name = "COLUMN")]
        sort: Vec<String>,
        /// Skip the quote lookup
        #[arg(long)]
        offline: bool,
    },
    /// Add a position
    Add {
        #[arg(long)]
        ticker: String,
        /// Call or Put
        #[arg(long = "option", value_name = "KIND")]
        option: String,
        #[arg(long)]
        contracts: String,
        #[arg(long)]
        premium: String,
        #[arg(long)]
        strike: String,
        /// Expiration as M/D
        #[arg(long, default_value = "")]
        ends: String,
    },
    /// Change one field of a position
    Edit {
        /// Row number as printed by `list`
        row: usize,
        /// Ticker, Ends, Option, Contracts, Premium or Strike
        field: String,
        value: String,
    },
    /// Remove one or more positions
    Remove {
        /// Row numbers as printed by `list`
        #[arg(required = true)]
        rows: Vec<usize>,
    },
    /// Remove every position
    RemoveAll {
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
    /// Fetch every quote and print the table
    Refresh,
    /// Keep the table up to date until interrupted
    Watch {
        /// "Don't Update", "5 Mins", "10 Mins", "15 Mins", "30 Mins", "1 Hour", "2 Hours"
        #[arg(short, long)]
        interval: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    if let Some(data_file) = cli.data_file {
        settings.data_file = data_file;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut monitor = OptionsMonitor::open(&settings).with_context(|| {
        format!("Failed to open positions file {}", settings.data_file.display())
    })?;

    match cli.command {
        Commands::List { sort, offline } => {
            let columns = sort
                .iter()
                .map(|s| s.parse::<SortColumn>())
                .collect::<Result<Vec<_>, _>>()?;
            if !offline {
                monitor.refresh_now().await;
            }
            for column in columns {
                monitor.sort_by(column);
            }
            print_screen(&monitor);
        }
        Commands::Add {
            ticker,
            option,
            contracts,
            premium,
            strike,
            ends,
        } => {
            let input = PositionInput {
                ticker,
                ends,
                kind: option,
                contracts,
                premium,
                strike,
            };
            monitor.add_position(&input)?;
            println!("Added position {}", monitor.positions().len());
        }
        Commands::Edit { row, field, value } => {
            let id = row_id(&monitor, row)?;
            let field: PositionField = field.parse()?;
            monitor.edit_position(id, field, &value)?;
            println!("Updated {field} of position {row}");
        }
        Commands::Remove { rows } => {
            let ids = rows
                .iter()
                .map(|&row| row_id(&monitor, row))
                .collect::<Result<Vec<_>>>()?;
            let removed = monitor.remove_positions(&ids)?;
            println!("Removed {removed} position(s)");
        }
        Commands::RemoveAll { yes } => {
            if !yes {
                bail!("Refusing to remove every position without --yes");
            }
            monitor.remove_all()?;
            println!("Removed all positions");
        }
        Commands::Refresh => {
            monitor.refresh_now().await;
            print_screen(&monitor);
        }
        Commands::Watch { interval } => {
            if let Some(label) = interval {
                let interval: RefreshInterval = label.parse()?;
                monitor.set_refresh_interval(interval)?;
            }
            watch(&mut monitor).await?;
        }
    }

    Ok(())
}

/// Map a 1-based row number to the position shown there.
fn row_id(monitor: &OptionsMonitor, row: usize) -> Result<Uuid> {
    row.checked_sub(1)
        .and_then(|index| monitor.position_id_at(index))
        .with_context(|| format!("No position in row {row}"))
}

fn print_screen(monitor: &OptionsMonitor) {
    print!("{}", render::render_table(&monitor.rows()));
    println!(
        "{}",
        render::render_status(
            monitor.last_updated(),
            monitor.refresh_interval(),
            monitor.is_market_open(Utc::now()),
        )
    );
}

enum Step {
    Stop,
    CheckMarket,
    Event(Option<RefreshEvent>),
}

/// Event loop: market-clock polling, scheduled refreshes and quote results.
/// Redraws after each batch of updates.
async fn watch(monitor: &mut OptionsMonitor) -> Result<()> {
    monitor.observe_market(Utc::now())?;
    monitor.fetch_missing()?;
    print_screen(monitor);

    let market_poll = tokio::time::sleep(monitor.market_poll_delay(Utc::now()));
    tokio::pin!(market_poll);

    loop {
        let step = tokio::select! {
            _ = tokio::signal::ctrl_c() => Step::Stop,
            () = &mut market_poll => Step::CheckMarket,
            event = monitor.next_event() => Step::Event(event),
        };

        match step {
            Step::Stop => {
                info!("stopping watch");
                break;
            }
            Step::CheckMarket => {
                let now = Utc::now();
                let event = monitor.observe_market(now)?;
                if event != MarketEvent::Unchanged {
                    print_screen(monitor);
                }
                market_poll
                    .as_mut()
                    .reset(tokio::time::Instant::now() + monitor.market_poll_delay(now));
            }
            Step::Event(Some(event)) => {
                let mut redraw = monitor.handle_event(event);
                redraw |= monitor.apply_quote_updates() > 0;
                if redraw {
                    print_screen(monitor);
                }
            }
            Step::Event(None) => break,
        }
    }

    Ok(())
}
