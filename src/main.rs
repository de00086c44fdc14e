use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use tracing_subscriber::{EnvFilter, fmt};

use wilt::cli::{Cli, Command};
use wilt::config::WiltConfig;
use wilt::display::{NullDisplay, TerminalDisplay};
use wilt::host::{self, RunOptions, RunSummary};
use wilt::storage::FileStore;

fn init_logging(verbose: bool) {
    let mut filter = EnvFilter::from_default_env();
    let directive = if verbose { "wilt=debug" } else { "wilt=info" };
    if let Ok(d) = directive.parse() {
        filter = filter.add_directive(d);
    }
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = WiltConfig::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    let mut store = FileStore::open(&config.store_path)
        .with_context(|| format!("failed to open store {}", config.store_path.display()))?;

    match cli.command {
        Command::Run { max_wakes, quiet } => {
            let options = RunOptions {
                delays: config.delays,
                stop_when_dead: config.stop_when_dead,
                max_wakes,
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start runtime")?;
            let shutdown = host::shutdown_on(tokio::signal::ctrl_c());
            let summary = if quiet {
                runtime.block_on(host::run(store, &mut NullDisplay, options, shutdown)).0
            } else {
                let mut display = TerminalDisplay::new();
                runtime.block_on(host::run(store, &mut display, options, shutdown)).0
            };
            print_summary(&summary, cli.verbose);
        }
        Command::Status => {
            let report = host::status(&store)?;
            let bold = Style::new().bold();
            match (report.code, report.state) {
                (None, _) => println!("No plant yet; the next run starts {}", bold.apply_to("ALIVE")),
                (Some(_), Some(state)) => println!("Plant is {}", bold.apply_to(state)),
                (Some(code), None) => println!(
                    "Plant state unreadable (code {code}); the next run starts {}",
                    bold.apply_to("ALIVE")
                ),
            }
            println!("Next run shows {}", report.asset);
        }
        Command::Reset => {
            host::reset(&mut store)?;
            println!("Plant reset; the next run starts fresh.");
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, verbose: bool) {
    let style = if summary.final_state.is_terminal() {
        Style::new().red().bold()
    } else {
        Style::new().green().bold()
    };
    println!(
        "{} {} → {} after {} wake(s)",
        style.apply_to("───"),
        summary.initial,
        style.apply_to(summary.final_state),
        summary.wakes
    );
    if verbose {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_default()
        );
    }
}
