use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use scrolly_core::Viewport;
use scrolly_page::{PageConfig, PageSession, ReplayReport, load_trace, replay};

#[derive(Parser)]
#[command(name = "scrolly", about = "Scroll-driven scene engine: config checks and trace replay")]
struct Cli {
    /// Page config (TOML)
    #[arg(long, global = true, env = "SCROLLY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a page config and list its scenes
    Validate {
        /// Fail when the config has warnings
        #[arg(long)]
        strict: bool,
    },

    /// Print the table of contents of a freshly mounted page
    Toc,

    /// Replay a JSON event trace against a page
    Replay {
        /// Trace file path
        trace: PathBuf,

        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,

        /// Initial viewport width
        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        /// Initial viewport height
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// Seed for ambient phase offsets
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn load_config(cli: &Cli) -> Result<PageConfig> {
    let Some(path) = cli.config.as_deref() else {
        bail!("no page config given: pass --config or set SCROLLY_CONFIG");
    };
    PageConfig::load(path).with_context(|| format!("failed to load config {}", path.display()))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Validate { strict } => cmd_validate(&cli, *strict),
        Commands::Toc => cmd_toc(&cli),
        Commands::Replay {
            trace,
            json,
            width,
            height,
            seed,
        } => cmd_replay(&cli, trace, *json, Viewport::new(*width, *height), *seed),
    }
}

fn cmd_validate(cli: &Cli, strict: bool) -> Result<()> {
    let config = load_config(cli)?;

    println!("page:     {}", config.page.name);
    println!("scenes:   {}", config.scenes.len());
    println!("ambient:  {}", config.ambient.len());
    println!("palette:  {}", config.page.palette.as_str());
    for (order, scene) in config.scenes.iter().enumerate() {
        let palette = if scene.palette.is_empty() {
            "-"
        } else {
            scene.palette.as_str()
        };
        println!("  {order:>3}  {:<24} {palette}", scene.id);
    }

    let warnings = config.warnings();
    for w in &warnings {
        eprintln!("warning: {w}");
    }
    if strict && !warnings.is_empty() {
        bail!("{} warning(s) in strict mode", warnings.len());
    }
    println!("ok");
    Ok(())
}

fn cmd_toc(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let mut rng = SmallRng::seed_from_u64(0);
    let session = PageSession::mount(&config, Viewport::new(1280.0, 800.0), 0.0, &mut rng);

    for entry in session.registry().toc() {
        let marker = if entry.is_current { '>' } else { ' ' };
        println!("{marker} {:>3}  {}", entry.order, entry.id);
    }
    Ok(())
}

fn cmd_replay(
    cli: &Cli,
    trace: &Path,
    json: bool,
    viewport: Viewport,
    seed: Option<u64>,
) -> Result<()> {
    let config = load_config(cli)?;
    let events =
        load_trace(trace).with_context(|| format!("failed to load trace {}", trace.display()))?;
    let mut rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_os_rng(),
    };

    let report = replay(&config, &events, viewport, &mut rng);

    if json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{out}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ReplayReport) {
    println!("page: {}", report.page);
    for step in &report.steps {
        let f = &step.frame;
        println!(
            "{:>8.0}ms  {:<9} scene={} ({}) color={} fade={:.2} progress={:.2}",
            f.at_ms,
            step.event,
            f.active_index,
            f.active_id.as_deref().unwrap_or("-"),
            f.color,
            f.transition_progress,
            f.narrative_progress,
        );
        if let Some(target) = step.scroll_target {
            println!("            scroll_to y={:.0}", target.y);
        }
    }
    let changes: Vec<String> = report.changes.iter().map(|c| c.to_string()).collect();
    println!("changes: [{}]", changes.join(", "));
}
