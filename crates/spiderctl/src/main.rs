mod trace;

use clap::{Parser, Subcommand};
use serde::Serialize;
use spiderfy::config::{self, SpiderOptions};
use spiderfy::{Hooks, LayoutMode, LegCount, LegGeometry, LegId, Settings, Spiderfier};
use std::path::PathBuf;
use std::time::Duration;
use trace::{LngLat, TraceSurface};

#[derive(Parser, Debug)]
#[command(name = "spiderctl", version, about, long_about = None)]
struct Cli {
    /// Config file to read instead of the per-user one
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Print the leg geometry for COUNT items as JSON
    Layout {
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Fan COUNT items out on a tracing surface and print every proxy operation
    Simulate {
        #[arg(allow_negative_numbers = true)]
        count: i64,

        #[arg(long)]
        animate: bool,

        #[arg(long)]
        duration_ms: Option<u64>,

        #[arg(long)]
        custom_pin: bool,

        /// Click the leg at this index once the fan-out is mounted
        #[arg(long)]
        click: Option<usize>,

        /// Retire the fan-out afterwards
        #[arg(long)]
        unspiderfy: bool,

        #[arg(long, default_value_t = 13.4050)]
        lng: f64,

        #[arg(long, default_value_t = 52.5200)]
        lat: f64,
    },
    /// Write the default config file if missing and print its path
    InitConfig,
}

#[derive(Serialize)]
struct LayoutReport {
    mode: LayoutMode,
    legs: Vec<LegGeometry>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { count } => {
            let settings = config::load_settings(cli.config.as_deref())?;
            print_layout(count, &settings)
        }
        Commands::Simulate {
            count,
            animate,
            duration_ms,
            custom_pin,
            click,
            unspiderfy,
            lng,
            lat,
        } => {
            let base = config::load_settings(cli.config.as_deref())?;
            let overrides = SpiderOptions {
                animate: animate.then_some(true),
                animation_duration: duration_ms.map(Duration::from_millis),
                use_custom_proxy_visual: custom_pin.then_some(true),
                ..SpiderOptions::default()
            };
            let settings = Settings::merge(&base, &overrides);
            simulate(
                usize::from(LegCount::try_from(count)?),
                settings,
                LngLat { lng, lat },
                click,
                unspiderfy,
            )
        }
        Commands::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn layout_report(count: i64, settings: &Settings) -> anyhow::Result<LayoutReport> {
    let count = usize::from(LegCount::try_from(count)?);
    Ok(LayoutReport {
        mode: LayoutMode::for_count(count, settings),
        legs: spiderfy::compute_layout(count, settings),
    })
}

fn print_layout(count: i64, settings: &Settings) -> anyhow::Result<()> {
    let report = layout_report(count, settings)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn simulate(
    count: usize,
    settings: Settings,
    anchor: LngLat,
    click: Option<usize>,
    unspiderfy: bool,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let hooks = Hooks::<String, TraceSurface>::new().on_click(|event, leg| {
        log::info!("{} on {} ({})", event, leg.item(), leg.id());
    });

    let lines = rt.block_on(async move {
        let mut spider = Spiderfier::new(TraceSurface::new(), settings, hooks)?;
        let items = (0..count).map(|i| format!("item-{}", i));

        spider.spiderfy(anchor, items)?;
        spider.run_until_idle().await?;

        if let Some(index) = click {
            let generation = match spider.active() {
                Some(set) => set.generation(),
                None => anyhow::bail!("Nothing is fanned out"),
            };
            if !spider.dispatch_click(LegId { generation, index }, &"click".to_string()) {
                anyhow::bail!("No leg at index {} (fan-out has {})", index, count);
            }
        }

        if unspiderfy {
            spider.unspiderfy()?;
            spider.run_until_idle().await?;
        }

        anyhow::Ok(std::mem::take(&mut spider.surface_mut().lines))
    })?;

    println!("{}", serde_json::to_string_pretty(&lines)?);
    Ok(())
}
