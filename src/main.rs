use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use graph::{
    wire, BranchLaneCalculator, Charset, DependencyLaneCalculator, Graph, LaneCalculator, Layout, NodeStyle,
    RenderConfig, SvgRenderer, TaskGraphBuilder, TextRenderer, TimelineBuilder, TimelineGraph,
};
use std::path::{Path, PathBuf};
use timeline_core::{load_task_graph, Snapshot, TimelineConfig};
use tracing::Level;

#[derive(Parser)]
#[command(name = "timeline")]
#[command(about = "Lay out pull requests and issues as a branch timeline", long_about = None)]
struct Cli {
    /// Log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TimelineArgs {
    /// Snapshot JSON with `pullRequests` and `issues`
    snapshot: PathBuf,
    /// Show only the most recent N merged or closed pull requests
    #[arg(long)]
    max_past_prs: Option<usize>,
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the timeline as wire JSON
    Build {
        #[command(flatten)]
        args: TimelineArgs,
    },
    /// Print one SVG fragment per row
    Svg {
        #[command(flatten)]
        args: TimelineArgs,
    },
    /// Print a text rendering
    Text {
        #[command(flatten)]
        args: TimelineArgs,
        /// Use ASCII glyphs only
        #[arg(long)]
        ascii: bool,
    },
    /// Lay out a precomputed task graph
    Tasks {
        /// Task graph JSON (array of entries)
        path: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Svg,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build { args } => {
            let (timeline, layout) = build_timeline(&args)?;
            let wire = wire::from_timeline(&timeline, Some(&layout));
            println!("{}", wire.to_json_pretty()?);
        }
        Commands::Svg { args } => {
            let (timeline, layout) = build_timeline(&args)?;
            let renderer = SvgRenderer::new(RenderConfig::timeline());
            if timeline.has_more_past_prs {
                println!("{}", renderer.render_load_more(layout.rows.first(), layout.max_lanes));
            }
            print_svg_rows(&renderer, &timeline.graph, &layout);
        }
        Commands::Text { args, ascii } => {
            let (timeline, layout) = build_timeline(&args)?;
            let renderer = TextRenderer::new(if ascii { Charset::Ascii } else { Charset::Unicode });
            if timeline.has_more_past_prs {
                let hidden = timeline.total_past_prs - timeline.total_past_prs_shown;
                println!("{}", renderer.render_load_more(layout.max_lanes, hidden));
            }
            print!("{}", renderer.render(&timeline.graph.nodes, &layout));
        }
        Commands::Tasks { path, format, config } => {
            let config = load_config(config.as_deref())?;
            let entries = load_task_graph(&path)?;
            let graph = TaskGraphBuilder::new()
                .palette(config.palette.branches.clone())
                .build(&entries)
                .context("Failed to build task graph")?;
            let layout = DependencyLaneCalculator::new().calculate(&graph.nodes);

            match format {
                Format::Json => {
                    let wire = wire::to_wire_with_layout(&graph, &layout);
                    println!("{}", wire.to_json_pretty()?);
                }
                Format::Svg => {
                    let renderer = SvgRenderer::new(RenderConfig::task_graph());
                    print_svg_rows(&renderer, &graph, &layout);
                }
                Format::Text => print!("{}", TextRenderer::default().render(&graph.nodes, &layout)),
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<TimelineConfig> {
    match path {
        Some(path) => TimelineConfig::load(path),
        None => Ok(TimelineConfig::default()),
    }
}

fn build_timeline(args: &TimelineArgs) -> Result<(TimelineGraph, Layout)> {
    let config = load_config(args.config.as_deref())?.with_max_past_prs(args.max_past_prs);
    let snapshot = Snapshot::load(&args.snapshot)?;

    let timeline = TimelineBuilder::from_config(&config)
        .build(&snapshot.pull_requests, &snapshot.issues)
        .context("Failed to build timeline")?;
    let layout = BranchLaneCalculator::new().calculate(&timeline.graph.nodes);

    let stats = timeline.graph.stats();
    tracing::info!(
        nodes = stats.total_nodes,
        pull_requests = stats.pull_requests,
        issues = stats.issues,
        branches = stats.branches,
        max_lanes = layout.max_lanes,
        "timeline ready"
    );
    if stats.dangling_references > 0 {
        tracing::warn!(count = stats.dangling_references, "parent references outside the snapshot");
    }

    Ok((timeline, layout))
}

fn print_svg_rows(renderer: &SvgRenderer, graph: &Graph, layout: &Layout) {
    for (row, node) in layout.rows.iter().zip(&graph.nodes) {
        println!("{}", renderer.render_row(row, layout.max_lanes, &NodeStyle::for_node(node)));
    }
}
