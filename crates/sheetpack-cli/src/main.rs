use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sheetpack_core::config::{IndexFormat, PackerConfig, SortOrder};
use sheetpack_core::output::{self, StagedFile};
use sheetpack_core::{FileSource, ScanOptions, compose, pack_tree, render_index, scan_dir};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "sheetpack",
    about = "Pack a directory tree of images into one atlas plus a nested index",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into an atlas and write its index
    Pack(PackArgs),
    /// Compute placements and write only the index (no atlas image)
    Layout(LayoutArgs),
}

#[derive(Args, Debug, Clone)]
struct PackArgs {
    /// Source directory (scanned recursively)
    #[arg(help_heading = "Input/Output")]
    source: PathBuf,
    /// Output atlas image (format from extension, e.g. .png)
    #[arg(help_heading = "Input/Output")]
    atlas: PathBuf,
    /// Output index file
    #[arg(help_heading = "Input/Output")]
    index: PathBuf,
    #[command(flatten)]
    options: PackOptions,
}

#[derive(Args, Debug, Clone)]
struct LayoutArgs {
    /// Source directory (scanned recursively)
    #[arg(help_heading = "Input/Output")]
    source: PathBuf,
    /// Output index file
    #[arg(help_heading = "Input/Output")]
    index: PathBuf,
    #[command(flatten)]
    options: PackOptions,
}

#[derive(Args, Debug, Clone)]
struct PackOptions {
    /// YAML config file path (overrides command-line options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob, relative to the source). If set, only matching files are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob, relative to the source)
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Follow symbolic links while scanning
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    follow_links: bool,

    // Layout
    /// Sort order: height_desc|area_desc|max_side_desc|width_desc|none
    #[arg(long, default_value = "height_desc", help_heading = "Layout")]
    sort_order: String,
    /// Pixels kept free right of and below each image
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    padding: u32,
    /// Maximum atlas width (unbounded if omitted)
    #[arg(long, help_heading = "Layout")]
    max_width: Option<u32>,
    /// Maximum atlas height (unbounded if omitted)
    #[arg(long, help_heading = "Layout")]
    max_height: Option<u32>,
    /// Round atlas sides up to a power of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    pow2: bool,
    /// Force a square atlas
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    square: bool,
    /// Draw red outlines (debug)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    outlines: bool,

    // Export
    /// Index format: json | json-hash | text
    #[arg(long, default_value = "json", help_heading = "Export")]
    format: String,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    dispatch(&cli)
}

fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Pack(args) => run(&args.source, Some(&args.atlas), &args.index, &args.options),
        Commands::Layout(args) => run(&args.source, None, &args.index, &args.options),
    }
}

#[derive(Debug, Serialize)]
struct MergedConfig<'a> {
    packer: &'a PackerConfig,
    scan: &'a ScanOptions,
}

fn run(
    source: &Path,
    atlas_path: Option<&Path>,
    index_path: &Path,
    opts: &PackOptions,
) -> anyhow::Result<()> {
    let (cfg, scan) = build_config(opts)?;
    cfg.validate()?;

    if opts.print_config {
        let merged = MergedConfig {
            packer: &cfg,
            scan: &scan,
        };
        match opts.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&merged)?),
            _ => println!("{}", serde_json::to_string_pretty(&merged)?),
        }
        return Ok(());
    }

    let scanned =
        scan_dir(source, &scan).with_context(|| format!("scan {}", source.display()))?;
    let skipped = scanned.diagnostics.len();
    info!(
        leaves = scanned.tree.leaf_count(),
        skipped, "loaded source tree"
    );

    let layout = pack_tree(&scanned.tree, &cfg)
        .with_context(|| format!("pack images from {}", source.display()))?;
    let index = render_index(&scanned.tree, &layout, &cfg)?;

    let stats = layout.stats();
    info!(
        frames = stats.num_frames,
        width = stats.canvas_width,
        height = stats.canvas_height,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        skipped,
        "stats"
    );

    if opts.dry_run {
        println!("{} skipped={}", stats.summary(), skipped);
        return Ok(());
    }

    let mut staged: Vec<StagedFile> = Vec::new();
    if let Some(atlas_path) = atlas_path {
        let atlas = compose(&scanned.tree, &layout, &FileSource, cfg.outlines)
            .context("composite atlas")?;
        staged.push(
            output::stage_image(&atlas, atlas_path)
                .with_context(|| format!("write {}", atlas_path.display()))?,
        );
    }
    staged.push(
        output::stage_bytes(index.as_bytes(), index_path)
            .with_context(|| format!("write {}", index_path.display()))?,
    );
    if let Some(stats_path) = &opts.export_stats {
        let mut value = serde_json::to_value(stats)?;
        value["skipped"] = serde_json::json!(skipped);
        let text = serde_json::to_string_pretty(&value)?;
        staged.push(
            output::stage_bytes(text.as_bytes(), stats_path)
                .with_context(|| format!("write {}", stats_path.display()))?,
        );
    }
    output::publish(staged).context("publish outputs")?;
    info!(index = %index_path.display(), frames = stats.num_frames, "atlas written");
    Ok(())
}

fn build_config(opts: &PackOptions) -> anyhow::Result<(PackerConfig, ScanOptions)> {
    let cfg = PackerConfig {
        sort_order: parse_sort_order(&opts.sort_order)?,
        padding: opts.padding,
        max_width: opts.max_width,
        max_height: opts.max_height,
        power_of_two: opts.pow2,
        square: opts.square,
        outlines: opts.outlines,
        index_format: parse_index_format(&opts.format)?,
    };
    let scan = ScanOptions {
        include: opts.include.clone(),
        exclude: opts.exclude.clone(),
        follow_links: opts.follow_links,
    };
    // Config file values win over command-line values.
    if let Some(path) = &opts.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        return y.apply(cfg, scan);
    }
    Ok((cfg, scan))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    sort_order: Option<String>,
    padding: Option<u32>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    power_of_two: Option<bool>,
    square: Option<bool>,
    outlines: Option<bool>,
    index_format: Option<String>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
}

impl YamlConfig {
    fn apply(
        self,
        mut cfg: PackerConfig,
        mut scan: ScanOptions,
    ) -> anyhow::Result<(PackerConfig, ScanOptions)> {
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.max_width {
            cfg.max_width = Some(v);
        }
        if let Some(v) = self.max_height {
            cfg.max_height = Some(v);
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.square {
            cfg.square = v;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        if let Some(v) = self.index_format {
            cfg.index_format = parse_index_format(&v)?;
        }
        if let Some(v) = self.include {
            scan.include = v;
        }
        if let Some(v) = self.exclude {
            scan.exclude = v;
        }
        if let Some(v) = self.follow_links {
            scan.follow_links = v;
        }
        Ok((cfg, scan))
    }
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

fn parse_index_format(s: &str) -> anyhow::Result<IndexFormat> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown index format: {}", s))
}
