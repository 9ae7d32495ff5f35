use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use texpack_core::{
    FileCodec, ImageKind, ItemOutcome, Manifest, OversizePolicy, PackError, PackerConfig,
    pack_images, pack_images_with, pack_to_file_with, write_manifest,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "texpack",
    about = "Pack a folder of images into one texture atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress bar while packing (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack every image under a directory into an atlas + JSON manifest
    Pack(PackArgs),
    /// Look up where a named image landed in a manifest
    Locate(LocateArgs),
    /// Simple timing bench (packs once in memory, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output image (.png/.jpg/.jpeg/.bmp/.webp); defaults to packed_<unix-seconds>.png
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// YAML config file; values set there override the command line
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob, matched against image names). If set, only matching files are packed
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob, matched against image names)
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Atlas width (1..=4096)
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    width: u32,
    /// Atlas height (1..=4096)
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    height: u32,
    /// Empty border around every image
    #[arg(long, default_value_t = 1, help_heading = "Layout")]
    padding: u32,
    /// Skip images that do not fit instead of failing
    #[arg(short, long, default_value_t = false, help_heading = "Layout")]
    ignore_large_image: bool,
    /// Decode inputs in parallel (requires feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Export
    /// JPEG quality (1..=100)
    #[arg(long, default_value_t = 100, help_heading = "Export")]
    quality: u8,
    /// Manifest schema (only json)
    #[arg(short, long, default_value = "json", help_heading = "Export")]
    schema: String,
    /// Image name written to the manifest instead of the output file name
    #[arg(short = 'm', long = "metafilename", help_heading = "Export")]
    meta_filename: Option<String>,
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

#[derive(Parser, Debug, Clone)]
struct LocateArgs {
    /// Manifest written by `texpack pack`
    manifest: PathBuf,
    /// Image name (as listed in the manifest) or identifier
    name: String,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input directory
    input: PathBuf,
    #[arg(long, default_value_t = 1024)]
    width: u32,
    #[arg(long, default_value_t = 1024)]
    height: u32,
    #[arg(long, default_value_t = 1)]
    padding: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Locate(args) => run_locate(args),
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(args)?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    cfg.validate().context("invalid configuration")?;

    let inputs = gather_inputs(&args.input, &args.include, &args.exclude)?;
    info!(
        width = cfg.width,
        height = cfg.height,
        padding = cfg.padding,
        oversize = ?cfg.oversize,
        count = inputs.len(),
        "start packing"
    );

    let bar = progress_bar(inputs.len(), show_progress)?;
    let on_item = |o: &ItemOutcome| {
        if let Some(b) = &bar {
            b.set_message(o.path().display().to_string());
            b.inc(1);
        }
    };
    let out = if args.dry_run {
        pack_images_with(inputs, &cfg, &FileCodec, on_item)
    } else {
        pack_to_file_with(inputs, &cfg, &FileCodec, on_item)
    }
    .with_context(|| format!("pack {}", args.input.display()))?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }

    let stats = out.stats();
    info!(
        placed = stats.placed,
        dropped = stats.dropped,
        undecodable = stats.decode_failed,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    if !args.dry_run {
        let manifest_path = write_manifest(&out, &cfg)
            .with_context(|| format!("write {}", cfg.schema_path().display()))?;
        info!(image = ?cfg.output_image_path, manifest = ?manifest_path, "atlas written");
    }

    if let Some(stats_path) = &args.export_stats {
        if !args.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_locate(args: &LocateArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.manifest)
        .with_context(|| format!("read {}", args.manifest.display()))?;
    let manifest = Manifest::from_json_str(&text)
        .with_context(|| format!("parse {}", args.manifest.display()))?;
    let frame = manifest
        .find(&args.name)
        .or_else(|| manifest.find_by_id(&args.name))
        .with_context(|| format!("{} is not in {}", args.name, manifest.meta.image))?;
    println!("{}", serde_json::to_string_pretty(frame)?);
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let inputs = gather_inputs(&b.input, &[], &[])?;
    let cfg = PackerConfig::builder()
        .with_dimensions(b.width, b.height)
        .padding(b.padding)
        .ignore_large_image(true)
        .build();
    let start = Instant::now();
    let out = pack_images(inputs, &cfg, &FileCodec)?;
    let dur = start.elapsed();
    let stats = out.stats();
    println!(
        "placed={} dropped={} occupancy={:.2}% time={}",
        stats.placed,
        stats.dropped,
        stats.occupancy * 100.0,
        bench_fmt_dur(dur)
    );
    Ok(())
}

fn bench_fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

/// Command-line values, overlaid with the YAML file when one is given.
fn build_config(args: &PackArgs) -> anyhow::Result<PackerConfig> {
    let cfg = PackerConfig::builder()
        .with_dimensions(args.width, args.height)
        .padding(args.padding)
        .quality(args.quality)
        .schema(args.schema.clone())
        .ignore_large_image(args.ignore_large_image)
        .meta_filename(args.meta_filename.clone())
        .parallel(args.parallel)
        .output_image_path(args.out.clone().unwrap_or_else(default_output_path))
        .build();

    let mut cfg = match &args.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)
                .with_context(|| format!("parse {}", path.display()))?;
            y.into_packer_config(cfg)?
        }
        None => cfg,
    };
    if cfg.output_image_path.is_relative() {
        cfg.output_image_path = std::env::current_dir()?.join(&cfg.output_image_path);
    }
    Ok(cfg)
}

fn default_output_path() -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    PathBuf::from(format!("packed_{secs}.png"))
}

/// Walks `dir` and returns `(absolute path, name)` for every supported image.
///
/// Names are relative to the parent of `dir` and always use `/`, so packing
/// `art/icons` yields names like `icons/ok.png`.
fn gather_inputs(
    dir: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<(PathBuf, String)>> {
    let meta = fs::metadata(dir).with_context(|| format!("cannot access {}", dir.display()))?;
    if !meta.is_dir() {
        return Err(PackError::Scan(format!("{} is not a directory", dir.display())).into());
    }
    let inc_set = build_globs(include)?;
    let exc_set = build_globs(exclude)?;

    let root = fs::canonicalize(dir).with_context(|| format!("resolve {}", dir.display()))?;
    let base = root.parent().unwrap_or(&root).to_path_buf();
    debug!(root = %root.display(), "searching");

    let mut list = Vec::new();
    for entry in WalkDir::new(&root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "skip unreadable entry");
                continue;
            }
        };
        let p = entry.path();
        if !entry.file_type().is_file() || ImageKind::from_path(p).is_none() {
            continue;
        }
        let name = relative_name(p, &base);
        if should_skip(&name, inc_set.as_ref(), exc_set.as_ref()) {
            continue;
        }
        debug!(path = %p.display(), "found");
        list.push((p.to_path_buf(), name));
    }

    if list.is_empty() {
        return Err(PackError::Scan(format!("no input image under {}", dir.display())).into());
    }
    Ok(list)
}

fn relative_name(p: &Path, base: &Path) -> String {
    let rel = p.strip_prefix(base).unwrap_or(p);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globs(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("bad glob {pat:?}"))?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(name: &str, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    if let Some(ex) = exclude {
        if ex.is_match(name) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(name) {
            return true;
        }
    }
    false
}

fn progress_bar(len: usize, enabled: bool) -> anyhow::Result<Option<ProgressBar>> {
    if !enabled {
        return Ok(None);
    }
    let b = ProgressBar::new(len as u64);
    b.set_style(ProgressStyle::with_template(
        "{spinner:.green} packing {pos}/{len} [{elapsed_precise}] {wide_msg}",
    )?);
    Ok(Some(b))
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
        .try_init();
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YamlConfig {
    width: Option<u32>,
    height: Option<u32>,
    padding: Option<u32>,
    out: Option<PathBuf>,
    quality: Option<u8>,
    schema: Option<String>,
    #[serde(alias = "ignoreLargeImage")]
    ignore_large_image: Option<bool>,
    /// abort | drop; wins over `ignore_large_image`
    oversize: Option<String>,
    #[serde(alias = "metafilename")]
    meta_filename: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.out {
            cfg.output_image_path = v;
        }
        if let Some(v) = self.quality {
            cfg.quality = v;
        }
        if let Some(v) = self.schema {
            cfg.schema = v;
        }
        if let Some(v) = self.ignore_large_image {
            cfg.oversize = if v {
                OversizePolicy::Drop
            } else {
                OversizePolicy::Abort
            };
        }
        if let Some(v) = self.oversize {
            cfg.oversize = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown oversize policy: {}", v))?;
        }
        if let Some(v) = self.meta_filename {
            cfg.meta_filename = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
