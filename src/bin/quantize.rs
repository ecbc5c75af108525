use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use lab_bucket_quantizer::{DistanceMetric, HistogramBar, QuantizeOptions, Shape, quantize_bytes};
use log::info;
use serde::Serialize;

/// `WIDTHxHEIGHT` bounding box.
#[derive(Clone, Copy, Debug)]
struct Fit {
    width: u32,
    height: u32,
}

impl FromStr for Fit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
        let width = w.trim().parse().map_err(|e| format!("bad width `{w}`: {e}"))?;
        let height = h.trim().parse().map_err(|e| format!("bad height `{h}`: {e}"))?;
        if width == 0 || height == 0 {
            return Err("fit dimensions must be positive".into());
        }
        Ok(Fit { width, height })
    }
}

/// Reduce images to a few perceptual color buckets.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of color buckets
    #[arg(short = 'k', long, default_value_t = 8)]
    buckets: usize,

    /// JSON file with quantization options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum k-means iterations (overrides the config file)
    #[arg(long)]
    iterations: Option<usize>,

    /// Seed for empty-cluster reseeding and art generation
    #[arg(long)]
    seed: Option<u64>,

    /// Color difference formula: cie76 or ciede2000
    #[arg(long)]
    metric: Option<DistanceMetric>,

    /// Fit the image inside WIDTHxHEIGHT before quantizing
    #[arg(long)]
    fit: Option<Fit>,

    /// Output directory
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Output filename prefix (ignored when --out-dir supplied)
    #[arg(short = 'p', long, default_value = "quantized_")]
    prefix: String,

    /// Skip writing the JSON report
    #[arg(long)]
    no_report: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    source: String,
    width: u32,
    height: u32,
    buckets: usize,
    iterations: usize,
    converged: bool,
    palette: Vec<String>,
    histogram: &'a [HistogramBar],
    shapes: &'a [Shape],
}

fn load_options(args: &Args) -> Result<QuantizeOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => QuantizeOptions::default(),
    };
    if let Some(iterations) = args.iterations {
        options.max_iterations = iterations;
    }
    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(metric) = args.metric {
        options.metric = metric;
    }
    options.validate()?;
    Ok(options)
}

fn output_path(args: &Args, input: &Path) -> Result<PathBuf> {
    if let Some(dir) = &args.out_dir {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        return Ok(dir.join(format!("{stem}.png")));
    }
    let stem = input
        .file_stem()
        .with_context(|| format!("no file name in {}", input.display()))?
        .to_string_lossy();
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!("{}{stem}.png", args.prefix)))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let options = load_options(&args)?;
    let fit = args.fit.map(|f| (f.width, f.height));

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let out = quantize_bytes(&bytes, args.buckets, fit, &options)
            .with_context(|| format!("quantizing {}", input.display()))?;

        let out_path = output_path(&args, input)?;
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, &out.png)?;
        info!("saved {}", out_path.display());

        if !args.no_report {
            let rendering = &out.rendering;
            let report = Report {
                source: input.display().to_string(),
                width: rendering.width,
                height: rendering.height,
                buckets: args.buckets,
                iterations: rendering.clusters.iterations(),
                converged: rendering.clusters.converged(),
                palette: rendering.palette_hex(),
                histogram: &rendering.histogram,
                shapes: &rendering.shapes,
            };
            let report_path = out_path.with_extension("json");
            fs::write(&report_path, serde_json::to_vec_pretty(&report)?)?;
            info!("report → {}", report_path.display());
        }
    }

    Ok(())
}
