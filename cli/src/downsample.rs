use clap::Args;
use eyre::{Result, WrapErr};
use futures::{stream, StreamExt as _, TryStreamExt as _};
use log::info;
use lttb_trace::{read_samples, write_samples, BinaryCodec, Config, ImuSample, Job, Plan};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::BufReader;

use crate::io::Staged;

#[derive(Args, Debug)]
pub struct Opts {
    /// JSON config file with "ratios", "channels" and "output_dir"
    #[clap(long)]
    config: Option<PathBuf>,

    /// Ratio of samples to keep, in (0, 1], repeatable [default: 0.8 0.5 0.2 0.1 0.05 0.01]
    #[clap(long = "ratio", short = 'r')]
    ratios: Vec<f64>,

    /// Channel to downsample over, repeatable [default: all six]
    #[clap(long = "channel", short = 'c')]
    channels: Vec<String>,

    /// Output directory [default: the input's directory]
    #[clap(long)]
    output_dir: Option<PathBuf>,

    /// Number of ratios computed in parallel
    #[clap(long, default_value_t = num_cpus::get())]
    workers: usize,

    /// Input file of little-endian int16 IMU samples (ax, ay, az, gx, gy, gz)
    input: PathBuf,
}

pub async fn downsample(opts: &Opts) -> Result<()> {
    let mut config = match &opts.config {
        Some(path) => Config::load(path)
            .await
            .wrap_err_with(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if !opts.ratios.is_empty() {
        config.ratios = opts.ratios.clone();
    }
    if !opts.channels.is_empty() {
        config.channels = opts.channels.clone();
    }
    if opts.output_dir.is_some() {
        config.output_dir = opts.output_dir.clone();
    }

    let plan: Plan<ImuSample> = config.plan()?;

    let file = tokio::fs::File::open(&opts.input)
        .await
        .wrap_err_with(|| format!("opening {}", opts.input.display()))?;
    let data: Vec<ImuSample> = read_samples(&BinaryCodec, &mut BufReader::new(file))
        .await
        .wrap_err_with(|| format!("reading {}", opts.input.display()))?;
    let jobs = plan.jobs(data.len())?;
    info!(
        "read {} samples from {}, channels {:?}",
        data.len(),
        opts.input.display(),
        plan.channels()
    );

    let data = Arc::new(data);
    let plan = Arc::new(plan);
    let selections: Vec<(Job, Vec<usize>)> = stream::iter(jobs)
        .map(|job| {
            let data = data.clone();
            let plan = plan.clone();
            async move {
                let indices =
                    tokio::task::spawn_blocking(move || plan.select(data.as_slice(), job))
                        .await??;
                Ok::<_, eyre::Report>((job, indices))
            }
        })
        .buffered(opts.workers.max(1))
        .try_collect()
        .await?;

    let dir = output_dir(&opts.input, config.output_dir.as_deref());
    let stem = opts
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| eyre::eyre!("bad input file name: {}", opts.input.display()))?;
    let ext = opts
        .input
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("dat");

    let mut staged = Staged::default();
    for (job, indices) in &selections {
        let path = dir.join(job.ratio.file_name(stem, ext));
        let written = match staged.create(&path).await {
            Ok(mut w) => write_samples(&BinaryCodec, &mut w, indices.iter().map(|&i| &data[i]))
                .await
                .wrap_err_with(|| format!("writing {}", path.display())),
            Err(e) => Err(e),
        };
        match written {
            Ok(n) => info!("{} -> {} ({} samples)", job.ratio, path.display(), n),
            Err(e) => {
                staged.abort().await;
                return Err(e);
            }
        }
    }

    staged.commit().await?;
    Ok(())
}

fn output_dir(input: &Path, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}
