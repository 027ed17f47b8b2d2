mod downsample;
mod encode;
mod io;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lttb-trace",
    about = "Shape-preserving downsampling of multi-channel sensor traces"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write one LTTB-downsampled copy of a trace per ratio
    Downsample(downsample::Opts),
    /// Transcode traces between encodings, optionally downsampling
    Encode(encode::Opts),
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Downsample(opts) => downsample::downsample(&opts).await,
        Command::Encode(opts) => encode::encode(&opts).await,
    }
}
