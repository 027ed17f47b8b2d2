use clap::{Args, ValueEnum};
use eyre::Result;
use log::info;
use lttb_trace::{
    downsample, read_samples, write_samples, BinaryCodec, ChannelSet, CsvCodec, ImuSample,
};
use tokio::io::AsyncWrite;

use crate::io::{create_output, open_input};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Headerless little-endian int16 tuples
    Bin,
    /// Comma separated rows with a header
    Csv,
}

#[derive(Args, Debug)]
pub struct Opts {
    /// Input encoding
    #[clap(long, value_enum, default_value = "bin")]
    pub from: Format,

    /// Output encoding
    #[clap(long, value_enum, default_value = "csv")]
    pub to: Format,

    /// Output file [default: stdout]
    #[clap(long, default_value = "stdout")]
    pub output: String,

    /// Downsample to this many samples before encoding
    #[clap(long)]
    pub threshold: Option<usize>,

    /// Channel to downsample over, repeatable [default: all six]
    #[clap(long = "channel", short = 'c')]
    pub channels: Vec<String>,

    /// Input files, concatenated in order [default: stdin]
    pub files: Vec<String>,
}

pub async fn encode(opts: &Opts) -> Result<()> {
    let sources: Vec<String> = if opts.files.is_empty() {
        vec!["stdin".to_string()]
    } else {
        opts.files.clone()
    };

    let channels = if opts.channels.is_empty() {
        ChannelSet::<ImuSample>::all()
    } else {
        ChannelSet::new(&opts.channels)?
    };

    let mut data: Vec<ImuSample> = Vec::new();
    for source in &sources {
        let mut input = open_input(source).await?;
        let samples: Vec<ImuSample> = match opts.from {
            Format::Bin => read_samples(&BinaryCodec, &mut input).await?,
            Format::Csv => read_samples(&CsvCodec::default(), &mut input).await?,
        };
        info!("read {} samples from {}", samples.len(), source);
        data.extend(samples);
    }

    let sampled: Vec<&ImuSample> = match opts.threshold {
        Some(threshold) => downsample(&data, threshold, &channels)?,
        None => data.iter().collect(),
    };

    let mut output = create_output(&opts.output).await?;
    let n = write(opts.to, &mut output, sampled).await?;
    info!("wrote {} samples to {}", n, opts.output);
    Ok(())
}

async fn write<W>(format: Format, output: &mut W, samples: Vec<&ImuSample>) -> Result<usize>
where
    W: AsyncWrite + Unpin + Send,
{
    let n = match format {
        Format::Bin => write_samples(&BinaryCodec, output, samples).await?,
        Format::Csv => {
            let codec = CsvCodec::default();
            codec.write_header::<ImuSample, _>(output).await?;
            write_samples(&codec, output, samples).await?
        }
    };
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<ImuSample> {
        (0..4)
            .map(|i| ImuSample {
                ax: i,
                gz: -i,
                ..Default::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn csv_output_has_header() {
        let data = samples();
        let mut out = Vec::new();
        let n = write(Format::Csv, &mut out, data.iter().collect())
            .await
            .unwrap();
        assert_eq!(n, 4);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ax,ay,az,gx,gy,gz"));
        assert_eq!(lines.last(), Some("3,0,0,0,0,-3"));
    }

    #[tokio::test]
    async fn bin_output_is_raw() {
        let data = samples();
        let mut out = Vec::new();
        write(Format::Bin, &mut out, data.iter().collect())
            .await
            .unwrap();
        assert_eq!(out.len(), 4 * 12);
    }
}
