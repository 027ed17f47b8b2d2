use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{ChannelSet, Error, Record, Result};

/// Ratios written by default, from coarse to fine reduction.
pub const DEFAULT_RATIOS: &[f64] = &[0.8, 0.5, 0.2, 0.1, 0.05, 0.01];

/// A fraction of the input length to keep, in `(0, 1]`, that names a
/// distinct output file: it must round to at least 1%.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    pub fn new(r: f64) -> Result<Self> {
        if r > 0.0 && r <= 1.0 && Ratio(r).percent() > 0 {
            Ok(Ratio(r))
        } else {
            Err(Error::InvalidRatio(r))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Number of samples to keep out of `n`: `max(2, floor(n * r))`.
    pub fn threshold(self, n: usize) -> usize {
        ((n as f64 * self.0).floor() as usize).max(2)
    }

    /// The ratio as a rounded percentage, e.g. 0.05 -> 5.
    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }

    /// Output file name for this ratio: `{stem}-{percent}.{ext}`.
    pub fn file_name(self, stem: &str, ext: &str) -> String {
        format!("{}-{}.{}", stem, self.percent(), ext)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

// Config is the on-disk JSON form of a Plan. Missing fields take defaults;
// an empty channel list selects every channel of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ratios: Vec<f64>,
    pub channels: Vec<String>,
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ratios: DEFAULT_RATIOS.to_vec(),
            channels: Vec::new(),
            output_dir: None,
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = tokio::fs::read_to_string(path).await?;
        Self::from_json(&s)
    }

    pub fn plan<S: Record>(&self) -> Result<Plan<S>> {
        let ratios = self
            .ratios
            .iter()
            .map(|&r| Ratio::new(r))
            .collect::<Result<Vec<_>>>()?;
        let channels = if self.channels.is_empty() {
            ChannelSet::all()
        } else {
            ChannelSet::new(&self.channels)?
        };
        Plan::new(ratios, channels)
    }
}

/// One downsample to run: the ratio and the threshold it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Job {
    pub ratio: Ratio,
    pub threshold: usize,
}

/// An ordered list of ratios applied to the same input over the same
/// channels.
#[derive(Debug, Clone)]
pub struct Plan<S: Record> {
    ratios: Vec<Ratio>,
    channels: ChannelSet<S>,
}

impl<S: Record> Plan<S> {
    /// Fails with [`Error::DuplicateRatio`] if two ratios round to the same
    /// percentage, since they would write the same file.
    pub fn new(ratios: Vec<Ratio>, channels: ChannelSet<S>) -> Result<Self> {
        for (i, r) in ratios.iter().enumerate() {
            if let Some(prev) = ratios[..i].iter().find(|p| p.percent() == r.percent()) {
                return Err(Error::DuplicateRatio {
                    first: prev.get(),
                    second: r.get(),
                    percent: r.percent(),
                });
            }
        }
        Ok(Plan { ratios, channels })
    }

    pub fn ratios(&self) -> &[Ratio] {
        &self.ratios
    }

    pub fn channels(&self) -> &ChannelSet<S> {
        &self.channels
    }

    /// Maps every ratio to a threshold for an input of `n` samples.
    pub fn jobs(&self, n: usize) -> Result<Vec<Job>> {
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        Ok(self
            .ratios
            .iter()
            .map(|&ratio| Job {
                ratio,
                threshold: ratio.threshold(n),
            })
            .collect())
    }

    /// Runs one job over `data` and returns the selected indices.
    pub fn select(&self, data: &[S], job: Job) -> Result<Vec<usize>> {
        let indices = crate::select(data, job.threshold, &self.channels)?;
        debug!("plan: {} kept {} of {}", job.ratio, indices.len(), data.len());
        Ok(indices)
    }
}
