use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown channel {name:?}, expected one of {expected:?}")]
    InvalidChannel {
        name: String,
        expected: &'static [&'static str],
    },
    #[error("channel {0:?} requested more than once")]
    DuplicateChannel(String),
    #[error("no channels selected")]
    EmptyChannelSet,
    #[error("cannot downsample {len} samples to {threshold}: first and last samples need two slots")]
    DegenerateInput { len: usize, threshold: usize },
    #[error("input has no samples")]
    EmptyInput,
    #[error("ratio {0} is outside (0, 1] or rounds to 0%")]
    InvalidRatio(f64),
    #[error("ratios {first} and {second} both write the {percent}% file")]
    DuplicateRatio { first: f64, second: f64, percent: u32 },
    #[error("input ends inside a record: {got} of {want} bytes")]
    TruncatedRecord { got: usize, want: usize },
    #[error("line {line}: expected {want} values, got {got}")]
    FieldCount { line: u64, got: usize, want: usize },
    #[error("line {line}: bad value {value:?}")]
    BadValue { line: u64, value: String },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
