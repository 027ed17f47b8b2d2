mod codec;
mod error;
mod lttb;
mod plan;
mod record;

pub use codec::*;
pub use error::*;
pub use lttb::*;
pub use plan::*;
pub use record::*;
