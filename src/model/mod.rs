mod record;
mod timestamp;

pub use record::*;
pub use timestamp::*;
