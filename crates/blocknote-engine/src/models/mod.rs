pub mod block;
pub mod timestamp;

pub use block::{Block, BlockId, BlockKind};
pub use timestamp::{Clock, FixedClock, SystemClock, TIMESTAMP_FORMAT, Timestamp};
