//! Fixed-capacity transposition table for multi-threaded game-tree search.

pub use debug::{CacheStats, RelaxedCounter};
pub use error::{Error, Result};
pub use eval::{Eval, EVAL_MAX, EVAL_MIN};
pub use info::ExtraInfo;
pub use node::EntryType;
pub use trans_table::{Depth, MAX_CAPACITY, TransEntry, TransTable};

mod debug;
mod error;
mod eval;
mod info;
mod node;
mod shared_table;
mod trans_table;
