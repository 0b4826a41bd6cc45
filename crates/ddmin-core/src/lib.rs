pub mod chunk;
pub mod harness;
pub mod minimize;
pub mod minimize_parallel;
pub mod types;

pub use chunk::{chunk_bounds, chunk_size, complement};
pub use harness::{reduce, reduce_parallel};
pub use minimize::{ddmin, try_ddmin};
pub use minimize_parallel::{ddmin_parallel, try_ddmin_parallel};
pub use types::{Outcome, Reduction, Stats, Status};
