pub mod backend;
pub mod ckks;
pub mod config;
pub mod error;
pub mod kernel;
pub mod layout;
pub mod math;

pub use backend::HomomorphicBackend;
pub use config::Config;
pub use error::{Error, Result};
pub use kernel::{KernelOptions, MatVecKernel, ReductionStrategy};
pub use layout::{PlaintextMatrix, PlaintextVector};
