pub mod error;
pub mod runner;
pub mod traits;
pub mod types;

pub use error::*;
pub use runner::*;
pub use traits::*;
pub use types::*;
