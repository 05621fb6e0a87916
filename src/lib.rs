pub mod clustering;
pub mod config;
pub mod detection;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod session;
pub mod utils;
pub mod visualization;

pub use clustering::*;
pub use detection::*;
pub use export::*;
pub use pipeline::*;
pub use session::*;

pub type Result<T> = anyhow::Result<T>;
