pub mod hough;

pub use hough::*;
