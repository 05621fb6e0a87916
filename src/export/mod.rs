pub mod destination;
pub mod table;

pub use destination::*;
pub use table::*;
