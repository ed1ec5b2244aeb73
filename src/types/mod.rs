//! Data types shared by the layout engine and the export pipeline.

mod component;
mod coordinate;
mod table;

pub use component::*;
pub use coordinate::*;
pub use table::*;
