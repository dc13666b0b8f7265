pub mod common;
pub mod dataset;
pub mod row;
pub mod vote;

pub use common::*;
pub use dataset::*;
pub use row::*;
pub use vote::*;
