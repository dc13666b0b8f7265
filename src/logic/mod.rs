pub mod cells;
pub mod checksum;
pub mod compat;
pub mod consistency;
pub mod partition;
pub mod reconcile;
pub mod tally;

pub use cells::*;
pub use checksum::*;
pub use compat::*;
pub use consistency::*;
pub use partition::*;
pub use reconcile::*;
pub use tally::*;
