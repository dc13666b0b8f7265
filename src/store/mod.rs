pub mod render_state_cache;
pub mod traits;

pub use render_state_cache::*;
pub use traits::*;
