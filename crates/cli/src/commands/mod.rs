pub mod classify;
pub mod extract;
pub mod features;
pub mod util;

pub use classify::*;
pub use extract::*;
pub use features::*;
pub use util::*;
