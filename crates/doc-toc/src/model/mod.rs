mod outline;
pub mod toc;

pub use outline::*;
