mod aggregate;
mod money;
mod transaction;

pub use aggregate::*;
pub use money::*;
pub use transaction::*;
