pub mod ask;
pub mod health;
pub mod invoke;

pub use ask::*;
pub use health::*;
pub use invoke::*;
