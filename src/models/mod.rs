pub mod event;
pub mod response;
pub mod search;

pub use event::*;
pub use response::*;
pub use search::*;
