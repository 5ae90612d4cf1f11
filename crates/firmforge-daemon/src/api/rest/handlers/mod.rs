//! API request handlers

mod boards;
mod compile;
mod health;
mod jobs;

pub use boards::*;
pub use compile::*;
pub use health::*;
pub use jobs::*;
