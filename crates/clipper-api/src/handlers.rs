//! Request handlers.

pub mod clips;
pub mod health;
pub mod jobs;

pub use clips::*;
pub use health::*;
pub use jobs::*;
