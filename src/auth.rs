//! Credential model, the synchronized authentication state machine, and its broadcast channel.

pub mod broadcast;
pub mod state;
pub mod token;

pub use broadcast::*;
pub use state::*;
pub use token::*;
