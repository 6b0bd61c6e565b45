//! Conversation core for the lead intake agent.
//!
//! One submission drives one cycle of the turn controller:
//! check finished → generate → execute requested tools → generate again or stop.
//! Generation and persistence are reached only through the traits in [`ports`].

pub mod event_bus;
pub mod ports;
pub mod qualification;
pub mod runtime;
pub mod session;
pub mod tools;


pub use runtime::{TurnController, TurnState};
pub use session::{ConversationContext, Session};
pub use tools::{Tool, ToolRegistry};
