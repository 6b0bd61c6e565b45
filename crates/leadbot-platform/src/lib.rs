//! Native adapters for the lead intake agent.
//!
//! - [`llm`]: OpenAI-compatible chat completions over HTTPS
//! - [`persistence`]: Google Sheets, in-memory, and backend auto-detection
//! - [`retry`]: timeout mapping and the single-retry policy both share

pub mod llm;
pub mod persistence;
pub mod retry;
