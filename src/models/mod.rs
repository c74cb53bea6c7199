//! Request-scoped data models for the asset gateway.
//!
//! Every value here lives for exactly one invocation: the canonical key
//! derived from the raw path, the access decision, the fetched object, the
//! content plan for its suffix, and the envelope handed back to the trigger.

pub mod access;
pub mod content;
pub mod envelope;
pub mod key;
pub mod object;
