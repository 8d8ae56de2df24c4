//! Trading-session lifecycle.
//!
//! A session is a bounded trading period during which float is opened,
//! used, and closed. Its status only ever changes through the state
//! machine's named transitions; confirmation transitions are gated on
//! every relevant float stack carrying the matching confirmed timestamp.

pub mod error;
pub mod machine;
pub mod types;

pub use error::SessionError;
pub use machine::SessionStateMachine;
pub use types::{CxSession, FloatAction, SessionStatus};
