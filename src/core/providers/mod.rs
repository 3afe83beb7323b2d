//! Operator input providers.
//!
//! Input channels supply values, notice sinks report fallbacks, and the
//! timeout gate ties the two together.

pub mod human_input;
pub mod input_channel;
pub mod notices;

pub use human_input::{
    DefaultResponses, DefaultRule, GateState, PendingInputRequest, Resolution, TimeoutInputGate,
};
pub use input_channel::{InputChannel, ReplyInputChannel, StdinInputChannel};
pub use notices::{CollectingNotices, ConsoleNotices, NoticeSink};
