//! Infinite-scroll stabilization.
//!
//! Deciding when a lazily loaded feed is "done" is a race against the
//! renderer. Two signals are combined:
//!
//! - the count of a cheap *control* element, sampled after each scroll: the
//!   feed is done once the count stops growing (confirmed by one more scroll
//!   and a longer wait);
//! - the document height: if it stays unchanged for several cycles the feed
//!   is done even when the control element never shows up.
//!
//! A hard cycle ceiling bounds the loop when neither signal converges.
//!
//! [`ScrollStabilizer`] holds the state machine and performs no I/O;
//! [`stabilize`] drives it against a [`Document`](crate::dom::Document).

mod driver;
mod machine;
mod types;

pub use driver::stabilize;
pub use machine::ScrollStabilizer;
pub use types::{ScrollOutcome, ScrollState, StableReason, Step};
