//! Data models for the OPQ protocol.

pub mod event;
pub mod message;
pub mod segment;

pub use event::MessageEvent;
pub use message::OpqMessage;
pub use segment::OpqSegment;
