//! Inbound event seam.
//!
//! Adapters only need three optional identities from an inbound event to
//! resolve targets and correlate messages. Platform event types implement
//! [`Event`] to expose them.

use std::any::Any;

/// An inbound platform event, as seen by builders and exporters.
pub trait Event: Send + Sync + 'static {
    /// Returns the group identity, if the event happened in a group.
    fn group_id(&self) -> Option<String>;

    /// Returns the identity of the user that triggered the event.
    fn user_id(&self) -> Option<String>;

    /// Returns the identity of the message carried by the event.
    fn message_id(&self) -> Option<String>;

    /// Returns self as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Attempts to downcast an event to a concrete type.
pub fn downcast_event<T: Event>(event: &dyn Event) -> Option<&T> {
    event.as_any().downcast_ref::<T>()
}
