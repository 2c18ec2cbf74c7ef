//! OPQ message events.
//!
//! Only the identities the adapter needs are modelled: the conversation
//! (group or friend), the sender, the message correlation fields and the
//! message body.

use std::any::Any;

use serde::{Deserialize, Serialize};

use uniseg_core::Event;

use super::message::OpqMessage;

/// An inbound OPQ message event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Account id of the receiving bot.
    pub self_id: i64,
    /// Group the message was posted in, absent for private messages.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Sender's user id.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Message id.
    #[serde(default)]
    pub message_id: Option<i64>,
    /// Message sequence number.
    #[serde(default)]
    pub msg_seq: Option<i64>,
    /// Message timestamp.
    #[serde(default)]
    pub msg_time: Option<i64>,
    /// Message body.
    #[serde(default)]
    pub message: OpqMessage,
}

impl MessageEvent {
    /// Returns true if the event came from a group.
    pub fn is_group(&self) -> bool {
        self.group_id.is_some()
    }

    /// Extracts plain text from the message body.
    pub fn plain_text(&self) -> String {
        self.message.extract_plain_text()
    }
}

impl Event for MessageEvent {
    fn group_id(&self) -> Option<String> {
        self.group_id.map(|id| id.to_string())
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.map(|id| id.to_string())
    }

    fn message_id(&self) -> Option<String> {
        self.message_id.map(|id| id.to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
