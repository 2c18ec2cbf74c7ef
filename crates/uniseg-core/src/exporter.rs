//! Outbound mapping and dispatch: universal segments to native messages.
//!
//! Export is split in two steps:
//!
//! 1. [`export`](MessageExporter::export) turns each segment into either a
//!    native element or a structured side effect (for example "upload this
//!    file" or "reply to that message"). The results are collected into an
//!    [`Outbound`].
//! 2. [`send_to`](MessageExporter::send_to) reads the side effects and picks
//!    the platform call to make.
//!
//! ```text
//! UniMessage ──export──▶ Outbound { elements, effects } ──send_to──▶ SendOutcome
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::bot::Bot;
use crate::error::{ExportError, ExportResult};
use crate::event::Event;
use crate::segment::{Segment, UniMessage};
use crate::target::{ConversationKind, SupportAdapter, Target};

/// Extra parameters forwarded to the platform send call.
pub type SendOptions = Map<String, Value>;

// =============================================================================
// Intermediate Results
// =============================================================================

/// Platform side effects accumulated while exporting a message.
pub trait SideEffects: Default + Send + Sync {
    /// A single side effect produced by exporting one segment.
    type Effect: Send;

    /// Records an effect.
    fn absorb(&mut self, effect: Self::Effect);

    /// Returns true if no effect was recorded.
    fn is_empty(&self) -> bool;
}

/// The result of exporting one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Exported<E, X> {
    /// An inline native element.
    Element(E),
    /// An out-of-band side effect.
    Effect(X),
}

/// A fully exported outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound<E, S> {
    /// Native elements in segment order.
    pub elements: Vec<E>,
    /// Side effects collected from the message.
    pub effects: S,
}

impl<E, S: Default> Default for Outbound<E, S> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            effects: S::default(),
        }
    }
}

impl<E, S: SideEffects> Outbound<E, S> {
    /// Creates an empty outbound message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the export result of one segment.
    pub fn push(&mut self, exported: Exported<E, S::Effect>) {
        match exported {
            Exported::Element(element) => self.elements.push(element),
            Exported::Effect(effect) => self.effects.absorb(effect),
        }
    }
}

// =============================================================================
// Dispatch Types
// =============================================================================

/// Where an outbound message should go.
#[derive(Debug, Clone)]
pub enum Destination<'a, E> {
    /// A pre-resolved target.
    Target(Target),
    /// Reply to the conversation an event came from.
    Event(&'a E),
}

impl<E> From<Target> for Destination<'_, E> {
    fn from(target: Target) -> Self {
        Self::Target(target)
    }
}

/// A platform capability that may be unavailable for some conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Out-of-band file upload.
    FileUpload,
}

/// Result of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome<R> {
    /// The platform accepted the message.
    Sent(R),
    /// Nothing was sent because the platform lacks the capability for this
    /// conversation.
    Skipped {
        /// The missing capability.
        capability: Capability,
        /// The conversation kind it is missing for.
        conversation: ConversationKind,
    },
}

impl<R> SendOutcome<R> {
    /// Returns true if a message was sent.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    /// Returns the platform acknowledgement, if any.
    pub fn receipt(&self) -> Option<&R> {
        match self {
            Self::Sent(r) => Some(r),
            Self::Skipped { .. } => None,
        }
    }
}

// =============================================================================
// MessageExporter
// =============================================================================

/// Exported result type of a [`MessageExporter`].
pub type ExportedOf<X> = Exported<
    <X as MessageExporter>::Element,
    <<X as MessageExporter>::Effects as SideEffects>::Effect,
>;

/// Outbound message type of a [`MessageExporter`].
pub type OutboundOf<X> = Outbound<<X as MessageExporter>::Element, <X as MessageExporter>::Effects>;

/// Converts universal segments into native messages and sends them.
#[async_trait]
pub trait MessageExporter: Send + Sync {
    /// The platform-native element type.
    type Element: Send + Sync;
    /// Side effects collected during export.
    type Effects: SideEffects;
    /// The platform event type.
    type Event: Event;
    /// The platform bot type.
    type Bot: Bot;
    /// The platform acknowledgement returned by a send.
    type Receipt: Send;

    /// Returns the adapter this exporter belongs to.
    fn adapter(&self) -> SupportAdapter;

    /// Resolves the conversation an event came from.
    ///
    /// Checks the group identity first, then the user identity.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnresolvableTarget`] if the event carries
    /// neither.
    fn get_target(&self, event: &Self::Event, bot: Option<&Self::Bot>) -> ExportResult<Target> {
        let target = Target::resolve(event.group_id(), event.user_id(), self.adapter())?;
        Ok(target.with_self_id(bot.map(|b| b.self_id())))
    }

    /// Reads the message identity of an event.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnresolvableMessageId`] if it is absent.
    fn get_message_id(&self, event: &Self::Event) -> ExportResult<String> {
        event.message_id().ok_or(ExportError::UnresolvableMessageId)
    }

    /// Exports one segment.
    async fn export(
        &self,
        segment: &Segment,
        bot: Option<&Self::Bot>,
    ) -> ExportResult<ExportedOf<Self>>;

    /// Exports a whole message, stopping at the first failure.
    async fn export_message(
        &self,
        message: &UniMessage,
        bot: Option<&Self::Bot>,
    ) -> ExportResult<OutboundOf<Self>> {
        let mut outbound: OutboundOf<Self> = Outbound::new();
        for segment in message {
            outbound.push(self.export(segment, bot).await?);
        }
        debug!(
            adapter = %self.adapter(),
            elements = outbound.elements.len(),
            has_effects = !outbound.effects.is_empty(),
            "Exported message"
        );
        Ok(outbound)
    }

    /// Sends an exported message.
    async fn send_to(
        &self,
        destination: Destination<'_, Self::Event>,
        bot: &Self::Bot,
        message: OutboundOf<Self>,
        options: SendOptions,
    ) -> ExportResult<SendOutcome<Self::Receipt>>;
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::Arc;

    use super::*;
    use crate::error::ApiResult;

    struct Chat {
        group: Option<&'static str>,
        user: Option<&'static str>,
    }

    impl Event for Chat {
        fn group_id(&self) -> Option<String> {
            self.group.map(str::to_string)
        }

        fn user_id(&self) -> Option<String> {
            self.user.map(str::to_string)
        }

        fn message_id(&self) -> Option<String> {
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct EchoBot;

    #[async_trait]
    impl Bot for EchoBot {
        fn self_id(&self) -> &str {
            "bot"
        }

        fn adapter(&self) -> SupportAdapter {
            SupportAdapter::Opq
        }

        async fn call_api(&self, _action: &str, params: Value) -> ApiResult<Value> {
            Ok(params)
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[derive(Debug, Default)]
    struct Replies(Vec<String>);

    impl SideEffects for Replies {
        type Effect = String;

        fn absorb(&mut self, effect: String) {
            self.0.push(effect);
        }

        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    struct TextExporter;

    #[async_trait]
    impl MessageExporter for TextExporter {
        type Element = String;
        type Effects = Replies;
        type Event = Chat;
        type Bot = EchoBot;
        type Receipt = ();

        fn adapter(&self) -> SupportAdapter {
            SupportAdapter::Opq
        }

        async fn export(
            &self,
            segment: &Segment,
            _bot: Option<&EchoBot>,
        ) -> ExportResult<Exported<String, String>> {
            match segment {
                Segment::Text(text) => Ok(Exported::Element(text.text.clone())),
                Segment::Reply(reply) => Ok(Exported::Effect(reply.id.clone())),
                _ => Err(ExportError::serialize_failed(segment)),
            }
        }

        async fn send_to(
            &self,
            _destination: Destination<'_, Chat>,
            _bot: &EchoBot,
            _message: OutboundOf<Self>,
            _options: SendOptions,
        ) -> ExportResult<SendOutcome<()>> {
            Ok(SendOutcome::Sent(()))
        }
    }

    #[tokio::test]
    async fn test_export_message_collects_elements_and_effects() {
        let msg = UniMessage::new().text("a").reply("9").text("b");
        let outbound = TextExporter.export_message(&msg, None).await.unwrap();
        assert_eq!(outbound.elements, vec!["a", "b"]);
        assert_eq!(outbound.effects.0, vec!["9"]);
    }

    #[tokio::test]
    async fn test_export_message_stops_at_first_failure() {
        let msg = UniMessage::new().text("a").at_all().text("b");
        let err = TextExporter.export_message(&msg, None).await.unwrap_err();
        assert!(matches!(err, ExportError::SerializeFailed { kind: "at_all", .. }));
    }

    #[test]
    fn test_default_get_target() {
        let event = Chat {
            group: Some("1"),
            user: Some("2"),
        };
        let target = TextExporter.get_target(&event, Some(&EchoBot)).unwrap();
        assert_eq!(target.id(), "1");
        assert_eq!(target.self_id.as_deref(), Some("bot"));

        let nobody = Chat {
            group: None,
            user: None,
        };
        assert!(matches!(
            TextExporter.get_target(&nobody, None),
            Err(ExportError::UnresolvableTarget)
        ));
        assert!(matches!(
            TextExporter.get_message_id(&nobody),
            Err(ExportError::UnresolvableMessageId)
        ));
    }
}
