//! Inbound mapping: native elements to universal segments.

use async_trait::async_trait;

use crate::bot::Bot;
use crate::event::Event;
use crate::rules::NativeElement;
use crate::segment::{Reply, Segment, UniMessage};
use crate::target::SupportAdapter;

/// Converts platform-native elements into universal segments.
///
/// [`build`](MessageBuilder::build) is pure and synchronous: it returns
/// exactly one segment, or `None` when the element has no mapping. Unknown
/// or malformed elements never fail the surrounding message.
#[async_trait]
pub trait MessageBuilder: Send + Sync {
    /// The platform-native element type.
    type Element: NativeElement + Send + Sync;
    /// The platform event type.
    type Event: Event;
    /// The platform bot type.
    type Bot: Bot;

    /// Returns the adapter this builder belongs to.
    fn adapter(&self) -> SupportAdapter;

    /// Maps one native element.
    fn build(&self, element: &Self::Element) -> Option<Segment>;

    /// Maps a sequence of native elements, dropping unmappable ones.
    fn build_message<'a, I>(&self, elements: I) -> UniMessage
    where
        I: IntoIterator<Item = &'a Self::Element>,
        Self::Element: 'a,
    {
        elements
            .into_iter()
            .filter_map(|element| self.build(element))
            .collect()
    }

    /// Recovers the reply an event refers to.
    ///
    /// Absence is a normal outcome and yields `None`; the default
    /// implementation is for platforms with no reply representation.
    async fn extract_reply(&self, _event: &Self::Event, _bot: &Self::Bot) -> Option<Reply> {
        None
    }
}
