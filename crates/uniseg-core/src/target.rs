//! Send destinations.
//!
//! A [`Target`] names where an outbound message goes: one group or one private
//! conversation, plus the adapter and bot that should deliver it. The
//! [`Conversation`] enum makes "both" and "neither" unrepresentable.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// Adapters known to the universal segment layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SupportAdapter {
    /// OneBot v11.
    Onebot11,
    /// OneBot v12.
    Onebot12,
    /// Satori.
    Satori,
    /// Telegram.
    Telegram,
    /// Discord.
    Discord,
    /// OPQ.
    Opq,
}

impl SupportAdapter {
    /// Returns the adapter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onebot11 => "OneBot V11",
            Self::Onebot12 => "OneBot V12",
            Self::Satori => "Satori",
            Self::Telegram => "Telegram",
            Self::Discord => "Discord",
            Self::Opq => "OPQ",
        }
    }

    /// Returns the default scope used by targets of this adapter.
    pub fn default_scope(&self) -> SupportScope {
        match self {
            Self::Onebot11 | Self::Onebot12 | Self::Satori => SupportScope::QqClient,
            Self::Telegram => SupportScope::Telegram,
            Self::Discord => SupportScope::Discord,
            Self::Opq => SupportScope::Opq,
        }
    }
}

impl fmt::Display for SupportAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform scope a target lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SupportScope {
    /// QQ through a client-side protocol implementation.
    QqClient,
    /// Telegram.
    Telegram,
    /// Discord.
    Discord,
    /// OPQ framework.
    Opq,
}

/// Which kind of conversation a target points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    /// Group chat.
    Group,
    /// One-to-one chat.
    Private,
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("group"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// The conversation a target points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Conversation {
    /// A group chat.
    Group {
        /// Group identity.
        group_id: String,
    },
    /// A private chat.
    Private {
        /// User identity.
        user_id: String,
    },
}

impl Conversation {
    /// Returns the conversation kind.
    pub fn kind(&self) -> ConversationKind {
        match self {
            Self::Group { .. } => ConversationKind::Group,
            Self::Private { .. } => ConversationKind::Private,
        }
    }

    /// Returns the group or user identity.
    pub fn id(&self) -> &str {
        match self {
            Self::Group { group_id } => group_id,
            Self::Private { user_id } => user_id,
        }
    }
}

/// A resolved send destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Group or private conversation.
    pub conversation: Conversation,
    /// Adapter that owns the conversation.
    pub adapter: SupportAdapter,
    /// Id of the bot acting on the conversation, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_id: Option<String>,
    /// Platform scope.
    pub scope: SupportScope,
}

impl Target {
    /// Creates a group target.
    pub fn group(group_id: impl Into<String>, adapter: SupportAdapter) -> Self {
        Self {
            conversation: Conversation::Group {
                group_id: group_id.into(),
            },
            adapter,
            self_id: None,
            scope: adapter.default_scope(),
        }
    }

    /// Creates a private target.
    pub fn private(user_id: impl Into<String>, adapter: SupportAdapter) -> Self {
        Self {
            conversation: Conversation::Private {
                user_id: user_id.into(),
            },
            adapter,
            self_id: None,
            scope: adapter.default_scope(),
        }
    }

    /// Resolves a target from optional group and user identities.
    ///
    /// The group identity wins when both are present.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::UnresolvableTarget`] when neither is present.
    pub fn resolve(
        group_id: Option<String>,
        user_id: Option<String>,
        adapter: SupportAdapter,
    ) -> ExportResult<Self> {
        match (group_id, user_id) {
            (Some(group_id), _) => Ok(Self::group(group_id, adapter)),
            (None, Some(user_id)) => Ok(Self::private(user_id, adapter)),
            (None, None) => Err(ExportError::UnresolvableTarget),
        }
    }

    /// Sets the acting bot id.
    pub fn with_self_id(mut self, self_id: Option<impl Into<String>>) -> Self {
        self.self_id = self_id.map(Into::into);
        self
    }

    /// Overrides the scope.
    pub fn with_scope(mut self, scope: SupportScope) -> Self {
        self.scope = scope;
        self
    }

    /// Returns the group or user identity.
    pub fn id(&self) -> &str {
        self.conversation.id()
    }

    /// Returns true for private conversations.
    pub fn is_private(&self) -> bool {
        matches!(self.conversation, Conversation::Private { .. })
    }

    /// Returns the conversation kind.
    pub fn kind(&self) -> ConversationKind {
        self.conversation.kind()
    }
}
