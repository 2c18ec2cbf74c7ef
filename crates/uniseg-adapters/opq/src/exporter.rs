//! Outbound mapping and dispatch: universal segments to OPQ API calls.
//!
//! Inline segments become [`OpqSegment`]s. File and reply segments have no
//! inline OPQ form and become side effects instead:
//!
//! - [`FileUpload`]: the message is sent as a group file upload.
//! - [`ReplyCorrelation`]: injected as the `ReplyTo` send option.
//!
//! Dispatch picks exactly one platform call per send, except for file uploads
//! to private chats which OPQ does not support; those are skipped and reported
//! through [`SendOutcome::Skipped`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use uniseg_core::rules::value_to_i64;
use uniseg_core::{
    ApiError, Capability, Conversation, ConversationKind, Destination, ExportError,
    ExportResult, Exported, MessageExporter, Outbound, Reply, Segment, SendOptions, SendOutcome,
    SideEffects, SupportAdapter, Target,
};

use crate::bot::OpqBot;
use crate::model::event::MessageEvent;
use crate::model::message::OpqMessage;
use crate::model::segment::OpqSegment;

// =============================================================================
// Side Effects
// =============================================================================

/// A file that must be uploaded instead of sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Display name of the uploaded file.
    pub name: String,
    /// Absolute local path.
    pub path: PathBuf,
}

/// Correlation data of the message being replied to.
///
/// Serialized as the `ReplyTo` send option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplyCorrelation {
    /// Sequence number of the original message.
    pub msg_seq: Option<i64>,
    /// Timestamp of the original message.
    pub msg_time: Option<i64>,
    /// Sender uid of the original message.
    pub msg_uid: Option<i64>,
}

/// A single OPQ side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpqEffect {
    /// Upload a file.
    FileUpload(FileUpload),
    /// Reply to a message.
    Reply(ReplyCorrelation),
}

/// Side effects collected from one outbound message.
///
/// Only the first effect of each category is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpqEffects {
    /// Pending file upload.
    pub file_upload: Option<FileUpload>,
    /// Pending reply correlation.
    pub reply: Option<ReplyCorrelation>,
}

impl SideEffects for OpqEffects {
    type Effect = OpqEffect;

    fn absorb(&mut self, effect: OpqEffect) {
        match effect {
            OpqEffect::FileUpload(upload) => {
                self.file_upload.get_or_insert(upload);
            }
            OpqEffect::Reply(reply) => {
                self.reply.get_or_insert(reply);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.file_upload.is_none() && self.reply.is_none()
    }
}

/// An exported OPQ message.
pub type OpqOutbound = Outbound<OpqSegment, OpqEffects>;

// =============================================================================
// OpqMessageExporter
// =============================================================================

/// Converts universal segments into OPQ elements and sends them.
#[derive(Debug, Clone, Default)]
pub struct OpqMessageExporter;

impl OpqMessageExporter {
    /// Creates a new exporter.
    pub fn new() -> Self {
        Self
    }
}

fn absolute(path: &Path, segment: &Segment) -> ExportResult<PathBuf> {
    std::path::absolute(path).map_err(|_| ExportError::serialize_failed(segment))
}

fn reply_correlation(reply: &Reply) -> ReplyCorrelation {
    let meta = |key: &str| reply.meta.get(key).and_then(value_to_i64);
    ReplyCorrelation {
        msg_seq: meta("seq").or_else(|| reply.id.trim().parse().ok()),
        msg_time: meta("time"),
        msg_uid: meta("uid"),
    }
}

/// Parses a target identity into the integer form OPQ expects.
fn numeric_id(target: &Target) -> ExportResult<i64> {
    let field = match target.conversation {
        Conversation::Group { .. } => "group_id",
        Conversation::Private { .. } => "user_id",
    };
    target
        .id()
        .parse()
        .map_err(|_| ExportError::invalid_identity(field, target.id()))
}

#[async_trait]
impl MessageExporter for OpqMessageExporter {
    type Element = OpqSegment;
    type Effects = OpqEffects;
    type Event = MessageEvent;
    type Bot = OpqBot;
    type Receipt = Value;

    fn adapter(&self) -> SupportAdapter {
        SupportAdapter::Opq
    }

    async fn export(
        &self,
        segment: &Segment,
        _bot: Option<&OpqBot>,
    ) -> ExportResult<Exported<OpqSegment, OpqEffect>> {
        let element = match segment {
            Segment::Text(text) => OpqSegment::text(text.text.as_str()),
            Segment::At(at) => {
                let uin = at
                    .target
                    .parse()
                    .map_err(|_| ExportError::serialize_failed(segment))?;
                OpqSegment::at(uin)
            }
            Segment::AtAll(_) => OpqSegment::at_all(),
            Segment::Image(image) => {
                if let Some(raw) = &image.raw {
                    OpqSegment::image_base64(STANDARD.encode(raw))
                } else if let Some(path) = &image.path {
                    OpqSegment::image_path(&absolute(path, segment)?)
                } else if let Some(url) = &image.url {
                    OpqSegment::image_url(url.as_str())
                } else {
                    return Err(ExportError::serialize_failed(segment));
                }
            }
            Segment::File(file) => {
                let Some(path) = &file.path else {
                    return Err(ExportError::serialize_failed(segment));
                };
                let name = match &file.name {
                    Some(name) => name.clone(),
                    None => path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .ok_or_else(|| ExportError::serialize_failed(segment))?,
                };
                return Ok(Exported::Effect(OpqEffect::FileUpload(FileUpload {
                    name,
                    path: absolute(path, segment)?,
                })));
            }
            Segment::Reply(reply) => {
                return Ok(Exported::Effect(OpqEffect::Reply(reply_correlation(reply))));
            }
            Segment::Video(_)
            | Segment::Voice(_)
            | Segment::Emoji(_)
            | Segment::Hyper(_)
            | Segment::Reference(_) => return Err(ExportError::serialize_failed(segment)),
        };
        Ok(Exported::Element(element))
    }

    async fn send_to(
        &self,
        destination: Destination<'_, MessageEvent>,
        bot: &OpqBot,
        message: OpqOutbound,
        mut options: SendOptions,
    ) -> ExportResult<SendOutcome<Value>> {
        let target = match &destination {
            Destination::Target(target) => target.clone(),
            Destination::Event(event) => self.get_target(event, Some(bot))?,
        };
        let id = numeric_id(&target)?;
        let Outbound { elements, effects } = message;

        if let Some(upload) = effects.file_upload {
            if target.is_private() {
                warn!(
                    user_id = id,
                    file = %upload.name,
                    "File upload is not supported in private chats, skipping"
                );
                return Ok(SendOutcome::Skipped {
                    capability: Capability::FileUpload,
                    conversation: ConversationKind::Private,
                });
            }
            debug!(group_id = id, file = %upload.name, "Uploading group file");
            let receipt = bot
                .upload_group_file(id, &upload.name, &upload.path, options)
                .await?;
            return Ok(SendOutcome::Sent(receipt));
        }

        if let Some(reply) = effects.reply {
            if target.is_private() {
                debug!(user_id = id, "Reply is not supported in private chats, dropping");
            } else {
                let reply = serde_json::to_value(&reply).map_err(ApiError::from)?;
                options.entry("ReplyTo").or_insert(reply);
            }
        }

        let message = OpqMessage::from(elements);
        debug!(
            conversation = %target.kind(),
            id,
            elements = message.len(),
            "Dispatching OPQ message"
        );

        let receipt = match (destination, &target.conversation) {
            (Destination::Event(event), _) => bot.send(event, &message, options).await?,
            (Destination::Target(_), Conversation::Group { .. }) => {
                bot.send_group_msg(id, &message, options).await?
            }
            (Destination::Target(_), Conversation::Private { .. }) => {
                bot.send_private_msg(id, &message, options).await?
            }
        };
        Ok(SendOutcome::Sent(receipt))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tracing_subscriber::prelude::*;

    use uniseg_core::{Image, MessageBuilder, UniMessage};

    use super::*;
    use crate::api_caller::ApiCaller;
    use crate::builder::OpqMessageBuilder;
    use crate::testing::{RecordingCaller, WarnCounter};

    fn setup() -> (OpqMessageExporter, Arc<RecordingCaller>, OpqBot) {
        let caller = Arc::new(RecordingCaller::new());
        let bot = OpqBot::new("10000", Arc::clone(&caller) as Arc<dyn ApiCaller>);
        (OpqMessageExporter::new(), caller, bot)
    }

    fn group_event() -> MessageEvent {
        MessageEvent {
            self_id: 10000,
            group_id: Some(1001),
            user_id: Some(42),
            message_id: Some(7),
            ..Default::default()
        }
    }

    async fn export_one(segment: Segment) -> ExportResult<Exported<OpqSegment, OpqEffect>> {
        OpqMessageExporter::new().export(&segment, None).await
    }

    #[tokio::test]
    async fn test_export_inline_elements() {
        assert_eq!(
            export_one(Segment::text("hi")).await.unwrap(),
            Exported::Element(OpqSegment::text("hi"))
        );
        assert_eq!(
            export_one(Segment::at("42")).await.unwrap(),
            Exported::Element(OpqSegment::at(42))
        );
        assert_eq!(
            export_one(Segment::at_all()).await.unwrap(),
            Exported::Element(OpqSegment::at_all())
        );
        assert!(matches!(
            export_one(Segment::at("alice")).await,
            Err(ExportError::SerializeFailed { kind: "at", .. })
        ));
    }

    #[tokio::test]
    async fn test_at_round_trip() {
        let builder = OpqMessageBuilder::new().unwrap();
        for target in ["1", "42", "2147483648"] {
            let Exported::Element(element) = export_one(Segment::at(target)).await.unwrap() else {
                panic!("Expected element");
            };
            assert_eq!(builder.build(&element), Some(Segment::at(target)));
        }
    }

    #[tokio::test]
    async fn test_export_image_sources() {
        let raw = export_one(Segment::image_raw(b"abc".to_vec())).await.unwrap();
        assert_eq!(raw, Exported::Element(OpqSegment::image_base64("YWJj")));

        let url = export_one(Segment::image_url("http://x/a.png")).await.unwrap();
        assert_eq!(url, Exported::Element(OpqSegment::image_url("http://x/a.png")));

        let Exported::Element(path) = export_one(Segment::image_path("img/a.png")).await.unwrap()
        else {
            panic!("Expected element");
        };
        let exported = path.data["path"].as_str().unwrap();
        assert!(Path::new(exported).is_absolute());
        assert!(exported.ends_with("a.png"));

        // raw wins over url
        let both = Segment::Image(Image {
            raw: Some(b"abc".to_vec()),
            url: Some("http://x/a.png".into()),
            ..Default::default()
        });
        assert_eq!(
            export_one(both).await.unwrap(),
            Exported::Element(OpqSegment::image_base64("YWJj"))
        );

        let empty = Segment::Image(Image {
            id: Some("md5".into()),
            ..Default::default()
        });
        assert!(matches!(
            export_one(empty).await,
            Err(ExportError::SerializeFailed { kind: "image", .. })
        ));
    }

    #[tokio::test]
    async fn test_export_file_effect() {
        let exported = export_one(Segment::file_path("docs/report.pdf", None))
            .await
            .unwrap();
        let Exported::Effect(OpqEffect::FileUpload(upload)) = exported else {
            panic!("Expected FileUpload");
        };
        assert_eq!(upload.name, "report.pdf");
        assert!(upload.path.is_absolute());

        let named = export_one(Segment::file_path("/tmp/a.bin", Some("b.bin".into())))
            .await
            .unwrap();
        assert!(matches!(
            named,
            Exported::Effect(OpqEffect::FileUpload(FileUpload { ref name, .. })) if name == "b.bin"
        ));

        let remote = Segment::File(uniseg_core::File {
            url: Some("http://x/f".into()),
            ..Default::default()
        });
        assert!(matches!(
            export_one(remote).await,
            Err(ExportError::SerializeFailed { kind: "file", .. })
        ));
    }

    #[tokio::test]
    async fn test_export_reply_effect() {
        let reply = Reply::new("99")
            .with_meta("time", 1700000000)
            .with_meta("uid", "555");
        let exported = export_one(Segment::Reply(reply)).await.unwrap();
        assert_eq!(
            exported,
            Exported::Effect(OpqEffect::Reply(ReplyCorrelation {
                msg_seq: Some(99),
                msg_time: Some(1700000000),
                msg_uid: Some(555),
            }))
        );

        let seq_in_meta = Reply::new("ignored").with_meta("seq", 3);
        let Exported::Effect(OpqEffect::Reply(correlation)) =
            export_one(Segment::Reply(seq_in_meta)).await.unwrap()
        else {
            panic!("Expected Reply");
        };
        assert_eq!(correlation.msg_seq, Some(3));
        assert_eq!(correlation.msg_time, None);
    }

    #[tokio::test]
    async fn test_export_unsupported_kinds() {
        let video = Segment::Video(Default::default());
        assert!(matches!(
            export_one(video).await,
            Err(ExportError::SerializeFailed { kind: "video", .. })
        ));
        let reference = Segment::Reference(Default::default());
        assert!(matches!(
            export_one(reference).await,
            Err(ExportError::SerializeFailed { kind: "reference", .. })
        ));
    }

    #[tokio::test]
    async fn test_export_message_stops_at_failure() {
        let exporter = OpqMessageExporter::new();
        let msg = UniMessage::new().text("a").at("bob").text("b");
        assert!(exporter.export_message(&msg, None).await.is_err());

        let msg = UniMessage::new()
            .reply("1")
            .text("a")
            .reply("2")
            .at_all();
        let outbound = exporter.export_message(&msg, None).await.unwrap();
        assert_eq!(outbound.elements.len(), 2);
        assert_eq!(outbound.effects.reply.unwrap().msg_seq, Some(1));
    }

    #[test]
    fn test_get_target() {
        let (exporter, _, bot) = setup();

        let target = exporter.get_target(&group_event(), Some(&bot)).unwrap();
        assert_eq!(target, Target::group("1001", SupportAdapter::Opq).with_self_id(Some("10000")));
        assert!(!target.is_private());

        let private = MessageEvent {
            user_id: Some(42),
            ..Default::default()
        };
        let target = exporter.get_target(&private, None).unwrap();
        assert!(target.is_private());
        assert_eq!(target.id(), "42");
        assert_eq!(target.self_id, None);

        assert!(matches!(
            exporter.get_target(&MessageEvent::default(), None),
            Err(ExportError::UnresolvableTarget)
        ));
    }

    #[test]
    fn test_get_message_id() {
        let exporter = OpqMessageExporter::new();
        assert_eq!(exporter.get_message_id(&group_event()).unwrap(), "7");
        assert!(matches!(
            exporter.get_message_id(&MessageEvent::default()),
            Err(ExportError::UnresolvableMessageId)
        ));
    }

    #[tokio::test]
    async fn test_send_group_message() {
        let (exporter, caller, bot) = setup();
        let target = exporter.get_target(&group_event(), Some(&bot)).unwrap();
        let msg = UniMessage::new().text("hi").at("42");
        let outbound = exporter.export_message(&msg, Some(&bot)).await.unwrap();

        let outcome = exporter
            .send_to(target.into(), &bot, outbound, SendOptions::new())
            .await
            .unwrap();
        assert!(outcome.is_sent());

        let calls = caller.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "send_group_msg");
        assert_eq!(calls[0].1["group_id"], 1001);
        assert_eq!(calls[0].1["message"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_private_file_upload_skipped() {
        let warnings = WarnCounter::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(warnings.clone()));

        let (exporter, caller, bot) = setup();
        let msg = UniMessage::from(Segment::file_path("/tmp/a.bin", None)).text("caption");
        let outbound = exporter.export_message(&msg, None).await.unwrap();

        let outcome = exporter
            .send_to(
                Target::private("42", SupportAdapter::Opq).into(),
                &bot,
                outbound,
                SendOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(
            outcome,
            SendOutcome::Skipped {
                capability: Capability::FileUpload,
                conversation: ConversationKind::Private,
            }
        );
        assert!(caller.calls().is_empty());
        assert_eq!(warnings.count(), 1);
    }

    #[tokio::test]
    async fn test_group_file_upload() {
        let (exporter, caller, bot) = setup();
        let msg = UniMessage::from(Segment::file_path("/tmp/a.bin", Some("a.bin".into())));
        let outbound = exporter.export_message(&msg, None).await.unwrap();

        let outcome = exporter
            .send_to(
                Destination::Event(&group_event()),
                &bot,
                outbound,
                SendOptions::new(),
            )
            .await
            .unwrap();
        assert!(outcome.is_sent());

        let calls = caller.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "upload_group_file");
        assert_eq!(calls[0].1["group_id"], 1001);
        assert_eq!(calls[0].1["filename"], "a.bin");
    }

    #[tokio::test]
    async fn test_group_reply_injects_reply_to() {
        let (exporter, caller, bot) = setup();
        let msg = UniMessage::new().reply("5").text("ok");
        let outbound = exporter.export_message(&msg, None).await.unwrap();

        exporter
            .send_to(
                Target::group("1001", SupportAdapter::Opq).into(),
                &bot,
                outbound,
                SendOptions::new(),
            )
            .await
            .unwrap();

        let calls = caller.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "send_group_msg");
        assert_eq!(
            calls[0].1["ReplyTo"],
            json!({"MsgSeq": 5, "MsgTime": null, "MsgUid": null})
        );
        assert_eq!(calls[0].1["message"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_caller_reply_to_wins() {
        let (exporter, caller, bot) = setup();
        let outbound = exporter
            .export_message(&UniMessage::new().reply("5").text("ok"), None)
            .await
            .unwrap();

        let mut options = SendOptions::new();
        options.insert("ReplyTo".into(), json!({"MsgSeq": 1}));
        exporter
            .send_to(
                Target::group("1001", SupportAdapter::Opq).into(),
                &bot,
                outbound,
                options,
            )
            .await
            .unwrap();

        assert_eq!(caller.calls()[0].1["ReplyTo"], json!({"MsgSeq": 1}));
    }

    #[tokio::test]
    async fn test_private_reply_dropped() {
        let (exporter, caller, bot) = setup();
        let outbound = exporter
            .export_message(&UniMessage::new().reply("5").text("ok"), None)
            .await
            .unwrap();

        exporter
            .send_to(
                Target::private("42", SupportAdapter::Opq).into(),
                &bot,
                outbound,
                SendOptions::new(),
            )
            .await
            .unwrap();

        let calls = caller.calls();
        assert_eq!(calls[0].0, "send_private_msg");
        assert_eq!(calls[0].1["user_id"], 42);
        assert!(calls[0].1.get("ReplyTo").is_none());
    }

    #[tokio::test]
    async fn test_event_destination_uses_generic_send() {
        let (exporter, caller, bot) = setup();
        let event = MessageEvent {
            user_id: Some(42),
            ..Default::default()
        };
        let outbound = exporter
            .export_message(&UniMessage::new().text("pong"), Some(&bot))
            .await
            .unwrap();

        exporter
            .send_to(Destination::Event(&event), &bot, outbound, SendOptions::new())
            .await
            .unwrap();

        let calls = caller.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "send_private_msg");
        assert_eq!(calls[0].1["user_id"], 42);
    }

    #[tokio::test]
    async fn test_invalid_identity() {
        let (exporter, caller, bot) = setup();
        let err = exporter
            .send_to(
                Target::group("lobby", SupportAdapter::Opq).into(),
                &bot,
                OpqOutbound::new(),
                SendOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::InvalidIdentity { field: "group_id", ref value } if value == "lobby"
        ));
        assert!(caller.calls().is_empty());
    }

    #[tokio::test]
    async fn test_event_without_session() {
        let (exporter, caller, bot) = setup();
        let err = exporter
            .send_to(
                Destination::Event(&MessageEvent::default()),
                &bot,
                OpqOutbound::new(),
                SendOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::UnresolvableTarget));
        assert!(caller.calls().is_empty());
    }
}
