//! Inbound mapping: OPQ elements to universal segments.
//!
//! | OPQ type | Segment | Keys read (priority order) |
//! |----------|---------|----------------------------|
//! | `text`   | `Text`  | `text`, `Content` |
//! | `at`     | `At`    | `qq`, `uin` |
//! | `atall`  | `AtAll` | |
//! | `image`  | `Image` | `url`/`Url`, `FileMd5`/`FileId`, `Width`, `Height` |
//! | `file`   | `File`  | `FileId`, `FileName`, `Url` |
//! | `video`  | `Video` | `Url`, `FileId`, `Duration` |
//! | `voice`  | `Voice` | `Url`, `FileId`, `Duration` |
//! | `reply`  | `Reply` | `MsgSeq`, `Content`, `MsgTime`, `MsgUid` |
//!
//! Any other type is dropped. Missing fields degrade to their defaults; a
//! reply without `MsgSeq` keeps an empty id.

use async_trait::async_trait;
use tracing::trace;

use uniseg_core::{
    At, AtAll, BuildRule, FieldDefault, FieldSpec, Fields, File, Image, Media, MessageBuilder,
    Reply, RuleError, RuleSet, Segment, SupportAdapter,
};

use crate::bot::OpqBot;
use crate::config::OpqConfig;
use crate::model::event::MessageEvent;
use crate::model::segment::OpqSegment;

// =============================================================================
// Field Specs
// =============================================================================

const TEXT: FieldSpec = FieldSpec::new("text", &["text", "Content"]).or(FieldDefault::Text(""));

const AT_TARGET: FieldSpec = FieldSpec::new("target", &["qq", "uin"]);

const IMAGE_URL: FieldSpec = FieldSpec::new("url", &["url", "Url"]);
const IMAGE_ID: FieldSpec = FieldSpec::new("id", &["FileMd5", "FileId"]);
const IMAGE_WIDTH: FieldSpec = FieldSpec::new("width", &["Width"]);
const IMAGE_HEIGHT: FieldSpec = FieldSpec::new("height", &["Height"]);

const FILE_ID: FieldSpec = FieldSpec::new("id", &["FileId"]);
const FILE_NAME: FieldSpec = FieldSpec::new("name", &["FileName"]);
const RESOURCE_URL: FieldSpec = FieldSpec::new("url", &["Url"]);

const DURATION: FieldSpec = FieldSpec::new("duration", &["Duration"]).or(FieldDefault::Integer(0));

const REPLY_SEQ: FieldSpec = FieldSpec::new("seq", &["MsgSeq"]);
const REPLY_CONTENT: FieldSpec = FieldSpec::new("message", &["Content"]).or(FieldDefault::Text(""));
const REPLY_TIME: FieldSpec = FieldSpec::new("time", &["MsgTime"]);
const REPLY_UID: FieldSpec = FieldSpec::new("uid", &["MsgUid"]);

// =============================================================================
// Build Functions
// =============================================================================

fn text(fields: &Fields<'_>) -> Option<Segment> {
    fields.text(&TEXT).map(Segment::text)
}

fn at(fields: &Fields<'_>) -> Option<Segment> {
    let target = fields.text(&AT_TARGET)?;
    Some(Segment::At(At { target }))
}

fn at_all(_: &Fields<'_>) -> Option<Segment> {
    Some(Segment::AtAll(AtAll {}))
}

fn image(fields: &Fields<'_>) -> Option<Segment> {
    Some(Segment::Image(Image {
        id: fields.text(&IMAGE_ID),
        url: fields.text(&IMAGE_URL),
        width: fields.integer_u32(&IMAGE_WIDTH),
        height: fields.integer_u32(&IMAGE_HEIGHT),
        ..Default::default()
    }))
}

fn file(fields: &Fields<'_>) -> Option<Segment> {
    Some(Segment::File(File {
        id: fields.text(&FILE_ID),
        name: fields.text(&FILE_NAME).filter(|name| !name.is_empty()),
        url: fields.text(&RESOURCE_URL),
        ..Default::default()
    }))
}

fn media(fields: &Fields<'_>) -> Media {
    Media {
        id: fields.text(&FILE_ID),
        url: fields.text(&RESOURCE_URL),
        duration: fields.integer(&DURATION).unwrap_or_default(),
        ..Default::default()
    }
}

fn video(fields: &Fields<'_>) -> Option<Segment> {
    Some(Segment::Video(media(fields)))
}

fn voice(fields: &Fields<'_>) -> Option<Segment> {
    Some(Segment::Voice(media(fields)))
}

fn reply(fields: &Fields<'_>) -> Option<Segment> {
    let mut reply = Reply::new(fields.text(&REPLY_SEQ).unwrap_or_default());
    reply.message = fields.text(&REPLY_CONTENT);
    for (key, spec) in [("seq", &REPLY_SEQ), ("time", &REPLY_TIME), ("uid", &REPLY_UID)] {
        if let Some(value) = fields.raw(spec) {
            reply.meta.insert(key.to_string(), value.clone());
        }
    }
    Some(Segment::Reply(reply))
}

/// The OPQ inbound rule table.
pub const RULES: &[BuildRule] = &[
    BuildRule::new("text", &[TEXT], text),
    BuildRule::new("at", &[AT_TARGET], at),
    BuildRule::new("atall", &[], at_all),
    BuildRule::new("image", &[IMAGE_URL, IMAGE_ID, IMAGE_WIDTH, IMAGE_HEIGHT], image),
    BuildRule::new("file", &[FILE_ID, FILE_NAME, RESOURCE_URL], file),
    BuildRule::new("video", &[RESOURCE_URL, FILE_ID, DURATION], video),
    BuildRule::new("voice", &[RESOURCE_URL, FILE_ID, DURATION], voice),
    BuildRule::new(
        "reply",
        &[REPLY_SEQ, REPLY_CONTENT, REPLY_TIME, REPLY_UID],
        reply,
    ),
];

// =============================================================================
// OpqMessageBuilder
// =============================================================================

/// Maps OPQ elements to universal segments.
#[derive(Debug, Clone)]
pub struct OpqMessageBuilder {
    rules: RuleSet,
    file_name_placeholder: String,
}

impl OpqMessageBuilder {
    /// Creates a builder with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the rule table is invalid.
    pub fn new() -> Result<Self, RuleError> {
        Self::with_config(&OpqConfig::default())
    }

    /// Creates a builder from the adapter configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] if the rule table is invalid.
    pub fn with_config(config: &OpqConfig) -> Result<Self, RuleError> {
        Ok(Self {
            rules: RuleSet::new(RULES)?,
            file_name_placeholder: config.file_name_placeholder.clone(),
        })
    }
}

#[async_trait]
impl MessageBuilder for OpqMessageBuilder {
    type Element = OpqSegment;
    type Event = MessageEvent;
    type Bot = OpqBot;

    fn adapter(&self) -> SupportAdapter {
        SupportAdapter::Opq
    }

    fn build(&self, element: &OpqSegment) -> Option<Segment> {
        match self.rules.apply(element)? {
            Segment::File(mut file) => {
                if file.name.is_none() {
                    file.name = Some(self.file_name_placeholder.clone());
                }
                Some(Segment::File(file))
            }
            segment => Some(segment),
        }
    }

    async fn extract_reply(&self, event: &MessageEvent, _bot: &OpqBot) -> Option<Reply> {
        let element = event.message.include("reply").next()?;
        match self.build(element) {
            Some(Segment::Reply(reply)) => {
                if reply.id.is_empty() {
                    trace!(data = ?element.data, "Reply element without MsgSeq");
                }
                Some(reply)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use super::*;
    use crate::api_caller::DisabledApiCaller;
    use crate::model::message::OpqMessage;

    fn element(kind: &str, data: Value) -> OpqSegment {
        match data {
            Value::Object(map) => OpqSegment::new(kind, map),
            _ => OpqSegment::new(kind, Default::default()),
        }
    }

    fn builder() -> OpqMessageBuilder {
        OpqMessageBuilder::new().unwrap()
    }

    #[test]
    fn test_rule_table_is_valid() {
        let rules = RuleSet::new(RULES).unwrap();
        assert_eq!(rules.len(), RULES.len());
        assert!(rules.handles("atall"));
        assert!(rules.handles("text"));
        assert!(!rules.handles("face"));
    }

    #[test]
    fn test_at_reads_qq_then_uin() {
        let b = builder();
        assert_eq!(
            b.build(&element("at", json!({"qq": 123}))),
            Some(Segment::at("123"))
        );
        assert_eq!(
            b.build(&element("at", json!({"uin": 456}))),
            Some(Segment::at("456"))
        );
        assert_eq!(
            b.build(&element("at", json!({"qq": 1, "uin": 2}))),
            Some(Segment::at("1"))
        );
        assert_eq!(b.build(&element("at", json!({}))), None);
    }

    #[test]
    fn test_image_id_preference() {
        let b = builder();
        let seg = b
            .build(&element(
                "image",
                json!({"Url": "http://x/a.png", "FileId": 7, "FileMd5": "abc", "Width": 64}),
            ))
            .unwrap();
        let Segment::Image(image) = seg else {
            panic!("Expected Image");
        };
        assert_eq!(image.id.as_deref(), Some("abc"));
        assert_eq!(image.url.as_deref(), Some("http://x/a.png"));
        assert_eq!(image.width, Some(64));
        assert_eq!(image.height, None);
    }

    #[test]
    fn test_image_without_id() {
        let seg = builder()
            .build(&element("image", json!({"url": "http://x/b.png"})))
            .unwrap();
        let Segment::Image(image) = seg else {
            panic!("Expected Image");
        };
        assert_eq!(image.id, None);
    }

    #[test]
    fn test_file_name_placeholder() {
        let seg = builder()
            .build(&element("file", json!({"FileId": "f1"})))
            .unwrap();
        let Segment::File(file) = seg else {
            panic!("Expected File");
        };
        assert_eq!(file.name.as_deref(), Some("file.bin"));
        assert_eq!(file.id.as_deref(), Some("f1"));

        let config = OpqConfig {
            file_name_placeholder: "upload.dat".into(),
            ..Default::default()
        };
        let seg = OpqMessageBuilder::with_config(&config)
            .unwrap()
            .build(&element("file", json!({"FileName": ""})))
            .unwrap();
        assert!(matches!(seg, Segment::File(File { name: Some(ref n), .. }) if n == "upload.dat"));
    }

    #[test]
    fn test_media_duration_default() {
        let b = builder();
        let seg = b
            .build(&element("voice", json!({"Url": "http://x/v.amr"})))
            .unwrap();
        assert!(matches!(seg, Segment::Voice(Media { duration: 0, .. })));

        let seg = b
            .build(&element("video", json!({"FileId": "v1", "Duration": 12})))
            .unwrap();
        assert!(matches!(seg, Segment::Video(Media { duration: 12, .. })));
    }

    #[test]
    fn test_reply_fields() {
        let seg = builder()
            .build(&element(
                "reply",
                json!({"MsgSeq": 99, "MsgTime": 1700000000, "MsgUid": 12345}),
            ))
            .unwrap();
        let Segment::Reply(reply) = seg else {
            panic!("Expected Reply");
        };
        assert_eq!(reply.id, "99");
        assert_eq!(reply.message.as_deref(), Some(""));
        assert_eq!(reply.meta["seq"], 99);
        assert_eq!(reply.meta["time"], 1700000000);
        assert_eq!(reply.meta["uid"], 12345);
    }

    #[test]
    fn test_text_maps_to_text() {
        let b = builder();
        assert_eq!(b.build(&OpqSegment::text("hi")), Some(Segment::text("hi")));
        assert_eq!(
            b.build(&element("text", json!({"Content": "legacy"}))),
            Some(Segment::text("legacy"))
        );
        assert_eq!(b.build(&element("text", json!({}))), Some(Segment::text("")));
    }

    #[test]
    fn test_unknown_dropped() {
        assert_eq!(builder().build(&element("face", json!({"id": 1}))), None);
    }

    #[test]
    fn test_reply_without_seq_keeps_content() {
        let seg = builder()
            .build(&element("reply", json!({"Content": "quoted text", "MsgUid": 8})))
            .unwrap();
        let Segment::Reply(reply) = seg else {
            panic!("Expected Reply");
        };
        assert_eq!(reply.id, "");
        assert_eq!(reply.message.as_deref(), Some("quoted text"));
        assert_eq!(reply.meta["uid"], 8);
        assert!(!reply.meta.contains_key("seq"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let b = builder();
        let el = element("image", json!({"url": "http://x/c.png", "Height": 10}));
        assert_eq!(b.build(&el), b.build(&el));
    }

    #[test]
    fn test_build_message_preserves_order() {
        let msg: OpqMessage = vec![
            OpqSegment::text("hello "),
            element("at", json!({"uin": 1})),
            element("face", json!({})),
            element("atall", json!({})),
        ]
        .into();
        let uni = builder().build_message(&msg);
        assert_eq!(
            uni.as_slice(),
            &[Segment::text("hello "), Segment::at("1"), Segment::at_all()]
        );
        assert_eq!(uni.extract_plain_text(), "hello ");
    }

    #[tokio::test]
    async fn test_extract_reply() {
        let b = builder();
        let bot = OpqBot::new("10000", Arc::new(DisabledApiCaller::new()));

        let event = MessageEvent {
            self_id: 10000,
            group_id: Some(1001),
            message: vec![
                OpqSegment::text("re"),
                element("reply", json!({"MsgSeq": 5, "Content": "quoted"})),
            ]
            .into(),
            ..Default::default()
        };
        let reply = b.extract_reply(&event, &bot).await.unwrap();
        assert_eq!(reply.id, "5");
        assert_eq!(reply.message.as_deref(), Some("quoted"));

        let plain = MessageEvent {
            message: OpqMessage::from("no reply"),
            ..Default::default()
        };
        assert!(b.extract_reply(&plain, &bot).await.is_none());
    }
}
