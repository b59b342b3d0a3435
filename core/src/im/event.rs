//! Inbound Feishu event model. Parsed from the `im.message.receive_v1` callback body.

use serde::Deserialize;

/// Chat the message was posted in. Feishu sends `topic_group` for topic chats on newer tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatType {
    P2p,
    Group,
    Topic,
}

impl ChatType {
    pub fn from_feishu(s: &str) -> Option<Self> {
        match s {
            "p2p" => Some(ChatType::P2p),
            "group" => Some(ChatType::Group),
            "topic" | "topic_group" => Some(ChatType::Topic),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::P2p => "p2p",
            ChatType::Group => "group",
            ChatType::Topic => "topic",
        }
    }
}

/// A user or bot referenced in the message. `display_text` is the placeholder
/// (e.g. `@_user_1`) that stands in for the mention inside the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub id: String,
    pub display_text: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    pub event_type: Option<String>,
    pub chat_type: ChatType,
    pub chat_id: String,
    pub message_id: String,
    pub mentions: Vec<Mention>,
    pub raw_text: String,
}

/// Why an event body did not yield an [`IncomingEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSkip {
    NoMessage,
    MissingMessageId,
    UnsupportedChatType(String),
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    chat_id: Option<String>,
    #[serde(default)]
    chat_type: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    mentions: Vec<RawMention>,
}

#[derive(Deserialize)]
struct RawMention {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<RawMentionId>,
}

#[derive(Deserialize)]
struct RawMentionId {
    #[serde(default)]
    open_id: Option<String>,
}

/// Extract the message event from a webhook root object.
/// Non-text messages parse with an empty `raw_text`; the classifier ignores them.
pub fn parse_event(root: &serde_json::Value) -> Result<IncomingEvent, EventSkip> {
    let event_type = root
        .get("header")
        .and_then(|h| h.get("event_type"))
        .and_then(|t| t.as_str())
        .map(String::from);

    let message = root
        .get("event")
        .and_then(|e| e.get("message"))
        .filter(|m| m.is_object())
        .ok_or(EventSkip::NoMessage)?;
    let message: RawMessage =
        serde_json::from_value(message.clone()).map_err(|_| EventSkip::NoMessage)?;

    let message_id = message
        .message_id
        .filter(|id| !id.is_empty())
        .ok_or(EventSkip::MissingMessageId)?;

    let chat_type_raw = message.chat_type.unwrap_or_default();
    let chat_type = ChatType::from_feishu(&chat_type_raw)
        .ok_or(EventSkip::UnsupportedChatType(chat_type_raw))?;

    let raw_text = message
        .content
        .as_deref()
        .and_then(|c| serde_json::from_str::<serde_json::Value>(c).ok())
        .and_then(|c| c.get("text").and_then(|t| t.as_str()).map(|t| t.trim().to_string()))
        .unwrap_or_default();

    let mentions = message
        .mentions
        .into_iter()
        .map(|m| Mention {
            id: m.id.and_then(|id| id.open_id).unwrap_or_default(),
            display_text: m.key.unwrap_or_default(),
            name: m.name.unwrap_or_default(),
        })
        .collect();

    Ok(IncomingEvent {
        event_type,
        chat_type,
        chat_id: message.chat_id.unwrap_or_default(),
        message_id,
        mentions,
        raw_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group_body() -> serde_json::Value {
        json!({
            "schema": "2.0",
            "header": { "event_type": "im.message.receive_v1" },
            "event": {
                "message": {
                    "message_id": "om_1",
                    "chat_id": "oc_1",
                    "chat_type": "group",
                    "message_type": "text",
                    "content": "{\"text\":\" @_user_1 what's new? \"}",
                    "mentions": [
                        { "key": "@_user_1", "name": "SteamLens", "id": { "open_id": "ou_bot" } }
                    ]
                }
            }
        })
    }

    #[test]
    fn parses_text_message_with_mentions() {
        let event = parse_event(&group_body()).unwrap();
        assert_eq!(event.event_type.as_deref(), Some("im.message.receive_v1"));
        assert_eq!(event.chat_type, ChatType::Group);
        assert_eq!(event.message_id, "om_1");
        assert_eq!(event.raw_text, "@_user_1 what's new?");
        assert_eq!(
            event.mentions,
            vec![Mention {
                id: "ou_bot".into(),
                display_text: "@_user_1".into(),
                name: "SteamLens".into(),
            }]
        );
    }

    #[test]
    fn topic_group_maps_to_topic() {
        let mut body = group_body();
        body["event"]["message"]["chat_type"] = json!("topic_group");
        assert_eq!(parse_event(&body).unwrap().chat_type, ChatType::Topic);
    }

    #[test]
    fn non_text_content_parses_to_empty_text() {
        let mut body = group_body();
        body["event"]["message"]["content"] = json!("{\"image_key\":\"img_1\"}");
        assert_eq!(parse_event(&body).unwrap().raw_text, "");
    }

    #[test]
    fn skips_bodies_without_message() {
        assert_eq!(parse_event(&json!({ "event": {} })), Err(EventSkip::NoMessage));
        assert_eq!(parse_event(&json!({})), Err(EventSkip::NoMessage));
    }

    #[test]
    fn skips_unknown_chat_type_and_missing_id() {
        let mut body = group_body();
        body["event"]["message"]["chat_type"] = json!("channel");
        assert_eq!(
            parse_event(&body),
            Err(EventSkip::UnsupportedChatType("channel".into()))
        );

        let mut body = group_body();
        body["event"]["message"]["message_id"] = json!("");
        assert_eq!(parse_event(&body), Err(EventSkip::MissingMessageId));
    }
}
