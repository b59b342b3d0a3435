//! Reply card: the single interactive message the bot posts back.

use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardTone {
    Info,
    Failure,
}

impl CardTone {
    /// Feishu header template colour.
    fn template(&self) -> &'static str {
        match self {
            CardTone::Info => "blue",
            CardTone::Failure => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCard {
    pub title: String,
    pub markdown: String,
    pub tone: CardTone,
}

impl ReplyCard {
    pub fn info(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tone: CardTone::Info,
        }
    }

    pub fn failure(title: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tone: CardTone::Failure,
        }
    }

    /// Feishu interactive card body (goes into `content` as a JSON string).
    pub fn to_feishu_card(&self) -> serde_json::Value {
        json!({
            "config": { "wide_screen_mode": true },
            "header": {
                "template": self.tone.template(),
                "title": { "tag": "plain_text", "content": self.title },
            },
            "elements": [
                { "tag": "markdown", "content": self.markdown }
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_interactive_card() {
        let card = ReplyCard::info("🎮 Portal 2 分析报告", "**Portal 2**");
        let v = card.to_feishu_card();
        assert_eq!(v["config"]["wide_screen_mode"], true);
        assert_eq!(v["header"]["template"], "blue");
        assert_eq!(v["header"]["title"]["tag"], "plain_text");
        assert_eq!(v["header"]["title"]["content"], "🎮 Portal 2 分析报告");
        assert_eq!(v["elements"][0]["tag"], "markdown");
        assert_eq!(v["elements"][0]["content"], "**Portal 2**");
    }

    #[test]
    fn failure_cards_are_red() {
        let v = ReplyCard::failure("处理失败", "oops").to_feishu_card();
        assert_eq!(v["header"]["template"], "red");
    }
}
