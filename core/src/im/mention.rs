//! Mention filter: decide whether the bot was addressed and strip the bot's mention placeholder.
//!
//! - **p2p**: always addressed.
//! - **group / topic**: addressed only when a mention's open_id equals the bot's.
//!   Without a known bot identity these are dropped (fail-closed).

use super::event::{ChatType, IncomingEvent};
use super::identity::BotIdentity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub addressed: bool,
    /// Message text with the bot's placeholder removed and other mentions rendered as `@name`. Trimmed.
    pub text: String,
}

/// True if the message should be processed by the bot.
pub fn is_addressed(event: &IncomingEvent, bot: Option<&BotIdentity>) -> bool {
    match event.chat_type {
        ChatType::P2p => true,
        ChatType::Group | ChatType::Topic => match bot {
            Some(bot) => event.mentions.iter().any(|m| bot.matches(&m.id)),
            None => false,
        },
    }
}

/// Clean the message text: other users' placeholders become `@name`, the bot's are removed.
/// With no known identity (p2p only) every placeholder is treated as the bot's and removed.
pub fn clean_text(event: &IncomingEvent, bot: Option<&BotIdentity>) -> String {
    let mut mentions: Vec<_> = event
        .mentions
        .iter()
        .filter(|m| !m.display_text.is_empty())
        .collect();
    // `@_user_10` must be handled before `@_user_1`.
    mentions.sort_by(|a, b| b.display_text.len().cmp(&a.display_text.len()));

    let is_bot = |id: &str| bot.is_none_or(|b| b.matches(id));

    let mut text = event.raw_text.clone();
    for m in mentions.iter().filter(|m| !is_bot(m.id.as_str()) && !m.name.is_empty()) {
        text = text.replace(&m.display_text, &format!("@{}", m.name));
    }
    // Bot placeholders go last and are removed until none is left: deleting one occurrence
    // can splice its neighbours into a fresh one (`@_@_user_1user_1`).
    let bot_keys: Vec<&str> = mentions
        .iter()
        .filter(|m| is_bot(m.id.as_str()))
        .map(|m| m.display_text.as_str())
        .collect();
    while let Some(key) = bot_keys.iter().find(|k| text.contains(**k)) {
        text = text.replace(key, "");
    }
    text.trim().to_string()
}

pub fn filter(event: &IncomingEvent, bot: Option<&BotIdentity>) -> FilterOutcome {
    FilterOutcome {
        addressed: is_addressed(event, bot),
        text: clean_text(event, bot),
    }
}
