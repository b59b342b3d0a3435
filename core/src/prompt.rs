//! Prompt text and user-facing reply strings.

use crate::store::ProductPage;

pub const CHAT_CARD_TITLE: &str = "🤖 AI 助手 (Gemini)";
pub const FAILURE_CARD_TITLE: &str = "处理失败";
pub const STORE_LINK_LABEL: &str = "前往 Steam 商店页面";

pub fn review_card_title(game_title: &str) -> String {
    format!("🎮 {} 分析报告", game_title)
}

/// Game review prompt built from a scraped store page.
pub fn game_review_prompt(page: &ProductPage) -> String {
    format!(
        r#"你是一位顶级的游戏行业分析师和资深评测家。请根据以下 Steam 游戏信息，进行深入、全面、专业的分析。

**游戏名称**: {title}
**游戏标签**: {tags}
**简短介绍**:
{short}
**详细介绍**:
{full}

**你的任务 (请严格按点回复)**:
1.  **核心玩法**: 用2-3句话总结游戏的核心玩法与特色。
2.  **亮点 ✨**: 列出这款游戏最吸引人的2-3个优点。
3.  **槽点 ⛈️**: 列出这款游戏可能存在的2-3个缺点或风险。
4.  **目标用户与竞品**:
    - 根据标签和介绍，分析这款游戏主要的目标用户群体是谁？
    - 在当前市场上，有哪些知名的同类竞品？简单对比一下它们的质量和特色。
5.  **同类游戏市场分析**:
    - 综合来看，这款游戏所属的品类在Steam上的总体受欢迎程度如何？
    - 玩家对这类游戏通常有哪些期待？
6.  **好玩指数**: 综合以上所有信息，给出一个1-10分的好玩指数（请给出整数），并用一句话解释打分理由。

请严格按照以上格式输出，使用 Markdown 语法。"#,
        title = page.title,
        tags = page.tags.join(", "),
        short = page.short_description,
        full = page.description,
    )
}

pub fn general_chat_prompt(question: &str) -> String {
    format!(
        "你是一个乐于助人、知识渊博的通用人工智能助手。请回答以下问题：\n\n{}",
        question
    )
}

/// Final review card body: bold title, model output, store link.
pub fn review_markdown(game_title: &str, review: &str, url: &str) -> String {
    format!(
        "**{}**\n\n{}\n\n[{}]({})",
        game_title, review, STORE_LINK_LABEL, url
    )
}

pub fn scrape_failed(url: &str) -> String {
    format!(
        "哎呀，无法从这个链接获取游戏信息，请检查链接是否正确或稍后再试。\n{}",
        url
    )
}

pub fn review_blocked(reason: &str) -> String {
    format!("抱歉，我的分析被安全规则拦截了，原因：{}。请换个游戏试试。", reason)
}

pub fn chat_blocked(reason: &str) -> String {
    format!("抱歉，我的回答被安全规则拦截了，原因：{}。请换个问题试试。", reason)
}

pub const REVIEW_FAILED: &str = "抱歉，Gemini 大脑暂时出了一点小问题...";
pub const CHAT_FAILED: &str = "抱歉，我的 Gemini 大脑暂时出了一点小问题，请稍后再试。";
pub const AI_NOT_CONFIGURED: &str = "抱歉，AI 功能尚未配置（缺少 GOOGLE_API_KEY），暂时无法回答。";
pub const INTERNAL_ERROR: &str = "抱歉，处理消息时发生了内部错误，请稍后再试。";
