//! IM (instant messaging) side of the relay: Feishu transport, webhook handling, and the
//! filter → classify → dispatch pipeline that turns an inbound message into a reply card.
//! Log fields: chat_id=... message_id=... kind=link|chat content=...

pub mod card;
pub mod channels;
pub mod classify;
pub mod dispatch;
pub mod event;
pub mod identity;
pub mod log;
pub mod mention;
pub mod transport;
pub mod webhook;
pub mod worker;

/// Re-export so `steamlens_core::im::feishu::FeishuClient` works.
pub use channels::feishu;
