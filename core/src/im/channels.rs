//! Concrete IM channels.

pub mod feishu;
