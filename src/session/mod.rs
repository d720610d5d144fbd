//! 会话层：按 PSID 保存对话状态（目前只有备注）

pub mod store;

pub use store::{MemorySessionStore, Session, SessionStore};
