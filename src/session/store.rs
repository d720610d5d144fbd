//! 会话存储抽象层
//!
//! 会话在首次接触时惰性创建，进程存活期间不销毁。
//! `append_note` 是单个原子操作：读取、拼接、写回都在同一把写锁内完成，
//! 同一用户并发到达的多条消息不会互相覆盖。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// 单个用户的会话状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            note: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 追加一段备注；已有内容时以换行分隔
    fn push_note(&mut self, text: &str) {
        if !self.note.is_empty() {
            self.note.push('\n');
        }
        self.note.push_str(text);
        self.updated_at = Utc::now();
    }
}

/// 会话存储接口
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 获取或创建用户的会话（返回快照）
    async fn get_or_create(&self, user_id: &str) -> Session;

    /// 追加备注，会话不存在时先创建
    async fn append_note(&self, user_id: &str, text: &str);

    /// 读取备注；未知用户返回空串
    async fn get_note(&self, user_id: &str) -> String;

    /// 清空备注，返回清空前的内容
    async fn clear_note(&self, user_id: &str) -> String;

    /// 当前会话数
    async fn active_count(&self) -> usize;
}

/// 内存会话存储：user_id -> Session
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_or_create(&self, user_id: &str) -> Session {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(user_id) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(user_id, "Session created");
                Session::new(user_id)
            })
            .clone()
    }

    async fn append_note(&self, user_id: &str, text: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id))
            .push_note(text);
    }

    async fn get_note(&self, user_id: &str) -> String {
        self.sessions
            .read()
            .await
            .get(user_id)
            .map(|s| s.note.clone())
            .unwrap_or_default()
    }

    async fn clear_note(&self, user_id: &str) -> String {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(user_id) {
            Some(session) => {
                session.updated_at = Utc::now();
                std::mem::take(&mut session.note)
            }
            None => String::new(),
        }
    }

    async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
