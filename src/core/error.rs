//! 错误类型
//!
//! 所有外部协作方（LLM、Messenger、Google Sheets、LINE、选项表）统一返回 `BotResult<T>`，
//! 调用方据此决定是回显错误（下单接口）还是替换为固定致歉文案（聊天管线）。

use thiserror::Error;

/// 机器人运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum BotError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Messenger API error: {0}")]
    Messenger(String),

    #[error("Sheets API error: {0}")]
    Sheets(String),

    #[error("LINE API error: {0}")]
    Line(String),

    #[error("Options error: {0}")]
    Options(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type BotResult<T> = Result<T, BotError>;
