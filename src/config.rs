//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SAIUA__*` 覆盖（双下划线表示嵌套，如 `SAIUA__LLM__MODEL=gpt-4o`），
//! 最后叠加部署平台常用的裸变量名（`OPENAI_API_KEY`、`PAGE_ACCESS_TOKEN`、`VERIFY_TOKEN`、`PORT` 等）。
//!
//! 配置只在启动时构建一次，之后以 `AppConfig` 显式传给各组件；其余模块不读取环境变量。

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub log: LogSection,
    pub http: HttpSection,
    pub llm: LlmSection,
    pub chat: ChatSection,
    pub messenger: MessengerSection,
    pub sheets: SheetsSection,
    pub line: LineSection,
    pub options: OptionsSection,
    pub order: OrderSection,
}

/// [server] 段：监听地址与端口
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
    /// 下单页面静态文件目录（未匹配路由时回退到此目录）
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

/// [log] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// 默认过滤级别，RUST_LOG 优先
    pub level: String,
    /// 输出 JSON 行（便于日志平台采集）
    pub json: bool,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// [http] 段：对外 HTTP 调用（Messenger / Sheets / LINE）共用的客户端设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            base_url: None,
            api_key: None,
            deepseek_api_key: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// 单次补全请求超时（秒）
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [chat] 段：人设提示词与兜底回复
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    /// 人设提示词文件；不存在时使用内置人设
    pub persona_path: Option<PathBuf>,
    /// 聊天管线失败时发给用户的固定文案
    pub fallback_reply: String,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            persona_path: None,
            fallback_reply: "ขอโทษครับ บ่าวน้อยตอบไม่ได้ตอนนี้ ลองใหม่อีกครั้งนะครับ 🙏".to_string(),
        }
    }
}

/// [messenger] 段：Graph API 与 Webhook 校验
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessengerSection {
    pub page_access_token: String,
    pub verify_token: String,
    pub graph_api_base: String,
    pub api_version: String,
}

impl Default for MessengerSection {
    fn default() -> Self {
        Self {
            page_access_token: String::new(),
            verify_token: String::new(),
            graph_api_base: "https://graph.facebook.com".to_string(),
            api_version: "v18.0".to_string(),
        }
    }
}

/// [sheets] 段：订单表与选项表
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    pub base_url: String,
    pub spreadsheet_id: Option<String>,
    pub access_token: Option<String>,
    /// 订单追加的目标区域
    pub order_range: String,
    /// 选项表区域：首行为 key，每列向下为该 key 的取值
    pub options_range: String,
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: None,
            access_token: None,
            order_range: "orders!A1".to_string(),
            options_range: "options!A1:Z200".to_string(),
        }
    }
}

impl SheetsSection {
    /// 表格 ID 与令牌齐全时才启用远端表格
    pub fn is_configured(&self) -> bool {
        self.spreadsheet_id.as_deref().is_some_and(|s| !s.is_empty())
            && self.access_token.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// [line] 段：员工通知（LINE Messaging API push）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineSection {
    pub base_url: String,
    pub channel_access_token: String,
    /// 接收通知的用户 / 群组 ID
    pub target_id: String,
}

impl Default for LineSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.line.me".to_string(),
            channel_access_token: String::new(),
            target_id: String::new(),
        }
    }
}

/// [options] 段：未配置表格时使用的静态选项
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OptionsSection {
    pub recipe_preset: Vec<String>,
    /// 其他 key 的静态列表
    pub extra: HashMap<String, Vec<String>>,
}

/// [order] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderSection {
    /// 下单成功后是否清空该用户的备注（默认保留）
    pub clear_note_after_submit: bool,
    /// 取货时间展示所用时区（相对 UTC 的小时数）
    pub display_utc_offset_hours: i32,
}

impl Default for OrderSection {
    fn default() -> Self {
        Self {
            clear_note_after_submit: false,
            display_utc_offset_hours: 7,
        }
    }
}

/// 从 config 目录加载配置，环境变量 SAIUA__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 SAIUA__*（双下划线表示嵌套键）
/// 4. 叠加裸变量名（见 [`apply_env_overrides`]）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SAIUA")
            .separator("__")
            .try_parsing(true),
    );

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    let vars: HashMap<String, String> = std::env::vars().collect();
    apply_env_overrides(&mut cfg, &vars)?;
    cfg.validate()?;
    Ok(cfg)
}

/// 展示时区允许的最大偏移（小时）
pub const MAX_UTC_OFFSET_HOURS: i32 = 23;

impl AppConfig {
    /// 启动时校验取值范围
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let offset = self.order.display_utc_offset_hours;
        if !(-MAX_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&offset) {
            return Err(config::ConfigError::Message(format!(
                "order.display_utc_offset_hours must be within ±{}, got {}",
                MAX_UTC_OFFSET_HOURS, offset
            )));
        }
        Ok(())
    }
}

/// 应用常见部署变量。取值来自传入的 map，便于测试时不修改进程环境。
pub fn apply_env_overrides(
    cfg: &mut AppConfig,
    vars: &HashMap<String, String>,
) -> Result<(), config::ConfigError> {
    let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(v) = get("OPENAI_API_KEY") {
        cfg.llm.api_key = Some(v);
    }
    if let Some(v) = get("DEEPSEEK_API_KEY") {
        cfg.llm.deepseek_api_key = Some(v);
    }
    if let Some(v) = get("PAGE_ACCESS_TOKEN") {
        cfg.messenger.page_access_token = v;
    }
    if let Some(v) = get("VERIFY_TOKEN") {
        cfg.messenger.verify_token = v;
    }
    if let Some(v) = get("LINE_CHANNEL_ACCESS_TOKEN") {
        cfg.line.channel_access_token = v;
    }
    if let Some(v) = get("LINE_TARGET_ID") {
        cfg.line.target_id = v;
    }
    if let Some(v) = get("GOOGLE_SHEETS_ACCESS_TOKEN") {
        cfg.sheets.access_token = Some(v);
    }
    if let Some(v) = get("SPREADSHEET_ID") {
        cfg.sheets.spreadsheet_id = Some(v);
    }
    if let Some(v) = get("PORT") {
        cfg.server.port = v
            .parse()
            .map_err(|_| config::ConfigError::Message(format!("invalid PORT: {}", v)))?;
    }
    Ok(())
}
