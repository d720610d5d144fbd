//! 选项源：key -> 可选值列表（如 recipe_preset 为当前可售的ไส้อั่ว配方）
//!
//! 对本系统只读，每次请求重新加载，不做缓存。

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::OptionsSection;
use crate::core::BotResult;

/// 配方列表所在的 key
pub const RECIPE_PRESET_KEY: &str = "recipe_preset";

/// 一次加载得到的选项集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: HashMap<String, Vec<String>>,
}

impl OptionSet {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// 取某个 key 的列表；缺失时为空
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn recipes(&self) -> &[String] {
        self.get(RECIPE_PRESET_KEY)
    }

    /// 由表格区域构造：首行为 key，每列向下为该 key 的取值，空单元格跳过
    pub fn from_columns(rows: &[Vec<String>]) -> Self {
        let Some((header, body)) = rows.split_first() else {
            return Self::default();
        };

        let mut entries: HashMap<String, Vec<String>> = HashMap::new();
        for (col, key) in header.iter().enumerate() {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let values = body
                .iter()
                .filter_map(|row| row.get(col))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect();
            entries.insert(key.to_string(), values);
        }
        Self { entries }
    }
}

/// 选项提供者
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn load(&self) -> BotResult<OptionSet>;
}

/// 静态选项（来自配置文件），未配置 Google Sheets 时使用
#[derive(Debug, Clone, Default)]
pub struct StaticOptionsProvider {
    options: OptionSet,
}

impl StaticOptionsProvider {
    pub fn new(options: OptionSet) -> Self {
        Self { options }
    }

    pub fn from_config(cfg: &OptionsSection) -> Self {
        let mut entries = cfg.extra.clone();
        entries.insert(RECIPE_PRESET_KEY.to_string(), cfg.recipe_preset.clone());
        Self::new(OptionSet::new(entries))
    }

    /// 只有配方列表的便捷构造
    pub fn with_recipes<I, S>(recipes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let recipes = recipes.into_iter().map(Into::into).collect();
        Self::new(OptionSet::new(HashMap::from([(
            RECIPE_PRESET_KEY.to_string(),
            recipes,
        )])))
    }
}

#[async_trait]
impl OptionsProvider for StaticOptionsProvider {
    async fn load(&self) -> BotResult<OptionSet> {
        Ok(self.options.clone())
    }
}
