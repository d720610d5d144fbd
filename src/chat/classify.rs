//! 备注分类：判断一条用户消息是「已知选择」还是「自由备注」
//!
//! 匹配为大小写敏感的子串包含，不做任何归一化。命中配方名或任一商品类型即为已知选择，
//! 其余一律当作备注追加（包括 quick reply 回传的截断标题与空白消息）。

/// 商品类型：(展示名, quick reply payload)
pub const PRODUCT_TYPES: [(&str, &str); 2] = [
    ("พร้อมทาน", "PRODUCT_READY"),
    ("ซีลสุญญากาศ", "PRODUCT_SEALED"),
];

/// 配方 quick reply 的 payload 前缀
pub const RECIPE_PAYLOAD_PREFIX: &str = "RECIPE_";

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteClass {
    /// 命中已知词表，不记录
    KnownSelection,
    /// 自由备注，追加到 note
    Remark,
}

impl NoteClass {
    pub fn is_remark(self) -> bool {
        matches!(self, NoteClass::Remark)
    }
}

/// 对消息分类
pub fn classify(message: &str, recipes: &[String]) -> NoteClass {
    let hits_recipe = recipes.iter().any(|r| message.contains(r.as_str()));
    let hits_product_type = PRODUCT_TYPES.iter().any(|(label, _)| message.contains(label));

    if hits_recipe || hits_product_type {
        NoteClass::KnownSelection
    } else {
        NoteClass::Remark
    }
}
