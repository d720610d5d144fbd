//! 提示词组装
//!
//! 每次只发送一条 system 消息：人设 + 配方列表 + 两种商品类型 + 下单规则 + 用户原文。
//! 不携带历史对话。

use std::path::Path;

use super::classify::PRODUCT_TYPES;

/// 内置人设
pub const DEFAULT_PERSONA: &str = "คุณคือบ่าวน้อยไส้อั่ว พูดจาน่ารักและสุภาพแบบเด็กผู้ชาย";

/// 读取人设：优先配置路径，再找 config/prompts/persona.md，最后用内置人设
pub fn load_persona(path: Option<&Path>) -> String {
    let candidates = [
        path.map(Path::to_path_buf),
        Some("config/prompts/persona.md".into()),
        Some("../config/prompts/persona.md".into()),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|p| std::fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_PERSONA.to_string())
}

/// 组装发给 LLM 的 system 指令
pub fn compose_prompt(persona: &str, recipes: &[String], user_message: &str) -> String {
    let recipe_lines = bullet_list(recipes.iter().map(String::as_str));
    let product_lines = bullet_list(PRODUCT_TYPES.iter().map(|(label, _)| *label));

    format!(
        "{persona}\n\n\
         ตอนนี้บ่าวน้อยมีสูตรไส้อั่วให้เลือก {recipe_count} แบบ:\n\
         {recipe_lines}\n\n\
         ลูกค้าสามารถเลือกประเภทสินค้าได้ {product_count} แบบ:\n\
         {product_lines}\n\n\
         หากลูกค้าพิมพ์ว่าอยากสั่ง ให้แนะนำให้เลือกจากรายการนี้เท่านั้น\n\
         ห้ามพูดว่าสามารถปรับสูตรเองได้ และอย่าตอบสูตรอื่นนอกจากนี้\n\
         แต่ถ้าลูกค้ามีความต้องการเพิ่มเติมหรือต่างจากเมนูที่กำหนด สามารถแจ้งรายละเอียดได้เลยครับ \
         บ่าวน้อยจะสรุปเป็นหมายเหตุ (Note) แนบไปให้แอดมินตรวจสอบครับ\n\n\
         หากลูกค้าเลือกสูตรเรียบร้อยแล้ว ให้ถามต่อว่า \"อยากได้แบบ{ready}หรือ{sealed}ดีครับ?\"\n\n\
         ลูกค้าพิมพ์ว่า: \"{user_message}\"\n",
        recipe_count = recipes.len(),
        product_count = PRODUCT_TYPES.len(),
        ready = PRODUCT_TYPES[0].0,
        sealed = PRODUCT_TYPES[1].0,
    )
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
