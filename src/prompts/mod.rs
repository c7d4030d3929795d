//! Prompt 模板：纯函数，输入类型化参数，输出交给模型的字符串

pub mod classification;

pub use classification::{
    ClassificationKind, GenreClassification, PriorityClassification, SentimentClassification,
};

/// 英雄生成数量上下限
pub const MIN_HEROES: u8 = 1;
pub const MAX_HEROES: u8 = 10;
pub const DEFAULT_GENRE: &str = "fantasy";

/// 结构化输出 Prompt 中示例 JSON 所在行的前缀
pub const EXAMPLE_OUTPUT_PREFIX: &str = "Example output: ";

/// ResearchAgent 的系统提示词：工具清单（JSON）+ 工具调用格式
pub fn research_system_prompt(tools_json: &str, tool_schema: &str) -> String {
    format!(
        "You are a travel research assistant. Plan trips, compare destinations and answer \
         questions about cities.\n\n\
         Available tools (name, description, parameters):\n{tools_json}\n\n\
         To call a tool, reply with ONLY a JSON object matching this schema:\n{tool_schema}\n\
         After you receive the tool result, either call another tool or answer the user in \
         plain text. Never wrap the final answer in JSON."
    )
}

/// StudioAgent 的系统提示词
pub const STUDIO_SYSTEM_PROMPT: &str =
    "You are a creative writing and analysis assistant. Follow the requested format exactly.";

pub fn recipe_prompt(cuisine: &str) -> String {
    let cuisine = cuisine.trim();
    let dish = if cuisine.is_empty() {
        "dish of any cuisine".to_string()
    } else {
        format!("{cuisine} dish")
    };
    format!(
        "Create a recipe for a {dish}. Include a title, a short description, \
         an ingredient list with quantities, and numbered preparation steps."
    )
}

/// 生成英雄角色；数量限制在 1..=10，题材为空时用 fantasy
pub fn heroes_prompt(count: u8, genre: Option<&str>) -> String {
    let count = count.clamp(MIN_HEROES, MAX_HEROES);
    let genre = genre
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GENRE);
    let noun = if count == 1 { "hero" } else { "heroes" };
    format!(
        "Invent {count} original {genre} {noun}. For each give a name, a one-line backstory, \
         a signature ability and a weakness."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_prompt_interpolates_cuisine() {
        assert!(recipe_prompt(" Thai ").contains("a Thai dish"));
        assert!(recipe_prompt("").contains("a dish of any cuisine"));
    }

    #[test]
    fn test_heroes_prompt_clamps_and_defaults() {
        assert!(heroes_prompt(0, None).starts_with("Invent 1 original fantasy hero."));
        assert!(heroes_prompt(50, Some("sci-fi")).starts_with("Invent 10 original sci-fi heroes."));
        assert!(heroes_prompt(3, Some("  ")).contains("fantasy"));
    }

    #[test]
    fn test_research_prompt_lists_tools() {
        let tools = r#"[{"name": "city_lookup"}]"#;
        let prompt = research_system_prompt(tools, "{}");
        assert!(prompt.contains("parameters):\n[{\"name\": \"city_lookup\"}]"));
    }
}
