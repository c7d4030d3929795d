//! 文本分类：封闭枚举 sentiment | genre | priority，每种对应一对 (Schema, Prompt)
//!
//! Schema 由 schemars 从结果结构体生成；模型输出再反序列化回结构体做校验。
//! 未知 key 一律回退到 sentiment。

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prompts::EXAMPLE_OUTPUT_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationKind {
    Sentiment,
    Genre,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SentimentClassification {
    pub sentiment: Sentiment,
    /// 0.0 ~ 1.0
    pub confidence: f32,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    Fantasy,
    ScienceFiction,
    Mystery,
    Romance,
    Horror,
    Thriller,
    NonFiction,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenreClassification {
    pub genre: Genre,
    pub confidence: f32,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PriorityClassification {
    pub priority: Priority,
    pub rationale: String,
}

impl ClassificationKind {
    pub const ALL: [ClassificationKind; 3] = [
        ClassificationKind::Sentiment,
        ClassificationKind::Genre,
        ClassificationKind::Priority,
    ];

    /// 解析 key；None、空串或未知值都回退到 Sentiment
    pub fn from_key(key: Option<&str>) -> Self {
        match key.map(|k| k.trim().to_ascii_lowercase()).as_deref() {
            Some("genre") => ClassificationKind::Genre,
            Some("priority") => ClassificationKind::Priority,
            _ => ClassificationKind::Sentiment,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationKind::Sentiment => "sentiment",
            ClassificationKind::Genre => "genre",
            ClassificationKind::Priority => "priority",
        }
    }

    /// 结果结构体的 JSON Schema
    pub fn schema(self) -> Value {
        let schema = match self {
            ClassificationKind::Sentiment => schema_for!(SentimentClassification),
            ClassificationKind::Genre => schema_for!(GenreClassification),
            ClassificationKind::Priority => schema_for!(PriorityClassification),
        };
        serde_json::to_value(schema).unwrap_or(Value::Null)
    }

    /// 一条合法输出示例（写进 Prompt，帮助模型对齐格式）
    pub fn example(self) -> &'static str {
        match self {
            ClassificationKind::Sentiment => {
                r#"{"sentiment":"positive","confidence":0.92,"rationale":"The author is delighted with the result."}"#
            }
            ClassificationKind::Genre => {
                r#"{"genre":"science-fiction","confidence":0.81,"rationale":"Starships and faster-than-light travel."}"#
            }
            ClassificationKind::Priority => {
                r#"{"priority":"high","rationale":"Production checkout is failing for some users."}"#
            }
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            ClassificationKind::Sentiment => {
                "Classify the overall sentiment of the text as positive, negative, neutral or mixed."
            }
            ClassificationKind::Genre => "Classify the literary genre the text most likely belongs to.",
            ClassificationKind::Priority => {
                "Classify how urgently the request or issue described in the text needs attention."
            }
        }
    }

    /// 完整 Prompt：任务说明 + Schema + 示例 + 待分类文本
    pub fn prompt(self, text: &str) -> String {
        let schema = serde_json::to_string(&self.schema()).unwrap_or_default();
        format!(
            "{}\nRespond with a single JSON object matching this JSON Schema:\n{}\n{}{}\n\nText:\n{}",
            self.instruction(),
            schema,
            EXAMPLE_OUTPUT_PREFIX,
            self.example(),
            text.trim()
        )
    }

    /// 把模型输出反序列化到对应结构体，再转回 JSON（丢弃多余字段）
    pub fn validate(self, value: Value) -> Result<Value, String> {
        fn check_confidence(c: f32) -> Result<(), String> {
            if (0.0..=1.0).contains(&c) {
                Ok(())
            } else {
                Err(format!("confidence out of range: {}", c))
            }
        }

        let typed = match self {
            ClassificationKind::Sentiment => {
                let r: SentimentClassification =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                check_confidence(r.confidence)?;
                serde_json::to_value(r)
            }
            ClassificationKind::Genre => {
                let r: GenreClassification =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                check_confidence(r.confidence)?;
                serde_json::to_value(r)
            }
            ClassificationKind::Priority => {
                let r: PriorityClassification =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
                serde_json::to_value(r)
            }
        };
        typed.map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys() {
        assert_eq!(ClassificationKind::from_key(Some("genre")), ClassificationKind::Genre);
        assert_eq!(ClassificationKind::from_key(Some(" PRIORITY ")), ClassificationKind::Priority);
        assert_eq!(ClassificationKind::from_key(Some("sentiment")), ClassificationKind::Sentiment);
    }

    #[test]
    fn test_unknown_key_falls_back_to_sentiment() {
        assert_eq!(ClassificationKind::from_key(Some("mood")), ClassificationKind::Sentiment);
        assert_eq!(ClassificationKind::from_key(Some("")), ClassificationKind::Sentiment);
        assert_eq!(ClassificationKind::from_key(None), ClassificationKind::Sentiment);
    }

    #[test]
    fn test_each_kind_has_distinct_schema_and_prompt() {
        let schemas: Vec<String> = ClassificationKind::ALL
            .iter()
            .map(|k| k.schema().to_string())
            .collect();
        let prompts: Vec<String> = ClassificationKind::ALL
            .iter()
            .map(|k| k.prompt("same text"))
            .collect();
        for i in 0..3 {
            for j in (i + 1)..3 {
                assert_ne!(schemas[i], schemas[j]);
                assert_ne!(prompts[i], prompts[j]);
            }
        }
        assert!(schemas[0].contains("sentiment"));
        assert!(schemas[1].contains("genre"));
        assert!(schemas[2].contains("priority"));
    }

    #[test]
    fn test_examples_validate() {
        for kind in ClassificationKind::ALL {
            let value: Value = serde_json::from_str(kind.example()).unwrap();
            assert!(kind.validate(value).is_ok(), "{} example invalid", kind);
        }
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        let value = serde_json::json!({"priority": "someday", "rationale": "x"});
        assert!(ClassificationKind::Priority.validate(value).is_err());

        let value = serde_json::json!({"sentiment": "positive", "confidence": 3.0, "rationale": "x"});
        assert!(ClassificationKind::Sentiment.validate(value).is_err());
    }
}
