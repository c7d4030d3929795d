//! 城市工具：city_lookup / city_distance，数据来自静态城市表

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::data::cities;
use crate::tools::Tool;

fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing argument: {}", key))
}

fn lookup(name: &str) -> Result<&'static cities::City, String> {
    cities::find(name).ok_or_else(|| format!("unknown city: {}", name))
}

/// 按名称查询城市的国家与坐标
pub struct CityLookupTool;

#[async_trait]
impl Tool for CityLookupTool {
    fn name(&self) -> &str {
        "city_lookup"
    }

    fn description(&self) -> &str {
        "Look up a city's country and coordinates. Args: {\"name\": \"Tokyo\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let city = lookup(str_arg(&args, "name")?)?;
        serde_json::to_string(city).map_err(|e| e.to_string())
    }
}

/// 两城之间的大圆距离
pub struct CityDistanceTool;

#[async_trait]
impl Tool for CityDistanceTool {
    fn name(&self) -> &str {
        "city_distance"
    }

    fn description(&self) -> &str {
        "Great-circle distance in km between two cities. Args: {\"from\": \"Tokyo\", \"to\": \"Osaka\"}"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "from": { "type": "string" },
                "to": { "type": "string" }
            },
            "required": ["from", "to"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let from = lookup(str_arg(&args, "from")?)?;
        let to = lookup(str_arg(&args, "to")?)?;
        let km = cities::distance_km(from, to);
        Ok(json!({
            "from": from.name,
            "to": to.name,
            "distance_km": (km * 10.0).round() / 10.0,
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup() {
        let out = CityLookupTool.execute(json!({"name": "kyoto"})).await.unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["name"], "Kyoto");
        assert_eq!(v["country"], "Japan");
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        assert!(CityLookupTool.execute(json!({})).await.is_err());
        assert!(CityLookupTool.execute(json!({"name": "Atlantis"})).await.is_err());
    }

    #[tokio::test]
    async fn test_distance() {
        let out = CityDistanceTool
            .execute(json!({"from": "London", "to": "Paris"}))
            .await
            .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();
        let km = v["distance_km"].as_f64().unwrap();
        assert!((330.0..360.0).contains(&km), "got {}", km);
    }

    #[test]
    fn test_registry_schema_lists_city_tool_parameters() {
        let mut registry = crate::tools::ToolRegistry::new();
        registry.register(CityLookupTool);
        registry.register(CityDistanceTool);

        let tools: Vec<Value> = serde_json::from_str(&registry.to_schema_json()).unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "city_distance");
        assert_eq!(tools[0]["parameters"]["required"], json!(["from", "to"]));
        assert_eq!(tools[1]["name"], "city_lookup");
        assert_eq!(tools[1]["parameters"]["required"], json!(["name"]));
    }
}
