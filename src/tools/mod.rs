pub mod cities;
pub mod executor;
pub mod registry;
pub mod schema;

pub use cities::{CityDistanceTool, CityLookupTool};
pub use executor::ToolExecutor;
pub use registry::{Tool, ToolRegistry};
pub use schema::tool_call_schema_json;
