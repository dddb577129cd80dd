pub mod assistant_tools;
mod tool;
pub mod weather_tools;

pub use assistant_tools::{CalculateSumTool, SearchDatabaseTool};
pub use tool::{parameters_schema, tool_output_text, AgentTool, FunctionDescriptor, ToolDescriptor};
pub use weather_tools::{GetWeatherTool, WeatherForecastTool, WeatherService};
