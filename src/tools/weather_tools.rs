use crate::agent::RunContext;
use crate::error::Result;
use crate::tools::{AgentTool, ToolDescriptor};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Simulated weather backend handed to the weather agent as its dependency
///
/// Both lookups answer immediately with canned text; they stand in for a
/// forecast API and a historical weather store.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherService;

impl WeatherService {
    pub async fn get_forecast(&self, location: &str, forecast_date: NaiveDate) -> String {
        format!("The forecast in {} on {} is 24°C and sunny.", location, forecast_date)
    }

    pub async fn get_historic_weather(&self, location: &str, forecast_date: NaiveDate) -> String {
        format!(
            "The weather in {} on {} was 18°C and partly cloudy.",
            location, forecast_date
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherForecastArgs {
    /// City or place to look up
    pub location: String,
    /// Day of interest, YYYY-MM-DD
    pub forecast_date: NaiveDate,
}

/// Forecast for today or later, recorded weather for past dates
pub struct WeatherForecastTool;

impl WeatherForecastTool {
    /// Resolve the forecast relative to an explicit `today`
    pub async fn forecast_as_of(
        service: &WeatherService,
        args: &WeatherForecastArgs,
        today: NaiveDate,
    ) -> String {
        if args.forecast_date >= today {
            service.get_forecast(&args.location, args.forecast_date).await
        } else {
            service.get_historic_weather(&args.location, args.forecast_date).await
        }
    }
}

#[async_trait]
impl AgentTool<WeatherService> for WeatherForecastTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<WeatherForecastArgs>(
            "weather_forecast",
            "Get the weather forecast for a location on a given date, \
             or the recorded weather if the date is in the past.",
        )
    }

    async fn call(&self, ctx: &RunContext<WeatherService>, args: Value) -> Result<Value> {
        let args: WeatherForecastArgs = serde_json::from_value(args)?;
        debug!(location = %args.location, date = %args.forecast_date, "weather_forecast");

        let today = Local::now().date_naive();
        Ok(json!(Self::forecast_as_of(&ctx.deps, &args, today).await))
    }
}

/// Static current-weather table; unknown cities get a fallback sentence
pub fn lookup_weather(city: &str) -> String {
    let weather = match city.to_lowercase().as_str() {
        "london" => "Cloudy, 15°C",
        "paris" => "Sunny, 18°C",
        "new york" => "Rainy, 12°C",
        "tokyo" => "Clear, 20°C",
        _ => return format!("Weather data not available for {}", city),
    };
    weather.to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWeatherArgs {
    /// City name
    pub city: String,
}

/// Current weather for a city, usable by an agent with any dependency type
pub struct GetWeatherTool;

#[async_trait]
impl<D: Send + Sync> AgentTool<D> for GetWeatherTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function::<GetWeatherArgs>(
            "get_weather",
            "Get the current weather for a city.",
        )
    }

    async fn call(&self, _ctx: &RunContext<D>, args: Value) -> Result<Value> {
        let args: GetWeatherArgs = serde_json::from_value(args)?;
        Ok(json!(lookup_weather(&args.city)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_forecast_for_future_date() {
        let args = WeatherForecastArgs {
            location: "Paris".to_string(),
            forecast_date: date(2030, 1, 1),
        };

        let text =
            WeatherForecastTool::forecast_as_of(&WeatherService, &args, date(2029, 12, 31)).await;
        assert_eq!(text, "The forecast in Paris on 2030-01-01 is 24°C and sunny.");
    }

    #[tokio::test]
    async fn test_forecast_for_today_is_a_forecast() {
        let args = WeatherForecastArgs {
            location: "Paris".to_string(),
            forecast_date: date(2026, 10, 20),
        };

        let text =
            WeatherForecastTool::forecast_as_of(&WeatherService, &args, date(2026, 10, 20)).await;
        assert!(text.starts_with("The forecast in Paris"));
    }

    #[tokio::test]
    async fn test_forecast_for_past_date_uses_history() {
        let args = WeatherForecastArgs {
            location: "Tokyo".to_string(),
            forecast_date: date(2000, 6, 1),
        };

        let text =
            WeatherForecastTool::forecast_as_of(&WeatherService, &args, date(2026, 10, 20)).await;
        assert_eq!(text, "The weather in Tokyo on 2000-06-01 was 18°C and partly cloudy.");
    }

    #[tokio::test]
    async fn test_weather_forecast_tool_call_parses_iso_date() {
        let ctx = RunContext::new(Arc::new(WeatherService), "prompt");
        let result = WeatherForecastTool
            .call(&ctx, json!({"location": "Paris", "forecast_date": "2999-01-01"}))
            .await
            .unwrap();

        assert_eq!(result, json!("The forecast in Paris on 2999-01-01 is 24°C and sunny."));
    }

    #[tokio::test]
    async fn test_weather_forecast_tool_rejects_malformed_date() {
        let ctx = RunContext::new(Arc::new(WeatherService), "prompt");
        let result = WeatherForecastTool
            .call(&ctx, json!({"location": "Paris", "forecast_date": "Tuesday"}))
            .await;

        assert!(result.is_err());
    }

    #[test]
    fn test_weather_forecast_descriptor() {
        let descriptor = AgentTool::<WeatherService>::descriptor(&WeatherForecastTool);

        assert_eq!(descriptor.function.name, "weather_forecast");
        let properties = &descriptor.function.parameters["properties"];
        assert_eq!(properties["forecast_date"]["format"], "date");
        assert_eq!(properties["location"]["type"], "string");
    }

    #[test]
    fn test_lookup_weather_is_case_insensitive() {
        assert_eq!(lookup_weather("Paris"), "Sunny, 18°C");
        assert_eq!(lookup_weather("NEW YORK"), "Rainy, 12°C");
    }

    #[test]
    fn test_lookup_weather_unknown_city_falls_back() {
        assert_eq!(lookup_weather("Atlantis"), "Weather data not available for Atlantis");
    }

    #[tokio::test]
    async fn test_get_weather_tool_works_without_deps() {
        let ctx = RunContext::new(Arc::new(()), "prompt");
        let result = GetWeatherTool.call(&ctx, json!({"city": "london"})).await.unwrap();

        assert_eq!(result, json!("Cloudy, 15°C"));
    }
}
