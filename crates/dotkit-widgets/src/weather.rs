//! OpenWeatherMap current conditions and 5-day forecast.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use dotkit_config::schema::{Units, WeatherConfig};
use dotkit_core::{DotkitError, Fetcher, Result};

use crate::argos::{ArgosItem, ArgosMenu, footer};
use crate::waybar::WaybarOutput;

// ── API types ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Main {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: String,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clouds {
    pub all: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sys: Sys,
    pub main: Main,
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
    /// Metres.
    pub visibility: Option<f64>,
    pub clouds: Option<Clouds>,
}

impl Current {
    fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

// ── Formatting helpers ─────────────────────────────────────────

/// Icon for an OpenWeatherMap condition id.
///
/// Exact ids first, then the closest group threshold at or below the id.
pub fn weather_icon(id: u32) -> &'static str {
    let exact = match id {
        200..=202 | 230..=232 => Some("⛈"),
        210..=221 => Some("🌩"),
        300..=321 | 500 => Some("🌦"),
        501..=504 | 520..=531 => Some("🌧"),
        511 | 600 | 601 | 611..=620 => Some("🌨"),
        602 | 621 | 622 => Some("❄️"),
        701..=771 => Some("🌫"),
        781 => Some("🌪"),
        800 => Some("☀️"),
        801 => Some("🌤"),
        802 => Some("⛅"),
        803 => Some("🌥"),
        804 => Some("☁️"),
        _ => None,
    };
    if let Some(icon) = exact {
        return icon;
    }

    const GROUPS: &[(u32, &str)] = &[
        (804, "☁️"),
        (803, "🌥"),
        (802, "⛅"),
        (801, "🌤"),
        (800, "☀️"),
        (781, "🌪"),
        (701, "🌫"),
        (602, "❄️"),
        (600, "🌨"),
        (501, "🌧"),
        (500, "🌦"),
        (300, "🌦"),
        (200, "⛈"),
    ];
    GROUPS
        .iter()
        .find(|(min, _)| id >= *min)
        .map(|(_, icon)| *icon)
        .unwrap_or("🌡")
}

/// 16-point compass direction.
pub fn wind_direction(degrees: f64) -> &'static str {
    const DIRS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let idx = (degrees / 22.5).round() as i64;
    DIRS[idx.rem_euclid(16) as usize]
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn local(ts: i64, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(offset))
}

fn round(v: f64) -> i64 {
    v.round() as i64
}

// ── Fetching ───────────────────────────────────────────────────

async fn fetch<T: DeserializeOwned>(
    fetcher: &dyn Fetcher,
    config: &WeatherConfig,
    api_key: Option<&str>,
    endpoint: &str,
) -> Result<T> {
    let key = api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| DotkitError::Config("no weather API key configured".into()))?;
    let url = reqwest::Url::parse_with_params(
        &format!("{}/{}", config.base_url.trim_end_matches('/'), endpoint),
        &[
            ("q", config.location.as_str()),
            ("units", config.units.as_query()),
            ("lang", config.lang.as_str()),
            ("appid", key),
        ],
    )
    .map_err(|e| DotkitError::Config(format!("bad weather base_url: {e}")))?;
    let body = fetcher.get_text(url.as_str()).await?;
    Ok(serde_json::from_str(&body)?)
}

pub async fn fetch_current(
    fetcher: &dyn Fetcher,
    config: &WeatherConfig,
    api_key: Option<&str>,
) -> Result<Current> {
    fetch(fetcher, config, api_key, "weather").await
}

pub async fn fetch_forecast(
    fetcher: &dyn Fetcher,
    config: &WeatherConfig,
    api_key: Option<&str>,
) -> Result<Forecast> {
    fetch(fetcher, config, api_key, "forecast").await
}

// ── Waybar ─────────────────────────────────────────────────────

pub fn render_waybar(current: &Current, units: Units) -> WaybarOutput {
    let t = units.temperature_suffix();
    let (icon, desc) = current
        .condition()
        .map(|c| (weather_icon(c.id), title_case(&c.description)))
        .unwrap_or(("🌡", String::new()));
    let text = format!("{} {}{}", icon, round(current.main.temp), t);
    let tooltip = format!(
        "{}\nFeels like {}{}\nHumidity {}%\nWind {} {}",
        desc,
        round(current.main.feels_like),
        t,
        round(current.main.humidity),
        current.wind.speed,
        units.speed_suffix()
    );
    WaybarOutput::new(text, tooltip)
}

pub fn waybar_error(err: &DotkitError) -> WaybarOutput {
    WaybarOutput::new("⚠ Weather", err.to_string())
}

/// Fetch and render; failures become the fallback frame.
pub async fn weather_waybar(
    fetcher: &dyn Fetcher,
    config: &WeatherConfig,
    api_key: Option<&str>,
) -> WaybarOutput {
    match fetch_current(fetcher, config, api_key).await {
        Ok(current) => render_waybar(&current, config.units),
        Err(e) => {
            warn!(error = %e, "weather fetch failed");
            waybar_error(&e)
        }
    }
}

// ── Argos ──────────────────────────────────────────────────────

/// One forecast day: local date, min, max and the most common condition.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub first: DateTime<FixedOffset>,
    pub min: f64,
    pub max: f64,
    pub condition_id: u32,
}

/// Group 3-hourly forecast items into at most five local days.
pub fn daily_forecast(forecast: &Forecast, offset: &FixedOffset) -> Vec<DailyForecast> {
    let mut days: Vec<(NaiveDate, DateTime<FixedOffset>, Vec<&ForecastItem>)> = Vec::new();
    for item in forecast.list.iter().take(40) {
        let Some(at) = local(item.dt, offset) else {
            continue;
        };
        let date = at.date_naive();
        match days.iter_mut().find(|(d, _, _)| *d == date) {
            Some((_, _, items)) => items.push(item),
            None => days.push((date, at, vec![item])),
        }
    }

    days.into_iter()
        .take(5)
        .map(|(date, first, items)| {
            let temps = items.iter().map(|i| i.main.temp);
            let min = temps.clone().fold(f64::INFINITY, f64::min);
            let max = temps.fold(f64::NEG_INFINITY, f64::max);

            let ids: Vec<u32> = items.iter().filter_map(|i| i.weather.first().map(|c| c.id)).collect();
            let mut best = (0u32, 0usize);
            for id in &ids {
                let n = ids.iter().filter(|x| *x == id).count();
                if n > best.1 {
                    best = (*id, n);
                }
            }
            DailyForecast {
                date,
                first,
                min,
                max,
                condition_id: best.0,
            }
        })
        .collect()
}

pub fn render_argos(
    current: &Current,
    forecast: &Forecast,
    units: Units,
    now: DateTime<FixedOffset>,
) -> String {
    let t = units.temperature_suffix();
    let offset = *now.offset();
    let temp = round(current.main.temp);
    let (icon, desc) = current
        .condition()
        .map(|c| (weather_icon(c.id), title_case(&c.description)))
        .unwrap_or(("🌡", String::new()));

    // Pango markup; the degree sign is left out of the panel label.
    let mut menu = ArgosMenu::new()
        .item(
            ArgosItem::new(format!(
                "<tt><b>{icon}</b></tt><tt><span color='#87ceeb'>{temp}C</span></tt>"
            ))
            .font("'monospace'")
            .size(12)
            .dropdown(false),
        )
        .separator()
        .item(ArgosItem::new(format!("📍 {}, {}", current.name, current.sys.country)).size(14))
        .item(ArgosItem::new(desc).size(12))
        .separator()
        .item(
            ArgosItem::new(format!(
                "🌡 Temperature: {temp}{t} (feels like {}{t})",
                round(current.main.feels_like)
            ))
            .color("#ff6b6b"),
        )
        .item(
            ArgosItem::new(format!(
                "↑ High: {}{t}  ↓ Low: {}{t}",
                round(current.main.temp_max),
                round(current.main.temp_min)
            ))
            .size(11),
        )
        .separator()
        .item(ArgosItem::new(format!("💧 Humidity: {}%", round(current.main.humidity))).color("#4ecdc4"))
        .item(
            ArgosItem::new(format!(
                "💨 Wind: {} {} {}",
                current.wind.speed,
                units.speed_suffix(),
                wind_direction(current.wind.deg)
            ))
            .color("#95e1d3"),
        )
        .item(ArgosItem::new(format!("🔵 Pressure: {} hPa", round(current.main.pressure))).color("#74b9ff"));

    if let Some(vis) = current.visibility {
        menu.push(ArgosItem::new(format!("👁 Visibility: {:.1} km", vis / 1000.0)).color("#a29bfe"));
    }
    if let Some(ref clouds) = current.clouds {
        menu.push(ArgosItem::new(format!("☁️ Cloudiness: {}%", clouds.all)).color("#dfe6e9"));
    }

    let sun = |ts: Option<i64>| {
        ts.and_then(|t| local(t, &offset))
            .map(|dt| dt.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".into())
    };
    menu.push_separator();
    menu.push(
        ArgosItem::new(format!(
            "🌅 Sunrise: {}  🌇 Sunset: {}",
            sun(current.sys.sunrise),
            sun(current.sys.sunset)
        ))
        .color("#f39c12"),
    );

    menu.push_separator();
    menu.push(ArgosItem::new("📅 5-Day Forecast").size(13));
    menu.push_separator();
    for day in daily_forecast(forecast, &offset) {
        menu.push(
            ArgosItem::new(format!(
                "{} {} {}: {}{t}/{}{t}",
                weather_icon(day.condition_id),
                day.first.format("%a"),
                day.first.format("%m/%d"),
                round(day.max),
                round(day.min)
            ))
            .font("Menlo"),
        );
    }

    footer(
        &mut menu,
        "Last updated",
        &now.format("%H:%M:%S").to_string(),
        "#636e72",
        10,
    );
    menu.render()
}

pub fn argos_error() -> String {
    ArgosMenu::new()
        .text("⚠️ Weather")
        .separator()
        .item(ArgosItem::new("Could not fetch weather data").color("red"))
        .render()
}

/// Fetch current conditions and forecast, render, or fall back.
pub async fn weather_argos(
    fetcher: &dyn Fetcher,
    config: &WeatherConfig,
    api_key: Option<&str>,
    now: DateTime<FixedOffset>,
) -> String {
    let (current, forecast) = futures::join!(
        fetch_current(fetcher, config, api_key),
        fetch_forecast(fetcher, config, api_key)
    );
    match (current, forecast) {
        (Ok(c), Ok(f)) => render_argos(&c, &f, config.units, now),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "weather fetch failed");
            argos_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_icon_exact_and_fallback() {
        assert_eq!(weather_icon(800), "☀️");
        assert_eq!(weather_icon(511), "🌨");
        assert_eq!(weather_icon(210), "🌩");
        // Unlisted ids fall back to their group.
        assert_eq!(weather_icon(805), "☁️");
        assert_eq!(weather_icon(640), "🌨");
        assert_eq!(weather_icon(100), "🌡");
    }

    #[test]
    fn test_wind_direction() {
        assert_eq!(wind_direction(0.0), "N");
        assert_eq!(wind_direction(22.5), "NNE");
        assert_eq!(wind_direction(180.0), "S");
        assert_eq!(wind_direction(350.0), "N");
        assert_eq!(wind_direction(-90.0), "W");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("OVERCAST clouds"), "Overcast Clouds");
    }

    #[test]
    fn test_error_frames() {
        assert_eq!(
            argos_error(),
            "⚠️ Weather\n---\nCould not fetch weather data | color=red\n"
        );
        let w = waybar_error(&DotkitError::http("openweathermap", "HTTP 401"));
        assert_eq!(w.text, "⚠ Weather");
        assert!(w.tooltip.contains("401"));
    }
}
