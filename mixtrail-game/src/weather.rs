//! Weather mood engine: observations in, NPC mood and ingredient deltas out.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::numbers::round_half_up_to_i32;

const TEMPERATURE_RANGE: (i32, i32) = (-5, 5);
const PRECIPITATION_RANGE: (i32, i32) = (-3, 3);
const CLOUDINESS_RANGE: (i32, i32) = (-2, 2);
const WIND_RANGE: (i32, i32) = (-2, 2);
const HUMIDITY_RANGE: (i32, i32) = (-1, 1);

const NEUTRAL_TEMPERATURE_C: f64 = 20.0;
const NEUTRAL_HUMIDITY_PCT: f64 = 50.0;
const UNKNOWN_WEATHER: &str = "Unknown";

/// Small inline list of ingredient names carried by a mood delta.
pub type IngredientDelta = SmallVec<[String; 2]>;

/// A single current-conditions observation for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub temperature: f64,
    pub weather_code: u16,
    pub weather_description: String,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Precipitation in millimetres.
    pub precipitation: f64,
    /// Cloud cover in percent.
    pub cloud_cover: f64,
}

impl WeatherData {
    /// Build an observation, resolving the description from the WMO code table.
    #[must_use]
    pub fn from_observation(
        temperature: f64,
        weather_code: u16,
        wind_speed: f64,
        humidity: f64,
        precipitation: f64,
        cloud_cover: f64,
    ) -> Self {
        Self {
            temperature,
            weather_code,
            weather_description: weather_code_description(weather_code).to_string(),
            wind_speed,
            humidity,
            precipitation,
            cloud_cover,
        }
    }

    /// Conditions substituted when a weather lookup fails.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            temperature: NEUTRAL_TEMPERATURE_C,
            weather_code: 0,
            weather_description: UNKNOWN_WEATHER.to_string(),
            wind_speed: 0.0,
            humidity: NEUTRAL_HUMIDITY_PCT,
            precipitation: 0.0,
            cloud_cover: 0.0,
        }
    }
}

impl Default for WeatherData {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Mood category an NPC takes on from the local weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Energetic,
    #[default]
    Neutral,
    Calm,
    Sad,
}

impl MoodCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Energetic => "energetic",
            Self::Neutral => "neutral",
            Self::Calm => "calm",
            Self::Sad => "sad",
        }
    }

    /// Map an overall weather score onto a mood.
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score >= 5 {
            Self::Happy
        } else if score >= 2 {
            Self::Energetic
        } else if score >= -2 {
            Self::Neutral
        } else if score >= -5 {
            Self::Calm
        } else {
            Self::Sad
        }
    }

    /// Ingredients this mood adds to and removes from a requirement list.
    #[must_use]
    pub const fn ingredient_deltas(self) -> (&'static [&'static str], &'static [&'static str]) {
        match self {
            Self::Happy => (&["Fresh Mint", "Lemon Peel"], &[]),
            Self::Energetic => (&["Fresh Basil", "Ginger"], &[]),
            Self::Sad => (&["Honey", "Vermouth"], &["Fresh Basil"]),
            Self::Calm => (&["Honey", "Fresh Mint"], &["Ginger"]),
            Self::Neutral => (&[], &[]),
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "happy" => Ok(Self::Happy),
            "energetic" => Ok(Self::Energetic),
            "neutral" => Ok(Self::Neutral),
            "calm" => Ok(Self::Calm),
            "sad" => Ok(Self::Sad),
            _ => Err(()),
        }
    }
}

/// The five banded adjustments exactly as the bands produce them.
///
/// Kept apart from [`WeatherMoodModifier`] because NPC mood scores are derived
/// from these unclamped values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawModifiers {
    pub temperature: i32,
    pub precipitation: i32,
    pub cloudiness: i32,
    pub wind: i32,
    pub humidity: i32,
}

impl RawModifiers {
    #[must_use]
    pub fn from_weather(weather: &WeatherData) -> Self {
        Self {
            temperature: temperature_band(weather.temperature),
            precipitation: precipitation_band(weather.precipitation),
            cloudiness: cloudiness_band(weather.cloud_cover),
            wind: wind_band(weather.wind_speed),
            humidity: humidity_band(weather.humidity),
        }
    }

    #[must_use]
    pub const fn sum(&self) -> i32 {
        self.temperature + self.precipitation + self.cloudiness + self.wind + self.humidity
    }
}

/// Mood modifier returned to callers; every field is clamped to its range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherMoodModifier {
    pub temperature_modifier: i32,
    pub precipitation_modifier: i32,
    pub cloudiness_modifier: i32,
    pub wind_modifier: i32,
    pub humidity_modifier: i32,
    pub overall_mood: MoodCategory,
    pub suggested_ingredients: IngredientDelta,
    pub removed_ingredients: IngredientDelta,
    pub description: String,
}

impl WeatherMoodModifier {
    /// Sum of the clamped modifiers.
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.temperature_modifier
            + self.precipitation_modifier
            + self.cloudiness_modifier
            + self.wind_modifier
            + self.humidity_modifier
    }
}

fn temperature_band(celsius: f64) -> i32 {
    if celsius < 15.0 {
        -3
    } else if celsius < 18.0 {
        1
    } else if celsius <= 24.0 {
        3
    } else if celsius <= 28.0 {
        1
    } else {
        -2
    }
}

fn precipitation_band(mm: f64) -> i32 {
    if mm <= 0.0 {
        2
    } else if mm <= 1.0 {
        0
    } else if mm <= 5.0 {
        -2
    } else {
        -3
    }
}

fn cloudiness_band(pct: f64) -> i32 {
    if pct <= 25.0 {
        2
    } else if pct <= 50.0 {
        1
    } else if pct <= 75.0 {
        -1
    } else {
        -2
    }
}

fn wind_band(kmh: f64) -> i32 {
    if kmh <= 10.0 {
        1
    } else if kmh <= 20.0 {
        0
    } else if kmh <= 30.0 {
        -1
    } else {
        -2
    }
}

fn humidity_band(pct: f64) -> i32 {
    if (40.0..=60.0).contains(&pct) { 1 } else { -1 }
}

const fn clamp_to(value: i32, range: (i32, i32)) -> i32 {
    if value < range.0 {
        range.0
    } else if value > range.1 {
        range.1
    } else {
        value
    }
}

fn to_delta(names: &[&str]) -> IngredientDelta {
    names.iter().map(|name| (*name).to_string()).collect()
}

/// Compute the mood modifier for an observation. Pure and infallible.
#[must_use]
pub fn calculate_mood_modifier(weather: &WeatherData) -> WeatherMoodModifier {
    let raw = RawModifiers::from_weather(weather);
    let mut modifier = WeatherMoodModifier {
        temperature_modifier: clamp_to(raw.temperature, TEMPERATURE_RANGE),
        precipitation_modifier: clamp_to(raw.precipitation, PRECIPITATION_RANGE),
        cloudiness_modifier: clamp_to(raw.cloudiness, CLOUDINESS_RANGE),
        wind_modifier: clamp_to(raw.wind, WIND_RANGE),
        humidity_modifier: clamp_to(raw.humidity, HUMIDITY_RANGE),
        overall_mood: MoodCategory::Neutral,
        suggested_ingredients: IngredientDelta::new(),
        removed_ingredients: IngredientDelta::new(),
        description: describe_conditions(weather),
    };

    let mood = MoodCategory::from_score(modifier.score());
    let (add, remove) = mood.ingredient_deltas();
    modifier.overall_mood = mood;
    modifier.suggested_ingredients = to_delta(add);
    modifier.removed_ingredients = to_delta(remove);
    modifier
}

/// NPC-facing mood score: twice the unclamped modifier sum.
#[must_use]
pub fn raw_mood_score(weather: &WeatherData) -> i32 {
    RawModifiers::from_weather(weather).sum() * 2
}

/// Drop removed ingredients, then append suggested ones not already present.
#[must_use]
pub fn apply_modifier_to_ingredients(
    base: &[String],
    modifier: &WeatherMoodModifier,
) -> Vec<String> {
    let mut adjusted: Vec<String> = base
        .iter()
        .filter(|name| !modifier.removed_ingredients.contains(*name))
        .cloned()
        .collect();

    for suggested in &modifier.suggested_ingredients {
        if !adjusted.contains(suggested) {
            adjusted.push(suggested.clone());
        }
    }
    adjusted
}

fn describe_conditions(weather: &WeatherData) -> String {
    format!(
        "Weather: {} | {}°C | {}% humidity",
        weather.weather_description,
        round_half_up_to_i32(weather.temperature),
        weather.humidity
    )
}

/// Short narrative line about how the weather is treating the locals.
#[must_use]
pub fn mood_flavor(weather: &WeatherData) -> &'static str {
    if weather.temperature > 28.0 {
        "It's too hot - the NPCs seem irritable and want refreshing drinks"
    } else if weather.temperature < 0.0 {
        "It's freezing - the NPCs are grumpy and want warm, comforting drinks"
    } else if weather.precipitation > 5.0 {
        "It's pouring rain - the NPCs are gloomy and need cheering up"
    } else if weather.wind_speed > 30.0 {
        "It's very windy - the NPCs are tense and irritable"
    } else if weather.cloud_cover > 75.0 && weather.precipitation <= 0.0 && weather.temperature < 15.0
    {
        "It's a dark, gloomy day - the NPCs are melancholic"
    } else if (18.0..=24.0).contains(&weather.temperature) && weather.cloud_cover <= 50.0 {
        "Perfect weather! The NPCs are happy and energetic"
    } else if weather.humidity < 30.0 {
        "It's very dry - the NPCs are thirsty"
    } else {
        "The weather is pleasant - the NPCs are in a neutral mood"
    }
}

/// WMO weather interpretation code description.
#[must_use]
pub const fn weather_code_description(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_WEATHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(temp: f64, precip: f64, cloud: f64, wind: f64, humidity: f64) -> WeatherData {
        WeatherData::from_observation(temp, 0, wind, humidity, precip, cloud)
    }

    #[test]
    fn ideal_conditions_are_happy() {
        for temp in [18.0, 21.5, 24.0] {
            for humidity in [40.0, 50.0, 60.0] {
                let weather = observation(temp, 0.0, 25.0, 10.0, humidity);
                let modifier = calculate_mood_modifier(&weather);
                assert_eq!(modifier.score(), 9);
                assert_eq!(modifier.overall_mood, MoodCategory::Happy);
            }
        }
    }

    #[test]
    fn harsh_conditions_are_sad() {
        let weather = observation(30.0, 10.0, 90.0, 35.0, 20.0);
        let modifier = calculate_mood_modifier(&weather);
        assert_eq!(modifier.temperature_modifier, -2);
        assert_eq!(modifier.precipitation_modifier, -3);
        assert_eq!(modifier.cloudiness_modifier, -2);
        assert_eq!(modifier.wind_modifier, -2);
        assert_eq!(modifier.humidity_modifier, -1);
        assert_eq!(modifier.score(), -10);
        assert_eq!(modifier.overall_mood, MoodCategory::Sad);
        assert_eq!(
            modifier.suggested_ingredients.as_slice(),
            ["Honey".to_string(), "Vermouth".to_string()]
        );
        assert_eq!(
            modifier.removed_ingredients.as_slice(),
            ["Fresh Basil".to_string()]
        );
    }

    #[test]
    fn temperature_band_edges() {
        assert_eq!(temperature_band(14.9), -3);
        assert_eq!(temperature_band(15.0), 1);
        assert_eq!(temperature_band(17.9), 1);
        assert_eq!(temperature_band(18.0), 3);
        assert_eq!(temperature_band(24.0), 3);
        assert_eq!(temperature_band(24.1), 1);
        assert_eq!(temperature_band(28.0), 1);
        assert_eq!(temperature_band(28.1), -2);
    }

    #[test]
    fn precipitation_cloud_wind_edges() {
        assert_eq!(precipitation_band(0.0), 2);
        assert_eq!(precipitation_band(0.5), 0);
        assert_eq!(precipitation_band(1.0), 0);
        assert_eq!(precipitation_band(5.0), -2);
        assert_eq!(precipitation_band(5.1), -3);
        assert_eq!(cloudiness_band(50.0), 1);
        assert_eq!(cloudiness_band(75.0), -1);
        assert_eq!(cloudiness_band(76.0), -2);
        assert_eq!(wind_band(20.0), 0);
        assert_eq!(wind_band(30.0), -1);
        assert_eq!(wind_band(30.5), -2);
        assert_eq!(humidity_band(39.9), -1);
        assert_eq!(humidity_band(60.1), -1);
    }

    #[test]
    fn score_thresholds_map_to_moods() {
        assert_eq!(MoodCategory::from_score(5), MoodCategory::Happy);
        assert_eq!(MoodCategory::from_score(4), MoodCategory::Energetic);
        assert_eq!(MoodCategory::from_score(2), MoodCategory::Energetic);
        assert_eq!(MoodCategory::from_score(1), MoodCategory::Neutral);
        assert_eq!(MoodCategory::from_score(-2), MoodCategory::Neutral);
        assert_eq!(MoodCategory::from_score(-3), MoodCategory::Calm);
        assert_eq!(MoodCategory::from_score(-5), MoodCategory::Calm);
        assert_eq!(MoodCategory::from_score(-6), MoodCategory::Sad);
    }

    #[test]
    fn modifier_application_removes_then_adds() {
        let weather = observation(10.0, 3.0, 60.0, 15.0, 50.0);
        let modifier = calculate_mood_modifier(&weather);
        assert_eq!(modifier.overall_mood, MoodCategory::Calm);

        let base = vec![
            "Gin".to_string(),
            "Ginger".to_string(),
            "Fresh Mint".to_string(),
        ];
        let adjusted = apply_modifier_to_ingredients(&base, &modifier);
        assert_eq!(adjusted, vec!["Gin", "Fresh Mint", "Honey"]);
    }

    #[test]
    fn neutral_mood_leaves_requirements_alone() {
        let modifier = calculate_mood_modifier(&observation(16.0, 0.5, 60.0, 15.0, 50.0));
        assert_eq!(modifier.overall_mood, MoodCategory::Neutral);
        let base = vec!["Rum".to_string(), "Cola".to_string()];
        assert_eq!(apply_modifier_to_ingredients(&base, &modifier), base);
    }

    #[test]
    fn raw_score_is_doubled_sum() {
        let weather = observation(30.0, 10.0, 90.0, 35.0, 20.0);
        assert_eq!(raw_mood_score(&weather), -20);
        assert_eq!(raw_mood_score(&WeatherData::neutral()), 18);
    }

    #[test]
    fn description_and_code_table() {
        let weather = WeatherData::from_observation(21.5, 63, 5.0, 45.0, 2.0, 80.0);
        let modifier = calculate_mood_modifier(&weather);
        assert_eq!(
            modifier.description,
            "Weather: Moderate rain | 22°C | 45% humidity"
        );
        assert_eq!(weather_code_description(42), "Unknown");
        assert_eq!(WeatherData::neutral().weather_description, "Unknown");
    }

    #[test]
    fn mood_flavor_follows_rule_order() {
        assert!(mood_flavor(&observation(31.0, 10.0, 0.0, 0.0, 50.0)).contains("too hot"));
        assert!(mood_flavor(&observation(-3.0, 0.0, 0.0, 0.0, 50.0)).contains("freezing"));
        assert!(mood_flavor(&observation(10.0, 8.0, 0.0, 0.0, 50.0)).contains("pouring"));
        assert!(mood_flavor(&observation(10.0, 0.0, 0.0, 40.0, 50.0)).contains("windy"));
        assert!(mood_flavor(&observation(10.0, 0.0, 90.0, 0.0, 50.0)).contains("gloomy"));
        assert!(mood_flavor(&observation(20.0, 0.0, 10.0, 0.0, 50.0)).contains("Perfect"));
        assert!(mood_flavor(&observation(10.0, 0.0, 10.0, 0.0, 20.0)).contains("dry"));
        assert!(mood_flavor(&observation(10.0, 0.0, 10.0, 0.0, 50.0)).contains("pleasant"));
    }

    #[test]
    fn mood_category_parses_and_displays() {
        for mood in [
            MoodCategory::Happy,
            MoodCategory::Energetic,
            MoodCategory::Neutral,
            MoodCategory::Calm,
            MoodCategory::Sad,
        ] {
            assert_eq!(mood.as_str().parse::<MoodCategory>(), Ok(mood));
            assert_eq!(mood.to_string(), mood.as_str());
        }
        assert!("grumpy".parse::<MoodCategory>().is_err());
    }
}
