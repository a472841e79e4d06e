use mixtrail_game::npc::{NpcRequest, generate_npc};
use mixtrail_game::weather::raw_mood_score;
use mixtrail_game::{MoodCategory, NpcConfig, WeatherData, calculate_mood_modifier};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn steps(from: f64, to: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    let mut value = from;
    while value <= to + 1e-9 {
        values.push(value);
        value += step;
    }
    values
}

#[test]
fn pleasant_band_is_always_happy() {
    for temperature in steps(18.0, 24.0, 0.5) {
        for cloud in steps(0.0, 25.0, 5.0) {
            for wind in steps(0.0, 10.0, 2.5) {
                for humidity in steps(40.0, 60.0, 5.0) {
                    let weather =
                        WeatherData::from_observation(temperature, 1, wind, humidity, 0.0, cloud);
                    let modifier = calculate_mood_modifier(&weather);
                    assert_eq!(modifier.overall_mood, MoodCategory::Happy, "{weather:?}");
                    assert_eq!(modifier.score(), 9);
                }
            }
        }
    }
}

#[test]
fn miserable_day_is_sad() {
    let weather = WeatherData::from_observation(30.0, 65, 35.0, 20.0, 10.0, 90.0);
    let modifier = calculate_mood_modifier(&weather);
    assert_eq!(modifier.overall_mood, MoodCategory::Sad);
    assert_eq!(modifier.score(), -10);
    assert_eq!(raw_mood_score(&weather), -20);
    assert_eq!(modifier.removed_ingredients.as_slice(), ["Fresh Basil".to_string()]);
}

#[test]
fn sad_npcs_never_ask_for_basil_unless_base_lacks_it() {
    let weather = WeatherData::from_observation(30.0, 65, 35.0, 20.0, 10.0, 90.0);
    let config = NpcConfig {
        base_ingredients: vec![
            "Fresh Basil".into(),
            "Rum".into(),
            "Gin".into(),
            "Lime Juice".into(),
            "Mint".into(),
        ],
        ..NpcConfig::default()
    };
    for seed in 0..50 {
        let request = NpcRequest {
            weather: &weather,
            location_name: "Valence",
            held_ingredients: &[],
            timestamp: seed,
        };
        let npc = generate_npc(&request, &config, &mut SmallRng::seed_from_u64(seed.unsigned_abs()));
        assert!(!npc.current_requirements.iter().any(|r| r == "Fresh Basil"));
        for kept in npc.base_requirements.iter().filter(|r| *r != "Fresh Basil") {
            assert!(npc.current_requirements.contains(kept));
        }
        assert!(npc.current_requirements.iter().any(|r| r == "Honey"));
    }
}

#[test]
fn every_mood_is_reachable() {
    let cases = [
        (WeatherData::from_observation(21.0, 0, 5.0, 50.0, 0.0, 10.0), MoodCategory::Happy),
        (WeatherData::from_observation(16.0, 2, 15.0, 70.0, 0.0, 40.0), MoodCategory::Energetic),
        (WeatherData::from_observation(16.0, 3, 15.0, 50.0, 0.5, 60.0), MoodCategory::Neutral),
        (WeatherData::from_observation(10.0, 61, 15.0, 70.0, 0.5, 60.0), MoodCategory::Calm),
        (WeatherData::from_observation(5.0, 63, 35.0, 90.0, 6.0, 90.0), MoodCategory::Sad),
    ];
    for (weather, mood) in cases {
        assert_eq!(calculate_mood_modifier(&weather).overall_mood, mood, "{weather:?}");
    }
}
