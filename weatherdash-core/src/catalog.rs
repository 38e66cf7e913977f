/// Label returned for any code that is not in [`CONDITIONS`].
pub const UNKNOWN_LABEL: &str = "Unknown";

/// WMO weather codes known to the widget, with their display labels.
pub const CONDITIONS: [(i32, &str); 22] = [
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
];

/// Human-readable condition for a weather code. Never fails.
pub fn label_for(code: i32) -> &'static str {
    CONDITIONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_LABEL)
}
