//! Color configuration for the TUI.

use ratatui::style::Color;
use serde::{de, Deserialize, Deserializer};

/// Configuration for all TUI colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    #[serde(deserialize_with = "deserialize_color")]
    pub active_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub inactive_border: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub selection_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub chip_selected_bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub chip_selected_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub chip_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_site: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_date: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub metadata_link: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_fg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub status_bg: Color,
    #[serde(deserialize_with = "deserialize_color")]
    pub toast_fg: Color,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            active_border: Color::Cyan,
            inactive_border: Color::DarkGray,
            selection_bg: Color::Cyan,
            selection_fg: Color::Black,
            chip_selected_bg: Color::Blue,
            chip_selected_fg: Color::White,
            chip_fg: Color::Gray,
            metadata_site: Color::Yellow,
            metadata_date: Color::Yellow,
            metadata_link: Color::Blue,
            status_fg: Color::White,
            status_bg: Color::DarkGray,
            toast_fg: Color::LightRed,
        }
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Color, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color_string(&s).map_err(de::Error::custom)
}

/// Parse a color name (case-insensitive, e.g. `"LightBlue"`) or a `#RRGGBB` /
/// `#RGB` hex code.
pub fn parse_color_string(s: &str) -> Result<Color, String> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| format!("Invalid hex color: {}", s));
    }

    let color = match s.to_lowercase().replace(['_', '-', ' '], "").as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        "white" => Color::White,
        "reset" | "default" => Color::Reset,
        _ => return Err(format!("Unknown color: {}", s)),
    };
    Ok(color)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let width = match hex.len() {
        6 => 2,
        3 => 1,
        _ => return None,
    };

    let mut channels = [0u8; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        let digits = &hex[i * width..(i + 1) * width];
        let value = u8::from_str_radix(digits, 16).ok()?;
        // "#RGB" is shorthand for "#RRGGBB".
        *channel = if width == 1 { value * 17 } else { value };
    }

    Some(Color::Rgb(channels[0], channels[1], channels[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color_string("LightBlue").unwrap(), Color::LightBlue);
        assert_eq!(parse_color_string("light_blue").unwrap(), Color::LightBlue);
        assert_eq!(parse_color_string("dark-grey").unwrap(), Color::DarkGray);
        assert_eq!(parse_color_string("Default").unwrap(), Color::Reset);
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(
            parse_color_string("#0172CB").unwrap(),
            Color::Rgb(0x01, 0x72, 0xCB)
        );
        assert_eq!(
            parse_color_string("#007bff").unwrap(),
            Color::Rgb(0x00, 0x7B, 0xFF)
        );
        assert_eq!(parse_color_string("#FA0").unwrap(), Color::Rgb(255, 170, 0));
    }

    #[test]
    fn test_parse_invalid_colors() {
        assert!(parse_color_string("sky").is_err());
        assert!(parse_color_string("#12345").is_err());
        assert!(parse_color_string("#XYZ").is_err());
        assert!(parse_color_string("#ééé").is_err());
    }

    #[test]
    fn test_color_config_from_toml() {
        let config: ColorConfig = toml::from_str("toast_fg = \"#FF0000\"").unwrap();
        assert_eq!(config.toast_fg, Color::Rgb(255, 0, 0));
        assert_eq!(config.chip_selected_bg, Color::Blue);
    }
}
