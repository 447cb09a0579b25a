//! Minimal TOML reader for the device configuration
//!
//! Handles only the subset `device.toml` uses:
//! - `[section]` headers
//! - `key = value` pairs with string, integer and boolean values
//! - `#` comments, whole-line or trailing
//!
//! Unknown sections and keys are skipped so older firmware accepts newer
//! files.

use heapless::String;

use super::types::DeviceConfig;

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigErrorKind {
    /// `[` without a matching `]`
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String longer than its field allows
    TooLong,
}

/// Parse failure with the 1-based line it happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    pub line: usize,
    pub kind: ConfigErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Kernel,
    Display,
    Sensor,
    Wifi,
    Beeper,
    StatusLed,
    Unknown,
}

/// Parse a configuration file, starting from the defaults
pub fn parse_config(input: &str) -> Result<DeviceConfig, ConfigError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        let err = |kind| ConfigError {
            line: index + 1,
            kind,
        };

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(err(ConfigErrorKind::InvalidSection));
            }
            section = parse_section_header(header[1..header.len() - 1].trim());
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(err(ConfigErrorKind::InvalidLine))?;
        apply_value(&mut config, section, key, value).map_err(err)?;
    }

    Ok(config)
}

fn parse_section_header(name: &str) -> Section {
    match name {
        "kernel" => Section::Kernel,
        "display" => Section::Display,
        "sensor" => Section::Sensor,
        "wifi" => Section::Wifi,
        "beeper" => Section::Beeper,
        "status_led" => Section::StatusLed,
        _ => Section::Unknown,
    }
}

fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim(),
            _ => {}
        }
    }
    text
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value.trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string<const N: usize>(value: &str) -> Result<String<N>, ConfigErrorKind> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ConfigErrorKind::InvalidValue)?;
    let mut out = String::new();
    out.push_str(inner).map_err(|_| ConfigErrorKind::TooLong)?;
    Ok(out)
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigErrorKind> {
    strip_underscores(value)
        .parse()
        .map_err(|_| ConfigErrorKind::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigErrorKind::InvalidValue),
    }
}

/// TOML allows `_` between digits; strip them into a stack buffer
fn strip_underscores(value: &str) -> String<24> {
    let mut out = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        if out.push(c).is_err() {
            // Overlong numbers fail to parse anyway
            out.clear();
            break;
        }
    }
    out
}

fn apply_value(
    config: &mut DeviceConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigErrorKind> {
    match (section, key) {
        (Section::Kernel, "tick_period_ms") => {
            let period: u32 = parse_int(value)?;
            if period == 0 {
                return Err(ConfigErrorKind::InvalidValue);
            }
            config.kernel.tick_period_ms = period;
        }

        (Section::Display, "width") => config.display.width = parse_int(value)?,
        (Section::Display, "height") => config.display.height = parse_int(value)?,
        (Section::Display, "col_offset") => config.display.col_offset = parse_int(value)?,
        (Section::Display, "row_offset") => config.display.row_offset = parse_int(value)?,
        (Section::Display, "window_x") => config.display.window_x = parse_int(value)?,
        (Section::Display, "window_y") => config.display.window_y = parse_int(value)?,
        (Section::Display, "backlight_timeout_ms") => {
            config.display.backlight_timeout_ms = parse_int(value)?
        }
        (Section::Display, "inverted") => config.display.inverted = parse_bool(value)?,
        (Section::Display, "rotation") => {
            let rotation: u8 = parse_int(value)?;
            if rotation > 3 {
                return Err(ConfigErrorKind::InvalidValue);
            }
            config.display.rotation = Some(rotation);
        }

        (Section::Sensor, "poll_interval_ms") => config.sensor.poll_interval_ms = parse_int(value)?,

        (Section::Wifi, "ssid") => config.wifi.ssid = parse_string(value)?,
        (Section::Wifi, "password") => config.wifi.password = parse_string(value)?,
        (Section::Wifi, "sync_interval_ms") => config.wifi.sync_interval_ms = parse_int(value)?,

        (Section::Beeper, "volume_permille") => {
            let volume: u16 = parse_int(value)?;
            if volume > 1000 {
                return Err(ConfigErrorKind::InvalidValue);
            }
            config.beeper.volume_permille = volume;
        }

        (Section::StatusLed, "connected_interval") => {
            config.status_led.connected_interval = parse_int(value)?
        }
        (Section::StatusLed, "disconnected_interval") => {
            config.status_led.disconnected_interval = parse_int(value)?
        }

        _ => {}
    }

    Ok(())
}
