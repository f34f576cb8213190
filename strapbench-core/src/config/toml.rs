//! Simple TOML parser for the rig configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `rig.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys
//!
//! Keys that are not present keep their default value.

use heapless::String as HString;

use super::rig::{ConfigError, RigConfig, StepTimings};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Invalid value type
    InvalidValue,
    /// Key not known in this section
    UnknownKey,
    /// String longer than the label capacity
    LabelTooLong,
    /// Parsed values failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Timing,
    Pressure,
    Policy,
    Steps,
}

/// Parse TOML text into a validated [`RigConfig`]
pub fn parse_rig_config(input: &str) -> Result<RigConfig, ParseError> {
    let mut config = RigConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(line[1..line.len() - 1].trim())?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        match section {
            Section::Root => apply_root(&mut config, key, value)?,
            Section::Timing => apply_timing(&mut config, key, value)?,
            Section::Pressure => apply_pressure(&mut config, key, value)?,
            Section::Policy => apply_policy(&mut config, key, value)?,
            Section::Steps => apply_step(&mut config.timings, key, value)?,
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header {
        "timing" => Ok(Section::Timing),
        "pressure" => Ok(Section::Pressure),
        "policy" => Ok(Section::Policy),
        "steps" => Ok(Section::Steps),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseError::InvalidValue)
    }
}

fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    // TOML allows `_` as a digit separator
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_root(config: &mut RigConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "label" => {
            let s = parse_string(value)?;
            config.label = HString::try_from(s).map_err(|_| ParseError::LabelTooLong)?;
        }
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_timing(config: &mut RigConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "tick_interval_ms" => config.tick_interval_ms = parse_int(value)?,
        "startup_delay_ms" => config.startup_delay_ms = parse_int(value)?,
        "stall_timeout_ms" => config.stall_timeout_ms = parse_int(value)?,
        "counter_reset_hold_ms" => config.counter_reset_hold_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_pressure(config: &mut RigConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "counts_per_bar" => config.counts_per_bar = parse_float(value)?,
        "force_per_bar" => config.force_per_bar = parse_float(value)?,
        "calm_deadband_bar" => config.calm_deadband_bar = parse_float(value)?,
        "vent_threshold_bar" => config.vent_threshold_bar = parse_float(value)?,
        "max_tool_force" => config.max_tool_force = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_policy(config: &mut RigConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "dry_run" => config.dry_run = parse_bool(value)?,
        "material_absence_is_error" => config.material_absence_is_error = parse_bool(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_step(timings: &mut StepTimings, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "wake_extend_ms" => timings.wake_extend_ms = parse_int(value)?,
        "wake_retract_ms" => timings.wake_retract_ms = parse_int(value)?,
        "cut_extend_ms" => timings.cut_extend_ms = parse_int(value)?,
        "cut_retract_ms" => timings.cut_retract_ms = parse_int(value)?,
        "tail_feed_ms" => timings.tail_feed_ms = parse_int(value)?,
        "clamp_settle_ms" => timings.clamp_settle_ms = parse_int(value)?,
        "fill_wait_ms" => timings.fill_wait_ms = parse_int(value)?,
        "fill_pulse_ms" => timings.fill_pulse_ms = parse_int(value)?,
        "fill_margin_n" => timings.fill_margin_n = parse_int(value)?,
        "fill_confirmations" => timings.fill_confirmations = parse_int(value)?,
        "tension_settle_ms" => timings.tension_settle_ms = parse_int(value)?,
        "weld_extend_ms" => timings.weld_extend_ms = parse_int(value)?,
        "weld_retract_ms" => timings.weld_retract_ms = parse_int(value)?,
        "vent_settle_ms" => timings.vent_settle_ms = parse_int(value)?,
        "rocker_extend_ms" => timings.rocker_extend_ms = parse_int(value)?,
        "rocker_retract_ms" => timings.rocker_retract_ms = parse_int(value)?,
        "release_settle_ms" => timings.release_settle_ms = parse_int(value)?,
        "return_settle_ms" => timings.return_settle_ms = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_rig_config("").unwrap(), RigConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let text = r#"
label = "bench-2"   # second rig

[timing]
tick_interval_ms = 5
stall_timeout_ms = 20_000

[pressure]
counts_per_bar = 111.112
calm_deadband_bar = 0.02

[policy]
dry_run = true
material_absence_is_error = true

[steps]
vent_settle_ms = 3000
fill_confirmations = 10
"#;
        let config = parse_rig_config(text).unwrap();
        assert_eq!(config.label.as_str(), "bench-2");
        assert_eq!(config.tick_interval_ms, 5);
        assert_eq!(config.stall_timeout_ms, 20_000);
        assert!((config.counts_per_bar - 111.112).abs() < 1e-3);
        assert!((config.calm_deadband_bar - 0.02).abs() < 1e-6);
        assert!(config.dry_run);
        assert!(config.material_absence_is_error);
        assert_eq!(config.timings.vent_settle_ms, 3000);
        assert_eq!(config.timings.fill_confirmations, 10);
        // Untouched keys keep defaults
        assert_eq!(config.timings.weld_retract_ms, 2000);
    }

    #[test]
    fn test_parse_key_value_strips_comment() {
        assert_eq!(parse_key_value("a = 5 # five"), Some(("a", "5")));
        assert_eq!(
            parse_key_value(r#"label = "x#y""#),
            Some(("label", r#""x#y""#))
        );
        assert_eq!(parse_key_value("a ="), None);
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_rig_config("[heaters]\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_rig_config("[timing]\nspeed = 4\n"),
            Err(ParseError::UnknownKey)
        );
    }

    #[test]
    fn test_bad_value() {
        assert_eq!(
            parse_rig_config("[policy]\ndry_run = yes\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_rig_config("[timing]\ntick_interval_ms = -3\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_label_too_long() {
        assert_eq!(
            parse_rig_config("label = \"a label far too long for the rig\"\n"),
            Err(ParseError::LabelTooLong)
        );
    }

    #[test]
    fn test_validation_runs_after_parse() {
        assert_eq!(
            parse_rig_config("[timing]\ntick_interval_ms = 0\n"),
            Err(ParseError::Invalid(ConfigError::ZeroTickInterval))
        );
    }
}
