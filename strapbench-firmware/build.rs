//! Build script for strapbench-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates rig.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Longest rig label the firmware accepts
const MAX_LABEL_LEN: usize = 16;

/// Integer keys per section
const INTEGER_KEYS: &[(&str, &[&str])] = &[
    (
        "timing",
        &[
            "tick_interval_ms",
            "startup_delay_ms",
            "stall_timeout_ms",
            "counter_reset_hold_ms",
        ],
    ),
    ("pressure", &["max_tool_force"]),
    (
        "steps",
        &[
            "wake_extend_ms",
            "wake_retract_ms",
            "cut_extend_ms",
            "cut_retract_ms",
            "tail_feed_ms",
            "clamp_settle_ms",
            "fill_wait_ms",
            "fill_pulse_ms",
            "fill_margin_n",
            "fill_confirmations",
            "tension_settle_ms",
            "weld_extend_ms",
            "weld_retract_ms",
            "vent_settle_ms",
            "rocker_extend_ms",
            "rocker_retract_ms",
            "release_settle_ms",
            "return_settle_ms",
        ],
    ),
];

/// Float keys per section
const FLOAT_KEYS: &[(&str, &[&str])] = &[(
    "pressure",
    &[
        "counts_per_bar",
        "force_per_bar",
        "calm_deadband_bar",
        "vent_threshold_bar",
    ],
)];

/// Boolean keys per section
const BOOL_KEYS: &[(&str, &[&str])] = &[("policy", &["dry_run", "material_absence_is_error"])];

/// Keys that must never be zero
const NONZERO_KEYS: &[&str] = &[
    "tick_interval_ms",
    "wake_extend_ms",
    "cut_extend_ms",
    "weld_extend_ms",
    "rocker_extend_ms",
    "fill_pulse_ms",
    "fill_confirmations",
    "max_tool_force",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate rig.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=rig.toml");

    let config_path = Path::new("rig.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: rig.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds rig.toml as its default configuration.      ║\n\
            ║  Please create one in the strapbench-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read rig.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in rig.toml                          ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_root(&config, &mut errors);
    validate_sections(&config, &mut errors);
    validate_limits(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid rig configuration in rig.toml                    ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=rig.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn keys_for<'a>(table: &'a [(&str, &'a [&'a str])], section: &str) -> &'a [&'a str] {
    table
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// Root level holds only the label and the section tables
fn validate_root(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("rig.toml must be a table".to_string());
        return;
    };

    for (key, value) in root {
        match (key.as_str(), value) {
            ("label", toml::Value::String(label)) => {
                if label.len() > MAX_LABEL_LEN {
                    errors.push(format!("label longer than {} bytes", MAX_LABEL_LEN));
                }
            }
            ("label", _) => errors.push("label must be a string".to_string()),
            ("timing" | "pressure" | "policy" | "steps", toml::Value::Table(_)) => {}
            ("timing" | "pressure" | "policy" | "steps", _) => {
                errors.push(format!("[{}] must be a table", key))
            }
            _ => errors.push(format!("unknown key or section '{}'", key)),
        }
    }
}

/// Every key is known and has the right type
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["timing", "pressure", "policy", "steps"] {
        let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
            continue;
        };

        for (key, value) in table {
            let key = key.as_str();
            if keys_for(INTEGER_KEYS, section).contains(&key) {
                match value.as_integer() {
                    Some(v) if v >= 0 && v <= u32::MAX as i64 => {}
                    _ => errors.push(format!("[{}] {} must be a non-negative integer", section, key)),
                }
            } else if keys_for(FLOAT_KEYS, section).contains(&key) {
                let number = value.as_float().or_else(|| value.as_integer().map(|i| i as f64));
                match number {
                    Some(v) if v >= 0.0 => {}
                    _ => errors.push(format!("[{}] {} must be a non-negative number", section, key)),
                }
            } else if keys_for(BOOL_KEYS, section).contains(&key) {
                if value.as_bool().is_none() {
                    errors.push(format!("[{}] {} must be true or false", section, key));
                }
            } else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            }
        }
    }
}

/// Cross-field limits the firmware also checks at boot
fn validate_limits(config: &toml::Value, errors: &mut Vec<String>) {
    let integer = |section: &str, key: &str| {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_integer())
    };

    for section in ["timing", "pressure", "steps"] {
        for key in NONZERO_KEYS {
            if integer(section, key) == Some(0) {
                errors.push(format!("[{}] {} must not be zero", section, key));
            }
        }
    }

    if let Some(fill_confirmations) = integer("steps", "fill_confirmations") {
        if fill_confirmations > u8::MAX as i64 {
            errors.push("[steps] fill_confirmations must be at most 255".to_string());
        }
    }

    let tick = integer("timing", "tick_interval_ms").unwrap_or(10);
    let stall = integer("timing", "stall_timeout_ms").unwrap_or(15_000);
    if stall < tick {
        errors.push("[timing] stall_timeout_ms shorter than one tick".to_string());
    }

    for key in ["counts_per_bar", "force_per_bar"] {
        let value = config.get("pressure").and_then(|s| s.get(key));
        let number = value.and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)));
        if number == Some(0.0) {
            errors.push(format!("[pressure] {} must be positive", key));
        }
    }
}
