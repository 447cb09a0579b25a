//! Build script for beedesk-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Expected value type of a known key
#[derive(Clone, Copy)]
enum Kind {
    /// Integer within an inclusive range
    Int(i64, i64),
    /// String of at most this many bytes
    Str(usize),
    Bool,
}

/// Every key the firmware reads, by section
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    ("kernel", &[("tick_period_ms", Kind::Int(1, 60_000))]),
    (
        "display",
        &[
            ("width", Kind::Int(1, 162)),
            ("height", Kind::Int(1, 162)),
            ("col_offset", Kind::Int(0, 161)),
            ("row_offset", Kind::Int(0, 161)),
            ("window_x", Kind::Int(0, 161)),
            ("window_y", Kind::Int(0, 161)),
            ("backlight_timeout_ms", Kind::Int(0, u32::MAX as i64)),
            ("inverted", Kind::Bool),
            ("rotation", Kind::Int(0, 3)),
        ],
    ),
    (
        "sensor",
        &[("poll_interval_ms", Kind::Int(0, u32::MAX as i64))],
    ),
    (
        "wifi",
        &[
            ("ssid", Kind::Str(32)),
            ("password", Kind::Str(64)),
            ("sync_interval_ms", Kind::Int(0, u32::MAX as i64)),
        ],
    ),
    ("beeper", &[("volume_permille", Kind::Int(0, 1000))]),
    (
        "status_led",
        &[
            ("connected_interval", Kind::Int(1, 255)),
            ("disconnected_interval", Kind::Int(1, 255)),
        ],
    ),
];

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: device.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a device.toml configuration file.           ║\n\
            ║  Please create one in the beedesk-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read device.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in device.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let errors = validate_sections(&config);
    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid device configuration                             ║\n\
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

    println!("cargo:warning=device.toml validated successfully");
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

/// Check every known key's type and range
///
/// Unknown sections and keys only warn; the on-target reader skips them.
fn validate_sections(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return errors;
    };

    for (name, section) in root {
        let Some(keys) = SCHEMA.iter().find(|(s, _)| s == name).map(|(_, k)| *k) else {
            println!("cargo:warning=device.toml: unknown section [{}] is ignored", name);
            continue;
        };

        let Some(section) = section.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };

        for (key, value) in section {
            let Some(kind) = keys.iter().find(|(k, _)| k == key).map(|(_, kind)| *kind) else {
                println!("cargo:warning=device.toml: unknown key {}.{} is ignored", name, key);
                continue;
            };

            if let Err(e) = check_value(value, kind) {
                errors.push(format!("[{}] {} {}", name, key, e));
            }
        }
    }

    errors
}

fn check_value(value: &toml::Value, kind: Kind) -> Result<(), String> {
    match (kind, value) {
        (Kind::Int(min, max), toml::Value::Integer(n)) => {
            if *n < min || *n > max {
                return Err(format!("must be {}-{}", min, max));
            }
        }
        (Kind::Str(max), toml::Value::String(s)) => {
            if s.len() > max {
                return Err(format!("must be at most {} bytes", max));
            }
        }
        (Kind::Bool, toml::Value::Boolean(_)) => {}
        (Kind::Int(..), _) => return Err("must be an integer".to_string()),
        (Kind::Str(_), _) => return Err("must be a string".to_string()),
        (Kind::Bool, _) => return Err("must be true or false".to_string()),
    }
    Ok(())
}
