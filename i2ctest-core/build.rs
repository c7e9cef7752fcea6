//! Build script for i2ctest-core
//!
//! Generates the default capacity of "brief" buffers. The value comes from
//! the `I2CTEST_BRIEF_LIMIT` environment variable when set, otherwise 16.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Capacity used when no override is given
const DEFAULT_BRIEF_LIMIT: usize = 16;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=I2CTEST_BRIEF_LIMIT");

    let limit = match env::var("I2CTEST_BRIEF_LIMIT") {
        Ok(value) => parse_limit(&value),
        Err(_) => DEFAULT_BRIEF_LIMIT,
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(
        out_dir.join("brief_limit.rs"),
        format!(
            "/// Capacity of \"brief\" fixed-size byte buffers\n\
             pub const BRIEF_LIMIT: usize = {};\n",
            limit
        ),
    )
    .unwrap();

    if limit != DEFAULT_BRIEF_LIMIT {
        println!("cargo:warning=I2C brief buffer capacity overridden to {}", limit);
    }
}

/// Parse and validate the override value
fn parse_limit(value: &str) -> usize {
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => limit,
        _ => panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid I2CTEST_BRIEF_LIMIT                              ║\n\
            ║                                                                  ║\n\
            ║  Value: {:<56} ║\n\
            ║  The brief buffer capacity must be a positive integer.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            value
        ),
    }
}
