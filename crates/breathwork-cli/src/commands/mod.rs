pub mod audio;
pub mod config;
pub mod history;
pub mod preset;
pub mod run;

use breathwork_core::session::PRACTICAL_RANGE;

/// clap parser for a duration or set count within the range the app allows.
pub fn parse_practical(value: &str) -> Result<u32, String> {
    let n: u32 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if PRACTICAL_RANGE.contains(&n) {
        Ok(n)
    } else {
        Err(format!(
            "must be between {} and {}",
            PRACTICAL_RANGE.start(),
            PRACTICAL_RANGE.end()
        ))
    }
}
