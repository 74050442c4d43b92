//! Console output
//!
//! Progress lines printed to stdout as `HH:MM:SS message`, colored by
//! severity. Formatting is a pure function; nothing is kept between calls.

use chrono::{Local, NaiveTime};

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[0;31m";
const GREEN: &str = "\x1b[0;32m";
const YELLOW: &str = "\x1b[0;33m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn color(self) -> Option<&'static str> {
        match self {
            Severity::Info => None,
            Severity::Success => Some(GREEN),
            Severity::Warning => Some(YELLOW),
            Severity::Error => Some(RED),
        }
    }
}

/// Format one console line
pub fn format_message(severity: Severity, message: &str, time: NaiveTime) -> String {
    let stamp = time.format("%H:%M:%S");
    match severity.color() {
        Some(color) => format!("{} {}{}{}", stamp, color, message, RESET),
        None => format!("{} {}", stamp, message),
    }
}

/// Print a line stamped with the local time
pub fn write(severity: Severity, message: &str) {
    println!("{}", format_message(severity, message, Local::now().time()));
}

pub fn info(message: &str) {
    write(Severity::Info, message);
}

pub fn success(message: &str) {
    write(Severity::Success, message);
}

pub fn warning(message: &str) {
    write(Severity::Warning, message);
}

pub fn error(message: &str) {
    write(Severity::Error, message);
}
