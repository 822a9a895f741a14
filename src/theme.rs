//! Terminal palette & spinner helpers.
//!
//! One teal/amber palette for every CLI surface. Honours the `NO_COLOR`
//! env-var and the `--no-color` flag.
//!
//! | Token   | Hex       | Usage                |
//! |---------|-----------|----------------------|
//! | accent  | `#1F8A70` | headings, frames     |
//! | info    | `#4FB3BF` | values               |
//! | success | `#3FA34D` | success states       |
//! | warn    | `#E9A820` | warnings, skips      |
//! | error   | `#D64545` | errors, failures     |
//! | muted   | `#8A8177` | labels, metadata     |

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

// ── Colour control ──────────────────────────────────────────────────────────

static COLOR_DISABLED: AtomicBool = AtomicBool::new(false);

/// Turn colour off globally, for this module and the `colored` crate both.
pub fn disable_color() {
    colored::control::set_override(false);
    COLOR_DISABLED.store(true, Ordering::Relaxed);
}

/// Honour `--no-color` and the `NO_COLOR` env-var. Call once after CLI
/// parsing, before anything prints.
pub fn init_color(no_color_flag: bool) {
    let env_no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    if no_color_flag || env_no_color {
        disable_color();
    }
}

fn is_color() -> bool {
    !COLOR_DISABLED.load(Ordering::Relaxed)
}

// ── Tones ───────────────────────────────────────────────────────────────────

/// Palette hex values — source of truth.
pub mod palette {
    pub const ACCENT: (u8, u8, u8) = (0x1F, 0x8A, 0x70);
    pub const INFO: (u8, u8, u8) = (0x4F, 0xB3, 0xBF);
    pub const SUCCESS: (u8, u8, u8) = (0x3F, 0xA3, 0x4D);
    pub const WARN: (u8, u8, u8) = (0xE9, 0xA8, 0x20);
    pub const ERROR: (u8, u8, u8) = (0xD6, 0x45, 0x45);
    pub const MUTED: (u8, u8, u8) = (0x8A, 0x81, 0x77);
}

// Every helper hands back a plain `String`, ANSI-free when colour is off,
// so output composes with `format!` either way.

fn apply(text: &str, (r, g, b): (u8, u8, u8)) -> String {
    if is_color() {
        text.truecolor(r, g, b).to_string()
    } else {
        text.to_string()
    }
}

/// Primary accent for headings and frames.
pub fn accent(text: &str) -> String {
    apply(text, palette::ACCENT)
}

/// Highlighted values.
pub fn info(text: &str) -> String {
    apply(text, palette::INFO)
}

/// Something went right.
pub fn success(text: &str) -> String {
    apply(text, palette::SUCCESS)
}

/// Needs attention, not fatal.
pub fn warn(text: &str) -> String {
    apply(text, palette::WARN)
}

/// Something went wrong.
pub fn error(text: &str) -> String {
    apply(text, palette::ERROR)
}

/// Metadata and labels.
pub fn muted(text: &str) -> String {
    apply(text, palette::MUTED)
}

/// Accent, bold. Section headings.
pub fn heading(text: &str) -> String {
    if is_color() {
        let (r, g, b) = palette::ACCENT;
        text.truecolor(r, g, b).bold().to_string()
    } else {
        text.to_string()
    }
}

/// Terminal dim attribute.
pub fn dim(text: &str) -> String {
    if is_color() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

// ── Icon lines ──────────────────────────────────────────────────────────────

/// Success line with a green check.
pub fn icon_ok(label: &str) -> String {
    format!("{} {}", success("✓"), label)
}

/// Failure line with a red cross.
pub fn icon_fail(label: &str) -> String {
    format!("{} {}", error("✗"), label)
}

/// Warning line with a yellow sign.
pub fn icon_warn(label: &str) -> String {
    format!("{} {}", warn("⚠"), label)
}

/// Indented "Label: value" line, label muted, value highlighted.
pub fn label_value(label: &str, value: &str) -> String {
    format!("  {} {}", muted(&format!("{label}:")), info(value))
}

// ── Spinners ────────────────────────────────────────────────────────────────

const SPINNER_CHARS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Indeterminate spinner on stderr with a steady tick.
///
/// Finish it with [`spinner_ok`] / [`spinner_warn`] / [`spinner_fail`], or
/// clear it with `.finish_and_clear()`.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let template = if is_color() {
        "{spinner:.cyan} {msg}"
    } else {
        "{spinner} {msg}"
    };
    pb.set_style(
        ProgressStyle::with_template(template)
            .unwrap()
            .tick_strings(SPINNER_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Stop the spinner on a success line.
pub fn spinner_ok(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(icon_ok(message));
}

/// Stop the spinner on a warning line.
pub fn spinner_warn(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(icon_warn(message));
}

/// Stop the spinner on a failure line.
pub fn spinner_fail(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(icon_fail(message));
}

// ── Frames ──────────────────────────────────────────────────────────────────

/// Print `title` inside a rounded accent frame.
pub fn print_header(title: &str) {
    use unicode_width::UnicodeWidthStr;

    let inner = UnicodeWidthStr::width(title) + 4;
    println!();
    println!("{}", accent(&format!("╭{}╮", "─".repeat(inner))));
    println!("{}", accent(&format!("│  {title}  │")));
    println!("{}", accent(&format!("╰{}╯", "─".repeat(inner))));
    println!();
}
