//! Terminal output helpers.

use std::sync::atomic::{AtomicBool, Ordering};

use ztmf_core::maturity::Tier;
use ztmf_core::trend::{Direction, Trend};

// ── ANSI color helpers ───────────────────────────────────────────────

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";
pub const WHITE: &str = "\x1b[37m";

static COLOR: AtomicBool = AtomicBool::new(true);

pub fn set_color(enabled: bool) {
    COLOR.store(enabled, Ordering::Relaxed);
}

/// Wrap `text` in `code` unless color is off.
pub fn paint(code: &str, text: &str) -> String {
    if COLOR.load(Ordering::Relaxed) {
        format!("{code}{text}{RESET}")
    } else {
        text.to_owned()
    }
}

pub fn bold(text: &str) -> String {
    paint(BOLD, text)
}

pub fn dim(text: &str) -> String {
    paint(DIM, text)
}

pub const BANNER_SMALL: &str = "◈ ZTMF";

// ── Pretty output helpers ────────────────────────────────────────────

pub fn header(icon: &str, title: &str) {
    println!("{}", paint(&format!("{BOLD}{CYAN}"), &format!("{icon} {title}")));
    println!("{}", dim("─────────────────────────────────────────"));
}

pub fn kv_line(key: &str, value: &str) {
    println!("  {} {}", dim(&format!("{key:<24}")), paint(WHITE, value));
}

pub fn success(msg: &str) {
    println!("{} {msg}", paint(&format!("{GREEN}{BOLD}"), "✓"));
}

pub fn warning(msg: &str) {
    println!("{} {}", paint(&format!("{YELLOW}{BOLD}"), "⚠"), paint(YELLOW, msg));
}

pub fn error_line(msg: &str) {
    eprintln!("  {} {msg}", paint(&format!("{RED}{BOLD}"), "✗ Error:"));
}

fn tier_code(tier: Tier) -> &'static str {
    match tier {
        Tier::NoScore => DIM,
        Tier::Traditional => MAGENTA,
        Tier::Initial => YELLOW,
        Tier::Advanced => GREEN,
        Tier::Optimal => CYAN,
    }
}

/// Score text tinted by its maturity tier.
pub fn score_chip(text: &str, tier: Tier) -> String {
    paint(tier_code(tier), text)
}

pub fn tier_label(tier: Tier) -> String {
    paint(tier_code(tier), tier.label())
}

fn direction_code(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => GREEN,
        Direction::Down => RED,
        Direction::Flat => YELLOW,
        Direction::None => DIM,
    }
}

pub fn trend_glyph(trend: &Trend) -> String {
    paint(direction_code(trend.direction), trend.direction.glyph())
}

pub fn trend_line(text: &str, trend: &Trend) -> String {
    paint(direction_code(trend.direction), text)
}

/// Render rows as left-aligned columns under a dimmed header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!(
        "  {}",
        dim(&line(headers.iter().map(|h| (*h).to_owned()).collect()))
    );
    for row in rows {
        println!("  {}", line(row.clone()));
    }
}
