//! Display formatting shared by every view.

/// Render a score with two decimals, or `N/A` when there is no score yet.
///
/// Zero, negative, and NaN inputs all mean "not scored" and never show as
/// `0.00`.
pub fn format_score(score: f64) -> String {
    if score > 0.0 {
        to_fixed(score, 2)
    } else {
        "N/A".to_owned()
    }
}

/// Render a percentage with one decimal.
pub fn format_percent(percent: f64) -> String {
    to_fixed(percent, 1)
}

/// Enough fractional digits to print any finite `f64` exactly.
const EXACT_DIGITS: usize = 1100;

/// Fixed-point text with `digits` decimals, rounded the way the dashboard
/// always has: on the exact binary value, with ties away from zero. So
/// `2.125` gives `2.13`, while `1.005` (stored just below the tie) gives
/// `1.00`.
///
/// Non-finite values are spelled `Infinity`, `-Infinity`, and `NaN`. A
/// negative value that rounds to zero keeps its sign (`-0.00`).
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }

    let exact = format!("{:.prec$}", value.abs(), prec = EXACT_DIGITS);
    let (whole, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = whole
        .bytes()
        .chain(frac.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .collect();

    if frac.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }

    let split = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..split].iter().map(|d| char::from(*d)));
    if digits > 0 {
        out.push('.');
        out.extend(kept[split..].iter().map(|d| char::from(*d)));
    }
    out
}

/// Insert a space before each capital that does not already follow one:
/// `IdentityStores` becomes `Identity Stores`.
pub fn split_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for ch in name.chars() {
        if let Some(p) = prev {
            if ch.is_uppercase() && p != ' ' {
                out.push(' ');
            }
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Section heading for a pillar in the questionnaire sidebar.
pub fn pillar_heading(pillar: &str) -> String {
    if pillar == "CrossCutting" {
        "CROSS CUTTING".to_owned()
    } else {
        pillar.to_uppercase()
    }
}

/// URL segment for a pillar.
pub fn pillar_slug(pillar: &str) -> String {
    if pillar == "CrossCutting" {
        "cross-cutting".to_owned()
    } else {
        pillar.to_lowercase()
    }
}

/// URL segment for a datacall: only the first space is replaced.
pub fn datacall_slug(datacall: &str) -> String {
    datacall.replacen(' ', "_", 1)
}

/// Deep-link path to one questionnaire step.
pub fn questionnaire_path(acronym: &str, datacall: &str, pillar: &str, function: &str) -> String {
    format!(
        "/questionnaire/{}/{}/{}/{}",
        acronym.to_lowercase(),
        datacall_slug(datacall),
        pillar_slug(pillar),
        function.to_lowercase()
    )
}
