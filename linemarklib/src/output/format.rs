//! Bounded-width number formatting for badges and tooltips.
//!
//! Badge strings are at most two visible characters. Values too large for
//! the slot saturate; tooltips carry the exact numbers.

/// Marker prefixed to directory totals.
pub const AGGREGATE_MARKER: char = 'Σ';

/// Saturated badge for very large counts.
pub const SATURATED: &str = "k+";

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Integer division rounding half up, without overflow near `u64::MAX`.
fn div_round(n: u64, d: u64) -> u64 {
    n / d + u64::from((n % d) * 2 >= d)
}

/// Compact a count into at most two characters.
///
/// `0..=99` verbatim, then hundreds (`1H`..`9H`), thousands (`1k`..`9k`),
/// and `k+` for everything that would need a double-digit multiplier.
pub fn format_compact_number(n: u64) -> String {
    if n < 100 {
        return n.to_string();
    }
    if n < 1_000 {
        let hundreds = div_round(n, 100);
        if hundreds < 10 {
            return format!("{}H", hundreds);
        }
    }
    if n < 10_000 {
        let thousands = div_round(n, 1_000);
        if thousands < 10 {
            return format!("{}k", thousands);
        }
    }
    SATURATED.to_string()
}

/// Largest unit index whose scaled value is at least 1.
fn size_unit(bytes: u64) -> usize {
    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit + 1 < SIZE_UNITS.len() && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }
    unit
}

/// Human-readable size in base 1024, one decimal place at most.
pub fn format_file_size(bytes: u64) -> String {
    let unit = size_unit(bytes);
    if unit == 0 {
        return format!("{} B", bytes);
    }

    let scaled = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (scaled * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0} {}", rounded, SIZE_UNITS[unit])
    } else {
        format!("{:.1} {}", rounded, SIZE_UNITS[unit])
    }
}

/// Two-character size badge: digit plus unit initial (`7K`), or unit
/// initial plus `+` once the scaled value reaches two digits (`K+`).
pub fn format_size_badge(bytes: u64) -> String {
    let unit = size_unit(bytes);
    let initial = &SIZE_UNITS[unit][..1];
    let divisor = 1u64 << (10 * unit as u32);
    let value = div_round(bytes, divisor);
    if value < 10 {
        format!("{}{}", value, initial)
    } else {
        format!("{}+", initial)
    }
}

/// Directory badge: the aggregate marker followed by one character.
///
/// Single digits are shown as is; totals that compact to hundreds show `H`,
/// thousands or more show `k`, anything else (10..=99) shows `+`.
pub fn format_directory_badge(total: u64) -> String {
    if total < 10 {
        return format!("{}{}", AGGREGATE_MARKER, total);
    }
    let compact = format_compact_number(total);
    let suffix = if compact.ends_with('H') {
        'H'
    } else if compact.ends_with('k') || compact == SATURATED {
        'k'
    } else {
        '+'
    };
    format!("{}{}", AGGREGATE_MARKER, suffix)
}

/// Exact count with thousands separators, for tooltips.
pub fn format_exact(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
