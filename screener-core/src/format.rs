// Display helpers. Every function here is total: missing values are defaulted to 0
// before they get here, and odd input (NaN, bad timestamps) renders as a placeholder.

use chrono::{DateTime, Utc};

use crate::models::parse_timestamp;

/// Scales to a K/M/B suffix with two decimals.
pub fn format_number(n: f64) -> String {
    if n >= 1e9 {
        format!("{:.2}B", n / 1e9)
    } else if n >= 1e6 {
        format!("{:.2}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.2}K", n / 1e3)
    } else {
        format!("{:.2}", n)
    }
}

/// USD with thousands separators, e.g. `$1,234.50`.
pub fn format_currency(n: f64) -> String {
    if !n.is_finite() {
        return "$0.00".to_string();
    }

    let fixed = format!("{:.2}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // -0.001 rounds to 0.00 and must not print as "-$0.00"
    let sign = if n < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// `format_number` with a dollar prefix; zero and NaN render as `$0.00`.
pub fn format_currency_millions(n: f64) -> String {
    if n == 0.0 || n.is_nan() {
        return "$0.00".to_string();
    }
    format!("${}", format_number(n))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Percentage {
    pub text: String,
    pub is_positive: bool,
}

pub fn format_percentage(p: f64) -> Percentage {
    // normalize -0.0 so it doesn't print as "+-0.00%"
    let p = if p == 0.0 { 0.0 } else { p };
    let is_positive = p >= 0.0;
    let text = if is_positive {
        format!("+{:.2}%", p)
    } else {
        format!("{:.2}%", p)
    };
    Percentage { text, is_positive }
}

/// Relative age of an ISO-8601 timestamp against the current clock.
pub fn time_ago(timestamp: &str) -> String {
    time_ago_at(timestamp, Utc::now())
}

/// Coarsest unit with a value of at least one, truncated: 90s is "1m ago".
pub fn time_ago_at(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_timestamp(timestamp) else {
        return "unknown".to_string();
    };

    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        format!("{seconds}s ago")
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

const MAX_PRICE_DECIMALS: usize = 12;

/// Token prices span many orders of magnitude; keep four significant digits below a cent,
/// switching to exponent form once that would need more than twelve decimals.
pub fn format_price(p: f64) -> String {
    if !p.is_finite() || p <= 0.0 {
        return "$0.00".to_string();
    }
    if p >= 1.0 {
        return format_currency(p);
    }

    let leading_zeros = (-p.log10()).floor() as usize;
    if leading_zeros + 4 > MAX_PRICE_DECIMALS {
        return format!("${:.3e}", p);
    }
    format!("${:.*}", (leading_zeros + 4).max(2), p)
}

/// Integer count with thousands separators.
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
