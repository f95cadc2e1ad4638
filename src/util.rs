use std::time::Duration;

const BILLION: f64 = 1_000_000_000.0;

pub fn format_market_cap(market_cap: Option<f64>) -> String {
    match market_cap.filter(|value| value.is_finite()) {
        Some(value) => format!("${:.2}B", value / BILLION),
        None => "n/a".to_owned(),
    }
}

pub fn format_change(change: Option<f64>) -> String {
    match change.filter(|value| value.is_finite()) {
        Some(value) if value >= 0.0 => format!("+{value:.2}%"),
        Some(value) => format!("{value:.2}%"),
        None => "n/a".to_owned(),
    }
}

/// Price with thousands separators; sub-unit prices keep six decimals so
/// small coins do not collapse to `$0`.
pub fn format_price(price: Option<f64>) -> String {
    let Some(value) = price.filter(|value| value.is_finite()) else {
        return "n/a".to_owned();
    };

    let decimals = if value.abs() >= 1.0 { 2 } else { 6 };
    let text = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let sign = if value < 0.0 { "-" } else { "" };

    if fraction.is_empty() {
        format!("{sign}${}", group_thousands(whole))
    } else {
        format!("{sign}${}.{fraction}", group_thousands(whole))
    }
}

pub fn format_age(age: Duration) -> String {
    let seconds = age.as_secs();
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}h", seconds / 3600)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
