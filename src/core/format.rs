//! Number and currency formatting shared by insights, reports and the shell.

pub const CURRENCY_SYMBOL: &str = "₹";

const MAX_FRACTION_DIGITS: u32 = 3;

/// Rounds half-up towards positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value + 0.5).floor()
}

/// Groups an amount with thousands separators and up to three fraction digits.
pub fn grouped(value: f64) -> String {
    if !value.is_finite() {
        return "0".into();
    }
    let scale = 10_u64.pow(MAX_FRACTION_DIGITS);
    let scaled = (value.abs() * scale as f64).round();
    if scaled == 0.0 {
        return "0".into();
    }
    let scaled = if scaled >= u64::MAX as f64 {
        u64::MAX
    } else {
        scaled as u64
    };
    let whole = scaled / scale;
    let fraction = scaled % scale;

    let digits = whole.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 6);
    if value < 0.0 {
        out.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if fraction > 0 {
        let frac = format!("{:0width$}", fraction, width = MAX_FRACTION_DIGITS as usize);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

/// Rupee amount, e.g. `₹12,500` or `-₹40.5`.
pub fn currency(value: f64) -> String {
    let body = grouped(value);
    match body.strip_prefix('-') {
        Some(rest) => format!("-{}{}", CURRENCY_SYMBOL, rest),
        None => format!("{}{}", CURRENCY_SYMBOL, body),
    }
}

/// Rupee amount after half-up rounding to a whole number.
pub fn currency_rounded(value: f64) -> String {
    currency(round_half_up(value))
}

/// One fraction digit. Ties round away from zero, so `-2.25` gives `-2.3`.
pub fn fixed1(value: f64) -> String {
    if !value.is_finite() {
        return "0.0".into();
    }
    let magnitude = round_half_up(value.abs() * 10.0) / 10.0;
    let text = format!("{:.1}", magnitude);
    if value < 0.0 && magnitude > 0.0 {
        format!("-{text}")
    } else {
        text
    }
}

/// `fixed1` followed by a percent sign.
pub fn percent(value: f64) -> String {
    format!("{}%", fixed1(value))
}

/// Percentage with an explicit `+` for positive values.
pub fn signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{}", percent(value))
    } else {
        percent(value)
    }
}

/// `numerator / denominator * 100`, or `0.0` when the denominator is not positive.
pub fn share_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && numerator.is_finite() {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}
