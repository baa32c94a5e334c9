//! Display formatting shared by every front end.

/// Formats a successful result for display with `precision` decimal digits.
///
/// The value is rounded to `precision` digits. If what remains after the decimal
/// point is smaller than `10^-(precision + 1)` the value is shown as an integer,
/// otherwise trailing zeros are stripped.
///
/// # Examples
///
/// ```
/// use calc_engine::format::format_value;
///
/// assert_eq!(format_value(17.0, 6), "17");
/// assert_eq!(format_value(0.1 + 0.2, 6), "0.3");
/// assert_eq!(format_value(2.0 / 3.0, 3), "0.667");
/// ```
pub fn format_value(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let exponent = precision.min(i32::MAX as usize - 1) as i32;
    let factor = 10f64.powi(exponent);
    let scaled = value * factor;
    let rounded = if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    };

    let threshold = 10f64.powi(-(exponent + 1));
    if (rounded - rounded.floor()).abs() < threshold {
        let integer = format!("{:.0}", rounded);
        return if integer == "-0" { "0".into() } else { integer };
    }

    let text = format!("{:.*}", precision, rounded);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".into()
    } else {
        trimmed.to_string()
    }
}
