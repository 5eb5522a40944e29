//! Human-readable rendering of fitted polynomial coefficients.

/// Renders `y = w_d·x^d + … + w_1·x + (bias + w_0)`.
///
/// Coefficients are rounded to two decimals with trailing zeros stripped;
/// terms that round to zero are dropped and a unit coefficient on an `x` term
/// is left implicit. Negative terms are written as `- c`.
///
/// # Example
/// ```rust
/// use regression_playground::equation::format_equation;
///
/// assert_eq!(format_equation(&[2.0, 1.0], 0.5), "y = x + 2.5");
/// assert_eq!(format_equation(&[0.0, -0.5, 3.0], 1.0), "y = 3x^2 - 0.5x + 1");
/// ```
pub fn format_equation(weights: &[f64], bias: f64) -> String {
    let mut terms: Vec<(bool, String)> = Vec::with_capacity(weights.len());

    for (power, &w) in weights.iter().enumerate().skip(1).rev() {
        let Some(coef) = format_coefficient(w) else {
            continue;
        };
        let coef = if coef == "1" { String::new() } else { coef };
        let var = if power == 1 {
            "x".to_string()
        } else {
            format!("x^{power}")
        };
        terms.push((w < 0.0, format!("{coef}{var}")));
    }

    let constant = bias + weights.first().copied().unwrap_or(0.0);
    if let Some(coef) = format_coefficient(constant) {
        terms.push((constant < 0.0, coef));
    }

    if terms.is_empty() {
        return "y = 0".to_string();
    }

    let mut out = String::from("y = ");
    for (i, (negative, body)) in terms.iter().enumerate() {
        match (i, negative) {
            (0, true) => out.push('-'),
            (0, false) => {}
            (_, true) => out.push_str(" - "),
            (_, false) => out.push_str(" + "),
        }
        out.push_str(body);
    }
    out
}

/// Absolute value at two decimals, trailing zeros stripped. `None` when it
/// rounds to zero or is not finite.
fn format_coefficient(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let text = format!("{:.2}", value.abs());
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "0" || text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
