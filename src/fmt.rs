use crate::calculator::round2;

/// Two-decimal display used for the strength figure.
pub fn strength(val: f64) -> String {
    format!("{:.2}", round2(val))
}

/// Numbers in preview tables: whole numbers stay whole, the rest get two decimals.
pub fn optional_number(val: Option<f64>) -> String {
    match val {
        None => String::new(),
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.2}"),
    }
}
