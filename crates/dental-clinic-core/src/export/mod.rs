//! Financial reporting and budget statements (JSON and CSV).

mod budget;
mod finance;

pub use budget::*;
pub use finance::*;

/// Quote a CSV field when it contains a delimiter, quote or line break.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Two-decimal money column.
pub(crate) fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}
