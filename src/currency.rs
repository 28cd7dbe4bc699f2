//! Currency formatting for the dashboard figures.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

/// Format `number` as dollars and cents, e.g. "$12.30" or "-$12.30".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();
    static NEGATIVE_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| currency_formatter("$"));
    let negative_fmt = NEGATIVE_FMT.get_or_init(|| currency_formatter("-$"));

    let formatted = if number < 0.0 {
        negative_fmt
            .as_ref()
            .map(|fmt| fmt.fmt_string(number.abs()))
    } else if number > 0.0 {
        positive_fmt.as_ref().map(|fmt| fmt.fmt_string(number))
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "$0.00".to_owned();
    };

    let Some(mut formatted_string) = formatted else {
        return format!("${number:.2}");
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    let bytes = formatted_string.as_bytes();
    if bytes.len() < 3 || bytes[bytes.len() - 3] != b'.' {
        if !formatted_string.contains('.') {
            formatted_string.push_str(".0");
        }
        formatted_string.push('0');
    }

    formatted_string
}

fn currency_formatter(prefix: &str) -> Option<Formatter> {
    match Formatter::currency(prefix) {
        Ok(formatter) => Some(formatter.precision(Precision::Decimals(2))),
        Err(error) => {
            tracing::error!("Could not create currency formatter for {prefix:?}: {error:?}");
            None
        }
    }
}
