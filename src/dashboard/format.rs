//! Text formatting for dashboard values.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use time::Date;

use crate::transaction::DATE_FORMAT;

/// Format `number` as a dollar amount with two decimal places, e.g. "$1,234.50".
pub fn format_currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .expect("\"$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .expect("\"-$\" is a valid currency prefix")
            .precision(Precision::Decimals(2))
    });

    let mut formatted = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // numfmt renders zero as "0" regardless of prefix.
        return "$0.00".to_owned();
    };

    // numfmt drops trailing zeros, e.g. "12.30" comes out as "12.3".
    match formatted.rsplit_once('.') {
        None => formatted.push_str(".00"),
        Some((_, decimals)) if decimals.len() == 1 => formatted.push('0'),
        Some(_) => {}
    }

    formatted
}

/// Format an optional transaction date, using "-" when there is none.
pub fn format_date(date: Option<Date>) -> String {
    date.and_then(|date| date.format(DATE_FORMAT).ok())
        .unwrap_or_else(|| "-".to_owned())
}
