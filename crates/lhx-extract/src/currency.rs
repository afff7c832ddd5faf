//! Currency conversion and price detection over free-form listing text.
//!
//! Rates are a fixed USD-pivot table; this is demo-grade conversion for
//! display purposes, not a market feed. Unknown currency codes degrade to a
//! 1:1 rate and a `"<CODE> "` prefix rather than erroring.

use std::sync::LazyLock;

use regex::Regex;

/// Currency codes with a known exchange rate, in table order.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CHF", "INR", "AUD", "CAD", "CNY", "HKD", "SGD", "AED",
];

/// USD-relative exchange rate for `code`, or `None` for unknown codes.
fn exchange_rate(code: &str) -> Option<f64> {
    match code {
        "USD" => Some(1.0),
        "EUR" => Some(0.92),
        "GBP" => Some(0.79),
        "JPY" => Some(149.5),
        "CHF" => Some(0.88),
        "INR" => Some(83.12),
        "AUD" => Some(1.53),
        "CAD" => Some(1.36),
        "CNY" => Some(7.24),
        "HKD" => Some(7.82),
        "SGD" => Some(1.34),
        "AED" => Some(3.67),
        _ => None,
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" | "CNY" => Some("¥"),
        "CHF" => Some("CHF "),
        "INR" => Some("₹"),
        "AUD" => Some("A$"),
        "CAD" => Some("C$"),
        "HKD" => Some("HK$"),
        "SGD" => Some("S$"),
        "AED" => Some("AED "),
        _ => None,
    }
}

/// Converts `amount` from one currency to another through the USD pivot,
/// rounded to two decimal places.
///
/// Unknown codes fall back to a 1.0 rate so conversion never fails.
#[must_use]
pub fn convert_price(amount: f64, from_currency: &str, to_currency: &str) -> f64 {
    let from = exchange_rate(from_currency).unwrap_or(1.0);
    let to = exchange_rate(to_currency).unwrap_or(1.0);
    let usd_amount = amount / from;
    (usd_amount * to * 100.0).round() / 100.0
}

/// Formats an optional amount for display.
///
/// `None` renders the literal `"Price on request"`. Amounts are shown in
/// whole currency units with thousands separators; unmapped currencies get a
/// `"<CODE> "` text prefix instead of a symbol.
#[must_use]
pub fn format_price(amount: Option<f64>, currency: &str) -> String {
    let Some(amount) = amount else {
        return "Price on request".to_string();
    };

    match currency_symbol(currency) {
        Some(symbol) => format!("{symbol}{}", group_thousands(amount)),
        None => format!("{currency} {}", group_thousands(amount)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn group_thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// A price detected in free text, with its inferred currency and display form.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDetection {
    pub amount: Option<f64>,
    pub currency: String,
    pub display: String,
}

/// Ordered symbol/code price patterns. The dollar pattern is first on
/// purpose: text quoting several currencies resolves to the earliest entry.
static PRICE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\$\s*([\d,]+(?:\.\d{2})?)", "USD"),
        (r"€\s*([\d,]+(?:\.\d{2})?)", "EUR"),
        (r"£\s*([\d,]+(?:\.\d{2})?)", "GBP"),
        (r"¥\s*([\d,]+)", "JPY"),
        (r"₹\s*([\d,]+(?:\.\d{2})?)", "INR"),
        (r"(?i)CHF\s*([\d,]+(?:\.\d{2})?)", "CHF"),
        (r"(?i)USD\s*([\d,]+(?:\.\d{2})?)", "USD"),
        (r"(?i)EUR\s*([\d,]+(?:\.\d{2})?)", "EUR"),
        (r"(?i)GBP\s*([\d,]+(?:\.\d{2})?)", "GBP"),
    ]
    .into_iter()
    .map(|(pattern, code)| {
        (
            Regex::new(pattern).expect("price pattern must compile"),
            code,
        )
    })
    .collect()
});

/// Scans text for the first price match in the fixed pattern order.
///
/// No match yields `amount: None`, currency `"USD"`, and the
/// `"Price on request"` display literal.
#[must_use]
pub fn detect_price(text: &str) -> PriceDetection {
    for (pattern, currency) in PRICE_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            let raw = captures[1].replace(',', "");
            if let Ok(amount) = raw.parse::<f64>() {
                return PriceDetection {
                    amount: Some(amount),
                    currency: (*currency).to_string(),
                    display: format_price(Some(amount), currency),
                };
            }
        }
    }

    PriceDetection {
        amount: None,
        currency: "USD".to_string(),
        display: "Price on request".to_string(),
    }
}
