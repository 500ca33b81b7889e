// Helpers for prices in the merchant's display format ("1.500,00 €")

use crate::error::ValidationError;

/// Parses a display price into cents.
///
/// Currency symbols and spaces are ignored, `.` is a thousands separator and `,` the
/// decimal separator. Extra decimals round half-up to the nearest cent.
pub fn parse_amount(price: &str) -> Result<u64, ValidationError> {
    let malformed = || ValidationError::MalformedAmount(price.to_string());

    if price.contains('-') {
        return Err(ValidationError::MalformedAmount(format!(
            "{price} is negative"
        )));
    }

    let cleaned: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    let (whole, fraction) = match cleaned.split_once(',') {
        Some((_, fraction)) if fraction.contains(',') => return Err(malformed()),
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| malformed())?
    };

    let digits: Vec<u64> = fraction
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(u64::from)
        .collect();
    let cents = digits.first().copied().unwrap_or(0) * 10 + digits.get(1).copied().unwrap_or(0);
    let round_up = digits.get(2).is_some_and(|d| *d >= 5);

    whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents + u64::from(round_up)))
        .ok_or_else(malformed)
}

// 150000 -> "1.500,00 €"
pub fn format_amount(cents: u64) -> String {
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{},{:02} €", grouped, cents % 100)
}

// d{1,3}(.ddd)*(,dd)? com € opcional
pub fn is_display_price(price: &str) -> bool {
    let body = price.trim();
    let body = body.strip_suffix('€').unwrap_or(body).trim_end();

    let (whole, fraction) = match body.split_once(',') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (body, None),
    };

    if let Some(fraction) = fraction {
        if fraction.len() != 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }

    let mut groups = whole.split('.');
    let leading_ok = groups
        .next()
        .is_some_and(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()));
    leading_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}
