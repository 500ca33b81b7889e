use crate::error::ValidationError;
use crate::models::payment::PaymentRequest;
use crate::utils::money::{is_display_price, parse_amount};

const SERVICE_MAX: usize = 200;
const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;
const PHONE_MIN: usize = 6;
const PHONE_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub service: String,
    pub amount_cents: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub fn validate(request: &PaymentRequest) -> Result<ValidatedRequest, ValidationError> {
    let service = request.service.trim();
    check_printable("service", service)?;
    let len = service.chars().count();
    if len == 0 || len > SERVICE_MAX {
        return Err(ValidationError::field("service", "must be 1-200 characters"));
    }

    let amount_cents = validate_price(&request.price)?;

    let name = request.name.trim();
    check_printable("name", name)?;
    let len = name.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(ValidationError::field("name", "must be 2-100 characters"));
    }

    let email = request.email.trim();
    if email.chars().count() > EMAIL_MAX || !is_email(email) {
        return Err(ValidationError::field("email", "must be a valid address"));
    }

    // checked as sent, stored trimmed
    let raw_phone = request.phone.as_deref().unwrap_or("");
    check_printable("phone", raw_phone)?;
    if !raw_phone.is_empty() && !is_phone(raw_phone) {
        return Err(ValidationError::field("phone", "must be 6-20 digits, spaces or +-()"));
    }
    let phone = raw_phone.trim();

    Ok(ValidatedRequest {
        service: service.to_string(),
        amount_cents,
        name: name.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
    })
}

// display format first, then a positive amount
pub fn validate_price(price: &str) -> Result<u64, ValidationError> {
    let price = price.trim();
    if !is_display_price(price) {
        return Err(ValidationError::MalformedAmount(price.to_string()));
    }
    match parse_amount(price)? {
        0 => Err(ValidationError::MalformedAmount(format!("{price} is zero"))),
        cents => Ok(cents),
    }
}

fn check_printable(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.chars().any(char::is_control) {
        return Err(ValidationError::field(field, "must not contain control characters"));
    }
    Ok(())
}

// local@domain.tld, no whitespace, exactly one '@'
fn is_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn is_phone(phone: &str) -> bool {
    let len = phone.chars().count();
    (PHONE_MIN..=PHONE_MAX).contains(&len)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')'))
}
