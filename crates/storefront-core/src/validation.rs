//! # Validation Module
//!
//! Input formatting and step guards for the checkout flow.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Formatters (every keystroke)                                 │
//! │  ├── format_card_number: "4242-4242..." → "4242 4242 ..."              │
//! │  └── format_expiry_date: "1225"         → "12/25"                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Step guards (on "Next")                                      │
//! │  ├── is_shipping_complete: required fields non-empty                   │
//! │  └── is_payment_complete:  length checks on card / cvv                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Diagnostics (optional, for the UI)                           │
//! │  └── shipping_errors / payment_errors: which field is blocking         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Card and cvv checks are length-only. There is no Luhn checksum and no
//! digit-class check on the cvv.

use crate::error::ValidationError;
use crate::types::{PaymentField, PaymentInfo, ShippingField, ShippingInfo};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum number of digits kept from a card number.
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Length of a complete canonical card number (16 digits + 3 spaces).
pub const FORMATTED_CARD_NUMBER_LEN: usize = 19;

/// Expected cvv length.
pub const CVV_LEN: usize = 3;

// =============================================================================
// Formatters
// =============================================================================

/// Canonicalizes a raw card number.
///
/// Strips every non-digit, keeps at most 16 digits and inserts one space
/// after every fourth digit.
///
/// ```rust
/// use storefront_core::validation::format_card_number;
///
/// assert_eq!(format_card_number("4242-4242 4242x4242"), "4242 4242 4242 4242");
/// assert_eq!(format_card_number("42424"), "4242 4");
/// ```
pub fn format_card_number(raw: &str) -> String {
    let mut formatted = String::with_capacity(FORMATTED_CARD_NUMBER_LEN);

    for (i, digit) in raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_NUMBER_DIGITS)
        .enumerate()
    {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(digit);
    }

    formatted
}

/// Canonicalizes a raw expiry date into `MM/YY`.
///
/// Strips every non-digit. Up to two digits are returned as typed; beyond
/// that the first two digits become the month and the next two the year.
/// Extra digits are dropped.
///
/// ```rust
/// use storefront_core::validation::format_expiry_date;
///
/// assert_eq!(format_expiry_date("1"), "1");
/// assert_eq!(format_expiry_date("1225"), "12/25");
/// assert_eq!(format_expiry_date("122599"), "12/25");
/// ```
pub fn format_expiry_date(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.len() <= 2 {
        return digits;
    }

    let month = &digits[..2];
    let year = &digits[2..digits.len().min(4)];
    format!("{}/{}", month, year)
}

// =============================================================================
// Step Guards
// =============================================================================

/// Shipping guard: every required field is non-empty.
pub fn is_shipping_complete(info: &ShippingInfo) -> bool {
    ShippingField::REQUIRED
        .iter()
        .all(|field| !info.get(*field).is_empty())
}

/// Payment guard: card name and expiry present, card number complete,
/// cvv exactly three characters.
pub fn is_payment_complete(info: &PaymentInfo) -> bool {
    payment_errors(info).is_empty()
}

// =============================================================================
// Diagnostics
// =============================================================================

/// Lists every required shipping field that is still empty.
///
/// ## Example
/// ```rust
/// use storefront_core::types::ShippingInfo;
/// use storefront_core::validation::shipping_errors;
///
/// let errors = shipping_errors(&ShippingInfo::default());
/// assert_eq!(errors.len(), 8); // country has a default
/// ```
pub fn shipping_errors(info: &ShippingInfo) -> Vec<ValidationError> {
    ShippingField::REQUIRED
        .iter()
        .filter(|field| info.get(**field).is_empty())
        .map(|field| ValidationError::Required {
            field: field.to_string(),
        })
        .collect()
}

/// Lists every payment field that blocks the payment step.
pub fn payment_errors(info: &PaymentInfo) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if info.card_name.is_empty() {
        errors.push(required(PaymentField::CardName));
    }

    if let Err(e) = exact_length(PaymentField::CardNumber, &info.card_number, FORMATTED_CARD_NUMBER_LEN) {
        errors.push(e);
    }

    if info.expiry_date.is_empty() {
        errors.push(required(PaymentField::ExpiryDate));
    }

    if let Err(e) = exact_length(PaymentField::Cvv, &info.cvv, CVV_LEN) {
        errors.push(e);
    }

    errors
}

/// Validates a quantity passed to an add-to-cart action.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Setting an existing line to zero or below is not an error; it removes the
/// line. Only `add` uses this check.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price handed over by the catalog.
///
/// Free items (0) are allowed; negative prices are not.
pub fn validate_price(price_cents: i64) -> ValidationResult<()> {
    if price_cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    Ok(())
}

fn required(field: PaymentField) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn exact_length(field: PaymentField, value: &str, expected: usize) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(required(field));
    }

    if value.chars().count() != expected {
        return Err(ValidationError::WrongLength {
            field: field.to_string(),
            expected,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_shipping() -> ShippingInfo {
        ShippingInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address: "12 Analytical Row".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "N1 9GU".to_string(),
            country: "UK".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
        }
    }

    fn complete_payment() -> PaymentInfo {
        PaymentInfo {
            card_name: "Ada Lovelace".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_date: "12/25".to_string(),
            cvv: "123".to_string(),
        }
    }

    #[test]
    fn test_format_card_number() {
        let formatted = format_card_number("4242-4242 4242x4242");
        assert_eq!(formatted, "4242 4242 4242 4242");
        assert_eq!(formatted.len(), FORMATTED_CARD_NUMBER_LEN);

        assert_eq!(format_card_number("4242424242424242"), "4242 4242 4242 4242");
        assert_eq!(format_card_number(""), "");
        assert_eq!(format_card_number("abcd"), "");
        assert_eq!(format_card_number("1234"), "1234");
        assert_eq!(format_card_number("12345"), "1234 5");
    }

    #[test]
    fn test_format_card_number_truncates_to_16_digits() {
        assert_eq!(
            format_card_number("4242 4242 4242 4242 9999"),
            "4242 4242 4242 4242"
        );
    }

    #[test]
    fn test_format_card_number_is_idempotent() {
        let once = format_card_number("4242424242");
        assert_eq!(format_card_number(&once), once);
    }

    #[test]
    fn test_format_expiry_date() {
        assert_eq!(format_expiry_date("1"), "1");
        assert_eq!(format_expiry_date("12"), "12");
        assert_eq!(format_expiry_date("123"), "12/3");
        assert_eq!(format_expiry_date("1225"), "12/25");
        assert_eq!(format_expiry_date("122599"), "12/25");
        assert_eq!(format_expiry_date("12/25"), "12/25");
        assert_eq!(format_expiry_date("ab"), "");
    }

    #[test]
    fn test_shipping_guard() {
        let mut info = complete_shipping();
        assert!(is_shipping_complete(&info));
        assert!(shipping_errors(&info).is_empty());

        info.email.clear();
        assert!(!is_shipping_complete(&info));
        assert_eq!(
            shipping_errors(&info),
            vec![ValidationError::Required {
                field: "email".to_string()
            }]
        );
    }

    #[test]
    fn test_shipping_guard_ignores_country() {
        let mut info = complete_shipping();
        info.country.clear();
        assert!(is_shipping_complete(&info));
    }

    #[test]
    fn test_payment_guard() {
        let info = complete_payment();
        assert!(is_payment_complete(&info));

        let mut short_card = complete_payment();
        short_card.card_number = "4242 4242".to_string();
        assert!(!is_payment_complete(&short_card));

        let mut long_cvv = complete_payment();
        long_cvv.cvv = "1234".to_string();
        assert!(!is_payment_complete(&long_cvv));

        let mut no_expiry = complete_payment();
        no_expiry.expiry_date.clear();
        assert!(!is_payment_complete(&no_expiry));
    }

    #[test]
    fn test_payment_guard_is_length_only() {
        // No checksum and no digit check on the cvv
        let info = PaymentInfo {
            card_name: "X".to_string(),
            card_number: "1111 1111 1111 1112".to_string(),
            expiry_date: "9".to_string(),
            cvv: "abc".to_string(),
        };
        assert!(is_payment_complete(&info));
    }

    #[test]
    fn test_payment_errors_lists_each_field() {
        let errors = payment_errors(&PaymentInfo::default());
        let fields: Vec<&str> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(fields, vec!["cardName", "cardNumber", "expiryDate", "cvv"]);

        let mut info = complete_payment();
        info.cvv = "12".to_string();
        assert_eq!(
            payment_errors(&info),
            vec![ValidationError::WrongLength {
                field: "cvv".to_string(),
                expected: 3
            }]
        );
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(250).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(1999).is_ok());

        let err = validate_price(-1).unwrap_err();
        assert_eq!(err.field(), "price");
    }
}
