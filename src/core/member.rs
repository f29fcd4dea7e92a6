use crate::config::import_config::MemberDefaults;
use crate::core::fields::{resolve_fields, CanonicalField};
use crate::core::validity::{parse_purchase_date, validity_window};
use crate::domain::model::{MembershipType, NormalizedMember, PaymentMethod, RawFields};
use crate::utils::error::RowError;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 金額允許 `₹`、千分位逗號與前後空白
fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

/// 把一列原始資料轉成 `NormalizedMember`；驗證順序：必填、email、類型、付款、日期
pub fn normalize_member(
    raw: &RawFields,
    defaults: &MemberDefaults,
    processed_at: DateTime<Utc>,
) -> Result<NormalizedMember, RowError> {
    let fields = resolve_fields(raw);

    let missing = fields.missing_required();
    if !missing.is_empty() {
        return Err(RowError::MissingFields { fields: missing });
    }

    let required = |field: CanonicalField| fields.get(field).unwrap_or_default().to_string();

    let email = normalize_email(&required(CanonicalField::Email));
    if !email_pattern().is_match(&email) {
        return Err(RowError::InvalidEmail { value: email });
    }

    let type_value = required(CanonicalField::Type);
    let membership_type = MembershipType::parse(&type_value)
        .ok_or(RowError::InvalidType { value: type_value })?;

    let payment_method = match fields.get(CanonicalField::PaymentMethod) {
        Some(value) => PaymentMethod::parse(value).ok_or_else(|| {
            RowError::InvalidPaymentMethod {
                value: value.to_string(),
            }
        })?,
        None => defaults.payment_method,
    };

    let payment_amount = match fields.get(CanonicalField::PaymentAmount) {
        Some(value) => parse_amount(value).ok_or_else(|| RowError::InvalidPaymentAmount {
            value: value.to_string(),
        })?,
        None => defaults.amount_for(membership_type),
    };

    let purchase_date = match fields.get(CanonicalField::PurchaseDate) {
        Some(value) => {
            parse_purchase_date(value).ok_or_else(|| RowError::InvalidPurchaseDate {
                value: value.to_string(),
            })?
        }
        None => processed_at,
    };

    let (valid_from, valid_until) = validity_window(membership_type, purchase_date);

    Ok(NormalizedMember {
        name: required(CanonicalField::Name),
        email,
        mobile: required(CanonicalField::Mobile),
        designation: required(CanonicalField::Designation),
        division: required(CanonicalField::Division),
        department: required(CanonicalField::Department),
        membership_type,
        place: fields
            .get(CanonicalField::Place)
            .unwrap_or(defaults.place.as_str())
            .to_string(),
        unit: fields
            .get(CanonicalField::Unit)
            .unwrap_or(defaults.unit.as_str())
            .to_string(),
        payment_method,
        payment_amount,
        purchase_date,
        valid_from,
        valid_until,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn john(extra: &[(&str, &str)]) -> RawFields {
        let mut fields: RawFields = [
            ("name", "John Doe"),
            ("email", " John@X.com "),
            ("mobile", "9876543210"),
            ("designation", "JE"),
            ("division", "Bhusawal"),
            ("department", "Mechanical"),
        ]
        .into_iter()
        .collect();
        for (header, value) in extra {
            fields.push(*header, *value);
        }
        fields
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_fields() {
        let member =
            normalize_member(&john(&[("type", "ordinary")]), &MemberDefaults::default(), now())
                .unwrap();

        assert_eq!(member.email, "john@x.com");
        assert_eq!(member.place, "Not specified");
        assert_eq!(member.unit, "Not specified");
        assert_eq!(member.payment_method, PaymentMethod::Upi);
        assert_eq!(member.payment_amount, 500.0);
        assert_eq!(member.purchase_date, now());
        assert_eq!(member.valid_from, now());
        assert_eq!(
            member.valid_until,
            Utc.with_ymd_and_hms(2027, 3, 1, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_lifetime_default_amount() {
        let member =
            normalize_member(&john(&[("type", "Lifetime")]), &MemberDefaults::default(), now())
                .unwrap();
        assert_eq!(member.membership_type, MembershipType::Lifetime);
        assert_eq!(member.payment_amount, 5000.0);
    }

    #[test]
    fn test_explicit_payment_fields() {
        let member = normalize_member(
            &john(&[
                ("type", "ordinary"),
                ("Payment Method", "NetBanking"),
                ("Amount", "₹1,200"),
                ("Place", "Jalgaon"),
            ]),
            &MemberDefaults::default(),
            now(),
        )
        .unwrap();
        assert_eq!(member.payment_method, PaymentMethod::Netbanking);
        assert_eq!(member.payment_amount, 1200.0);
        assert_eq!(member.place, "Jalgaon");
    }

    #[test]
    fn test_invalid_type_names_value() {
        let err = normalize_member(&john(&[("type", "annual")]), &MemberDefaults::default(), now())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("annual"));
        assert!(message.contains("ordinary"));
        assert!(message.contains("lifetime"));
    }

    #[test]
    fn test_invalid_purchase_date_names_formats() {
        let err = normalize_member(
            &john(&[("type", "ordinary"), ("purchaseDate", "15.01.2024")]),
            &MemberDefaults::default(),
            now(),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("15.01.2024"));
        assert!(message.contains("YYYY-MM-DD"));
        assert!(message.contains("MM/DD/YYYY"));
    }

    #[test]
    fn test_invalid_payment_values() {
        let err = normalize_member(
            &john(&[("type", "ordinary"), ("paymentMethod", "cash")]),
            &MemberDefaults::default(),
            now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RowError::InvalidPaymentMethod {
                value: "cash".to_string()
            }
        );

        let err = normalize_member(
            &john(&[("type", "ordinary"), ("paymentAmount", "-10")]),
            &MemberDefaults::default(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, RowError::InvalidPaymentAmount { .. }));
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let base = john(&[("type", "ordinary")]);
        let raw: RawFields = base
            .iter()
            .map(|(h, v)| if h == "email" { (h, "not-an-email") } else { (h, v) })
            .collect();
        let err = normalize_member(&raw, &MemberDefaults::default(), now()).unwrap_err();
        assert!(matches!(err, RowError::InvalidEmail { .. }));
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let raw: RawFields = [
            ("name", "John Doe"),
            ("mobile", "9876543210"),
            ("designation", "JE"),
            ("division", "Bhusawal"),
            ("type", "ordinary"),
        ]
        .into_iter()
        .collect();
        let err = normalize_member(&raw, &MemberDefaults::default(), now()).unwrap_err();
        assert_eq!(
            err,
            RowError::MissingFields {
                fields: vec!["email", "department"]
            }
        );
    }
}
