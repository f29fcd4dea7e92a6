use crate::domain::model::RawFields;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Name,
    Email,
    Mobile,
    Designation,
    Division,
    Department,
    Type,
    Place,
    Unit,
    PaymentMethod,
    PaymentAmount,
    PurchaseDate,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Name => "name",
            CanonicalField::Email => "email",
            CanonicalField::Mobile => "mobile",
            CanonicalField::Designation => "designation",
            CanonicalField::Division => "division",
            CanonicalField::Department => "department",
            CanonicalField::Type => "type",
            CanonicalField::Place => "place",
            CanonicalField::Unit => "unit",
            CanonicalField::PaymentMethod => "paymentMethod",
            CanonicalField::PaymentAmount => "paymentAmount",
            CanonicalField::PurchaseDate => "purchaseDate",
        }
    }
}

/// 必填欄位，錯誤訊息依此順序列出
pub const REQUIRED_FIELDS: [CanonicalField; 7] = [
    CanonicalField::Name,
    CanonicalField::Email,
    CanonicalField::Mobile,
    CanonicalField::Designation,
    CanonicalField::Division,
    CanonicalField::Department,
    CanonicalField::Type,
];

/// 欄名同義詞表；同一欄位中，越前面的別名優先
pub const FIELD_ALIASES: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Name,
        &["name", "full name", "fullname", "member name"],
    ),
    (
        CanonicalField::Email,
        &["email", "email address", "e-mail", "mail"],
    ),
    (
        CanonicalField::Mobile,
        &["mobile", "phone", "contact", "mobile number", "phone number"],
    ),
    (
        CanonicalField::Designation,
        &["designation", "post", "position"],
    ),
    (CanonicalField::Division, &["division"]),
    (CanonicalField::Department, &["department", "dept"]),
    (
        CanonicalField::Type,
        &["type", "membership type", "member type"],
    ),
    (CanonicalField::Place, &["place", "location", "city"]),
    (CanonicalField::Unit, &["unit", "work unit"]),
    (
        CanonicalField::PaymentMethod,
        &[
            "paymentmethod",
            "payment method",
            "payment_method",
            "payment mode",
        ],
    ),
    (
        CanonicalField::PaymentAmount,
        &[
            "paymentamount",
            "payment amount",
            "payment_amount",
            "amount",
        ],
    ),
    (
        CanonicalField::PurchaseDate,
        &["purchasedate", "purchase date", "purchase_date", "date"],
    ),
];

/// 欄名正規化：小寫、trim、壓縮中間空白、去掉 BOM
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 依同義詞表解析出的欄位值（已 trim，且非空）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFields {
    values: HashMap<CanonicalField, String>,
}

impl ResolvedFields {
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .filter(|field| !self.values.contains_key(field))
            .map(|field| field.as_str())
            .collect()
    }
}

pub fn resolve_fields(raw: &RawFields) -> ResolvedFields {
    let normalized: Vec<(String, &str)> = raw
        .iter()
        .map(|(header, value)| (normalize_header(header), value.trim()))
        .collect();

    let mut values = HashMap::new();
    for (field, aliases) in FIELD_ALIASES {
        let found = aliases.iter().find_map(|alias| {
            normalized
                .iter()
                .find(|(header, value)| header == alias && !value.is_empty())
                .map(|(_, value)| value.to_string())
        });

        if let Some(value) = found {
            values.insert(*field, value);
        }
    }

    ResolvedFields { values }
}

/// 範本檔的標題列
pub fn template_headers() -> Vec<&'static str> {
    FIELD_ALIASES
        .iter()
        .map(|(field, _)| field.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawFields {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_synonym_headers_resolve_to_canonical_fields() {
        let fields = resolve_fields(&raw(&[
            ("Full Name", "John Doe"),
            ("Phone Number", "9876543210"),
            ("E-Mail", "john@x.com"),
        ]));

        assert_eq!(fields.get(CanonicalField::Name), Some("John Doe"));
        assert_eq!(fields.get(CanonicalField::Mobile), Some("9876543210"));
        assert_eq!(fields.get(CanonicalField::Email), Some("john@x.com"));
    }

    #[test]
    fn test_alias_order_breaks_ties() {
        let fields = resolve_fields(&raw(&[
            ("Phone", "1111111111"),
            ("Mobile", "2222222222"),
        ]));
        assert_eq!(fields.get(CanonicalField::Mobile), Some("2222222222"));
    }

    #[test]
    fn test_empty_value_falls_through_to_next_alias() {
        let fields = resolve_fields(&raw(&[("Mobile", "  "), ("Contact", "3333333333")]));
        assert_eq!(fields.get(CanonicalField::Mobile), Some("3333333333"));
    }

    #[test]
    fn test_headers_are_trimmed_and_case_folded() {
        assert_eq!(normalize_header("  Member   NAME "), "member name");
        assert_eq!(normalize_header("\u{feff}Email"), "email");

        let fields = resolve_fields(&raw(&[(" PAYMENT METHOD ", "card")]));
        assert_eq!(fields.get(CanonicalField::PaymentMethod), Some("card"));
    }

    #[test]
    fn test_missing_required_lists_every_field() {
        let fields = resolve_fields(&raw(&[
            ("name", "John"),
            ("mobile", "9876543210"),
            ("designation", "JE"),
            ("division", "Bhusawal"),
            ("type", "ordinary"),
        ]));
        assert_eq!(fields.missing_required(), vec!["email", "department"]);
    }

    #[test]
    fn test_template_headers_cover_every_field() {
        let headers = template_headers();
        assert_eq!(headers.len(), 12);
        assert_eq!(headers[0], "name");
        assert_eq!(headers[11], "purchaseDate");
    }
}
