use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 一列原始資料：保留檔案中的原始欄名（已 trim）與欄位順序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields(Vec<(String, String)>);

impl RawFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.0.push((header.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(h, _)| h.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|(_, v)| v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(h, v)| (h.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for RawFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (header, value) in &self.0 {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

/// 試算表中的一筆資料列，`row_number` 從 1 起算且不含標題列
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub row_number: usize,
    pub raw_fields: RawFields,
}

/// 無法解碼的資料列，仍要產生一筆失敗結果
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadableRow {
    pub row_number: usize,
    pub raw_fields: RawFields,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetRow {
    Row(ImportRow),
    Unreadable(UnreadableRow),
}

impl SheetRow {
    pub fn row_number(&self) -> usize {
        match self {
            SheetRow::Row(row) => row.row_number,
            SheetRow::Unreadable(row) => row.row_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Ordinary,
    Lifetime,
}

impl MembershipType {
    /// 不分大小寫，只接受 `ordinary` / `lifetime`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ordinary" => Some(MembershipType::Ordinary),
            "lifetime" => Some(MembershipType::Lifetime),
            _ => None,
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipType::Ordinary => write!(f, "ordinary"),
            MembershipType::Lifetime => write!(f, "lifetime"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Upi,
    Card,
    Netbanking,
    Qr,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "upi" => Some(PaymentMethod::Upi),
            "card" => Some(PaymentMethod::Card),
            "netbanking" => Some(PaymentMethod::Netbanking),
            "qr" => Some(PaymentMethod::Qr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Active,
    Expired,
    Rejected,
}

/// 通過驗證、已套用預設值與有效期間的會員資料
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMember {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub division: String,
    pub department: String,
    pub membership_type: MembershipType,
    pub place: String,
    pub unit: String,
    pub payment_method: PaymentMethod,
    pub payment_amount: f64,
    pub purchase_date: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// 寫入儲存端的新會員資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMembership {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: String,
    pub division: String,
    pub department: String,
    #[serde(rename = "type")]
    pub membership_type: MembershipType,
    pub place: String,
    pub unit: String,
    pub payment_method: PaymentMethod,
    pub payment_amount: f64,
    pub purchase_date: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub status: MembershipStatus,
}

impl From<NormalizedMember> for NewMembership {
    fn from(member: NormalizedMember) -> Self {
        Self {
            name: member.name,
            email: member.email,
            mobile: member.mobile,
            designation: member.designation,
            division: member.division,
            department: member.department,
            membership_type: member.membership_type,
            place: member.place,
            unit: member.unit,
            payment_method: member.payment_method,
            payment_amount: member.payment_amount,
            purchase_date: member.purchase_date,
            valid_from: member.valid_from,
            valid_until: member.valid_until,
            payment_status: PaymentStatus::Pending,
            status: MembershipStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub membership_id: String,
    #[serde(flatten)]
    pub details: NewMembership,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSuccess {
    pub row: usize,
    pub membership_id: String,
    pub name: String,
    pub email: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    pub row: usize,
    pub data: RawFields,
    pub error: String,
}

/// 一次匯入的彙總結果：`success.len() + failed.len() == total`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub total: usize,
    pub success: Vec<ImportSuccess>,
    pub failed: Vec<ImportFailure>,
}

impl ImportOutcome {
    pub fn record_success(&mut self, entry: ImportSuccess) {
        self.total += 1;
        self.success.push(entry);
    }

    pub fn record_failure(&mut self, entry: ImportFailure) {
        self.total += 1;
        self.failed.push(entry);
    }

    pub fn is_consistent(&self) -> bool {
        self.success.len() + self.failed.len() == self.total
    }
}

/// 回傳給呼叫端的 JSON 結構
#[derive(Debug, Clone, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    pub results: ImportOutcome,
}

impl ImportResponse {
    pub fn from_outcome(outcome: ImportOutcome) -> Self {
        let message = format!(
            "Bulk import completed: {} of {} rows imported, {} failed",
            outcome.success.len(),
            outcome.total,
            outcome.failed.len()
        );
        Self {
            success: true,
            message,
            results: outcome,
        }
    }
}
