use crate::domain::model::MembershipType;
use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};

/// 終身會員的到期日標記，代表「不會到期」
pub fn lifetime_sentinel() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 12, 31, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub fn is_lifetime_sentinel(date: &DateTime<Utc>) -> bool {
    date.date_naive() == lifetime_sentinel().date_naive()
}

/// 顯示用：終身會員顯示 `Lifetime`，其餘顯示日期
pub fn display_valid_until(date: &DateTime<Utc>) -> String {
    if is_lifetime_sentinel(date) {
        "Lifetime".to_string()
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// 回傳 `(valid_from, valid_until)`；一般會員為購買日加一年（2/29 落在 2/28）
pub fn validity_window(
    membership_type: MembershipType,
    purchase_date: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let valid_until = match membership_type {
        MembershipType::Lifetime => lifetime_sentinel(),
        MembershipType::Ordinary => purchase_date
            .checked_add_months(Months::new(12))
            .unwrap_or_else(lifetime_sentinel),
    };
    (purchase_date, valid_until)
}

pub const ACCEPTED_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// 解析購買日期：`YYYY-MM-DD`、`MM/DD/YYYY` 或 RFC 3339 時間戳
pub fn parse_purchase_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    for format in ACCEPTED_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
