use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of the string encoded in an attendance QR code.
pub const QR_PREFIX: &str = "hrm-attendance:";

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceCode {
    pub id: u64,
    pub token: String,
    pub location: Option<String>,
    pub valid_on: NaiveDate,
    pub expires_at: DateTime<Utc>,
}

impl AttendanceCode {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.valid_on == now.date_naive() && now < self.expires_at
    }
}

pub fn qr_payload(token: &str) -> String {
    format!("{}{}", QR_PREFIX, token)
}

/// Accepts either the bare token or the full scanned payload.
pub fn token_from_scan(scanned: &str) -> &str {
    let scanned = scanned.trim();
    scanned.strip_prefix(QR_PREFIX).unwrap_or(scanned).trim()
}
