//! Payment domain types.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use coursehaven_core::{CourseId, PaymentId, PaymentStatus, Price, UserId};

/// An immutable record of one monetary transaction.
///
/// Created in the same storage transaction as its paired [`Purchase`]; a
/// payment can never exist without a matching purchase (and vice versa).
/// The `amount` is the course price at purchase time, preserved even if the
/// course price later changes.
///
/// [`Purchase`]: super::Purchase
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Unique payment ID.
    pub id: PaymentId,
    /// The paying user.
    pub user_id: UserId,
    /// The purchased course.
    pub course_id: CourseId,
    /// Price snapshot taken when the purchase was committed.
    pub amount: Price,
    /// Last four digits of the card used, the only card data retained.
    pub card_last_four: String,
    /// Globally unique transaction identifier.
    pub transaction_id: TransactionId,
    /// Settlement status.
    pub status: PaymentStatus,
    /// When the payment was recorded.
    pub created_at: DateTime<Utc>,
}

/// A globally unique transaction identifier.
///
/// Format: `TXN` + Unix milliseconds + 9 random base-36 characters, e.g.
/// `TXN1754436221843K3G9QW2XA`. The random suffix gives 36^9 (~10^14)
/// variants per millisecond; the storage layer still carries a unique
/// constraint and the orchestrator regenerates on the (vanishingly rare)
/// collision rather than ever overwriting a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    const SUFFIX_LEN: usize = 9;

    /// Generate a fresh transaction identifier.
    #[must_use]
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let mut rng = rand::rng();
        let suffix: String = (0..Self::SUFFIX_LEN)
            .map(|_| {
                let digit = rng.random_range(0..36u32);
                char::from_digit(digit, 36)
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or('0')
            })
            .collect();
        Self(format!("TXN{millis}{suffix}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// SQLx support: stored as TEXT
impl sqlx::Type<sqlx::Postgres> for TransactionId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TransactionId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for TransactionId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
