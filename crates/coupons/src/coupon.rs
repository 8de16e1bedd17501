use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nilecart_core::{impl_uuid_id, DomainError, DomainResult, Entity};

/// Coupon identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponId(Uuid);

impl_uuid_id!(CouponId, "CouponId");

/// Percentage discount code. Codes are stored upper-normalized and must be
/// unique (enforced by the store). No expiry or usage count is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub discount_percentage: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(
        code: impl AsRef<str>,
        discount_percentage: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let code = normalize_code(code.as_ref());
        if code.is_empty() {
            return Err(DomainError::validation("coupon code must not be empty"));
        }
        if discount_percentage <= Decimal::ZERO || discount_percentage > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(
                "discount_percentage must be in (0, 100]",
            ));
        }

        Ok(Self {
            id: CouponId::new(),
            code,
            discount_percentage,
            is_active: true,
            created_at: now,
        })
    }

    /// Whether the coupon can currently be redeemed.
    pub fn is_redeemable(&self) -> bool {
        self.is_active
    }
}

impl Entity for Coupon {
    type Id = CouponId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Case-normalize a code the way it is stored and looked up.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
