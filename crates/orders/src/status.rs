use serde::{Deserialize, Serialize};

use nilecart_core::{DomainError, DomainResult};

/// Order status lifecycle.
///
/// `Pending → Confirmed → Delivered`; `Canceled` is reachable from `Pending`
/// or `Confirmed` only. `Delivered` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Canceled)
    }

    /// Check a requested transition against the state machine.
    ///
    /// Forward edges only; re-requesting the current status is rejected so a
    /// repeated `confirmed` update cannot re-fire the receipt notification.
    pub fn validate_transition(self, to: OrderStatus) -> DomainResult<()> {
        use OrderStatus::*;

        let allowed = matches!(
            (self, to),
            (Pending, Confirmed) | (Pending, Canceled) | (Confirmed, Delivered) | (Confirmed, Canceled)
        );

        if allowed {
            return Ok(());
        }

        if self == Delivered && to == Canceled {
            return Err(DomainError::invalid_transition(
                "a delivered order cannot be canceled",
            ));
        }

        Err(DomainError::invalid_transition(format!(
            "cannot move order from {self} to {to}"
        )))
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "delivered" => Ok(OrderStatus::Delivered),
            "canceled" => Ok(OrderStatus::Canceled),
            other => Err(DomainError::validation(format!("unknown order status: {other}"))),
        }
    }
}
