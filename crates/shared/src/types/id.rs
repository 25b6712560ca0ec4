//! Typed IDs for type-safe entity references.
//!
//! Rows use `BIGSERIAL` keys, so every ID wraps an `i64`. Wrapping prevents
//! accidentally passing an `AccountId` where an `InvoiceId` is expected.

use serde::{Deserialize, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Creates an ID from a raw key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw key.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

typed_id!(TranscodeId, "Unique identifier for a transcode (document type).");
typed_id!(JournalId, "Unique identifier for a journal.");
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
typed_id!(PeriodId, "Unique identifier for an accounting period.");
typed_id!(CurrencyId, "Unique identifier for a currency.");
typed_id!(RateTypeId, "Unique identifier for a rate type.");
typed_id!(ExchangeRateId, "Unique identifier for an exchange rate set.");
typed_id!(InvoiceId, "Unique identifier for an AP/AR invoice.");
typed_id!(PartnerId, "Unique identifier for a business partner.");
