//! The business (tenant) record
//!
//! One session works against exactly one business at a time. The business
//! carries the period-closing watermark: the end date of the last closed
//! fiscal period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{BusinessId, Currency};

/// A business using the back office
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: BusinessId,
    pub name: String,
    pub currency: Currency,
    /// End date of the last closed period; `None` before the first close.
    ///
    /// Invariant: no journal entry dated on or before this watermark may be
    /// created, other than the closing entry that advanced it.
    pub last_closed_period_end: Option<NaiveDate>,
}

impl Business {
    pub fn new(name: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: BusinessId::new(),
            name: name.into(),
            currency,
            last_closed_period_end: None,
        }
    }
}
