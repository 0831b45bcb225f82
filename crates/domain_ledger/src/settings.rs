//! Accounting settings
//!
//! Automatic posting needs to know which concrete account plays which
//! semantic role ("the cash account", "the VAT-payable account"). The
//! original system hardcoded account numbers at the posting sites; here the
//! mapping is explicit configuration, resolved once per business and
//! injected into the poster.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use core_kernel::{AccountId, BusinessId};

use crate::account::ChartOfAccounts;
use crate::error::LedgerError;

/// The semantic account roles automatic posting uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountRole {
    Cash,
    AccountsReceivable,
    AccountsPayable,
    Inventory,
    SalesRevenue,
    VatPayable,
    VatReceivable,
    CostOfGoodsSold,
    SalesReturns,
    PurchaseReturns,
    RetainedEarnings,
}

impl AccountRole {
    /// Every role, for settings screens and validation sweeps
    pub const ALL: [AccountRole; 11] = [
        AccountRole::Cash,
        AccountRole::AccountsReceivable,
        AccountRole::AccountsPayable,
        AccountRole::Inventory,
        AccountRole::SalesRevenue,
        AccountRole::VatPayable,
        AccountRole::VatReceivable,
        AccountRole::CostOfGoodsSold,
        AccountRole::SalesReturns,
        AccountRole::PurchaseReturns,
        AccountRole::RetainedEarnings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AccountRole::Cash => "cash",
            AccountRole::AccountsReceivable => "accounts receivable",
            AccountRole::AccountsPayable => "accounts payable",
            AccountRole::Inventory => "inventory",
            AccountRole::SalesRevenue => "sales revenue",
            AccountRole::VatPayable => "VAT payable",
            AccountRole::VatReceivable => "VAT receivable",
            AccountRole::CostOfGoodsSold => "cost of goods sold",
            AccountRole::SalesReturns => "sales returns",
            AccountRole::PurchaseReturns => "purchase returns",
            AccountRole::RetainedEarnings => "retained earnings",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Role to account-number mapping for one business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingSettings {
    pub business_id: BusinessId,
    mappings: HashMap<AccountRole, String>,
}

impl AccountingSettings {
    /// Creates an empty mapping
    pub fn new(business_id: BusinessId) -> Self {
        Self {
            business_id,
            mappings: HashMap::new(),
        }
    }

    /// The conventional mapping matching [`StandardChart`]
    ///
    /// [`StandardChart`]: crate::account::StandardChart
    pub fn standard(business_id: BusinessId) -> Self {
        let mut settings = Self::new(business_id);
        settings.map(AccountRole::Cash, "1010");
        settings.map(AccountRole::AccountsReceivable, "1200");
        settings.map(AccountRole::Inventory, "1300");
        settings.map(AccountRole::VatReceivable, "1445");
        settings.map(AccountRole::AccountsPayable, "2010");
        settings.map(AccountRole::VatPayable, "2445");
        settings.map(AccountRole::RetainedEarnings, "3300");
        settings.map(AccountRole::SalesRevenue, "4010");
        settings.map(AccountRole::SalesReturns, "4510");
        settings.map(AccountRole::CostOfGoodsSold, "5010");
        settings.map(AccountRole::PurchaseReturns, "5510");
        settings
    }

    /// Maps a role to an account number
    pub fn map(&mut self, role: AccountRole, number: impl Into<String>) {
        self.mappings.insert(role, number.into());
    }

    /// Removes a mapping
    pub fn unmap(&mut self, role: AccountRole) {
        self.mappings.remove(&role);
    }

    /// The account number mapped to a role, if any
    pub fn number_for(&self, role: AccountRole) -> Option<&str> {
        self.mappings.get(&role).map(String::as_str)
    }

    /// Resolves a role to a concrete account id through the chart
    ///
    /// # Errors
    ///
    /// `AccountNotResolved` when the role is unmapped or the mapped number
    /// does not exist in the chart.
    pub fn resolve(
        &self,
        role: AccountRole,
        chart: &ChartOfAccounts,
    ) -> Result<AccountId, LedgerError> {
        self.resolve_optional(role, chart)
            .ok_or(LedgerError::AccountNotResolved(role))
    }

    /// Like [`resolve`](Self::resolve), but a miss is `None`
    pub fn resolve_optional(&self, role: AccountRole, chart: &ChartOfAccounts) -> Option<AccountId> {
        self.number_for(role)
            .and_then(|number| chart.resolve_by_number(number))
            .map(|account| account.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::StandardChart;

    #[test]
    fn test_standard_settings_resolve_against_standard_chart() {
        let business_id = BusinessId::new();
        let chart =
            ChartOfAccounts::from_accounts(business_id, StandardChart::small_business(business_id));
        let settings = AccountingSettings::standard(business_id);

        for role in AccountRole::ALL {
            assert!(
                settings.resolve(role, &chart).is_ok(),
                "role {role} must resolve"
            );
        }
    }

    #[test]
    fn test_unmapped_role_fails_resolution() {
        let business_id = BusinessId::new();
        let chart =
            ChartOfAccounts::from_accounts(business_id, StandardChart::small_business(business_id));
        let mut settings = AccountingSettings::standard(business_id);
        settings.unmap(AccountRole::CostOfGoodsSold);

        let result = settings.resolve(AccountRole::CostOfGoodsSold, &chart);
        assert!(matches!(
            result,
            Err(LedgerError::AccountNotResolved(AccountRole::CostOfGoodsSold))
        ));
    }

    #[test]
    fn test_mapping_to_missing_account_fails_resolution() {
        let business_id = BusinessId::new();
        let chart =
            ChartOfAccounts::from_accounts(business_id, StandardChart::small_business(business_id));
        let mut settings = AccountingSettings::standard(business_id);
        settings.map(AccountRole::Cash, "9999");

        assert!(settings.resolve(AccountRole::Cash, &chart).is_err());
    }
}
