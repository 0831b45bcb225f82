//! Chart of accounts
//!
//! Accounts are identified internally by [`AccountId`] and externally by a
//! per-business account number ("1010"). Balances are never stored here;
//! they are always derived by replaying journal lines.

use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, BusinessId};

use crate::error::LedgerError;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// An account in the chart of accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Owning business
    pub business_id: BusinessId,
    /// Account number, unique within the business (e.g. "1010")
    pub number: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Description
    pub description: Option<String>,
    /// System accounts are seeded by the application and protected from
    /// type changes and deletion
    pub is_system: bool,
}

impl Account {
    /// Creates a new account
    pub fn new(
        business_id: BusinessId,
        number: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id: AccountId::new(),
            business_id,
            number: number.into(),
            name: name.into(),
            account_type,
            description: None,
            is_system: false,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the account as a protected system account
    pub fn as_system(mut self) -> Self {
        self.is_system = true;
        self
    }
}

/// Fields that can change on an existing account
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub number: Option<String>,
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub description: Option<String>,
}

/// The per-business registry of accounts
#[derive(Debug, Clone)]
pub struct ChartOfAccounts {
    business_id: BusinessId,
    accounts: Vec<Account>,
}

impl ChartOfAccounts {
    /// Creates an empty chart
    pub fn new(business_id: BusinessId) -> Self {
        Self {
            business_id,
            accounts: Vec::new(),
        }
    }

    /// Rebuilds a chart from loaded accounts
    ///
    /// Accounts belonging to another business are ignored.
    pub fn from_accounts(business_id: BusinessId, accounts: Vec<Account>) -> Self {
        Self {
            business_id,
            accounts: accounts
                .into_iter()
                .filter(|a| a.business_id == business_id)
                .collect(),
        }
    }

    pub fn business_id(&self) -> BusinessId {
        self.business_id
    }

    /// Adds an account to the chart
    ///
    /// # Errors
    ///
    /// `DuplicateAccountNumber` if the number is already taken.
    pub fn add(&mut self, account: Account) -> Result<AccountId, LedgerError> {
        if self.resolve_by_number(&account.number).is_some() {
            return Err(LedgerError::DuplicateAccountNumber(account.number));
        }
        let id = account.id;
        self.accounts.push(account);
        Ok(id)
    }

    /// Applies an update to an existing account
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` for an unknown id
    /// - `SystemAccountTypeLocked` when changing a system account's type
    /// - `DuplicateAccountNumber` when the new number collides
    pub fn update(&mut self, id: AccountId, update: AccountUpdate) -> Result<&Account, LedgerError> {
        if let Some(new_number) = &update.number {
            if self
                .accounts
                .iter()
                .any(|a| a.id != id && &a.number == new_number)
            {
                return Err(LedgerError::DuplicateAccountNumber(new_number.clone()));
            }
        }

        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;

        if let Some(new_type) = update.account_type {
            if account.is_system && new_type != account.account_type {
                return Err(LedgerError::SystemAccountTypeLocked(account.number.clone()));
            }
            account.account_type = new_type;
        }
        if let Some(number) = update.number {
            account.number = number;
        }
        if let Some(name) = update.name {
            account.name = name;
        }
        if let Some(description) = update.description {
            account.description = Some(description);
        }

        Ok(account)
    }

    /// Removes an account from the chart
    ///
    /// Existing journal references are not checked; the ledger keeps its
    /// history and queries against the removed account simply find no chart
    /// entry (preserved behavior of the original system).
    ///
    /// # Errors
    ///
    /// `SystemAccountProtected` for system accounts, `AccountNotFound`
    /// otherwise.
    pub fn remove(&mut self, id: AccountId) -> Result<Account, LedgerError> {
        let position = self
            .accounts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;

        if self.accounts[position].is_system {
            return Err(LedgerError::SystemAccountProtected(
                self.accounts[position].number.clone(),
            ));
        }

        Ok(self.accounts.remove(position))
    }

    /// Gets an account by id
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Resolves an account by its number
    ///
    /// Used by automatic posting to map semantic roles onto concrete
    /// accounts; a miss degrades the posting rather than crashing it.
    pub fn resolve_by_number(&self, number: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.number == number)
    }

    /// Iterates the accounts in insertion order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// The standard chart seeded for a new small business
pub struct StandardChart;

impl StandardChart {
    /// Creates the conventional small-business accounts
    pub fn small_business(business_id: BusinessId) -> Vec<Account> {
        vec![
            // Assets
            Account::new(business_id, "1010", "Cash", AccountType::Asset).as_system(),
            Account::new(business_id, "1200", "Accounts Receivable", AccountType::Asset)
                .as_system(),
            Account::new(business_id, "1300", "Inventory", AccountType::Asset).as_system(),
            Account::new(business_id, "1445", "VAT Receivable", AccountType::Asset).as_system(),
            // Liabilities
            Account::new(business_id, "2010", "Accounts Payable", AccountType::Liability)
                .as_system(),
            Account::new(business_id, "2445", "VAT Payable", AccountType::Liability).as_system(),
            // Equity
            Account::new(business_id, "3010", "Owner's Capital", AccountType::Equity),
            Account::new(business_id, "3300", "Retained Earnings", AccountType::Equity)
                .as_system(),
            // Revenue
            Account::new(business_id, "4010", "Sales Revenue", AccountType::Revenue).as_system(),
            Account::new(business_id, "4510", "Sales Returns", AccountType::Revenue).as_system(),
            // Expenses
            Account::new(business_id, "5010", "Cost of Goods Sold", AccountType::Expense)
                .as_system(),
            Account::new(business_id, "5510", "Purchase Returns", AccountType::Expense)
                .as_system(),
            Account::new(business_id, "6010", "Operating Expenses", AccountType::Expense),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> ChartOfAccounts {
        let business_id = BusinessId::new();
        ChartOfAccounts::from_accounts(business_id, StandardChart::small_business(business_id))
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let mut chart = chart();
        let dup = Account::new(chart.business_id(), "1010", "Second Cash", AccountType::Asset);

        let result = chart.add(dup);
        assert!(matches!(result, Err(LedgerError::DuplicateAccountNumber(n)) if n == "1010"));
    }

    #[test]
    fn test_system_account_type_locked() {
        let mut chart = chart();
        let cash = chart.resolve_by_number("1010").unwrap().id;

        let result = chart.update(
            cash,
            AccountUpdate {
                account_type: Some(AccountType::Expense),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LedgerError::SystemAccountTypeLocked(_))));
    }

    #[test]
    fn test_system_account_rename_allowed() {
        let mut chart = chart();
        let cash = chart.resolve_by_number("1010").unwrap().id;

        let updated = chart
            .update(
                cash,
                AccountUpdate {
                    name: Some("Till".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Till");
    }

    #[test]
    fn test_update_number_collision() {
        let mut chart = chart();
        let capital = chart.resolve_by_number("3010").unwrap().id;

        let result = chart.update(
            capital,
            AccountUpdate {
                number: Some("1010".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LedgerError::DuplicateAccountNumber(_))));
    }

    #[test]
    fn test_system_account_protected_from_deletion() {
        let mut chart = chart();
        let cash = chart.resolve_by_number("1010").unwrap().id;

        assert!(matches!(
            chart.remove(cash),
            Err(LedgerError::SystemAccountProtected(_))
        ));
    }

    #[test]
    fn test_remove_plain_account() {
        let mut chart = chart();
        let capital = chart.resolve_by_number("3010").unwrap().id;

        let removed = chart.remove(capital).unwrap();
        assert_eq!(removed.number, "3010");
        assert!(chart.resolve_by_number("3010").is_none());
    }

    #[test]
    fn test_from_accounts_drops_foreign_records() {
        let business_id = BusinessId::new();
        let mut accounts = StandardChart::small_business(business_id);
        accounts.push(Account::new(
            BusinessId::new(),
            "9999",
            "Not ours",
            AccountType::Asset,
        ));

        let chart = ChartOfAccounts::from_accounts(business_id, accounts);
        assert!(chart.resolve_by_number("9999").is_none());
    }
}
