//! # Treasury
//!
//! Accumulates registration and renewal payments. Withdrawal is
//! checks-then-zero: the balance is taken out of the ledger before the
//! caller performs any external transfer, so a nested withdrawal issued
//! during that transfer finds nothing left.

use crate::domain::value_objects::{Address, Amount, U256};
use crate::errors::RegistryError;

/// Payment pool with a single authorized controller.
///
/// INVARIANT: `balance == total_collected - total_withdrawn`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Treasury {
    controller: Address,
    balance: Amount,
    total_collected: Amount,
    total_withdrawn: Amount,
}

impl Treasury {
    /// Creates an empty treasury controlled by `controller`.
    #[must_use]
    pub fn new(controller: Address) -> Self {
        Self {
            controller,
            balance: U256::zero(),
            total_collected: U256::zero(),
            total_withdrawn: U256::zero(),
        }
    }

    /// The withdrawal controller.
    #[must_use]
    pub fn controller(&self) -> Address {
        self.controller
    }

    /// Current withdrawable balance.
    #[must_use]
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Sum of every credited amount.
    #[must_use]
    pub fn total_collected(&self) -> Amount {
        self.total_collected
    }

    /// Sum of every successfully withdrawn amount.
    #[must_use]
    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }

    /// Check that `amount` can be credited without overflow.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow`.
    pub fn ensure_can_credit(&self, amount: Amount) -> Result<(), RegistryError> {
        self.total_collected
            .checked_add(amount)
            .and_then(|_| self.balance.checked_add(amount))
            .map(|_| ())
            .ok_or(RegistryError::ArithmeticOverflow("treasury balance"))
    }

    /// Add a collected payment.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow`; nothing is credited in that case.
    pub fn credit(&mut self, amount: Amount) -> Result<(), RegistryError> {
        self.ensure_can_credit(amount)?;
        self.balance += amount;
        self.total_collected += amount;
        Ok(())
    }

    /// Take the whole balance for `caller`, leaving zero behind.
    ///
    /// # Errors
    ///
    /// `NotAuthorized` if `caller` is not the controller.
    pub fn withdraw(&mut self, caller: Address) -> Result<Amount, RegistryError> {
        if caller != self.controller {
            return Err(RegistryError::NotAuthorized { caller });
        }
        let amount = std::mem::replace(&mut self.balance, U256::zero());
        self.total_withdrawn += amount;
        Ok(amount)
    }

    /// Put back a withdrawn amount whose external transfer failed.
    pub fn restore(&mut self, amount: Amount) {
        let amount = amount.min(self.total_withdrawn);
        self.total_withdrawn -= amount;
        self.balance += amount;
    }

    /// Returns true if the balance invariant holds.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total_collected
            .checked_sub(self.total_withdrawn)
            .is_some_and(|expected| expected == self.balance)
    }
}
