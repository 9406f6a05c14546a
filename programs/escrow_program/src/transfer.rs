//! Staged lamport movements.
//!
//! Balances are computed for every account involved before any of them is
//! written, so an overflow or shortfall anywhere in the plan leaves all
//! accounts untouched.

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, system_program};

use crate::error::EscrowError;

pub struct StagedTransfers<'a, 'info> {
    balances: Vec<(&'a AccountInfo<'info>, u64)>,
    closing: Vec<&'a AccountInfo<'info>>,
}

impl<'a, 'info> StagedTransfers<'a, 'info> {
    pub fn new() -> Self {
        Self {
            balances: Vec::new(),
            closing: Vec::new(),
        }
    }

    fn index_of(&mut self, account: &'a AccountInfo<'info>) -> usize {
        if let Some(index) = self
            .balances
            .iter()
            .position(|(staged, _)| staged.key == account.key)
        {
            return index;
        }
        self.balances.push((account, account.lamports()));
        self.balances.len() - 1
    }

    /// Debit `from` (must be owned by this program) and credit `to`.
    pub fn transfer(
        &mut self,
        from: &'a AccountInfo<'info>,
        to: &'a AccountInfo<'info>,
        amount: u64,
    ) -> Result<(), EscrowError> {
        let from_index = self.index_of(from);
        let to_index = self.index_of(to);
        let debited = self.balances[from_index]
            .1
            .checked_sub(amount)
            .ok_or(EscrowError::Overflow)?;
        self.balances[from_index].1 = debited;
        let credited = self.balances[to_index]
            .1
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        self.balances[to_index].1 = credited;
        Ok(())
    }

    /// Move whatever `account` holds after the earlier transfers to
    /// `recipient` and release the account on commit.
    pub fn close(
        &mut self,
        account: &'a AccountInfo<'info>,
        recipient: &'a AccountInfo<'info>,
    ) -> Result<u64, EscrowError> {
        let index = self.index_of(account);
        let remaining = self.balances[index].1;
        self.transfer(account, recipient, remaining)?;
        self.closing.push(account);
        Ok(remaining)
    }

    /// Write all staged balances, then wipe and reassign closed accounts.
    pub fn commit(self) -> ProgramResult {
        for (account, lamports) in &self.balances {
            **account.try_borrow_mut_lamports()? = *lamports;
        }
        for account in self.closing {
            account.try_borrow_mut_data()?.fill(0);
            account.assign(&system_program::ID);
        }
        Ok(())
    }
}

impl Default for StagedTransfers<'_, '_> {
    fn default() -> Self {
        Self::new()
    }
}
