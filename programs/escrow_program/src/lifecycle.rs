//! Escrow state machine.
//!
//! Each transition checks every precondition before touching `self`, so a
//! failed call leaves the escrow exactly as it was. The processor runs
//! these on a decoded copy and only persists the result if the whole
//! instruction succeeds.

use solana_program::{clock::Clock, pubkey::Pubkey};

use crate::{
    error::EscrowError,
    fees::{split_fee, FeeSplit},
    state::{CancelPolicy, Deadline, Escrow, EscrowState},
};

/// Clock reading that deadlines are compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    pub slot: u64,
    pub unix_timestamp: i64,
}

impl From<&Clock> for Now {
    fn from(clock: &Clock) -> Self {
        Self {
            slot: clock.slot,
            unix_timestamp: clock.unix_timestamp,
        }
    }
}

impl Deadline {
    pub fn has_passed(&self, now: &Now) -> bool {
        match *self {
            Deadline::Slot(slot) => now.slot > slot,
            Deadline::UnixTimestamp(ts) => now.unix_timestamp > ts,
        }
    }
}

/// Lamports released by a completed escrow.
pub type Payout = FeeSplit;

impl Escrow {
    pub fn fund(&mut self, signer: &Pubkey, amount: u64) -> Result<(), EscrowError> {
        if *signer != self.initializer {
            return Err(EscrowError::Unauthorized);
        }
        match self.state {
            EscrowState::Created => {}
            EscrowState::Funded | EscrowState::Completed | EscrowState::Cancelled => {
                return Err(EscrowError::AlreadyFunded)
            }
        }
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }
        self.deposited_amount = amount;
        self.state = EscrowState::Funded;
        Ok(())
    }

    pub fn set_counterparty(
        &mut self,
        signer: &Pubkey,
        counterparty: Pubkey,
    ) -> Result<(), EscrowError> {
        if *signer != self.initializer {
            return Err(EscrowError::Unauthorized);
        }
        match self.state {
            EscrowState::Created | EscrowState::Funded => {}
            EscrowState::Completed | EscrowState::Cancelled => {
                return Err(EscrowError::AccountNotFound)
            }
        }
        if self.counterparty.is_some() {
            return Err(EscrowError::CounterpartyAlreadySet);
        }
        if counterparty == self.initializer || counterparty == Pubkey::default() {
            return Err(EscrowError::InvalidCounterparty);
        }
        self.counterparty = Some(counterparty);
        Ok(())
    }

    /// Funded -> Completed. The signer must be the counterparty or the arbiter.
    pub fn complete(&mut self, signer: &Pubkey) -> Result<Payout, EscrowError> {
        match self.state {
            EscrowState::Funded => {}
            EscrowState::Created | EscrowState::Completed | EscrowState::Cancelled => {
                return Err(EscrowError::NotFunded)
            }
        }
        let counterparty = self.counterparty.ok_or(EscrowError::CounterpartyNotSet)?;
        if *signer != counterparty && self.arbiter != Some(*signer) {
            return Err(EscrowError::Unauthorized);
        }
        let payout = split_fee(self.deposited_amount, self.fee_bps)?;
        self.state = EscrowState::Completed;
        Ok(payout)
    }

    /// Created/Funded -> Cancelled. Returns the lamports owed back to the
    /// initializer, zero when cancelled before funding.
    pub fn cancel(&mut self, signer: &Pubkey, now: &Now) -> Result<u64, EscrowError> {
        let refund = match self.state {
            EscrowState::Created => 0,
            EscrowState::Funded => self.deposited_amount,
            EscrowState::Completed | EscrowState::Cancelled => {
                return Err(EscrowError::NotFunded)
            }
        };
        self.authorize_cancel(signer, now)?;
        self.state = EscrowState::Cancelled;
        Ok(refund)
    }

    fn authorize_cancel(&self, signer: &Pubkey, now: &Now) -> Result<(), EscrowError> {
        if *signer == self.initializer {
            return Ok(());
        }
        let counterparty_may_cancel = match self.cancel_policy {
            CancelPolicy::InitializerOnly => false,
            CancelPolicy::InitializerOrCounterparty => self.counterparty == Some(*signer),
        };
        if counterparty_may_cancel {
            return Ok(());
        }
        match self.expiry {
            Some(deadline) if deadline.has_passed(now) => Ok(()),
            Some(_) => Err(EscrowError::NotExpired),
            None => Err(EscrowError::Unauthorized),
        }
    }
}
