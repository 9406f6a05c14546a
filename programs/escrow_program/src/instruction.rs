//! Instruction definitions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::state::{CancelPolicy, Deadline};

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Create the admin's fee account. Repeating it for the same admin is a no-op.
    ///
    /// Accounts expected:
    /// 0. `[writable, signer]` Admin (payer)
    /// 1. `[writable]` Fee account (PDA of `["fee_account", admin]`)
    /// 2. `[]` System program
    InitializeFeeAccount { fee_bps: u16, bump: u8 },

    /// Create an escrow in the Created state, capturing the fee account's rate
    ///
    /// Accounts expected:
    /// 0. `[writable, signer]` Initializer (payer)
    /// 1. `[writable]` Escrow account (PDA of `["escrow", initializer, seq]`)
    /// 2. `[]` Fee account
    /// 3. `[]` System program
    CreateEscrow {
        seq: u64,
        bump: u8,
        counterparty: Option<Pubkey>,
        arbiter: Option<Pubkey>,
        cancel_policy: CancelPolicy,
        expiry: Option<Deadline>,
    },

    /// Move `amount` lamports from the initializer into custody
    ///
    /// Accounts expected:
    /// 0. `[writable, signer]` Initializer
    /// 1. `[writable]` Escrow account (PDA)
    /// 2. `[]` Fee account
    /// 3. `[]` System program
    FundEscrow { amount: u64 },

    /// Release custody to the counterparty minus the protocol fee and close the escrow
    ///
    /// Accounts expected:
    /// 0. `[signer]` Counterparty or arbiter
    /// 1. `[writable]` Escrow account (PDA)
    /// 2. `[writable]` Fee account (PDA)
    /// 3. `[writable]` Counterparty (receives net amount)
    /// 4. `[writable]` Initializer (receives escrow rent)
    CompleteEscrow,

    /// Refund custody and rent to the initializer and close the escrow
    ///
    /// Accounts expected:
    /// 0. `[signer]` Initializer, counterparty (per policy) or anyone after expiry
    /// 1. `[writable]` Escrow account (PDA)
    /// 2. `[writable]` Initializer (refund destination)
    CancelEscrow,

    /// Withdraw accumulated fees
    ///
    /// Accounts expected:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Fee account (PDA)
    /// 2. `[writable]` Destination
    WithdrawFees { amount: u64 },

    /// Match an escrow created without a counterparty
    ///
    /// Accounts expected:
    /// 0. `[signer]` Initializer
    /// 1. `[writable]` Escrow account (PDA)
    SetCounterparty { counterparty: Pubkey },

    /// Change the rate captured by escrows created afterwards
    ///
    /// Accounts expected:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Fee account (PDA)
    SetFeeRate { fee_bps: u16 },

    /// Pause or resume escrow creation and funding
    ///
    /// Accounts expected:
    /// 0. `[signer]` Admin
    /// 1. `[writable]` Fee account (PDA)
    SetPaused { paused: bool },
}
