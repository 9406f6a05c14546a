//! Escrow Program (Native Solana)
//!
//! Holds lamports in custody for a two-party trade and takes a protocol fee
//! on completion. Fees accrue on a per-admin fee account at the derived
//! address `["fee_account", admin]`; each escrow lives at
//! `["escrow", initializer, seq]`.
//!
//! ## Instructions
//!
//! - `InitializeFeeAccount`: create the admin's fee account
//! - `CreateEscrow` / `FundEscrow`: open a trade and move value into custody
//! - `CompleteEscrow`: pay the counterparty, credit the fee, close the escrow
//! - `CancelEscrow`: refund the initializer and close the escrow
//! - `WithdrawFees`, `SetFeeRate`, `SetPaused`: admin operations
//! - `SetCounterparty`: match an escrow opened without a counterparty

pub mod checks;
pub mod error;
pub mod fees;
pub mod instruction;
pub mod lifecycle;
pub mod pda;
pub mod processor;
pub mod state;
pub mod transfer;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint {
    use solana_program::{
        account_info::AccountInfo, entrypoint, entrypoint::ProgramResult, pubkey::Pubkey,
    };

    use crate::processor::Processor;

    entrypoint!(process_instruction);

    fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        Processor::process(program_id, accounts, instruction_data)
    }
}

solana_program::declare_id!("6KNjJqfUVrDZRnosDUDrWeHVAeMcKzvuPjoNC8Gc4JJq");

/// Upper bound on any fee rate, 100% in basis points.
pub const MAX_FEE_BPS: u16 = 10_000;
