//! Error types

use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Errors returned by the escrow program.
///
/// The discriminant is the custom error code reported to clients, so new
/// variants are only ever appended.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Fee rate exceeds 10000 basis points")]
    InvalidFeeRate,

    #[error("Insufficient accumulated fees")]
    InsufficientFees,

    #[error("Escrow already funded")]
    AlreadyFunded,

    #[error("Escrow not funded")]
    NotFunded,

    #[error("Escrow not expired yet")]
    NotExpired,

    #[error("Unauthorized signer")]
    Unauthorized,

    #[error("Invalid derived address")]
    InvalidDerivedAddress,

    #[error("Corrupt account data")]
    CorruptAccount,

    #[error("No valid derived address for seeds")]
    NoValidAddress,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Invalid instruction data")]
    InvalidInstructionData,

    #[error("Invalid account owner")]
    InvalidAccountOwner,

    #[error("Account not writable")]
    AccountNotWritable,

    #[error("Escrow already exists")]
    EscrowAlreadyExists,

    #[error("Counterparty not set")]
    CounterpartyNotSet,

    #[error("Counterparty already set")]
    CounterpartyAlreadySet,

    #[error("Invalid counterparty")]
    InvalidCounterparty,

    #[error("Invalid destination account")]
    InvalidDestination,

    #[error("Expiry deadline already passed")]
    InvalidExpiry,

    #[error("Program paused by fee account admin")]
    ProgramPaused,
}

impl From<EscrowError> for ProgramError {
    fn from(e: EscrowError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
