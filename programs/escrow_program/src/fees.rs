//! Fee accounting

use solana_program::pubkey::Pubkey;

use crate::{error::EscrowError, state::FeeAccount, MAX_FEE_BPS};

/// Denominator of a basis-point rate.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Split of an escrowed amount into the protocol fee and the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub fee: u64,
    pub net: u64,
}

pub fn validate_fee_rate(fee_bps: u16) -> Result<u16, EscrowError> {
    if fee_bps > MAX_FEE_BPS {
        return Err(EscrowError::InvalidFeeRate);
    }
    Ok(fee_bps)
}

/// `fee = floor(amount * fee_bps / 10000)`, `net = amount - fee`.
///
/// The product is taken in u128 so every u64 amount at any u16 rate fits.
pub fn split_fee(amount: u64, fee_bps: u16) -> Result<FeeSplit, EscrowError> {
    let fee = u128::from(amount)
        .checked_mul(u128::from(fee_bps))
        .ok_or(EscrowError::Overflow)?
        / BPS_DENOMINATOR;
    let fee = u64::try_from(fee).map_err(|_| EscrowError::Overflow)?;
    let net = amount.checked_sub(fee).ok_or(EscrowError::Overflow)?;
    Ok(FeeSplit { fee, net })
}

impl FeeAccount {
    fn authorize(&self, signer: &Pubkey) -> Result<(), EscrowError> {
        if self.admin != *signer {
            return Err(EscrowError::Unauthorized);
        }
        Ok(())
    }

    pub fn credit(&mut self, fee: u64) -> Result<(), EscrowError> {
        self.accumulated_fees = self
            .accumulated_fees
            .checked_add(fee)
            .ok_or(EscrowError::Overflow)?;
        Ok(())
    }

    pub fn withdraw(&mut self, signer: &Pubkey, amount: u64) -> Result<(), EscrowError> {
        self.authorize(signer)?;
        if amount == 0 {
            return Err(EscrowError::InvalidAmount);
        }
        let remaining = self
            .accumulated_fees
            .checked_sub(amount)
            .ok_or(EscrowError::InsufficientFees)?;
        let total_withdrawn = self
            .total_withdrawn
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        self.accumulated_fees = remaining;
        self.total_withdrawn = total_withdrawn;
        Ok(())
    }

    /// New rate only applies to escrows created afterwards.
    pub fn set_fee_rate(&mut self, signer: &Pubkey, fee_bps: u16) -> Result<(), EscrowError> {
        self.authorize(signer)?;
        self.fee_bps = validate_fee_rate(fee_bps)?;
        Ok(())
    }

    pub fn set_paused(&mut self, signer: &Pubkey, paused: bool) -> Result<(), EscrowError> {
        self.authorize(signer)?;
        self.is_paused = paused;
        Ok(())
    }
}
