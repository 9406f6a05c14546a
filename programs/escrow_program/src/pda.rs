//! Program-derived address derivation.
//!
//! Addresses are a pure function of `(seeds, bump, program_id)`. The search
//! walks bumps from 255 downward and keeps the first off-curve candidate,
//! which is the canonical bump stored in each account.

use solana_program::pubkey::{Pubkey, PubkeyError};

use crate::{error::EscrowError, state::seeds};

/// Search for the canonical `(address, bump)` of `seeds`.
pub fn find_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), EscrowError> {
    for bump in (0..=u8::MAX).rev() {
        match derive_address(seeds, bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            // On-curve candidate, try the next bump
            Err(PubkeyError::InvalidSeeds) => continue,
            Err(_) => return Err(EscrowError::NoValidAddress),
        }
    }
    Err(EscrowError::NoValidAddress)
}

/// Derive the address for `seeds` with a known `bump`.
pub fn derive_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, PubkeyError> {
    let bump_seed = [bump];
    let mut with_bump = seeds.to_vec();
    with_bump.push(&bump_seed);
    Pubkey::create_program_address(&with_bump, program_id)
}

/// Check that `supplied` is the address of `seeds` under the stored `bump`.
pub fn verify_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &Pubkey,
    supplied: &Pubkey,
) -> Result<(), EscrowError> {
    match derive_address(seeds, bump, program_id) {
        Ok(address) if address == *supplied => Ok(()),
        _ => Err(EscrowError::InvalidDerivedAddress),
    }
}

/// Check that `supplied` and `bump` are the canonical derivation of `seeds`.
pub fn verify_canonical(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &Pubkey,
    supplied: &Pubkey,
) -> Result<(), EscrowError> {
    let (address, canonical_bump) = find_address(seeds, program_id)?;
    if address != *supplied || canonical_bump != bump {
        return Err(EscrowError::InvalidDerivedAddress);
    }
    Ok(())
}

pub fn fee_account_seeds(admin: &Pubkey) -> [&[u8]; 2] {
    [seeds::FEE_ACCOUNT_SEED, admin.as_ref()]
}

pub fn escrow_seeds<'a>(initializer: &'a Pubkey, seq: &'a [u8; 8]) -> [&'a [u8]; 3] {
    [seeds::ESCROW_SEED, initializer.as_ref(), seq]
}

pub fn find_fee_account_address(
    admin: &Pubkey,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), EscrowError> {
    find_address(&fee_account_seeds(admin), program_id)
}

pub fn find_escrow_address(
    initializer: &Pubkey,
    seq: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), EscrowError> {
    let seq = seq.to_le_bytes();
    find_address(&escrow_seeds(initializer, &seq), program_id)
}
