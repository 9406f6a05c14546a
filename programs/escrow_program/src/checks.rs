//! Account validation

use solana_program::{
    account_info::AccountInfo, program_error::ProgramError, pubkey::Pubkey, system_program,
};

use crate::{error::EscrowError, state::AccountSchema};

pub fn check_signer(account: &AccountInfo) -> Result<(), ProgramError> {
    if !account.is_signer {
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

pub fn check_writable(account: &AccountInfo) -> Result<(), ProgramError> {
    if !account.is_writable {
        return Err(EscrowError::AccountNotWritable.into());
    }
    Ok(())
}

pub fn check_system_program(account: &AccountInfo) -> Result<(), ProgramError> {
    if *account.key != system_program::ID {
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

/// True if nothing has been allocated at this address yet.
pub fn is_uninitialized(account: &AccountInfo) -> bool {
    account.data_is_empty() && account.owner == &system_program::ID
}

/// Decode a program-owned account.
///
/// A closed account has no lamports and no data and reports
/// `AccountNotFound` before the owner check, since closing hands it back
/// to the system program.
pub fn load<T: AccountSchema>(account: &AccountInfo, program_id: &Pubkey) -> Result<T, ProgramError> {
    if account.lamports() == 0 || account.data_is_empty() {
        return Err(EscrowError::AccountNotFound.into());
    }
    if account.owner != program_id {
        return Err(EscrowError::InvalidAccountOwner.into());
    }
    let data = account.try_borrow_data()?;
    Ok(T::unpack(&data)?)
}

/// Encode `value` into a program-owned account.
pub fn store<T: AccountSchema>(value: &T, account: &AccountInfo) -> Result<(), ProgramError> {
    let mut data = account.try_borrow_mut_data()?;
    Ok(value.pack(&mut data)?)
}
