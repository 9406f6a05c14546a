//! Instruction processing

#![allow(deprecated)] // system_instruction deprecation - will migrate when solana_system_interface is stable

use borsh::BorshDeserialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    checks::{check_signer, check_system_program, check_writable, is_uninitialized, load, store},
    error::EscrowError,
    fees::validate_fee_rate,
    instruction::EscrowInstruction,
    lifecycle::Now,
    pda,
    state::{seeds, AccountSchema, CancelPolicy, Deadline, Escrow, FeeAccount},
    transfer::StagedTransfers,
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = EscrowInstruction::try_from_slice(instruction_data)
            .map_err(|_| EscrowError::InvalidInstructionData)?;

        match instruction {
            EscrowInstruction::InitializeFeeAccount { fee_bps, bump } => {
                msg!("Instruction: InitializeFeeAccount");
                Self::process_initialize_fee_account(program_id, accounts, fee_bps, bump)
            }
            EscrowInstruction::CreateEscrow {
                seq,
                bump,
                counterparty,
                arbiter,
                cancel_policy,
                expiry,
            } => {
                msg!("Instruction: CreateEscrow - seq={}", seq);
                Self::process_create_escrow(
                    program_id,
                    accounts,
                    seq,
                    bump,
                    counterparty,
                    arbiter,
                    cancel_policy,
                    expiry,
                )
            }
            EscrowInstruction::FundEscrow { amount } => {
                msg!("Instruction: FundEscrow");
                Self::process_fund_escrow(program_id, accounts, amount)
            }
            EscrowInstruction::CompleteEscrow => {
                msg!("Instruction: CompleteEscrow");
                Self::process_complete_escrow(program_id, accounts)
            }
            EscrowInstruction::CancelEscrow => {
                msg!("Instruction: CancelEscrow");
                Self::process_cancel_escrow(program_id, accounts)
            }
            EscrowInstruction::WithdrawFees { amount } => {
                msg!("Instruction: WithdrawFees");
                Self::process_withdraw_fees(program_id, accounts, amount)
            }
            EscrowInstruction::SetCounterparty { counterparty } => {
                msg!("Instruction: SetCounterparty");
                Self::process_set_counterparty(program_id, accounts, counterparty)
            }
            EscrowInstruction::SetFeeRate { fee_bps } => {
                msg!("Instruction: SetFeeRate");
                Self::process_set_fee_rate(program_id, accounts, fee_bps)
            }
            EscrowInstruction::SetPaused { paused } => {
                msg!("Instruction: SetPaused");
                Self::process_set_paused(program_id, accounts, paused)
            }
        }
    }

    fn process_initialize_fee_account(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        fee_bps: u16,
        bump: u8,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        check_signer(admin)?;
        check_writable(fee_account_info)?;
        check_system_program(system_program)?;
        validate_fee_rate(fee_bps)?;

        pda::verify_canonical(
            &pda::fee_account_seeds(admin.key),
            bump,
            program_id,
            fee_account_info.key,
        )?;

        if !is_uninitialized(fee_account_info) {
            let existing: FeeAccount = load(fee_account_info, program_id)?;
            if existing.admin != *admin.key {
                return Err(EscrowError::Unauthorized.into());
            }
            msg!("Fee account already exists: admin={}", admin.key);
            return Ok(());
        }

        create_pda_account(
            admin,
            fee_account_info,
            system_program,
            FeeAccount::LEN,
            program_id,
            &[seeds::FEE_ACCOUNT_SEED, admin.key.as_ref(), &[bump]],
        )?;

        store(&FeeAccount::new(*admin.key, bump, fee_bps), fee_account_info)?;

        msg!(
            "Fee account created: admin={}, fee_bps={}",
            admin.key,
            fee_bps
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn process_create_escrow(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        seq: u64,
        bump: u8,
        counterparty: Option<Pubkey>,
        arbiter: Option<Pubkey>,
        cancel_policy: CancelPolicy,
        expiry: Option<Deadline>,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let initializer = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        check_signer(initializer)?;
        check_writable(escrow_info)?;
        check_system_program(system_program)?;

        let seq_bytes = seq.to_le_bytes();
        pda::verify_canonical(
            &pda::escrow_seeds(initializer.key, &seq_bytes),
            bump,
            program_id,
            escrow_info.key,
        )?;
        if !is_uninitialized(escrow_info) {
            return Err(EscrowError::EscrowAlreadyExists.into());
        }

        let fee_account = load_fee_account(program_id, fee_account_info)?;
        if fee_account.is_paused {
            return Err(EscrowError::ProgramPaused.into());
        }
        let fee_bps = validate_fee_rate(fee_account.fee_bps)?;

        if let Some(counterparty) = counterparty {
            if counterparty == *initializer.key || counterparty == Pubkey::default() {
                return Err(EscrowError::InvalidCounterparty.into());
            }
        }

        let now = Now::from(&Clock::get()?);
        if let Some(deadline) = expiry {
            if deadline.has_passed(&now) {
                return Err(EscrowError::InvalidExpiry.into());
            }
        }

        create_pda_account(
            initializer,
            escrow_info,
            system_program,
            Escrow::LEN,
            program_id,
            &[seeds::ESCROW_SEED, initializer.key.as_ref(), &seq_bytes, &[bump]],
        )?;

        let escrow = Escrow::new(
            *initializer.key,
            counterparty,
            arbiter,
            *fee_account_info.key,
            seq,
            fee_bps,
            cancel_policy,
            expiry,
            bump,
        );
        store(&escrow, escrow_info)?;

        msg!(
            "Escrow created: escrow={}, initializer={}, fee_bps={}",
            escrow_info.key,
            initializer.key,
            fee_bps
        );
        Ok(())
    }

    fn process_fund_escrow(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let initializer = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        check_signer(initializer)?;
        check_writable(initializer)?;
        check_writable(escrow_info)?;
        check_system_program(system_program)?;

        let mut escrow = load_escrow(program_id, escrow_info)?;
        if *fee_account_info.key != escrow.fee_account {
            return Err(EscrowError::InvalidDerivedAddress.into());
        }
        let fee_account = load_fee_account(program_id, fee_account_info)?;
        if fee_account.is_paused {
            return Err(EscrowError::ProgramPaused.into());
        }

        escrow.fund(initializer.key, amount)?;

        invoke(
            &system_instruction::transfer(initializer.key, escrow_info.key, amount),
            &[initializer.clone(), escrow_info.clone(), system_program.clone()],
        )?;
        store(&escrow, escrow_info)?;

        msg!("Escrow funded: escrow={}, amount={}", escrow_info.key, amount);
        Ok(())
    }

    fn process_complete_escrow(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;
        let counterparty = next_account_info(account_info_iter)?;
        let initializer = next_account_info(account_info_iter)?;

        check_signer(authority)?;
        check_writable(escrow_info)?;
        check_writable(fee_account_info)?;
        check_writable(counterparty)?;
        check_writable(initializer)?;

        let mut escrow = load_escrow(program_id, escrow_info)?;
        if *fee_account_info.key != escrow.fee_account {
            return Err(EscrowError::InvalidDerivedAddress.into());
        }
        let mut fee_account = load_fee_account(program_id, fee_account_info)?;

        let payout = escrow.complete(authority.key)?;
        if escrow.counterparty != Some(*counterparty.key) || escrow.initializer != *initializer.key {
            return Err(EscrowError::InvalidDestination.into());
        }
        fee_account.credit(payout.fee)?;

        let mut transfers = StagedTransfers::new();
        transfers.transfer(escrow_info, counterparty, payout.net)?;
        transfers.transfer(escrow_info, fee_account_info, payout.fee)?;
        let reclaimed = transfers.close(escrow_info, initializer)?;

        store(&fee_account, fee_account_info)?;
        transfers.commit()?;

        msg!(
            "Escrow completed: escrow={}, net={}, fee={}, rent_reclaimed={}",
            escrow_info.key,
            payout.net,
            payout.fee,
            reclaimed
        );
        Ok(())
    }

    fn process_cancel_escrow(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;
        let initializer = next_account_info(account_info_iter)?;

        check_signer(authority)?;
        check_writable(escrow_info)?;
        check_writable(initializer)?;

        let mut escrow = load_escrow(program_id, escrow_info)?;
        let now = Now::from(&Clock::get()?);
        let refund = escrow.cancel(authority.key, &now)?;

        if escrow.initializer != *initializer.key {
            return Err(EscrowError::InvalidDestination.into());
        }

        let mut transfers = StagedTransfers::new();
        transfers.transfer(escrow_info, initializer, refund)?;
        let reclaimed = transfers.close(escrow_info, initializer)?;
        transfers.commit()?;

        msg!(
            "Escrow cancelled: escrow={}, refund={}, rent_reclaimed={}",
            escrow_info.key,
            refund,
            reclaimed
        );
        Ok(())
    }

    fn process_withdraw_fees(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;
        let destination = next_account_info(account_info_iter)?;

        check_signer(admin)?;
        check_writable(fee_account_info)?;
        check_writable(destination)?;
        if destination.key == fee_account_info.key {
            return Err(EscrowError::InvalidDestination.into());
        }

        let mut fee_account = load_fee_account(program_id, fee_account_info)?;
        fee_account.withdraw(admin.key, amount)?;

        let mut transfers = StagedTransfers::new();
        transfers.transfer(fee_account_info, destination, amount)?;

        store(&fee_account, fee_account_info)?;
        transfers.commit()?;

        msg!(
            "Fees withdrawn: amount={}, remaining={}",
            amount,
            fee_account.accumulated_fees
        );
        Ok(())
    }

    fn process_set_counterparty(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        counterparty: Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let initializer = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;

        check_signer(initializer)?;
        check_writable(escrow_info)?;

        let mut escrow = load_escrow(program_id, escrow_info)?;
        escrow.set_counterparty(initializer.key, counterparty)?;
        store(&escrow, escrow_info)?;

        msg!("Escrow matched: escrow={}, counterparty={}", escrow_info.key, counterparty);
        Ok(())
    }

    fn process_set_fee_rate(program_id: &Pubkey, accounts: &[AccountInfo], fee_bps: u16) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;

        check_signer(admin)?;
        check_writable(fee_account_info)?;

        let mut fee_account = load_fee_account(program_id, fee_account_info)?;
        fee_account.set_fee_rate(admin.key, fee_bps)?;
        store(&fee_account, fee_account_info)?;

        msg!("Fee rate updated: fee_bps={}", fee_bps);
        Ok(())
    }

    fn process_set_paused(program_id: &Pubkey, accounts: &[AccountInfo], paused: bool) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin = next_account_info(account_info_iter)?;
        let fee_account_info = next_account_info(account_info_iter)?;

        check_signer(admin)?;
        check_writable(fee_account_info)?;

        let mut fee_account = load_fee_account(program_id, fee_account_info)?;
        fee_account.set_paused(admin.key, paused)?;
        store(&fee_account, fee_account_info)?;

        msg!("Pause status: paused={}", paused);
        Ok(())
    }
}

/// Allocate `space` bytes at a PDA and hand it to this program.
///
/// An address that already holds lamports (sent there before creation) is
/// topped up to the rent minimum, then allocated and assigned, since
/// `create_account` refuses any address with a balance.
fn create_pda_account<'info>(
    payer: &AccountInfo<'info>,
    target: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    space: usize,
    program_id: &Pubkey,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    let required = Rent::get()?.minimum_balance(space);
    let current = target.lamports();

    if current == 0 {
        return invoke_signed(
            &system_instruction::create_account(
                payer.key,
                target.key,
                required,
                space as u64,
                program_id,
            ),
            &[payer.clone(), target.clone(), system_program.clone()],
            &[signer_seeds],
        );
    }

    let shortfall = required.saturating_sub(current);
    if shortfall > 0 {
        invoke(
            &system_instruction::transfer(payer.key, target.key, shortfall),
            &[payer.clone(), target.clone(), system_program.clone()],
        )?;
    }
    invoke_signed(
        &system_instruction::allocate(target.key, space as u64),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(target.key, program_id),
        &[target.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    msg!("Adopted pre-funded address: {}, topped_up={}", target.key, shortfall);
    Ok(())
}

/// Load a fee account and confirm it sits at its own derived address.
fn load_fee_account(program_id: &Pubkey, account: &AccountInfo) -> Result<FeeAccount, ProgramError> {
    let fee_account: FeeAccount = load(account, program_id)?;
    pda::verify_address(
        &pda::fee_account_seeds(&fee_account.admin),
        fee_account.bump,
        program_id,
        account.key,
    )?;
    Ok(fee_account)
}

/// Load an escrow and confirm it sits at its own derived address.
fn load_escrow(program_id: &Pubkey, account: &AccountInfo) -> Result<Escrow, ProgramError> {
    let escrow: Escrow = load(account, program_id)?;
    let seq = escrow.seq.to_le_bytes();
    pda::verify_address(
        &pda::escrow_seeds(&escrow.initializer, &seq),
        escrow.bump,
        program_id,
        account.key,
    )?;
    Ok(escrow)
}
