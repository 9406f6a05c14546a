//! Shared helpers for escrow program tests

#![allow(dead_code, deprecated)]

use borsh::BorshSerialize;
use escrow_program::{
    error::EscrowError,
    instruction::EscrowInstruction,
    pda,
    processor::Processor,
    state::{AccountSchema, CancelPolicy, Deadline, Escrow, FeeAccount},
};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    instruction::{AccountMeta, Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction, system_program,
    transaction::{Transaction, TransactionError},
};

pub const STARTING_LAMPORTS: u64 = 10_000_000_000;

// ============================================================================
// PROGRAM SETUP
// ============================================================================

pub fn program_test() -> ProgramTest {
    ProgramTest::new(
        "escrow_program",
        escrow_program::id(),
        processor!(Processor::process),
    )
}

pub struct TestEnv {
    pub program_id: Pubkey,
    pub admin: Keypair,
    pub fee_account: Pubkey,
    pub initializer: Keypair,
    pub counterparty: Keypair,
}

/// Fund an admin, initializer and counterparty and create the admin's fee account.
pub async fn setup_env(context: &mut ProgramTestContext, fee_bps: u16) -> TestEnv {
    let program_id = escrow_program::id();
    let admin = Keypair::new();
    let initializer = Keypair::new();
    let counterparty = Keypair::new();

    for keypair in [&admin, &initializer, &counterparty] {
        airdrop(context, &keypair.pubkey(), STARTING_LAMPORTS).await;
    }

    send(
        context,
        &[initialize_fee_account_ix(program_id, admin.pubkey(), fee_bps)],
        &[&admin],
    )
    .await
    .unwrap();

    let (fee_account, _) = pda::find_fee_account_address(&admin.pubkey(), &program_id).unwrap();
    TestEnv {
        program_id,
        admin,
        fee_account,
        initializer,
        counterparty,
    }
}

pub async fn airdrop(context: &mut ProgramTestContext, to: &Pubkey, lamports: u64) {
    let payer = context.payer.insecure_clone();
    let ix = system_instruction::transfer(&payer.pubkey(), to, lamports);
    send(context, &[ix], &[]).await.unwrap();
}

/// Sign with the context payer (which pays transaction fees) plus `signers`
/// and process on a fresh blockhash so repeated instructions never collide.
pub async fn send(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let payer = context.payer.insecure_clone();
    let blockhash = context.get_new_latest_blockhash().await.unwrap();
    let mut all_signers: Vec<&Keypair> = vec![&payer];
    all_signers.extend_from_slice(signers);
    let tx = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &all_signers[..],
        blockhash,
    );
    context.banks_client.process_transaction(tx).await
}

// ============================================================================
// INSTRUCTION BUILDERS
// ============================================================================

fn build(program_id: Pubkey, instruction: EscrowInstruction, accounts: Vec<AccountMeta>) -> Instruction {
    Instruction::new_with_bytes(program_id, &instruction.try_to_vec().unwrap(), accounts)
}

pub fn initialize_fee_account_ix(program_id: Pubkey, admin: Pubkey, fee_bps: u16) -> Instruction {
    let (fee_account, bump) = pda::find_fee_account_address(&admin, &program_id).unwrap();
    initialize_fee_account_ix_with(program_id, admin, fee_account, fee_bps, bump)
}

pub fn initialize_fee_account_ix_with(
    program_id: Pubkey,
    admin: Pubkey,
    fee_account: Pubkey,
    fee_bps: u16,
    bump: u8,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::InitializeFeeAccount { fee_bps, bump },
        vec![
            AccountMeta::new(admin, true),
            AccountMeta::new(fee_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub struct EscrowTerms {
    pub seq: u64,
    pub counterparty: Option<Pubkey>,
    pub arbiter: Option<Pubkey>,
    pub cancel_policy: CancelPolicy,
    pub expiry: Option<Deadline>,
}

impl EscrowTerms {
    pub fn with_counterparty(seq: u64, counterparty: Pubkey) -> Self {
        Self {
            seq,
            counterparty: Some(counterparty),
            arbiter: None,
            cancel_policy: CancelPolicy::InitializerOnly,
            expiry: None,
        }
    }
}

pub fn escrow_address(program_id: Pubkey, initializer: Pubkey, seq: u64) -> Pubkey {
    pda::find_escrow_address(&initializer, seq, &program_id).unwrap().0
}

pub fn create_escrow_ix(
    program_id: Pubkey,
    initializer: Pubkey,
    fee_account: Pubkey,
    terms: &EscrowTerms,
) -> Instruction {
    let (escrow, bump) = pda::find_escrow_address(&initializer, terms.seq, &program_id).unwrap();
    create_escrow_ix_with(program_id, initializer, escrow, fee_account, terms, bump)
}

pub fn create_escrow_ix_with(
    program_id: Pubkey,
    initializer: Pubkey,
    escrow: Pubkey,
    fee_account: Pubkey,
    terms: &EscrowTerms,
    bump: u8,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::CreateEscrow {
            seq: terms.seq,
            bump,
            counterparty: terms.counterparty,
            arbiter: terms.arbiter,
            cancel_policy: terms.cancel_policy,
            expiry: terms.expiry,
        },
        vec![
            AccountMeta::new(initializer, true),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(fee_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn fund_escrow_ix(
    program_id: Pubkey,
    initializer: Pubkey,
    escrow: Pubkey,
    fee_account: Pubkey,
    amount: u64,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::FundEscrow { amount },
        vec![
            AccountMeta::new(initializer, true),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(fee_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

pub fn complete_escrow_ix(
    program_id: Pubkey,
    authority: Pubkey,
    escrow: Pubkey,
    fee_account: Pubkey,
    counterparty: Pubkey,
    initializer: Pubkey,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::CompleteEscrow,
        vec![
            AccountMeta::new_readonly(authority, true),
            AccountMeta::new(escrow, false),
            AccountMeta::new(fee_account, false),
            AccountMeta::new(counterparty, false),
            AccountMeta::new(initializer, false),
        ],
    )
}

pub fn cancel_escrow_ix(
    program_id: Pubkey,
    authority: Pubkey,
    escrow: Pubkey,
    initializer: Pubkey,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::CancelEscrow,
        vec![
            AccountMeta::new_readonly(authority, true),
            AccountMeta::new(escrow, false),
            AccountMeta::new(initializer, false),
        ],
    )
}

pub fn withdraw_fees_ix(
    program_id: Pubkey,
    admin: Pubkey,
    fee_account: Pubkey,
    destination: Pubkey,
    amount: u64,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::WithdrawFees { amount },
        vec![
            AccountMeta::new_readonly(admin, true),
            AccountMeta::new(fee_account, false),
            AccountMeta::new(destination, false),
        ],
    )
}

pub fn set_counterparty_ix(
    program_id: Pubkey,
    initializer: Pubkey,
    escrow: Pubkey,
    counterparty: Pubkey,
) -> Instruction {
    build(
        program_id,
        EscrowInstruction::SetCounterparty { counterparty },
        vec![
            AccountMeta::new_readonly(initializer, true),
            AccountMeta::new(escrow, false),
        ],
    )
}

pub fn set_fee_rate_ix(program_id: Pubkey, admin: Pubkey, fee_account: Pubkey, fee_bps: u16) -> Instruction {
    build(
        program_id,
        EscrowInstruction::SetFeeRate { fee_bps },
        vec![
            AccountMeta::new_readonly(admin, true),
            AccountMeta::new(fee_account, false),
        ],
    )
}

pub fn set_paused_ix(program_id: Pubkey, admin: Pubkey, fee_account: Pubkey, paused: bool) -> Instruction {
    build(
        program_id,
        EscrowInstruction::SetPaused { paused },
        vec![
            AccountMeta::new_readonly(admin, true),
            AccountMeta::new(fee_account, false),
        ],
    )
}

// ============================================================================
// FLOWS
// ============================================================================

/// Create and fund an escrow owned by `env.initializer`, returning its address.
pub async fn create_funded_escrow(
    context: &mut ProgramTestContext,
    env: &TestEnv,
    terms: &EscrowTerms,
    amount: u64,
) -> Pubkey {
    let escrow = escrow_address(env.program_id, env.initializer.pubkey(), terms.seq);
    send(
        context,
        &[
            create_escrow_ix(env.program_id, env.initializer.pubkey(), env.fee_account, terms),
            fund_escrow_ix(
                env.program_id,
                env.initializer.pubkey(),
                escrow,
                env.fee_account,
                amount,
            ),
        ],
        &[&env.initializer],
    )
    .await
    .unwrap();
    escrow
}

// ============================================================================
// STATE READERS
// ============================================================================

pub async fn get_balance(context: &mut ProgramTestContext, address: Pubkey) -> u64 {
    context.banks_client.get_balance(address).await.unwrap()
}

pub async fn get_account_data(context: &mut ProgramTestContext, address: Pubkey) -> Option<Vec<u8>> {
    context
        .banks_client
        .get_account(address)
        .await
        .unwrap()
        .map(|account| account.data)
}

pub async fn read_escrow(context: &mut ProgramTestContext, address: Pubkey) -> Escrow {
    let data = get_account_data(context, address).await.expect("escrow account");
    Escrow::unpack(&data).unwrap()
}

pub async fn read_fee_account(context: &mut ProgramTestContext, address: Pubkey) -> FeeAccount {
    let data = get_account_data(context, address).await.expect("fee account");
    FeeAccount::unpack(&data).unwrap()
}

pub async fn rent_for(context: &mut ProgramTestContext, len: usize) -> u64 {
    context.banks_client.get_rent().await.unwrap().minimum_balance(len)
}

// ============================================================================
// ASSERTIONS
// ============================================================================

/// Assert the transaction failed in instruction `index` with `expected`.
pub fn assert_instruction_error(
    result: Result<(), BanksClientError>,
    index: u8,
    expected: InstructionError,
) {
    let err = result.expect_err("transaction should have failed").unwrap();
    assert_eq!(err, TransactionError::InstructionError(index, expected));
}

/// Assert a single-instruction transaction failed with `expected`.
pub fn assert_escrow_error(result: Result<(), BanksClientError>, expected: EscrowError) {
    assert_instruction_error(result, 0, InstructionError::Custom(expected as u32));
}
