//! Account layouts

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::EscrowError;

/// PDA seeds
pub mod seeds {
    pub const FEE_ACCOUNT_SEED: &[u8] = b"fee_account";
    pub const ESCROW_SEED: &[u8] = b"escrow";
}

/// Leading tag of an account that was never written or has been closed.
pub const UNINITIALIZED_TAG: u8 = 0;

/// Fixed-size, tagged and versioned account layout.
///
/// Every account starts with `[tag, version]` followed by its fields in
/// declaration order. `LEN` is the largest encoding and is also the
/// allocated size, so optional fields never shift the buffer length.
pub trait AccountSchema: BorshSerialize + BorshDeserialize {
    const TAG: u8;
    const VERSION: u8;
    const LEN: usize;

    /// Decode from account data, rejecting foreign or truncated layouts.
    fn unpack(data: &[u8]) -> Result<Self, EscrowError> {
        match data.first() {
            None | Some(&UNINITIALIZED_TAG) => return Err(EscrowError::AccountNotFound),
            Some(tag) if *tag != Self::TAG => return Err(EscrowError::CorruptAccount),
            Some(_) => {}
        }
        if data.len() < Self::LEN || data[1] != Self::VERSION {
            return Err(EscrowError::CorruptAccount);
        }
        Self::deserialize(&mut &data[..]).map_err(|_| EscrowError::CorruptAccount)
    }

    /// Encode into account data. The buffer must hold at least `LEN` bytes.
    fn pack(&self, dst: &mut [u8]) -> Result<(), EscrowError> {
        if dst.len() < Self::LEN {
            return Err(EscrowError::CorruptAccount);
        }
        self.serialize(&mut &mut dst[..])
            .map_err(|_| EscrowError::CorruptAccount)
    }
}

/// Protocol fee vault, one per admin.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeeAccount {
    pub tag: u8,
    pub version: u8,
    pub admin: Pubkey,
    pub bump: u8,
    /// Rate captured by escrows created from now on
    pub fee_bps: u16,
    pub accumulated_fees: u64,
    pub total_withdrawn: u64,
    pub is_paused: bool,
}

impl AccountSchema for FeeAccount {
    const TAG: u8 = 1;
    const VERSION: u8 = 1;
    const LEN: usize = 1 + 1 + 32 + 1 + 2 + 8 + 8 + 1;
}

impl FeeAccount {
    pub fn new(admin: Pubkey, bump: u8, fee_bps: u16) -> Self {
        Self {
            tag: Self::TAG,
            version: Self::VERSION,
            admin,
            bump,
            fee_bps,
            accumulated_fees: 0,
            total_withdrawn: 0,
            is_paused: false,
        }
    }
}

/// Lifecycle state of an escrow.
///
/// Completed and Cancelled are terminal; the account is closed in the same
/// instruction that reaches them, so they are never read back from chain.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowState {
    Created,
    Funded,
    Completed,
    Cancelled,
}

/// Who may cancel before the deadline passes.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelPolicy {
    InitializerOnly,
    InitializerOrCounterparty,
}

/// Logical deadline after which anyone may cancel.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    Slot(u64),
    UnixTimestamp(i64),
}

/// Single trade held in custody.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Escrow {
    pub tag: u8,
    pub version: u8,
    pub initializer: Pubkey,
    pub counterparty: Option<Pubkey>,
    pub arbiter: Option<Pubkey>,
    /// Fee account the rate was captured from and the fee is paid to
    pub fee_account: Pubkey,
    pub seq: u64,
    pub deposited_amount: u64,
    pub fee_bps: u16,
    pub state: EscrowState,
    pub cancel_policy: CancelPolicy,
    pub expiry: Option<Deadline>,
    pub bump: u8,
}

impl AccountSchema for Escrow {
    const TAG: u8 = 2;
    const VERSION: u8 = 1;
    const LEN: usize =
        1 + 1 + 32 + (1 + 32) + (1 + 32) + 32 + 8 + 8 + 2 + 1 + 1 + (1 + 1 + 8) + 1;
}

impl Escrow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initializer: Pubkey,
        counterparty: Option<Pubkey>,
        arbiter: Option<Pubkey>,
        fee_account: Pubkey,
        seq: u64,
        fee_bps: u16,
        cancel_policy: CancelPolicy,
        expiry: Option<Deadline>,
        bump: u8,
    ) -> Self {
        Self {
            tag: Self::TAG,
            version: Self::VERSION,
            initializer,
            counterparty,
            arbiter,
            fee_account,
            seq,
            deposited_amount: 0,
            fee_bps,
            state: EscrowState::Created,
            cancel_policy,
            expiry,
            bump,
        }
    }
}
