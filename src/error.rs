use num_derive::FromPrimitive;
use thiserror::Error;

use solana_program::{decode_error::DecodeError, program_error::ProgramError};

pub type EmissionResult<T = ()> = Result<T, EmissionError>;

#[derive(Clone, Copy, Debug, Error, FromPrimitive, PartialEq, Eq)]
pub enum EmissionError {
    // Account shape
    #[error("This account is already initialized")]
    AlreadyInitialized,
    #[error("Data type mismatch")]
    DataTypeMismatch,
    #[error("Wrong system program key")]
    WrongSystemProgram,
    #[error("Wrong SPL token program ID")]
    WrongSplTokenProgramId,
    #[error("Wrong account owner")]
    WrongOwner,
    #[error("Wrong token account owner")]
    WrongTokenAccountOwner,
    #[error("Account not generated deterministically")]
    AccountNotDeterministic,
    #[error("Wrong mint")]
    WrongMint,
    #[error("Wrong custody account")]
    WrongCustody,
    #[error("Wrong distributor account")]
    WrongDistributor,
    #[error("Wrong recipient account")]
    WrongRecipient,
    #[error("Token account cannot have a delegate or close authority")]
    DelegatedTokenAccount,
    #[error("A ledger account required by the operation was not provided")]
    MissingLedgerAccount,

    // Validation
    #[error("Recipient address cannot be null")]
    NullRecipient,
    #[error("Stage is out of range")]
    StageOutOfRange,
    #[error("Amount is below the minimum stake amount")]
    AmountBelowMinimum,
    #[error("Allocation schedule does not sum to the total distribution")]
    InvalidAllocation,
    #[error("Overflow")]
    Overflow,

    // State conflict
    #[error("Stage advance must target the next stage")]
    OutOfOrderStage,
    #[error("The reward of the current stage has not been sent")]
    RewardNotSent,
    #[error("Recipients are not configured")]
    RecipientsNotConfigured,
    #[error("The scheduled mint of this stage already happened")]
    DuplicateMint,
    #[error("The reward of this stage was already sent")]
    RewardAlreadySent,
    #[error("The position cannot be redeemed yet")]
    PrematureRedemption,
    #[error("Position not found")]
    PositionNotFound,
    #[error("Caller is not the holder of the position token")]
    NotHolder,
    #[error("The component is paused")]
    ComponentPaused,
    #[error("Reentrant call into a guarded operation")]
    Reentrancy,
    #[error("The holder has no position token to release")]
    HolderBalanceUnderflow,

    // Authorization
    #[error("The caller is not allowed to invoke this operation")]
    Unauthorized,
    #[error("The authority must sign")]
    AuthorityMustSign,
    #[error("The caller must sign")]
    CallerMustSign,

    // Resource
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient allowance")]
    InsufficientAllowance,
}

/// The error categories reported to callers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Account,
    Validation,
    StateConflict,
    Authorization,
    Resource,
}

impl EmissionError {
    pub fn kind(&self) -> ErrorKind {
        use EmissionError::*;
        match self {
            AlreadyInitialized
            | DataTypeMismatch
            | WrongSystemProgram
            | WrongSplTokenProgramId
            | WrongOwner
            | WrongTokenAccountOwner
            | AccountNotDeterministic
            | WrongMint
            | WrongCustody
            | WrongDistributor
            | WrongRecipient
            | DelegatedTokenAccount
            | MissingLedgerAccount => ErrorKind::Account,
            NullRecipient | StageOutOfRange | AmountBelowMinimum | InvalidAllocation | Overflow => {
                ErrorKind::Validation
            }
            OutOfOrderStage
            | RewardNotSent
            | RecipientsNotConfigured
            | DuplicateMint
            | RewardAlreadySent
            | PrematureRedemption
            | PositionNotFound
            | NotHolder
            | ComponentPaused
            | Reentrancy
            | HolderBalanceUnderflow => ErrorKind::StateConflict,
            Unauthorized | AuthorityMustSign | CallerMustSign => ErrorKind::Authorization,
            InsufficientBalance | InsufficientAllowance => ErrorKind::Resource,
        }
    }
}

impl From<EmissionError> for ProgramError {
    fn from(e: EmissionError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for EmissionError {
    fn type_of() -> &'static str {
        "EmissionError"
    }
}
