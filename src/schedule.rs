//! Stage allocation table
use crate::error::EmissionError;
use crate::state::{MAX_STAGE, TOKEN_DECIMALS_MULTIPLIER};

/// Total amount minted over stages 0 to 10, in whole tokens
pub const TOTAL_DISTRIBUTION: u64 = 122_500_000;

/// Treasury tranche paid for stages 4 to 8, in whole tokens
pub const TREASURY_TRANCHE_A: u64 = 5_000_000;
/// Treasury tranche paid for stages 9 and 10, in whole tokens
pub const TREASURY_TRANCHE_B: u64 = 2_500_000;

/// Amount paid to each of Content and DevInfra for a stage
pub fn band(stage: i8) -> u64 {
    let whole = match stage {
        0 => 12_500_000,
        1 => 10_000_000,
        2 => 7_500_000,
        3 => 5_000_000,
        4..=5 => 2_500_000,
        6..=MAX_STAGE => 1_250_000,
        _ => 0,
    };
    whole * TOKEN_DECIMALS_MULTIPLIER
}

/// Treasury tranche for a stage
pub fn treasury_band(stage: i8) -> u64 {
    let whole = match stage {
        0..=3 => 0,
        4..=8 => TREASURY_TRANCHE_A,
        9..=MAX_STAGE => TREASURY_TRANCHE_B,
        _ => 0,
    };
    whole * TOKEN_DECIMALS_MULTIPLIER
}

/// Content and DevInfra each receive one full band, hence the factor of 2
pub fn mint_amount(stage: i8) -> Result<u64, EmissionError> {
    band(stage)
        .checked_mul(2)
        .and_then(|a| a.checked_add(treasury_band(stage)))
        .ok_or(EmissionError::Overflow)
}

pub fn validate_schedule() -> Result<(), EmissionError> {
    let mut total: u64 = 0;
    for stage in 0..=MAX_STAGE {
        total = total
            .checked_add(mint_amount(stage)?)
            .ok_or(EmissionError::Overflow)?;
    }
    let expected = TOTAL_DISTRIBUTION
        .checked_mul(TOKEN_DECIMALS_MULTIPLIER)
        .ok_or(EmissionError::Overflow)?;
    if total != expected {
        return Err(EmissionError::InvalidAllocation);
    }
    Ok(())
}
