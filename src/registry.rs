//! Locked positions keyed by (stage, role, staker)
//!
//! Deposits sharing a key merge into one position. The first deposit issues
//! a position token to the staker; its holder can redeem the whole locked
//! amount once the distributor is `REDEMPTION_COOLDOWN` stages further.
use solana_program::{hash::hashv, program_error::ProgramError, pubkey::Pubkey};

use crate::authority::{assert_authorized, AccessAuthority, Component, Operation};
use crate::error::{EmissionError, EmissionResult};
use crate::events::Event;
use crate::ledger::FungibleLedger;
use crate::state::{
    Position, PositionToken, Registry, Role, MINIMUM_STAKE_AMOUNT, REDEMPTION_COOLDOWN,
};
use crate::utils::rollback_on_error;

const POSITION_KEY_DOMAIN: &[u8] = b"staged-emission:position";

/// Identity of a position, used identically when staking and redeeming
pub fn derive_position_key(stage: i8, role: Role, staker: &Pubkey) -> [u8; 32] {
    hashv(&[
        POSITION_KEY_DOMAIN,
        &stage.to_le_bytes(),
        &[role as u8],
        staker.as_ref(),
    ])
    .to_bytes()
}

/// Staking for oneself always records the reserved self-staker role
pub fn effective_role(caller: &Pubkey, staker: &Pubkey, requested: Role) -> Role {
    if caller == staker {
        Role::SelfStaker
    } else {
        requested
    }
}

impl PositionToken {
    pub fn position_key(&self) -> [u8; 32] {
        derive_position_key(self.creation_stage, self.role, &self.staker)
    }

    pub fn redeemable_at(&self) -> i16 {
        self.creation_stage as i16 + REDEMPTION_COOLDOWN as i16
    }
}

impl Registry {
    pub fn assert_not_paused(&self) -> EmissionResult {
        if self.paused {
            return Err(EmissionError::ComponentPaused);
        }
        Ok(())
    }

    pub fn enter(&mut self) -> EmissionResult {
        if self.entered {
            return Err(EmissionError::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn issue_token_id(&mut self) -> EmissionResult<u64> {
        self.tokens_issued = self
            .tokens_issued
            .checked_add(1)
            .ok_or(EmissionError::Overflow)?;
        Ok(self.tokens_issued)
    }
}

pub struct StakeRequest {
    /// The signer whose funds are pulled
    pub caller: Pubkey,
    /// Token account of the caller
    pub source: Pubkey,
    pub staker: Pubkey,
    pub role: Role,
    pub amount: u64,
}

#[derive(Debug, PartialEq)]
pub enum StakeOutcome {
    /// The deposit was added to an existing position
    Merged { key: [u8; 32], position: Position },
    /// A new position and its token were issued
    Created {
        key: [u8; 32],
        position: Position,
        token: PositionToken,
        event: Event,
    },
}

impl StakeOutcome {
    pub fn position(&self) -> &Position {
        match self {
            StakeOutcome::Merged { position, .. } | StakeOutcome::Created { position, .. } => {
                position
            }
        }
    }
}

/// Pulls `amount` from the caller and locks it under the position key.
///
/// `existing` is the position currently stored under the key, if any.
/// `checkpoint` persists the registry before the ledger is called.
pub fn stake<L, F>(
    registry: &mut Registry,
    current_stage: i8,
    request: &StakeRequest,
    existing: Option<Position>,
    ledger: &mut L,
    mut checkpoint: F,
) -> Result<StakeOutcome, ProgramError>
where
    L: FungibleLedger,
    F: FnMut(&Registry) -> Result<(), ProgramError>,
{
    registry.assert_not_paused()?;
    let amount = request.amount;
    if amount < MINIMUM_STAKE_AMOUNT {
        return Err(EmissionError::AmountBelowMinimum.into());
    }
    if ledger.balance_of(&request.source)? < amount {
        return Err(EmissionError::InsufficientBalance.into());
    }
    if ledger.allowance(&request.source)? < amount {
        return Err(EmissionError::InsufficientAllowance.into());
    }

    rollback_on_error(registry, |r| {
        r.enter()?;
        let role = effective_role(&request.caller, &request.staker, request.role);
        let key = derive_position_key(current_stage, role, &request.staker);

        let outcome = match existing.filter(|p| p.locked_amount > 0) {
            Some(mut position) => {
                position.deposit(amount)?;
                StakeOutcome::Merged { key, position }
            }
            None => {
                let token_id = r.issue_token_id()?;
                StakeOutcome::Created {
                    key,
                    position: Position::new(token_id, amount),
                    token: PositionToken::new(token_id, request.staker, role, current_stage),
                    event: Event::PositionCreated {
                        staker: request.staker,
                        token_id,
                        role,
                        stage: current_stage,
                        amount,
                    },
                }
            }
        };

        checkpoint(&*r)?;
        ledger.transfer_from(&request.source, &r.vault, amount)?;
        r.exit();
        Ok(outcome)
    })
}

/// Pays the locked amount of a position back to its holder.
///
/// `checkpoint` runs once every check passed and before the ledger is
/// called, it is where the position and its token get deleted.
#[allow(clippy::too_many_arguments)]
pub fn redeem<L, F>(
    registry: &mut Registry,
    current_stage: i8,
    caller: &Pubkey,
    token: Option<&PositionToken>,
    position: Option<&Position>,
    destination: &Pubkey,
    ledger: &mut L,
    mut checkpoint: F,
) -> Result<Event, ProgramError>
where
    L: FungibleLedger,
    F: FnMut(&Registry) -> Result<(), ProgramError>,
{
    registry.assert_not_paused()?;
    let token = token.ok_or(EmissionError::PositionNotFound)?;
    if token.holder != *caller {
        return Err(EmissionError::NotHolder.into());
    }
    if (current_stage as i16) < token.redeemable_at() {
        return Err(EmissionError::PrematureRedemption.into());
    }
    let position = match position {
        Some(p) if p.token_id == token.token_id => p,
        _ => return Err(EmissionError::PositionNotFound.into()),
    };
    let amount = position.locked_amount;

    rollback_on_error(registry, |r| {
        r.enter()?;
        checkpoint(&*r)?;
        ledger.transfer(&r.vault, destination, amount)?;
        r.exit();
        Ok(Event::PositionRedeemed {
            staker: token.staker,
            token_id: token.token_id,
            amount,
        })
    })
}

/// Hands a position token over to `new_holder`
pub fn transfer_position(
    registry: &Registry,
    token: &mut PositionToken,
    caller: &Pubkey,
    new_holder: &Pubkey,
) -> Result<Event, ProgramError> {
    registry.assert_not_paused()?;
    if token.holder != *caller {
        return Err(EmissionError::NotHolder.into());
    }
    token.holder = *new_holder;
    Ok(Event::PositionTransferred {
        token_id: token.token_id,
        from: *caller,
        to: *new_holder,
    })
}

pub fn set_paused<A: AccessAuthority>(
    registry: &mut Registry,
    authority: &A,
    caller: &Pubkey,
    key: &Pubkey,
    paused: bool,
) -> Result<Event, ProgramError> {
    let operation = if paused {
        Operation::Pause
    } else {
        Operation::Unpause
    };
    assert_authorized(authority, caller, Component::Registry, operation)?;
    registry.paused = paused;
    Ok(if paused {
        Event::Paused { component: *key }
    } else {
        Event::Unpaused { component: *key }
    })
}
