//! Capability checks gating privileged operations
use solana_program::pubkey::Pubkey;

use crate::error::EmissionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Distributor,
    Registry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    ConfigureRecipients,
    AdvanceStage,
    SendStageReward,
    Pause,
    Unpause,
    ChangeAuthority,
}

impl Operation {
    /// Whether `self` exists as a privileged operation of `component`
    pub fn applies_to(&self, component: Component) -> bool {
        match self {
            Operation::ConfigureRecipients
            | Operation::AdvanceStage
            | Operation::SendStageReward => component == Component::Distributor,
            Operation::Pause | Operation::Unpause | Operation::ChangeAuthority => true,
        }
    }
}

/// Answers whether a caller may invoke a privileged operation on a component
pub trait AccessAuthority {
    fn check(
        &self,
        caller: &Pubkey,
        component: Component,
        operation: Operation,
    ) -> Result<bool, EmissionError>;
}

/// Allows exactly the authority key stored in the component state
pub struct SignerAuthority {
    pub authority: Pubkey,
    pub component: Component,
}

impl SignerAuthority {
    pub fn new(authority: Pubkey, component: Component) -> Self {
        Self {
            authority,
            component,
        }
    }
}

impl AccessAuthority for SignerAuthority {
    fn check(
        &self,
        caller: &Pubkey,
        component: Component,
        operation: Operation,
    ) -> Result<bool, EmissionError> {
        Ok(component == self.component
            && operation.applies_to(component)
            && *caller == self.authority)
    }
}

/// A negative or failing answer is an authorization failure
pub fn assert_authorized<A: AccessAuthority>(
    authority: &A,
    caller: &Pubkey,
    component: Component,
    operation: Operation,
) -> Result<(), EmissionError> {
    match authority.check(caller, component, operation) {
        Ok(true) => Ok(()),
        _ => Err(EmissionError::Unauthorized),
    }
}
