use crate::config::Config;
use crate::transition::Fields;
use std::any::Any;

/// Opaque recurrent state owned by a [`Policy`]. The driver stores it between
/// calls and never looks inside.
pub type PolicyState = Box<dyn Any + Send>;

/// Maps a batch of observations to a batch of actions.
///
/// Every field of the returned action map must have a leading dimension equal
/// to the number of environments in the batch. The policy updates `state` in
/// place; it starts out as `None` and is kept as is when the policy does not
/// touch it, including when the call fails.
pub trait Policy {
    /// # Errors
    ///
    /// Any error aborts the current rollout.
    fn act(
        &mut self,
        observation: &Fields,
        state: &mut Option<PolicyState>,
        config: &Config,
    ) -> anyhow::Result<Fields>;
}

impl<F> Policy for F
where
    F: FnMut(&Fields, &mut Option<PolicyState>, &Config) -> anyhow::Result<Fields>,
{
    fn act(
        &mut self,
        observation: &Fields,
        state: &mut Option<PolicyState>,
        config: &Config,
    ) -> anyhow::Result<Fields> {
        self(observation, state, config)
    }
}
