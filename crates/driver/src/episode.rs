use crate::array::Array;
use crate::error::DriverError;
use crate::transition::{Episode, Fields, Observation, Transition, DISCOUNT, REWARD};

/// Transitions of the episode currently running in one slot.
///
/// The first entry is always the synthetic reset transition: the initial
/// observation with `reward = 0` and `discount = 1` and no action fields.
#[derive(Debug, Clone, Default)]
pub struct EpisodeBuffer {
    transitions: Vec<Transition>,
}

impl EpisodeBuffer {
    #[must_use]
    pub fn start(observation: &Observation) -> Self {
        let mut fields: Fields = observation
            .iter()
            .map(|(k, v)| (k.clone(), v.clone().convert()))
            .collect();
        fields.insert(REWARD.to_owned(), Array::scalar(0.0f64).convert());
        fields.insert(DISCOUNT.to_owned(), Array::scalar(1.0f64).convert());
        Self { transitions: vec![Transition::new(fields)] }
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Number of transitions, including the reset transition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Stacks the buffered transitions into an [`Episode`].
    ///
    /// The episode schema is the reset transition's fields plus the fields of
    /// the first real transition. Fields missing at index 0 are filled with
    /// zeros shaped like the first real value, and reset values whose dtype
    /// differs from that value are cast to it so every column stacks cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::SchemaDivergence`] if a later transition lacks a
    /// field of the episode schema, and [`DriverError::Field`] if the values of
    /// one field disagree in shape or dtype across time.
    pub fn finalize(&self, slot: usize) -> Result<Episode, DriverError> {
        let Some((reset, rest)) = self.transitions.split_first() else {
            return Ok(Episode::new(Fields::new()));
        };
        let mut head = reset.clone();
        if let Some(first) = rest.first() {
            let padded = head.fields_mut();
            for (key, value) in first.fields() {
                match padded.get_mut(key) {
                    None => {
                        padded.insert(key.clone(), value.zeros_like());
                    }
                    Some(existing) if existing.dtype() != value.dtype() => {
                        *existing = existing.cast(value.dtype());
                    }
                    Some(_) => {}
                }
            }
        }

        let mut fields = Fields::new();
        for (key, value) in head.fields() {
            let mut column = Vec::with_capacity(self.transitions.len());
            column.push(value);
            for transition in rest {
                let next = transition.get(key).ok_or_else(|| DriverError::SchemaDivergence {
                    slot,
                    expected: head.keys().map(str::to_owned).collect(),
                    got: transition.keys().map(str::to_owned).collect(),
                })?;
                column.push(next);
            }
            let stacked = Array::stack(&column).map_err(DriverError::field(key))?;
            fields.insert(key.clone(), stacked.convert());
        }
        Ok(Episode::new(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DType;

    fn observation(x: f64) -> Observation {
        Fields::from([("pos".to_owned(), Array::vector(vec![x, x]))])
    }

    fn transition(x: f64, action: f32, reward: f64, discount: f64) -> Transition {
        let mut fields = observation(x);
        for value in fields.values_mut() {
            *value = value.clone().convert();
        }
        fields.insert("action".to_owned(), Array::vector(vec![action]));
        fields.insert(REWARD.to_owned(), Array::scalar(reward).convert());
        fields.insert(DISCOUNT.to_owned(), Array::scalar(discount).convert());
        Transition::new(fields)
    }

    #[test]
    fn reset_transition_has_no_action() {
        let buffer = EpisodeBuffer::start(&observation(1.0));
        let reset = &buffer.transitions()[0];
        assert!(!reset.contains("action"));
        assert_eq!(reset.reward().unwrap().item::<f32>(), Some(0.0));
        assert_eq!(reset.discount().unwrap().item::<f32>(), Some(1.0));
        assert_eq!(reset.get("pos").unwrap().dtype(), DType::F32);
    }

    #[test]
    fn finalize_pads_missing_fields_with_zeros() {
        let mut buffer = EpisodeBuffer::start(&observation(0.0));
        buffer.push(transition(0.0, 2.5, 1.0, 1.0));
        buffer.push(transition(1.0, -1.0, 2.0, 0.0));
        let episode = buffer.finalize(0).unwrap();

        assert_eq!(episode.len(), 3);
        let action = episode.get("action").unwrap();
        assert_eq!(action.shape(), &[3, 1]);
        assert_eq!(action.as_slice::<f32>(), Some(&[0.0f32, 2.5, -1.0][..]));
        let reward = episode.get(REWARD).unwrap();
        assert_eq!(reward.as_slice::<f32>(), Some(&[0.0f32, 1.0, 2.0][..]));
        assert_eq!(episode.get("pos").unwrap().shape(), &[3, 2]);
        assert_eq!(episode.total_reward(), 3.0);
    }

    #[test]
    fn finalize_aligns_reset_reward_dtype() {
        let mut buffer = EpisodeBuffer::start(&observation(0.0));
        let mut t = transition(0.0, 0.0, 0.0, 0.0);
        t.fields_mut().insert(REWARD.to_owned(), Array::scalar(3i64).convert());
        buffer.push(t);
        let episode = buffer.finalize(0).unwrap();
        let reward = episode.get(REWARD).unwrap();
        assert_eq!(reward.dtype(), DType::I32);
        assert_eq!(reward.as_slice::<i32>(), Some(&[0, 3][..]));
    }

    #[test]
    fn finalize_rejects_transition_missing_schema_field() {
        let mut buffer = EpisodeBuffer::start(&observation(0.0));
        buffer.push(transition(0.0, 1.0, 0.0, 1.0));
        let mut short = transition(1.0, 1.0, 0.0, 0.0);
        short.fields_mut().remove("action");
        buffer.push(short);
        assert!(matches!(
            buffer.finalize(4),
            Err(DriverError::SchemaDivergence { slot: 4, .. })
        ));
    }
}
