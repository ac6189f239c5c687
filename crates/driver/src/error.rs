use crate::array::ArrayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("driver has no environments to step")]
    NoEnvironments,
    #[error("environment {slot} failed to reset")]
    Reset {
        slot: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("environment {slot} failed to step")]
    Step {
        slot: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("policy call failed")]
    Policy(#[source] anyhow::Error),
    #[error("step callback failed on slot {slot}")]
    StepCallback {
        slot: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("episode callback failed on slot {slot}")]
    EpisodeCallback {
        slot: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("action field `{field}` has leading dimension {got:?}, expected one entry per slot ({expected})")]
    ActionShape {
        field: String,
        expected: usize,
        got: Option<usize>,
    },
    #[error("slot {slot} field set diverges: expected {expected:?}, got {got:?}")]
    SchemaDivergence {
        slot: usize,
        expected: Vec<String>,
        got: Vec<String>,
    },
    #[error("field `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: ArrayError,
    },
}

impl DriverError {
    pub(crate) fn field(field: &str) -> impl FnOnce(ArrayError) -> Self + '_ {
        move |source| DriverError::Field { field: field.to_owned(), source }
    }
}
