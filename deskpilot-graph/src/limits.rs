/// Driver-level cap on node transitions within one run. Cycles are legal in
/// these graphs; bounded retries live in the nodes that decide to retry.
#[derive(Clone, Debug)]
pub struct ExecutionLimits {
    pub max_transitions: Option<usize>,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_transitions: Some(50),
        }
    }
}
