use std::collections::HashMap;

use crate::{ExecutionLimits, GraphError, Node, NodeContext, StateSchema};

/// Sentinel a conditional edge returns to end the run.
pub const END: &str = "__end__";

enum Edge<S> {
    Fixed(String),
    Conditional(Box<dyn Fn(&S) -> String + Send + Sync>),
}

pub struct GraphBuilder<S: StateSchema> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
    limits: ExecutionLimits,
}

impl<S: StateSchema> Default for GraphBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateSchema> GraphBuilder<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
            limits: ExecutionLimits::default(),
        }
    }

    pub fn add_node<N>(mut self, name: &str, node: N) -> Self
    where
        N: Node<S> + 'static,
    {
        self.nodes.insert(name.to_string(), Box::new(node));
        self
    }

    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .insert(from.to_string(), Edge::Fixed(to.to_string()));
        self
    }

    /// Route out of `from` by inspecting the state after the node ran. The
    /// closure returns the next node's name, or [`END`] to end the run.
    pub fn add_conditional_edge<F>(mut self, from: &str, decide: F) -> Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.edges
            .insert(from.to_string(), Edge::Conditional(Box::new(decide)));
        self
    }

    pub fn set_entry(mut self, name: &str) -> Self {
        self.entry = Some(name.to_string());
        self
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Result<Graph<S>, GraphError> {
        let entry = self.entry.ok_or_else(|| GraphError::MissingNode {
            node: "<entry>".to_string(),
        })?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::MissingNode { node: entry });
        }
        for (from, edge) in &self.edges {
            if let Edge::Fixed(to) = edge {
                if to != END && !self.nodes.contains_key(to) {
                    return Err(GraphError::InvalidEdge {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
        }
        Ok(Graph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            limits: self.limits,
        })
    }
}

pub struct Graph<S: StateSchema> {
    nodes: HashMap<String, Box<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: String,
    limits: ExecutionLimits,
}

impl<S: StateSchema> Graph<S> {
    /// Drive the graph from the builder's entry node until a terminal node,
    /// an [`END`] edge, or an error.
    pub async fn run(&self, ctx: &NodeContext, state: S) -> Result<S, GraphError> {
        let entry = self.entry.clone();
        self.run_from(ctx, state, &entry).await
    }

    /// Same as [`Graph::run`] but starting at `entry`. The caller owns resume
    /// semantics: a resumed thread typically re-enters downstream of the
    /// nodes that only make sense on a fresh task.
    pub async fn run_from(
        &self,
        ctx: &NodeContext,
        mut state: S,
        entry: &str,
    ) -> Result<S, GraphError> {
        let mut current = entry.to_string();
        if !self.nodes.contains_key(&current) {
            return Err(GraphError::MissingNode { node: current });
        }

        let mut executed = 0usize;
        loop {
            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::MissingNode {
                    node: current.clone(),
                })?;
            state = node
                .run(ctx, state)
                .await
                .map_err(|source| GraphError::Node {
                    node: current.clone(),
                    source,
                })?;
            executed += 1;

            let next = match self.edges.get(&current) {
                Some(Edge::Fixed(next)) => next.clone(),
                Some(Edge::Conditional(decide)) => decide(&state),
                None => break,
            };
            if next == END {
                break;
            }
            if !self.nodes.contains_key(&next) {
                return Err(GraphError::InvalidEdge {
                    from: current,
                    to: next,
                });
            }
            if let Some(max) = self.limits.max_transitions {
                if executed >= max {
                    return Err(GraphError::TransitionLimit { max });
                }
            }
            current = next;
        }
        Ok(state)
    }
}
