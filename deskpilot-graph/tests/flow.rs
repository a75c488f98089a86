use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use deskpilot_core::DeskpilotError;
use deskpilot_graph::{
    ExecutionLimits, GraphBuilder, GraphError, Node, NodeContext, StateSchema, END,
};

#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq)]
struct LoopState {
    count: u32,
    visited: Vec<String>,
}

impl StateSchema for LoopState {}

struct Tag(&'static str);

#[async_trait]
impl Node<LoopState> for Tag {
    async fn run(
        &self,
        _ctx: &NodeContext,
        mut state: LoopState,
    ) -> Result<LoopState, DeskpilotError> {
        state.visited.push(self.0.to_string());
        Ok(state)
    }
}

struct Bump;

#[async_trait]
impl Node<LoopState> for Bump {
    async fn run(
        &self,
        _ctx: &NodeContext,
        mut state: LoopState,
    ) -> Result<LoopState, DeskpilotError> {
        state.count += 1;
        state.visited.push("bump".to_string());
        Ok(state)
    }
}

struct Explode;

#[async_trait]
impl Node<LoopState> for Explode {
    async fn run(&self, _ctx: &NodeContext, _state: LoopState) -> Result<LoopState, DeskpilotError> {
        Err(DeskpilotError::Custom("boom".to_string()))
    }
}

fn ctx() -> NodeContext {
    NodeContext::new("thread-1", "run-1")
}

#[tokio::test]
async fn runs_linear_chain_in_order() {
    let graph = GraphBuilder::new()
        .add_node("first", Tag("first"))
        .add_node("second", Tag("second"))
        .add_edge("first", "second")
        .set_entry("first")
        .build()
        .unwrap();

    let out = graph.run(&ctx(), LoopState::default()).await.unwrap();
    assert_eq!(out.visited, vec!["first", "second"]);
}

#[tokio::test]
async fn conditional_edge_loops_until_end() {
    let graph = GraphBuilder::new()
        .add_node("bump", Bump)
        .add_conditional_edge("bump", |state: &LoopState| {
            if state.count >= 3 {
                END.to_string()
            } else {
                "bump".to_string()
            }
        })
        .set_entry("bump")
        .build()
        .unwrap();

    let out = graph.run(&ctx(), LoopState::default()).await.unwrap();
    assert_eq!(out.count, 3);
}

#[tokio::test]
async fn entry_override_skips_upstream_nodes() {
    let graph = GraphBuilder::new()
        .add_node("first", Tag("first"))
        .add_node("second", Tag("second"))
        .add_edge("first", "second")
        .set_entry("first")
        .build()
        .unwrap();

    let out = graph
        .run_from(&ctx(), LoopState::default(), "second")
        .await
        .unwrap();
    assert_eq!(out.visited, vec!["second"]);
}

#[tokio::test]
async fn transition_limit_stops_infinite_loops() {
    let graph = GraphBuilder::new()
        .add_node("bump", Bump)
        .add_conditional_edge("bump", |_: &LoopState| "bump".to_string())
        .with_limits(ExecutionLimits {
            max_transitions: Some(5),
        })
        .set_entry("bump")
        .build()
        .unwrap();

    let err = graph.run(&ctx(), LoopState::default()).await.unwrap_err();
    assert!(matches!(err, GraphError::TransitionLimit { max: 5 }));
}

#[tokio::test]
async fn node_failure_names_the_node() {
    let graph = GraphBuilder::new()
        .add_node("explode", Explode)
        .set_entry("explode")
        .build()
        .unwrap();

    let err = graph.run(&ctx(), LoopState::default()).await.unwrap_err();
    match err {
        GraphError::Node { node, .. } => assert_eq!(node, "explode"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn build_rejects_missing_entry() {
    let result = GraphBuilder::<LoopState>::new()
        .add_node("only", Tag("only"))
        .build();
    assert!(matches!(result, Err(GraphError::MissingNode { .. })));
}

#[tokio::test]
async fn build_rejects_edge_to_unknown_node() {
    let result = GraphBuilder::new()
        .add_node("first", Tag("first"))
        .add_edge("first", "ghost")
        .set_entry("first")
        .build();
    match result {
        Err(GraphError::InvalidEdge { from, to }) => {
            assert_eq!(from, "first");
            assert_eq!(to, "ghost");
        }
        _ => panic!("expected invalid edge"),
    }
}

#[tokio::test]
async fn conditional_edge_to_unknown_node_fails_at_runtime() {
    let graph = GraphBuilder::new()
        .add_node("first", Tag("first"))
        .add_conditional_edge("first", |_: &LoopState| "ghost".to_string())
        .set_entry("first")
        .build()
        .unwrap();

    let err = graph.run(&ctx(), LoopState::default()).await.unwrap_err();
    assert!(matches!(err, GraphError::InvalidEdge { .. }));
}
