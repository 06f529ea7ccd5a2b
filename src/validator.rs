//! # Validator
//!
//! Pure structural checks over a frozen topology, run at the start of
//! [`FlowGraph::run`](crate::FlowGraph::run) and available standalone through
//! [`FlowGraph::validate`](crate::FlowGraph::validate).
//!
//! Order matters: the cycle check runs first, then the dangling-endpoint
//! check; both complete before any materialization step. Validation never
//! mutates the graph.

use crate::error::RunError;
use crate::graph::Multigraph;
use crate::vertex::Vertex;
use tracing::debug;

/// Check the graph for directed cycles and unresolved placeholders.
pub(crate) fn validate(graph: &Multigraph) -> Result<(), RunError> {
  if let Some(cycle) = graph.find_cycle() {
    let path: Vec<String> = cycle.iter().map(Vertex::to_string).collect();
    debug!(path = ?path, "validation failed: cycle");
    return Err(RunError::UnsupportedCycle { path });
  }

  let mut endpoints = Vec::new();
  for vertex in graph.vertices() {
    match vertex {
      Vertex::UndefinedSource(_) => {
        for edge in graph.outgoing(&vertex) {
          endpoints.push(format!(
            "{} -> {} -> {}",
            vertex,
            edge.label().name(),
            edge.to().vertex()
          ));
        }
      }
      Vertex::UndefinedSink(_) => {
        for edge in graph.incoming(&vertex) {
          endpoints.push(format!(
            "{} -> {} -> {}",
            edge.from().vertex(),
            edge.label().name(),
            vertex
          ));
        }
      }
      _ => {}
    }
  }
  if !endpoints.is_empty() {
    debug!(endpoints = ?endpoints, "validation failed: dangling endpoints");
    return Err(RunError::DanglingEndpoint { endpoints });
  }

  debug!(
    vertices = graph.vertices().len(),
    edges = graph.edges().len(),
    "validation passed"
  );
  Ok(())
}
