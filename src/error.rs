//! # Error Types
//!
//! Construction-time and run-time errors for topology building and
//! materialization. All errors are synchronous, immediate and non-retryable:
//! a failing builder call leaves the graph exactly as it was, and a failing
//! `run()` leaves no partial wiring considered valid.

use thiserror::Error;

/// Error raised by [`GraphBuilder`](crate::GraphBuilder) operations.
///
/// Every variant leaves the graph unchanged: all checks complete before the
/// first mutation of the failing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// A second incoming edge was attached to a broadcast, or a second outgoing
  /// edge to a merge.
  #[error("{fan} already has its single-arity side attached")]
  FanAlreadyAttached {
    /// Rendered fan vertex, e.g. `Broadcast#7`.
    fan: String,
  },
  /// No edge carries the given flow label.
  #[error("no edge carries flow '{flow}'")]
  NoMatchingFlow {
    /// Name of the flow that matched nothing.
    flow: String,
  },
  /// A matching edge's open endpoint is already a defined vertex, not a
  /// placeholder.
  #[error("flow '{flow}' is already attached to {endpoint}")]
  AlreadyAttached {
    /// Name of the flow used for the lookup.
    flow: String,
    /// Rendered endpoint that was expected to be a placeholder.
    endpoint: String,
  },
}

/// Error raised by [`FlowGraph::validate`](crate::FlowGraph::validate) and
/// [`FlowGraph::run`](crate::FlowGraph::run).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
  /// The topology contains a directed cycle.
  #[error("unsupported cycle: {}", .path.join(" -> "))]
  UnsupportedCycle {
    /// Vertex sequence of the cycle, first vertex repeated at the end.
    path: Vec<String>,
  },
  /// One or more placeholder endpoints were never resolved.
  #[error("dangling endpoints: {}", .endpoints.join("; "))]
  DanglingEndpoint {
    /// One rendered `from -> flow -> to` entry per placeholder-incident edge.
    endpoints: Vec<String>,
  },
  /// A sink does not have exactly one incoming edge.
  #[error("{sink} has {incoming} incoming edges, expected exactly 1")]
  SinkArityViolation {
    /// Rendered sink vertex.
    sink: String,
    /// Observed incoming edge count.
    incoming: usize,
  },
  /// A merge does not have exactly two incoming edges.
  #[error("{fan} has {incoming} incoming edges, expected exactly 2")]
  MergeArityViolation {
    /// Rendered merge vertex.
    fan: String,
    /// Observed incoming edge count.
    incoming: usize,
  },
  /// A broadcast does not have exactly one incoming and two outgoing edges.
  #[error("{fan} has {incoming} incoming and {outgoing} outgoing edges, expected 1 and 2")]
  BroadcastArityViolation {
    /// Rendered broadcast vertex.
    fan: String,
    /// Observed incoming edge count.
    incoming: usize,
    /// Observed outgoing edge count.
    outgoing: usize,
  },
  /// Internal consistency failure: a traversal terminal that should be
  /// impossible after validation (a starting vertex that is not a sink, or a
  /// placeholder surviving into traversal).
  #[error("unexpected terminal vertex {vertex}")]
  UnexpectedTerminalVertex {
    /// Rendered offending vertex.
    vertex: String,
  },
}
