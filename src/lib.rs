//! # Streamloom
//!
//! Typed, finite dataflow topologies: build them incrementally, validate them
//! structurally, and materialize them into a wired network of
//! backpressure-aware producer/consumer links.
//!
//! Streamloom models a topology as a directed multigraph of endpoints
//! (sources, sinks), fan operators (merge, broadcast) and labeled
//! transformation stages (flows). The crate covers three phases:
//!
//! - **Build**: [`GraphBuilder`] adds labeled edges one at a time, supports
//!   open-ended edges through unique placeholder endpoints, and resolves those
//!   placeholders later by flow label.
//! - **Validate**: [`FlowGraph::validate`] rejects directed cycles and any
//!   placeholder endpoint left unresolved.
//! - **Materialize**: [`FlowGraph::run`] walks the validated graph backward
//!   from every sink and wires concrete consumer/producer entry points,
//!   materializing the subgraph above each broadcast exactly once no matter
//!   how many downstream branches reach it.
//!
//! The transformation stages themselves, the backpressure protocol, and the
//! runtime that eventually drives elements are external collaborators behind
//! the traits in [`traits`]; the core only orchestrates wiring. A reference
//! in-memory runtime over tokio channels lives in [`channel`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use streamloom::GraphBuilder;
//! use streamloom::channel::{ChannelFans, ChannelFlow, ChannelRuntime, CollectSink, VecSource};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = VecSource::from_iter("numbers", [1i64, 2, 3]);
//! let (sink, _rx) = CollectSink::new("out", 16);
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_edge(source, ChannelFlow::identity("pass"), sink)?;
//! let graph = builder.build();
//!
//! let mut runtime = ChannelRuntime::default();
//! let mut fans = ChannelFans;
//! let materialization = graph.run(&mut runtime, &mut fans)?;
//! # let _ = materialization;
//! # Ok(())
//! # }
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Reference channel-backed runtime for materialized topologies.
pub mod channel;
/// Labeled directed edges between topology vertices.
pub mod edge;
/// Error types for construction and materialization.
pub mod error;
/// Multigraph storage and the frozen graph handle.
pub mod graph;
/// Incremental builder with placeholder attachment.
pub mod graph_builder;
/// Backward-traversal materializer with memoized fan-out.
pub mod materializer;
/// Boundary traits for external collaborators.
pub mod traits;
/// Structural validation: cycles and dangling endpoints.
pub mod validator;
/// Vertex model: endpoints, fan operators, placeholders.
pub mod vertex;

pub use error::{BuildError, RunError};
pub use graph::FlowGraph;
pub use graph_builder::GraphBuilder;
pub use materializer::Materialization;

#[cfg(test)]
mod channel_test;
#[cfg(test)]
mod graph_test;
