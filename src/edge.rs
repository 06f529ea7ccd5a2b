//! # Edge
//!
//! A directed, labeled connection between two topology vertices. The graph is
//! a multigraph: several edges may connect the same ordered vertex pair, told
//! apart by their flow labels, which are compared by identity.

use crate::traits::flow::{FlowRef, same_flow};
use crate::vertex::{Inlet, Outlet};
use std::fmt;

/// One directed `from -> to` connection carrying a flow label.
#[derive(Clone)]
pub struct Edge {
  from: Outlet,
  label: FlowRef,
  to: Inlet,
}

impl Edge {
  /// Creates an edge from `from` to `to` labeled with `label`.
  pub fn new(from: Outlet, label: FlowRef, to: Inlet) -> Self {
    Self { from, label, to }
  }

  /// The origin side of this edge.
  pub fn from(&self) -> &Outlet {
    &self.from
  }

  /// The flow label of this edge.
  pub fn label(&self) -> &FlowRef {
    &self.label
  }

  /// The destination side of this edge.
  pub fn to(&self) -> &Inlet {
    &self.to
  }

  /// Whether this edge carries exactly the given label (identity comparison).
  pub fn has_label(&self, flow: &FlowRef) -> bool {
    same_flow(&self.label, flow)
  }

  /// Replace the destination, keeping origin and label. Used by placeholder
  /// resolution; preserves the edge's position among parallel edges.
  pub(crate) fn retarget(&mut self, to: Inlet) {
    self.to = to;
  }

  /// Replace the origin, keeping destination and label.
  pub(crate) fn reroot(&mut self, from: Outlet) {
    self.from = from;
  }
}

impl fmt::Debug for Edge {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} -> {} -> {}",
      self.from.vertex(),
      self.label.name(),
      self.to.vertex()
    )
  }
}
