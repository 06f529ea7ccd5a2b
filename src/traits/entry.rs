use std::any::Any;

/// Consumer-side handle of the external backpressure-aware delivery contract.
///
/// The contract itself (single active subscription, explicit demand
/// signaling, termination via completion or error) lives entirely outside the
/// core: materialization only moves these handles into position. The one
/// affordance the trait carries is downcast support, so the runtime that
/// created an entry point can recover its concrete type when the wired
/// network starts moving elements.
pub trait ConsumerEntryPoint: Send {
  /// Consume the boxed entry point for downcasting.
  fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// Producer-side handle of the delivery contract.
///
/// A producer entry point represents a shared output; the core attaches every
/// downstream branch that reaches it. For a broadcast this is the one
/// concurrency-relevant guarantee the core upholds: many independent
/// downstream consumers subscribe to one producer whose upstream was
/// materialized exactly once.
pub trait ProducerEntryPoint: Send + Sync {
  /// Connect a downstream consumer to this shared output.
  fn attach(&self, downstream: Box<dyn ConsumerEntryPoint>);
}
