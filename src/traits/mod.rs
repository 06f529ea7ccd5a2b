//! Boundary traits for the external collaborators of a topology: endpoint
//! capabilities, flow stage labels, entry points of the backpressure protocol,
//! and the fan operator materialization capability.

/// Consumer and producer entry points of the delivery protocol.
pub mod entry;
/// Fan operator materialization capability.
pub mod fan;
/// Flow stage capability and label identity.
pub mod flow;
/// Sink capability.
pub mod sink;
/// Source capability.
pub mod source;

pub use entry::{ConsumerEntryPoint, ProducerEntryPoint};
pub use fan::FanMaterializer;
pub use flow::{Flow, FlowRef};
pub use sink::{Sink, SinkRef};
pub use source::{Source, SourceRef};
