//! Entrypoint registration and invocation
//!
//! Units contribute callbacks per named stage. The host registers them into
//! an [`EntrypointRegistry`], freezes it, then runs stages with [`invoke`].
//! One unit failing never stops the others; all failures of a stage come back
//! as a single [`AggregateInvocationFailure`].

pub mod container;
pub mod errors;
pub mod initializer;
pub mod invoker;
pub mod registry;

pub use container::{EntrypointContainer, UnitInfo};
pub use errors::{AggregateInvocationFailure, EntrypointError, UnitFailure};
pub use initializer::{
    initialize, ClientModInitializer, DedicatedServerModInitializer, ModInitializer,
};
pub use invoker::{invoke, InvocationOutcome};
pub use registry::{ContainerLookup, EntrypointProvider, EntrypointRegistry};
