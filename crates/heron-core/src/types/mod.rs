//! Core data model: inbound events, registry snapshot, dispatch packets.

mod event;
mod packet;
mod registry;

pub use event::ArtifactDeltaEvent;
pub use packet::{
    DeliverableFamily, DispatchPacket, DispatchPacketV2, DispatchStatus, IntendedOutcome,
    Priority, QueueState, RecommendedRoute, TriggerKind, WhySource, SCHEMA_V1, SCHEMA_V2,
};
pub use registry::{
    ArtifactClass, RegistryDocument, RegistryEntry, RegistrySnapshot, TriggerPolicy,
};
