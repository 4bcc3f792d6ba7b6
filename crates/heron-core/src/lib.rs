//! heron-core - Core library for heron.
//!
//! heron ingests change events ("deltas") against a business's standing
//! knowledge artifacts and decides, deterministically and idempotently,
//! which of them deserve a downstream dispatch packet.
//!
//! The core is a pure synchronous computation: one call transforms one
//! batch of events into one outcome. The caller owns and persists the two
//! pieces of mutable state (dedupe set, cooldown map) and injects the
//! clock, so repeated runs over the same input are reproducible.
//!
//! # Example
//!
//! ```
//! use heron_core::{run_trial, AdmissionState, ArtifactDeltaEvent, TrialOptions};
//!
//! let event = ArtifactDeltaEvent {
//!     artifact_id: "ACME-MARKET".to_string(),
//!     business: "acme".to_string(),
//!     before_sha: Some("aaa1111".to_string()),
//!     after_sha: "bbb2222".to_string(),
//!     path: "market.md".to_string(),
//!     changed_sections: Some(vec!["Target Customer".to_string()]),
//!     ..Default::default()
//! };
//!
//! let mut state = AdmissionState::default();
//! let options = TrialOptions::at("2026-02-24T15:30:00Z".parse().unwrap());
//! let outcome = run_trial("trial", &[event], &mut state, &options).unwrap();
//! assert_eq!(outcome.dispatched.len(), 1);
//! ```

pub mod clustering;
pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod keys;
pub mod limiters;
pub mod materiality;
pub mod orchestrator;
pub mod policy;
pub mod queue;
pub mod routing;
pub mod suppression;
pub mod telemetry;
pub mod types;
pub mod validate;
pub mod vocab;

// Re-export commonly used types
pub use cooldown::{ClusterCooldownEntry, CooldownState, DEFAULT_COOLDOWN_WINDOW_HOURS};
pub use error::{HeronError, HeronResult};
pub use limiters::DEFAULT_LINEAGE_DEPTH_CAP;
pub use orchestrator::{run_trial, AdmissionState, TrialOptions, TrialOutcome, TRIAL_MODE};
pub use policy::CutoverPhase;
pub use queue::{DispatchQueue, EnqueueRejection, QueueAggregates, QueueEntry};
pub use routing::{
    route_dispatch, route_dispatch_v2, InvocationPayload, RouteError, RouteSuccess,
    RoutingErrorCode,
};
pub use suppression::{Disposition, SuppressionReason};
pub use telemetry::ShadowTelemetrySnapshot;
pub use types::{
    ArtifactClass, ArtifactDeltaEvent, DeliverableFamily, DispatchPacket, DispatchPacketV2,
    DispatchStatus, IntendedOutcome, Priority, QueueState, RecommendedRoute, RegistryDocument,
    RegistryEntry, RegistrySnapshot, TriggerKind, TriggerPolicy, WhySource, SCHEMA_V1, SCHEMA_V2,
};
pub use validate::{validate_v2_packet, V2ValidationReport};
