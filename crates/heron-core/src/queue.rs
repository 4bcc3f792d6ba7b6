//! In-memory idempotent dispatch queue.
//!
//! Pure data structure, no file I/O; persistence is the caller's
//! responsibility. Duplicate suppression happens on both the dispatch id
//! (primary) and the artifact dedupe key (secondary), and the state machine
//! is monotonic: `enqueued` → `processed` | `error`, any state → `skipped`,
//! `skipped` terminal. Every transition appends one telemetry record.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::NULL_SHA_PLACEHOLDER;
use crate::types::{DispatchPacket, QueueState, SCHEMA_V1};

/// One entry in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Primary key.
    pub dispatch_id: String,
    /// Secondary dedupe key: `"<artifact_id>:<before_sha|null>:<after_sha>"`.
    pub dedupe_key: String,
    pub queue_state: QueueState,
    pub packet: DispatchPacket,
    /// Event clock: the packet's creation timestamp.
    pub event_timestamp: DateTime<Utc>,
    /// When the queue last touched this entry.
    pub processing_timestamp: DateTime<Utc>,
    /// Reason for the current state, when one was given.
    pub state_reason: Option<String>,
}

/// Why a telemetry record was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEventKind {
    Enqueued,
    AdvancedToProcessed,
    AdvancedToError,
    AdvancedToSkipped,
    SkippedDuplicateDispatchId,
    SkippedDuplicateDedupeKey,
    ValidationRejected,
}

/// Append-only telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueTelemetryRecord {
    pub recorded_at: DateTime<Utc>,
    pub dispatch_id: String,
    pub kind: QueueEventKind,
    pub queue_state: QueueState,
    pub reason: Option<String>,
}

/// Aggregated counters derived from the telemetry log and entry map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueAggregates {
    /// Total submissions, duplicates and rejections included.
    pub dispatch_count: u64,
    pub duplicate_suppression_count: u64,
    /// Successfully routed dispatches (processed + enqueued); denominator
    /// for route-accuracy measurement.
    pub route_accuracy_denominator: u64,
    pub processed_count: u64,
    pub enqueued_count: u64,
    pub error_count: u64,
    pub skipped_count: u64,
}

/// Why an enqueue was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueRejection {
    /// Packet failed structural validation.
    Invalid { reason: String },
    /// Primary dedup: dispatch id already present.
    DuplicateDispatchId { existing_state: QueueState },
    /// Secondary dedup: dedupe key already admitted.
    DuplicateDedupeKey { canonical_dispatch_id: String },
}

/// In-memory idempotent queue keyed by dispatch id.
#[derive(Debug, Default)]
pub struct DispatchQueue {
    entries: BTreeMap<String, QueueEntry>,
    dedupe_index: HashMap<String, String>,
    telemetry: Vec<QueueTelemetryRecord>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a packet. On success the entry starts in `enqueued` state.
    pub fn enqueue(
        &mut self,
        packet: DispatchPacket,
        now: DateTime<Utc>,
    ) -> Result<&QueueEntry, EnqueueRejection> {
        if let Err(reason) = validate_packet(&packet) {
            self.telemetry.push(QueueTelemetryRecord {
                recorded_at: now,
                dispatch_id: packet.dispatch_id.clone(),
                kind: QueueEventKind::ValidationRejected,
                queue_state: QueueState::Error,
                reason: Some(reason.clone()),
            });
            return Err(EnqueueRejection::Invalid { reason });
        }

        if let Some(existing) = self.entries.get(&packet.dispatch_id) {
            let existing_state = existing.queue_state;
            self.telemetry.push(QueueTelemetryRecord {
                recorded_at: now,
                dispatch_id: packet.dispatch_id.clone(),
                kind: QueueEventKind::SkippedDuplicateDispatchId,
                queue_state: QueueState::Skipped,
                reason: Some(format!(
                    "duplicate dispatch_id \"{}\": already in state \"{existing_state}\"",
                    packet.dispatch_id
                )),
            });
            return Err(EnqueueRejection::DuplicateDispatchId { existing_state });
        }

        let dedupe_key = packet_dedupe_key(&packet);
        if let Some(canonical) = self.dedupe_index.get(&dedupe_key) {
            let canonical_dispatch_id = canonical.clone();
            self.telemetry.push(QueueTelemetryRecord {
                recorded_at: now,
                dispatch_id: packet.dispatch_id.clone(),
                kind: QueueEventKind::SkippedDuplicateDedupeKey,
                queue_state: QueueState::Skipped,
                reason: Some(format!(
                    "duplicate dedupe key \"{dedupe_key}\": canonical dispatch is \
                     \"{canonical_dispatch_id}\""
                )),
            });
            return Err(EnqueueRejection::DuplicateDedupeKey {
                canonical_dispatch_id,
            });
        }

        let dispatch_id = packet.dispatch_id.clone();
        let entry = QueueEntry {
            dispatch_id: dispatch_id.clone(),
            dedupe_key: dedupe_key.clone(),
            queue_state: QueueState::Enqueued,
            event_timestamp: packet.created_at,
            processing_timestamp: now,
            state_reason: None,
            packet,
        };
        self.entries.insert(dispatch_id.clone(), entry);
        self.dedupe_index.insert(dedupe_key, dispatch_id.clone());
        self.telemetry.push(QueueTelemetryRecord {
            recorded_at: now,
            dispatch_id: dispatch_id.clone(),
            kind: QueueEventKind::Enqueued,
            queue_state: QueueState::Enqueued,
            reason: None,
        });
        Ok(&self.entries[&dispatch_id])
    }

    /// Advance an entry through the monotonic state machine.
    pub fn advance(
        &mut self,
        dispatch_id: &str,
        new_state: QueueState,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<&QueueEntry, String> {
        let entry = self
            .entries
            .get_mut(dispatch_id)
            .ok_or_else(|| format!("dispatch_id \"{dispatch_id}\" not found in queue"))?;

        if entry.queue_state == new_state {
            return Err(format!(
                "dispatch_id \"{dispatch_id}\" is already in state \"{new_state}\""
            ));
        }
        if !transition_allowed(entry.queue_state, new_state) {
            return Err(format!(
                "invalid transition for dispatch_id \"{dispatch_id}\": \"{}\" -> \
                 \"{new_state}\" is not permitted by the monotonic state machine",
                entry.queue_state
            ));
        }

        entry.queue_state = new_state;
        entry.processing_timestamp = now;
        entry.state_reason = reason.clone();

        let kind = match new_state {
            QueueState::Processed => QueueEventKind::AdvancedToProcessed,
            QueueState::Error => QueueEventKind::AdvancedToError,
            QueueState::Skipped => QueueEventKind::AdvancedToSkipped,
            QueueState::Enqueued => QueueEventKind::Enqueued,
        };
        self.telemetry.push(QueueTelemetryRecord {
            recorded_at: now,
            dispatch_id: dispatch_id.to_string(),
            kind,
            queue_state: new_state,
            reason,
        });
        Ok(&self.entries[dispatch_id])
    }

    /// Entry by dispatch id.
    pub fn entry(&self, dispatch_id: &str) -> Option<&QueueEntry> {
        self.entries.get(dispatch_id)
    }

    /// All entries in deterministic order: event timestamp ascending, then
    /// dispatch id.
    pub fn entries(&self) -> Vec<&QueueEntry> {
        let mut all: Vec<&QueueEntry> = self.entries.values().collect();
        all.sort_by(|a, b| {
            a.event_timestamp
                .cmp(&b.event_timestamp)
                .then_with(|| a.dispatch_id.cmp(&b.dispatch_id))
        });
        all
    }

    /// Snapshot of the append-only telemetry log.
    pub fn telemetry(&self) -> &[QueueTelemetryRecord] {
        &self.telemetry
    }

    /// Aggregated counters.
    pub fn aggregates(&self) -> QueueAggregates {
        let mut aggregates = QueueAggregates {
            dispatch_count: self.telemetry.len() as u64,
            ..Default::default()
        };
        for record in &self.telemetry {
            if matches!(
                record.kind,
                QueueEventKind::SkippedDuplicateDispatchId
                    | QueueEventKind::SkippedDuplicateDedupeKey
            ) {
                aggregates.duplicate_suppression_count += 1;
            }
        }
        for entry in self.entries.values() {
            match entry.queue_state {
                QueueState::Processed => aggregates.processed_count += 1,
                QueueState::Enqueued => aggregates.enqueued_count += 1,
                QueueState::Error => aggregates.error_count += 1,
                QueueState::Skipped => aggregates.skipped_count += 1,
            }
        }
        aggregates.route_accuracy_denominator =
            aggregates.processed_count + aggregates.enqueued_count;
        aggregates
    }

    /// Number of entries in the queue, all states included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Queue acceptance criteria for a packet.
fn validate_packet(packet: &DispatchPacket) -> Result<(), String> {
    if packet.dispatch_id.trim().is_empty() {
        return Err("dispatch_id must not be empty".to_string());
    }
    if packet.schema_version != SCHEMA_V1 {
        return Err(format!(
            "schema_version must be \"{SCHEMA_V1}\", got \"{}\"",
            packet.schema_version
        ));
    }
    if packet.mode != "trial" {
        return Err(format!("mode must be \"trial\", got \"{}\"", packet.mode));
    }
    if packet.evidence_refs.is_empty() {
        return Err("evidence_refs must be a non-empty list".to_string());
    }
    Ok(())
}

fn packet_dedupe_key(packet: &DispatchPacket) -> String {
    format!(
        "{}:{}:{}",
        packet.artifact_id,
        packet.before_sha.as_deref().unwrap_or(NULL_SHA_PLACEHOLDER),
        packet.after_sha
    )
}

fn transition_allowed(from: QueueState, to: QueueState) -> bool {
    matches!(
        (from, to),
        (
            QueueState::Enqueued,
            QueueState::Processed | QueueState::Error | QueueState::Skipped
        ) | (QueueState::Processed | QueueState::Error, QueueState::Skipped)
    )
}
