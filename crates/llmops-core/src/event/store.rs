use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Almacenamiento de eventos append-only, indexado por pipeline.
pub trait EventStore: Send {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, pipeline_id: Uuid, run_id: Uuid, kind: RunEventKind) -> RunEvent;
    /// Lista eventos de un pipeline (orden ascendente por seq).
    fn list(&self, pipeline_id: Uuid) -> Vec<RunEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<RunEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, pipeline_id: Uuid, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let events = self.inner.entry(pipeline_id).or_default();
        let ev = RunEvent { seq: events.len() as u64,
                            pipeline_id,
                            run_id,
                            kind,
                            ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, pipeline_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&pipeline_id).cloned().unwrap_or_default()
    }
}
