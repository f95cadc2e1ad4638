use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::BubbleConfig;
use crate::market::BubbleRecord;

use super::super::ViewModel;
use super::super::physics::{DragController, Simulation, Viewport};

impl ViewModel {
    pub(in crate::app) fn new(records: Vec<BubbleRecord>, config: BubbleConfig, rng: StdRng) -> Self {
        Self {
            record_index: index_records(&records),
            records,
            config,
            rng,
            simulation: None,
            drag: DragController::default(),
            layout_dirty: true,
            refresh_error: None,
            refreshed_at: Instant::now(),
        }
    }

    /// Swaps in a fresh record set; the running engine is halted and a new
    /// one is built on the next frame. Empty sets keep the current layout.
    pub(in crate::app) fn replace_records(&mut self, records: Vec<BubbleRecord>) {
        if records.is_empty() {
            warn!("market source returned no records, keeping the current layout");
            self.refresh_error = Some("Source returned no records".to_owned());
            return;
        }

        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }
        self.record_index = index_records(&records);
        self.records = records;
        self.layout_dirty = true;
        self.refresh_error = None;
        self.refreshed_at = Instant::now();
    }

    pub(in crate::app) fn note_refresh_failure(&mut self, error: String) {
        self.refresh_error = Some(error);
    }

    pub(in crate::app) fn ensure_layout(&mut self, viewport: Viewport) {
        let resized = self
            .simulation
            .as_ref()
            .is_none_or(|simulation| !simulation.viewport().approx_eq(viewport));
        if !self.layout_dirty && !resized {
            return;
        }

        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }

        let simulation =
            Simulation::build(&self.records, viewport, self.config.clone(), &mut self.rng);
        let (min_radius, max_radius) = simulation.scale().range();
        info!(
            nodes = simulation.nodes().len(),
            width = viewport.width,
            height = viewport.height,
            min_radius,
            max_radius,
            "layout rebuilt"
        );

        self.simulation = Some(simulation);
        self.drag = DragController::default();
        self.layout_dirty = false;
    }

    pub(in crate::app) fn record_for(&self, id: &str) -> Option<&BubbleRecord> {
        self.record_index
            .get(id)
            .and_then(|index| self.records.get(*index))
    }
}

/// Later records win when ids repeat.
fn index_records(records: &[BubbleRecord]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        if index.insert(record.id.clone(), position).is_some() {
            debug!(id = %record.id, "duplicate record id, keeping the later record for lookups");
        }
    }
    index
}
