use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, Context};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::BubbleConfig;
use crate::market::{BubbleRecord, MarketSource};

mod graph;
mod physics;
mod render_utils;
mod ui;

use physics::{DragController, Simulation};

type FetchResult = Result<Vec<BubbleRecord>, String>;

const PENDING_REPAINT: Duration = Duration::from_millis(100);

pub struct MarketBubblesApp {
    source: Arc<dyn MarketSource>,
    config: BubbleConfig,
    seed: Option<u64>,
    state: AppState,
    reload_rx: Option<Receiver<FetchResult>>,
    next_poll: Instant,
}

enum AppState {
    Loading { rx: Receiver<FetchResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    records: Vec<BubbleRecord>,
    record_index: HashMap<String, usize>,
    config: BubbleConfig,
    rng: StdRng,
    simulation: Option<Simulation>,
    drag: DragController,
    layout_dirty: bool,
    refresh_error: Option<String>,
    refreshed_at: Instant,
}

impl MarketBubblesApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: Arc<dyn MarketSource>,
        config: BubbleConfig,
        seed: Option<u64>,
    ) -> Self {
        let state = Self::start_load(Arc::clone(&source));
        Self {
            source,
            config,
            seed,
            state,
            reload_rx: None,
            next_poll: Instant::now(),
        }
    }

    fn spawn_fetch(source: Arc<dyn MarketSource>) -> Receiver<FetchResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let label = source.describe();
            info!(source = %label, "fetching market data");
            let result = match source.fetch() {
                Ok(records) => {
                    info!(source = %label, records = records.len(), "market data fetched");
                    Ok(records)
                }
                Err(error) => {
                    let message = format!("{error:#}");
                    warn!(source = %label, error = %message, "market data fetch failed");
                    Err(message)
                }
            };
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: Arc<dyn MarketSource>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_fetch(source),
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.poll_interval_secs.max(1))
    }
}

fn layout_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

impl eframe::App for MarketBubblesApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let now = Instant::now();
        let interval = self.poll_interval();

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(records)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            records,
                            self.config.clone(),
                            layout_rng(self.seed),
                        ))));
                        self.next_poll = now + interval;
                    }
                    Ok(Err(error)) => {
                        transition = Some(AppState::Error(error));
                        self.next_poll = now + interval;
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background fetch worker disconnected".to_owned(),
                        ));
                        self.next_poll = now + interval;
                    }
                }

                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE.fill(render_utils::BACKGROUND_EDGE))
                    .show(ctx, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(ui.available_height() * 0.4);
                            ui.heading("Loading Crypto Data...");
                            ui.add_space(8.0);
                            ui.spinner();
                        });
                    });
                ctx.request_repaint_after(PENDING_REPAINT);
            }
            AppState::Error(error) => {
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE.fill(render_utils::BACKGROUND_EDGE))
                    .show(ctx, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(ui.available_height() * 0.4);
                            ui.colored_label(
                                Color32::from_rgb(0xEF, 0x44, 0x44),
                                format!("Error loading data: {error}"),
                            );
                            ui.add_space(10.0);
                            if ui.button("Retry").clicked() {
                                transition = Some(Self::start_load(Arc::clone(&self.source)));
                            }
                        });
                    });

                if transition.is_none() && now >= self.next_poll {
                    debug!("retrying market fetch after failure");
                    transition = Some(Self::start_load(Arc::clone(&self.source)));
                }
                ctx.request_repaint_after(self.next_poll.saturating_duration_since(now));
            }
            AppState::Ready(model) => {
                let is_refreshing = self.reload_rx.is_some();
                model.show(ctx, is_refreshing);

                if self.reload_rx.is_none() && now >= self.next_poll {
                    self.reload_rx = Some(Self::spawn_fetch(Arc::clone(&self.source)));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(records)) => {
                            model.replace_records(records);
                            self.next_poll = now + interval;
                        }
                        Ok(Err(error)) => {
                            model.note_refresh_failure(error);
                            self.next_poll = now + interval;
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.note_refresh_failure(
                                "Background fetch worker disconnected".to_owned(),
                            );
                            self.next_poll = now + interval;
                        }
                    }
                }

                if self.reload_rx.is_some() {
                    ctx.request_repaint_after(PENDING_REPAINT);
                } else {
                    ctx.request_repaint_after(self.next_poll.saturating_duration_since(now));
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
