//! Event types and the main event loop driver for the Blue Steps TUI.
//!
//! [`EventHandler`] runs a background task that polls crossterm for key
//! events and emits periodic [`Event::Tick`]s. Other tasks (the ocean poller,
//! check-in enrichment) post their results through [`EventHandler::tx`].

use crate::models::{Coordinate, ResolvedMarineData};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for UI refresh.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// Fresh "current ocean conditions" from the background poller.
    OceanUpdate {
        /// `None` when the provider gave nothing usable.
        data: Option<ResolvedMarineData>,
        /// When this update was produced.
        timestamp: Instant,
    },
    /// Marine enrichment for a committed check-in has finished.
    CheckInEnriched {
        checkin_id: i64,
        marine: Option<ResolvedMarineData>,
    },
    /// The default location was resolved (geolocation or configured value).
    LocationResolved(Coordinate),
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// The sender ([`tx`](EventHandler::tx)) can be cloned and handed to other
/// tasks, while the receiver is consumed by [`next`](EventHandler::next) in
/// the main loop.
pub struct EventHandler {
    /// Sender for posting events from background tasks.
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The task polls crossterm with a timeout of `tick_rate_ms`, sending
    /// [`Event::Input`] on key press and [`Event::Tick`] whenever the tick
    /// interval elapses. It stops if the terminal can no longer be read.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            event_tx.send(Event::Input(key)).ok();
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    event_tx.send(Event::Tick).ok();
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event; `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
