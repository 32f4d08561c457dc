use blue_steps::{
    api::{MarineProvider, MarineResolver},
    app::{Action, App},
    config::Config,
    db::Store,
    events::{Event, EventHandler},
    location, logging,
    tracker::Tracker,
    ui,
};
use chrono::Local;
use color_eyre::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    // Instrumentation and safety
    let _log_guard = logging::initialize_logging(&config.logging);
    install_panic_hook();
    color_eyre::install()?;

    config.validate()?;

    let store = Store::open(&config.database.path)?;
    let user = store.ensure_user(&config.profile.email, &config.profile.name)?;
    let resolver = MarineResolver::new(MarineProvider::new(&config.marine)?, config.catalog());
    let mut tracker = Tracker::new(store, resolver, config.location.default_coordinate());
    info!(user_id = user.id, "Starting Blue Steps");

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(user.name.clone(), tracker.default_location());
    let mut events = EventHandler::new(250);

    refresh_habits(&tracker, &mut app, user.id);

    // Default location, then periodic ocean conditions
    let location_config = config.location.clone();
    let location_tx = events.tx.clone();
    let ocean_tx = events.tx.clone();
    let ocean_resolver = tracker.resolver().clone();
    let poll_interval = Duration::from_secs(config.ocean.poll_interval_seconds.max(30));
    tokio::spawn(async move {
        let at = location::default_coordinates(&location_config).await;
        let _ = location_tx.send(Event::LocationResolved(at));
        loop {
            let data = ocean_resolver.fetch(at.lat, at.lon).await;
            let _ = ocean_tx.send(Event::OceanUpdate {
                data,
                timestamp: std::time::Instant::now(),
            });
            tokio::time::sleep(poll_interval).await;
        }
    });

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Tick => app.on_tick(),
            Event::Input(key) => {
                if let Some(action) = app.handle_key(key) {
                    apply(action, &tracker, &mut app, user.id, &events.tx);
                }
            }
            Event::OceanUpdate { data, timestamp } => app.set_ocean(data, timestamp),
            Event::LocationResolved(at) => {
                tracker.set_default_location(at);
                app.location = at;
            }
            Event::CheckInEnriched { checkin_id, marine } => {
                if let Err(e) = tracker.finish_checkin(checkin_id, marine.as_ref()) {
                    error!(checkin_id, "Failed to store marine data: {}", e);
                }
                refresh_habits(&tracker, &mut app, user.id);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Runs a key-press action against the store; network work goes to a task.
fn apply(action: Action, tracker: &Tracker, app: &mut App, user_id: i64, tx: &UnboundedSender<Event>) {
    let outcome = match action {
        Action::CreateHabit {
            description,
            activity_type,
        } => tracker
            .store()
            .create_habit(user_id, &description, activity_type)
            .map(|h| format!("Added \"{}\"", h.description)),
        Action::UpdateHabit {
            habit_id,
            description,
            activity_type,
        } => tracker
            .store()
            .update_habit(user_id, habit_id, &description, activity_type)
            .map(|h| format!("Updated \"{}\"", h.description)),
        Action::DeleteHabit(habit_id) => tracker
            .store()
            .delete_habit(user_id, habit_id)
            .map(|_| "Habit deleted".to_string()),
        Action::CheckIn(habit_id) => {
            let today = Local::now().date_naive();
            tracker.record_checkin(user_id, habit_id, today, None).map(|checkin| {
                let target = tracker.enrichment_target(&checkin);
                let checkin_id = checkin.id;
                let resolver = tracker.resolver().clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let marine = resolver.fetch(target.lat, target.lon).await;
                    let _ = tx.send(Event::CheckInEnriched { checkin_id, marine });
                });
                format!("Check-in recorded 🌊 +{} pts", checkin.impact_score)
            })
        }
        Action::RefreshOcean => {
            let resolver = tracker.resolver().clone();
            let at = app.location;
            let tx = tx.clone();
            tokio::spawn(async move {
                let data = resolver.fetch(at.lat, at.lon).await;
                let _ = tx.send(Event::OceanUpdate {
                    data,
                    timestamp: std::time::Instant::now(),
                });
            });
            return;
        }
        Action::RefreshCommunity => {
            refresh_community(tracker, app);
            return;
        }
    };

    match outcome {
        Ok(msg) => app.status_message = Some(msg),
        Err(e) => {
            error!("Action failed: {}", e);
            app.status_message = Some(e.to_string());
        }
    }
    refresh_habits(tracker, app, user_id);
}

fn refresh_habits(tracker: &Tracker, app: &mut App, user_id: i64) {
    let store = tracker.store();
    match (store.habits_for_user(user_id), store.checkins_for_user(user_id)) {
        (Ok(habits), Ok(checkins)) => {
            app.set_habits(habits);
            app.checkins = checkins;
        }
        (Err(e), _) | (_, Err(e)) => error!("Failed to load habits: {}", e),
    }
}

fn refresh_community(tracker: &Tracker, app: &mut App) {
    let store = tracker.store();
    let today = Local::now().date_naive();
    let loaded = store.community_stats(today).and_then(|stats| {
        Ok((
            stats,
            store.leaderboard(app.timeframe, today, 5)?,
            store.recent_activity(10)?,
        ))
    });
    match loaded {
        Ok((stats, leaderboard, recent)) => {
            app.stats = stats;
            app.leaderboard = leaderboard;
            app.recent_activity = recent;
        }
        Err(e) => error!("Failed to load community data: {}", e),
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
