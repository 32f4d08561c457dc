//! TUI rendering for Blue Steps
//!
//! This module handles all UI rendering logic using the `ratatui` crate:
//! the habits view, the ocean conditions view and the community dashboard.

use crate::app::{App, InputMode, ViewMode};
use crate::models::{ActivityType, CheckIn, LocationInfo, MarineReading, ResolvedMarineData};
use ratatui::{prelude::*, widgets::*};

/// Renders one frame of the TUI based on current application state.
///
/// Splits off a one-line footer for key help and status messages, then draws
/// the view selected by [`App::view_mode`] above it.
///
/// # Arguments
///
/// * `f` - The ratatui frame to draw into (from `terminal.draw()`).
/// * `app` - Current application state.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.size());

    match app.view_mode {
        ViewMode::Habits => render_habits_view(f, app, chunks[0]),
        ViewMode::Ocean => render_ocean_view(f, app, chunks[0]),
        ViewMode::Community => render_community_view(f, app, chunks[0]),
    }

    render_footer(f, app, chunks[1]);
}

/// Habits view: habit list (35%) + input line and check-in history (65%).
fn render_habits_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let items: Vec<ListItem> = app
        .habits
        .iter()
        .enumerate()
        .map(|(i, habit)| {
            let style = if i == app.selected_index {
                Style::default()
                    .fg(Color::Cyan)
                    .bg(Color::Rgb(10, 40, 70))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let count = app.checkins.iter().filter(|c| c.habit_id == habit.id).count();
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", habit.activity_type.icon())),
                Span::styled(habit.description.clone(), style),
                Span::styled(format!(" │ {}✓", count), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let title = format!(" {}'s Habits ", app.user_name);
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(list, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(chunks[1]);

    let draft = |buffer: &str, activity: ActivityType| {
        Line::from(vec![
            Span::styled(format!("[{} {}] ", activity.icon(), activity.label()), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{}▏", buffer), Style::default().fg(Color::Yellow)),
        ])
    };
    let (prompt, text) = match &app.input_mode {
        InputMode::Normal => (
            " New habit ",
            Line::from(Span::styled("press 'a' to add", Style::default().fg(Color::DarkGray))),
        ),
        InputMode::Adding { buffer, activity } => (" New habit ", draft(buffer, *activity)),
        InputMode::Editing { buffer, activity, .. } => (" Edit habit ", draft(buffer, *activity)),
    };
    let input = Paragraph::new(text).block(Block::default().title(prompt).borders(Borders::ALL));
    f.render_widget(input, main_chunks[0]);

    let history: Vec<Line> = app
        .checkins
        .iter()
        .take(main_chunks[1].height.saturating_sub(2) as usize)
        .map(|c| checkin_line(app, c))
        .collect();

    let p = Paragraph::new(history).block(
        Block::default()
            .title(" Check-ins ")
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1)),
    );
    f.render_widget(p, main_chunks[1]);
}

fn checkin_line<'a>(app: &'a App, checkin: &'a CheckIn) -> Line<'a> {
    let description = app
        .habits
        .iter()
        .find(|h| h.id == checkin.habit_id)
        .map(|h| h.description.as_str())
        .unwrap_or("Deleted habit");

    let marine = match (&checkin.marine_data, checkin.marine()) {
        (None, _) => Span::styled("fetching ocean data…", Style::default().fg(Color::DarkGray)),
        (Some(_), None) => Span::styled("no ocean data", Style::default().fg(Color::DarkGray)),
        (Some(_), Some(data)) => Span::styled(
            format!("{} @ {}", reading_summary(&data.reading), data.location_info.ocean_name),
            Style::default().fg(Color::Cyan),
        ),
    };

    Line::from(vec![
        Span::styled(format!("{} ", checkin.date), Style::default().fg(Color::Yellow)),
        Span::raw(format!("{:<24} ", description)),
        Span::styled(format!("+{:<3} ", checkin.impact_score), Style::default().fg(Color::Blue)),
        marine,
    ])
}

fn reading_summary(reading: &MarineReading) -> String {
    let fmt = |v: Option<f64>, unit: &str| v.map(|v| format!("{:.1}{}", v, unit)).unwrap_or_else(|| "--".to_string());
    format!(
        "🌊 {}  🌡 {}  💨 {}",
        fmt(reading.wave_height, " m"),
        fmt(reading.sea_surface_temperature, " °C"),
        fmt(reading.wind_speed, " km/h"),
    )
}

/// Ocean view: current marine conditions plus where they were measured.
///
/// When the requested location was on land and a reference point was used
/// instead, the substitution and its distance are spelled out.
fn render_ocean_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    let freshness = app
        .ocean_updated
        .map(|inst| format!("{}s ago", inst.elapsed().as_secs()))
        .unwrap_or_else(|| "never".to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("  REQUESTED: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{:.4}, {:.4}", app.location.lat, app.location.lon)),
            Span::raw("  │  "),
            Span::styled("UPDATED: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(freshness, Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];

    match (&app.ocean, app.ocean_loading) {
        (_, true) => lines.push(Line::from(Span::styled(
            "  Fetching ocean conditions…",
            Style::default().fg(Color::DarkGray),
        ))),
        (None, false) => lines.push(Line::from(Span::styled(
            "  Ocean data is unavailable right now.",
            Style::default().fg(Color::Red),
        ))),
        (Some(data), false) => lines.extend(conditions_lines(data)),
    }

    let p = Paragraph::new(lines).block(
        Block::default()
            .title(" Current Ocean Conditions ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(p, chunks[0]);

    let location = app
        .ocean
        .as_ref()
        .map(|d| location_lines(&d.location_info))
        .unwrap_or_default();
    let p = Paragraph::new(location)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Measurement Location ")
                .borders(Borders::ALL)
                .padding(Padding::new(2, 2, 1, 1)),
        );
    f.render_widget(p, chunks[1]);
}

fn conditions_lines(data: &ResolvedMarineData) -> Vec<Line<'static>> {
    let row = |label: &'static str, value: Option<f64>, unit: &'static str| {
        Line::from(vec![
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
            match value {
                Some(v) => Span::styled(format!("{:.1} {}", v, unit), Style::default().fg(Color::Cyan)),
                None => Span::styled("not reported", Style::default().fg(Color::DarkGray)),
            },
        ])
    };
    vec![
        row("  Wave height:        ", data.reading.wave_height, "m"),
        row("  Sea surface temp:   ", data.reading.sea_surface_temperature, "°C"),
        row("  Wind speed (10 m):  ", data.reading.wind_speed, "km/h"),
    ]
}

fn location_lines(info: &LocationInfo) -> Vec<Line<'static>> {
    if !info.adjusted {
        return vec![Line::from(Span::styled(
            format!(
                "Measured at your location ({:.2}, {:.2}).",
                info.original_location.lat, info.original_location.lon
            ),
            Style::default().fg(Color::Green),
        ))];
    }

    vec![
        Line::from(Span::styled(
            "Your location is on land, so the nearest ocean reference point is shown instead.",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Reference point: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(info.ocean_name.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Coordinates:     ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{:.2}, {:.2}", info.ocean_location.lat, info.ocean_location.lon)),
        ]),
        Line::from(vec![
            Span::styled("Distance:        ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!("{:.1} km", info.distance_km)),
        ]),
    ]
}

/// Community view: headline counters, activity breakdown, leaderboard and
/// recent activity.
fn render_community_view(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let s = &app.stats;
    let stat = |label: &'static str, value: i64, color: Color| {
        vec![
            Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(value.to_string(), Style::default().fg(color)),
            Span::raw("  │  "),
        ]
    };
    let mut spans = vec![Span::raw(" ")];
    spans.extend(stat("MEMBERS: ", s.total_users, Color::Blue));
    spans.extend(stat("HABITS: ", s.total_habits, Color::Magenta));
    spans.extend(stat("ACTIONS: ", s.total_checkins, Color::Green));
    spans.extend(stat("IMPACT: ", s.total_impact_score, Color::Magenta));
    spans.extend(stat("THIS WEEK: ", s.recent_weekly_checkins, Color::Yellow));
    spans.pop();

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Community Impact ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(header, chunks[0]);

    let mut breakdown: Vec<Span> = s
        .activity_breakdown
        .iter()
        .flat_map(|(activity, count)| {
            [
                Span::raw(format!(" {} ", activity.icon())),
                Span::styled(format!("{}: ", activity.label()), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("{} ", count), Style::default().fg(Color::Cyan)),
            ]
        })
        .collect();
    if breakdown.is_empty() {
        breakdown.push(Span::styled(" No actions yet", Style::default().fg(Color::DarkGray)));
    }
    let breakdown = Paragraph::new(Line::from(breakdown))
        .block(Block::default().title(" Activity Breakdown ").borders(Borders::ALL));
    f.render_widget(breakdown, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);

    let rows: Vec<ListItem> = app
        .leaderboard
        .iter()
        .map(|entry| {
            let medal = match entry.rank {
                1 => Color::Yellow,
                2 => Color::Gray,
                3 => Color::Rgb(205, 127, 50),
                _ => Color::Blue,
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" #{:<3}", entry.rank), Style::default().fg(medal).add_modifier(Modifier::BOLD)),
                Span::raw(format!("{:<20}", entry.name)),
                Span::styled(format!("{} actions  ", entry.total_checkins), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{} pts", entry.impact_score), Style::default().fg(Color::Blue)),
            ]))
        })
        .collect();
    let leaderboard = List::new(rows).block(
        Block::default()
            .title(format!(" Top Contributors · {} ", app.timeframe.label()))
            .borders(Borders::ALL),
    );
    f.render_widget(leaderboard, body[0]);

    let activity: Vec<ListItem> = app
        .recent_activity
        .iter()
        .map(|a| {
            let mut spans = vec![
                Span::styled(format!(" {} ", a.date), Style::default().fg(Color::Yellow)),
                Span::raw(format!("{} ", a.activity_type.icon())),
                Span::styled(format!("{}: ", a.user_name), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(a.description.clone()),
                Span::styled(format!("  +{} pts", a.impact_score), Style::default().fg(Color::Blue)),
            ];
            if a.has_location {
                spans.push(Span::styled("  📍", Style::default().fg(Color::Cyan)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let recent = List::new(activity).block(Block::default().title(" Recent Activity ").borders(Borders::ALL));
    f.render_widget(recent, body[1]);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let help = match (app.view_mode, &app.input_mode) {
        (_, InputMode::Adding { .. } | InputMode::Editing { .. }) => " Tab activity   Enter save   Esc cancel",
        (ViewMode::Habits, _) => " 1/2/3 views   j/k move   a add   e edit   d delete   c check in   q quit",
        (ViewMode::Ocean, _) => " 1/2/3 views   r refresh   q quit",
        (ViewMode::Community, _) => " 1/2/3 views   t timeframe   r refresh   q quit",
    };

    let mut spans = vec![Span::styled(help, Style::default().fg(Color::DarkGray))];
    if let Some(ref msg) = app.status_message {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
