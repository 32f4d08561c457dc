use crate::models::{
    ActivityType, CheckIn, CommunityStats, Coordinate, Habit, LeaderboardEntry, RecentActivity, ResolvedMarineData, Timeframe,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ViewMode {
    #[default]
    Habits,
    Ocean,
    Community,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Adding {
        buffer: String,
        activity: ActivityType,
    },
    Editing {
        habit_id: i64,
        buffer: String,
        activity: ActivityType,
    },
}

/// Work requested by a key press. `main` carries it out against the store
/// and the resolver, then feeds the results back into [`App`].
#[derive(Debug, PartialEq, Clone)]
pub enum Action {
    CreateHabit {
        description: String,
        activity_type: ActivityType,
    },
    UpdateHabit {
        habit_id: i64,
        description: String,
        activity_type: ActivityType,
    },
    DeleteHabit(i64),
    CheckIn(i64),
    RefreshOcean,
    RefreshCommunity,
}

#[derive(Default)]
pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub user_name: String,
    pub tick_count: usize,
    pub should_quit: bool,
    pub status_message: Option<String>,

    // Habits view
    pub habits: Vec<Habit>,
    pub selected_index: usize,
    pub checkins: Vec<CheckIn>,

    // Ocean view
    pub location: Coordinate,
    pub ocean: Option<ResolvedMarineData>,
    pub ocean_updated: Option<Instant>,
    pub ocean_loading: bool,

    // Community view
    pub timeframe: Timeframe,
    pub stats: CommunityStats,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub recent_activity: Vec<RecentActivity>,
}

impl App {
    pub fn new(user_name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            user_name: user_name.into(),
            location,
            ocean_loading: true,
            ..Self::default()
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
    }

    pub fn selected_habit(&self) -> Option<&Habit> {
        self.habits.get(self.selected_index)
    }

    /// Replaces the habit list, keeping the selection in range.
    pub fn set_habits(&mut self, habits: Vec<Habit>) {
        self.habits = habits;
        if self.selected_index >= self.habits.len() {
            self.selected_index = self.habits.len().saturating_sub(1);
        }
    }

    pub fn set_ocean(&mut self, data: Option<ResolvedMarineData>, at: Instant) {
        self.ocean = data;
        self.ocean_updated = Some(at);
        self.ocean_loading = false;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            _ => self.handle_text_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.view_mode = ViewMode::Habits,
            KeyCode::Char('2') => self.view_mode = ViewMode::Ocean,
            KeyCode::Char('3') => {
                self.view_mode = ViewMode::Community;
                return Some(Action::RefreshCommunity);
            }
            KeyCode::Char('r') => {
                return match self.view_mode {
                    ViewMode::Community => Some(Action::RefreshCommunity),
                    _ => {
                        self.ocean_loading = true;
                        Some(Action::RefreshOcean)
                    }
                };
            }
            KeyCode::Char('t') if self.view_mode == ViewMode::Community => {
                self.timeframe = self.timeframe.next();
                return Some(Action::RefreshCommunity);
            }
            _ if self.view_mode == ViewMode::Habits => return self.handle_habit_key(key),
            _ => {}
        }
        None
    }

    fn handle_habit_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.habits.is_empty() {
                    self.selected_index = (self.selected_index + 1) % self.habits.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.habits.is_empty() {
                    self.selected_index = self
                        .selected_index
                        .checked_sub(1)
                        .unwrap_or(self.habits.len() - 1);
                }
            }
            KeyCode::Char('a') => {
                self.input_mode = InputMode::Adding {
                    buffer: String::new(),
                    activity: ActivityType::default(),
                }
            }
            KeyCode::Char('e') => {
                if let Some(habit) = self.selected_habit() {
                    self.input_mode = InputMode::Editing {
                        habit_id: habit.id,
                        buffer: habit.description.clone(),
                        activity: habit.activity_type,
                    };
                }
            }
            KeyCode::Char('d') => return self.selected_habit().map(|h| Action::DeleteHabit(h.id)),
            KeyCode::Char('c') | KeyCode::Enter => return self.selected_habit().map(|h| Action::CheckIn(h.id)),
            _ => {}
        }
        None
    }

    fn handle_text_key(&mut self, key: KeyEvent) -> Option<Action> {
        let (buffer, activity) = match &mut self.input_mode {
            InputMode::Adding { buffer, activity } | InputMode::Editing { buffer, activity, .. } => {
                (buffer, activity)
            }
            InputMode::Normal => return None,
        };

        match key.code {
            KeyCode::Tab => *activity = activity.next(),
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Enter => {
                let action = match std::mem::take(&mut self.input_mode) {
                    InputMode::Adding { buffer, activity } if !buffer.trim().is_empty() => {
                        Some(Action::CreateHabit {
                            description: buffer,
                            activity_type: activity,
                        })
                    }
                    InputMode::Editing {
                        habit_id,
                        buffer,
                        activity,
                    } if !buffer.trim().is_empty() => Some(Action::UpdateHabit {
                        habit_id,
                        description: buffer,
                        activity_type: activity,
                    }),
                    _ => None,
                };
                return action;
            }
            _ => {}
        }
        None
    }
}
