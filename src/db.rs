//! SQLite persistence for users, habits and check-ins.
//!
//! Tables are created on open with `CREATE TABLE IF NOT EXISTS`; there is no
//! migration step. Every habit operation is scoped to its owner, and a habit
//! that belongs to somebody else is reported as not found.

use crate::error::{Error, Result};
use crate::models::{
    ActivityType, CheckIn, CommunityStats, Coordinate, Habit, LeaderboardEntry, RecentActivity, Timeframe, User,
};
use chrono::{NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS habits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        description TEXT NOT NULL,
        activity_type TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS habit_checkins (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        latitude REAL,
        longitude REAL,
        impact_score INTEGER NOT NULL DEFAULT 0,
        marine_data TEXT
    );

    CREATE INDEX IF NOT EXISTS habits_owner_idx ON habits(owner_id);
    CREATE INDEX IF NOT EXISTS checkins_habit_idx ON habit_checkins(habit_id);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::init(Connection::open(path)?)?;
        info!("Opened database at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    // Users

    pub fn create_user(&self, email: &str, name: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(Error::InvalidInput {
                reason: "email must not be empty".to_string(),
            });
        }
        if self.user_by_email(&email)?.is_some() {
            return Err(Error::EmailTaken { email });
        }

        let created_at = Utc::now().naive_utc();
        self.conn.execute(
            "INSERT INTO users (email, name, created_at) VALUES (?1, ?2, ?3)",
            params![email, name.trim(), created_at],
        )?;

        Ok(User {
            id: self.conn.last_insert_rowid(),
            email,
            name: name.trim().to_string(),
            created_at,
        })
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE email = ?1",
                [email.trim().to_lowercase()],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Returns the user registered under `email`, registering it first if needed.
    pub fn ensure_user(&self, email: &str, name: &str) -> Result<User> {
        match self.user_by_email(email)? {
            Some(user) => Ok(user),
            None => self.create_user(email, name),
        }
    }

    // Habits

    pub fn create_habit(&self, owner_id: i64, description: &str, activity_type: ActivityType) -> Result<Habit> {
        let description = validate_description(description)?;
        let created_at = Utc::now().naive_utc();
        self.conn.execute(
            "INSERT INTO habits (owner_id, description, activity_type, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![owner_id, description, activity_type, created_at],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(habit_id = id, owner_id, activity = activity_type.as_str(), "Created habit");
        Ok(Habit {
            id,
            owner_id,
            description,
            activity_type,
            created_at,
        })
    }

    pub fn habits_for_user(&self, owner_id: i64) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, description, activity_type, created_at FROM habits
             WHERE owner_id = ?1 ORDER BY id",
        )?;
        let habits = stmt
            .query_map([owner_id], habit_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(habits)
    }

    pub fn habit(&self, owner_id: i64, habit_id: i64) -> Result<Habit> {
        self.conn
            .query_row(
                "SELECT id, owner_id, description, activity_type, created_at FROM habits
                 WHERE id = ?1 AND owner_id = ?2",
                params![habit_id, owner_id],
                habit_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound {
                entity: "Habit",
                id: habit_id,
            })
    }

    /// Changes what the habit is. Earlier check-ins keep the score they earned.
    pub fn update_habit(
        &self,
        owner_id: i64,
        habit_id: i64,
        description: &str,
        activity_type: ActivityType,
    ) -> Result<Habit> {
        let description = validate_description(description)?;
        let changed = self.conn.execute(
            "UPDATE habits SET description = ?1, activity_type = ?2 WHERE id = ?3 AND owner_id = ?4",
            params![description, activity_type, habit_id, owner_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "Habit",
                id: habit_id,
            });
        }
        self.habit(owner_id, habit_id)
    }

    /// Deletes the habit together with its check-ins.
    pub fn delete_habit(&self, owner_id: i64, habit_id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND owner_id = ?2",
            params![habit_id, owner_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "Habit",
                id: habit_id,
            });
        }
        debug!(habit_id, owner_id, "Deleted habit");
        Ok(())
    }

    // Check-ins

    pub fn insert_checkin(
        &self,
        owner_id: i64,
        habit_id: i64,
        date: NaiveDate,
        at: Option<Coordinate>,
    ) -> Result<CheckIn> {
        let habit = self.habit(owner_id, habit_id)?;
        let impact_score = habit.activity_type.impact_points();

        let (latitude, longitude) = (at.map(|c| c.lat), at.map(|c| c.lon));
        self.conn.execute(
            "INSERT INTO habit_checkins (habit_id, date, latitude, longitude, impact_score)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![habit_id, date, latitude, longitude, impact_score],
        )?;

        Ok(CheckIn {
            id: self.conn.last_insert_rowid(),
            habit_id,
            date,
            latitude,
            longitude,
            impact_score,
            marine_data: None,
        })
    }

    pub fn attach_marine_data(&self, checkin_id: i64, marine_json: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE habit_checkins SET marine_data = ?1 WHERE id = ?2",
            params![marine_json, checkin_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "Check-in",
                id: checkin_id,
            });
        }
        Ok(())
    }

    pub fn checkin(&self, checkin_id: i64) -> Result<CheckIn> {
        self.conn
            .query_row(
                "SELECT id, habit_id, date, latitude, longitude, impact_score, marine_data
                 FROM habit_checkins WHERE id = ?1",
                [checkin_id],
                checkin_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound {
                entity: "Check-in",
                id: checkin_id,
            })
    }

    /// All check-ins on the user's habits, newest first.
    pub fn checkins_for_user(&self, owner_id: i64) -> Result<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.habit_id, c.date, c.latitude, c.longitude, c.impact_score, c.marine_data
             FROM habit_checkins c JOIN habits h ON h.id = c.habit_id
             WHERE h.owner_id = ?1
             ORDER BY c.date DESC, c.id DESC",
        )?;
        let checkins = stmt
            .query_map([owner_id], checkin_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(checkins)
    }

    // Community

    pub fn community_stats(&self, today: NaiveDate) -> Result<CommunityStats> {
        let count = |sql: &str| -> Result<i64> { Ok(self.conn.query_row(sql, [], |row| row.get(0))?) };

        let mut stmt = self.conn.prepare(
            "SELECT h.activity_type, COUNT(c.id)
             FROM habit_checkins c JOIN habits h ON h.id = c.habit_id
             GROUP BY h.activity_type",
        )?;
        let activity_breakdown = stmt
            .query_map([], |row| Ok((row.get::<_, ActivityType>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        Ok(CommunityStats {
            total_users: count("SELECT COUNT(*) FROM users")?,
            total_habits: count("SELECT COUNT(*) FROM habits")?,
            total_checkins: count("SELECT COUNT(*) FROM habit_checkins")?,
            recent_weekly_checkins: self.conn.query_row(
                "SELECT COUNT(*) FROM habit_checkins WHERE date >= ?1",
                [Timeframe::Week.since(today)],
                |row| row.get(0),
            )?,
            total_impact_score: count("SELECT COALESCE(SUM(impact_score), 0) FROM habit_checkins")?,
            activity_breakdown,
        })
    }

    /// Users ranked by check-ins inside `timeframe`, then by impact score.
    /// Remaining ties keep registration order.
    pub fn leaderboard(
        &self,
        timeframe: Timeframe,
        today: NaiveDate,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT u.name, COUNT(c.id) AS total, SUM(c.impact_score) AS impact
             FROM users u
             JOIN habits h ON h.owner_id = u.id
             JOIN habit_checkins c ON c.habit_id = h.id
             WHERE ?1 IS NULL OR c.date >= ?1
             GROUP BY u.id
             ORDER BY total DESC, impact DESC, u.id ASC
             LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(params![timeframe.since(today), limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, (name, total_checkins, impact_score))| LeaderboardEntry {
                rank: i + 1,
                name,
                total_checkins,
                impact_score,
            })
            .collect())
    }

    pub fn recent_activity(&self, limit: usize) -> Result<Vec<RecentActivity>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, u.name, h.description, h.activity_type, c.impact_score, c.date,
                    c.latitude IS NOT NULL AND c.longitude IS NOT NULL
             FROM habit_checkins c
             JOIN habits h ON h.id = c.habit_id
             JOIN users u ON u.id = h.owner_id
             ORDER BY c.date DESC, c.id DESC
             LIMIT ?1",
        )?;
        let activity = stmt
            .query_map([limit as i64], |row| {
                Ok(RecentActivity {
                    checkin_id: row.get(0)?,
                    user_name: row.get(1)?,
                    description: row.get(2)?,
                    activity_type: row.get(3)?,
                    impact_score: row.get(4)?,
                    date: row.get(5)?,
                    has_location: row.get(6)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(activity)
    }
}

impl ToSql for ActivityType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ActivityType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e: Error| FromSqlError::Other(Box::new(e)))
    }
}

fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(Error::InvalidInput {
            reason: "habit description must not be empty".to_string(),
        });
    }
    Ok(description.to_string())
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn habit_from_row(row: &Row) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        description: row.get(2)?,
        activity_type: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn checkin_from_row(row: &Row) -> rusqlite::Result<CheckIn> {
    Ok(CheckIn {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        date: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        impact_score: row.get(5)?,
        marine_data: row.get(6)?,
    })
}
