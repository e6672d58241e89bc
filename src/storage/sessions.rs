use anyhow::Result;
use chrono::Local;

use super::{
    helpers::{read_json, write_json_atomic},
    Storage,
};
use crate::models::session::{date_key, month_key, Session};

const ENABLE_LOGS: bool = true;

impl Storage {
    /// Every stored session in append order; empty if nothing was ever saved.
    pub fn all_sessions(&self) -> Result<Vec<Session>> {
        Ok(read_json::<Vec<Session>>(&self.sessions_path())?.unwrap_or_default())
    }

    fn write_sessions(&self, sessions: &[Session]) -> Result<()> {
        write_json_atomic(&self.sessions_path(), sessions)
    }

    /// Replaces the session with the same id in place, or appends it.
    pub fn append_or_update(&self, session: &Session) -> Result<()> {
        let mut sessions = self.all_sessions()?;
        match sessions.iter_mut().find(|existing| existing.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        self.write_sessions(&sessions)
    }

    /// The in-flight session, if any.
    ///
    /// Should several records claim to be active, the most recently appended
    /// one wins.
    pub fn get_active(&self) -> Result<Option<Session>> {
        let sessions = self.all_sessions()?;
        let mut active = sessions.into_iter().filter(Session::is_in_flight);
        let first = active.next();
        let extra: Vec<Session> = active.collect();

        if extra.is_empty() {
            return Ok(first);
        }

        crate::log_warn!(
            "{} sessions marked active; using the most recent one",
            extra.len() + 1
        );
        Ok(extra.into_iter().last())
    }

    /// Clears the `active` flag on every record. Writes only when something changed.
    pub fn deactivate_all(&self) -> Result<()> {
        let mut sessions = self.all_sessions()?;
        let mut changed = 0usize;
        for session in sessions.iter_mut().filter(|session| session.active) {
            session.active = false;
            changed += 1;
        }

        if changed == 0 {
            return Ok(());
        }

        crate::log_info!("Deactivated {changed} session(s)");
        self.write_sessions(&sessions)
    }

    /// Deactivates every record and appends `session` in a single rewrite.
    pub fn begin_exclusive(&self, session: &Session) -> Result<()> {
        let mut sessions = self.all_sessions()?;
        for existing in sessions.iter_mut() {
            existing.active = false;
        }
        sessions.retain(|existing| existing.id != session.id);
        sessions.push(session.clone());
        self.write_sessions(&sessions)
    }

    fn sessions_where<F>(&self, predicate: F) -> Result<Vec<Session>>
    where
        F: Fn(&Session) -> bool,
    {
        Ok(self
            .all_sessions()?
            .into_iter()
            .filter(|session| predicate(session))
            .collect())
    }

    pub fn sessions_by_date(&self, date: &str) -> Result<Vec<Session>> {
        self.sessions_where(|session| session.date == date)
    }

    pub fn today_sessions(&self) -> Result<Vec<Session>> {
        self.sessions_by_date(&date_key(&Local::now()))
    }

    pub fn sessions_by_week(&self, year: i32, week: u32) -> Result<Vec<Session>> {
        self.sessions_where(|session| session.year == year && session.week == week)
    }

    pub fn sessions_by_month(&self, year: i32, month: u32) -> Result<Vec<Session>> {
        let key = month_key(year, month);
        self.sessions_where(|session| session.month == key)
    }

    pub fn sessions_by_year(&self, year: i32) -> Result<Vec<Session>> {
        self.sessions_where(|session| session.year == year)
    }
}
