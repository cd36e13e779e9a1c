// ── Kindred: Proactive Message Throttling ───────────────────────────────────
//
// Holds the pending queue of proactive messages and a per-calendar-day sent
// counter. The day key is the "YYYY-MM-DD" date in the configured timezone
// and resets lazily on every call, so a scheduler that sits idle across
// midnight still starts the new day at zero.
//
// Cap rule: non-high-priority messages are rejected once messages already
// sent today plus non-high messages pending for today reach `max_daily`.
// High priority bypasses the cap.
//
// Per-type marker: the types delivered today are remembered (reset with the
// counter) so a caller polling on a cadence can skip a type that is already
// pending or already went out.
//
// Thread-safety: NOT internally synchronized. `schedule_message` and
// `get_due_messages` must be serialized by the caller (see SessionRegistry).

use crate::atoms::policy_types::{Priority, ProactiveMessage, ProactiveType};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, info};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ProactiveScheduler {
    pending: Vec<ProactiveMessage>,
    /// Local date "YYYY-MM-DD" the counter belongs to.
    date: String,
    sent_today: u32,
    /// Message types delivered on `date`.
    sent_types: HashSet<ProactiveType>,
    max_daily: u32,
    tz: Tz,
}

impl ProactiveScheduler {
    pub fn new(max_daily: u32, tz: Tz) -> Self {
        Self {
            pending: Vec::new(),
            date: String::new(),
            sent_today: 0,
            sent_types: HashSet::new(),
            max_daily,
            tz,
        }
    }

    fn day_key(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.tz).format("%Y-%m-%d").to_string()
    }

    fn maybe_reset(&mut self, now: DateTime<Utc>) {
        let today = self.day_key(now);
        if self.date != today {
            if !self.date.is_empty() {
                debug!(
                    "[policy-scheduler] Day rollover {} → {}, resetting sent counter ({})",
                    self.date, today, self.sent_today
                );
            }
            self.date = today;
            self.sent_today = 0;
            self.sent_types.clear();
        }
    }

    /// Queue a message. Returns false if the daily cap rejects it or a
    /// message with the same id is already pending.
    pub fn schedule_message(&mut self, message: ProactiveMessage, now: DateTime<Utc>) -> bool {
        self.maybe_reset(now);

        if self.pending.iter().any(|m| m.id == message.id) {
            return false;
        }

        let pending_today = self
            .pending
            .iter()
            .filter(|m| m.priority != Priority::High && self.day_key(m.scheduled_for) == self.date)
            .count() as u32;
        let used = self.sent_today + pending_today;
        if message.priority != Priority::High && used >= self.max_daily {
            info!(
                "[policy-scheduler] Daily cap reached ({}/{}), rejecting {} message",
                used, self.max_daily, message.message_type
            );
            return false;
        }

        debug!(
            "[policy-scheduler] Scheduled {} ({:?}) for {}",
            message.message_type, message.priority, message.scheduled_for
        );
        self.pending.push(message);
        true
    }

    /// Remove and return every pending message due at or before `now`,
    /// earliest first. Counts them as sent today.
    pub fn get_due_messages(&mut self, now: DateTime<Utc>) -> Vec<ProactiveMessage> {
        self.maybe_reset(now);

        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|m| m.scheduled_for <= now);
        self.pending = rest;
        due.sort_by_key(|m| m.scheduled_for);

        self.sent_today += due.len() as u32;
        self.sent_types.extend(due.iter().map(|m| m.message_type));
        due
    }

    /// True if a message of `message_type` is pending or was delivered on
    /// the current local day.
    pub fn has_outstanding(&mut self, message_type: ProactiveType, now: DateTime<Utc>) -> bool {
        self.maybe_reset(now);
        self.sent_types.contains(&message_type)
            || self.pending.iter().any(|m| m.message_type == message_type)
    }

    /// Drop a pending message by id.
    pub fn cancel(&mut self, id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|m| m.id != id);
        self.pending.len() != before
    }

    pub fn pending(&self) -> &[ProactiveMessage] {
        &self.pending
    }

    /// Messages counted as sent on the current local day (as of `now`).
    pub fn sent_today(&mut self, now: DateTime<Utc>) -> u32 {
        self.maybe_reset(now);
        self.sent_today
    }

    pub fn max_daily(&self) -> u32 {
        self.max_daily
    }
}
