// ── Kindred: Session Registry ───────────────────────────────────────────────
//
// One CompanionSession per user, each behind its own lock. The map lock is
// held only long enough to look up or insert, so work on different users
// never contends, while all calls for one user are serialized.

use crate::atoms::error::PolicyResult;
use crate::atoms::policy_types::PolicyConfig;
use crate::atoms::traits::{Clock, RandomSource, SystemClock, ThreadRandom};
use crate::engine::policy::session::CompanionSession;
use chrono_tz::Tz;
use log::info;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type RandomFactory = Box<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

pub struct SessionRegistry {
    config: PolicyConfig,
    tz: Tz,
    clock: Arc<dyn Clock>,
    random: RandomFactory,
    sessions: Mutex<HashMap<String, Arc<Mutex<CompanionSession>>>>,
}

impl SessionRegistry {
    /// Registry on the system clock and thread-local randomness.
    pub fn new(config: PolicyConfig) -> PolicyResult<Self> {
        Self::with_sources(
            config,
            Arc::new(SystemClock),
            Box::new(|| Box::new(ThreadRandom) as Box<dyn RandomSource>),
        )
    }

    /// Registry with an injected clock and a per-session random source.
    pub fn with_sources(
        config: PolicyConfig,
        clock: Arc<dyn Clock>,
        random: RandomFactory,
    ) -> PolicyResult<Self> {
        config.validate()?;
        let tz = config.tz()?;
        Ok(Self {
            config,
            tz,
            clock,
            random,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// The session for `user_id`, created on first use.
    pub fn session(&self, user_id: &str) -> Arc<Mutex<CompanionSession>> {
        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get(user_id) {
            return existing.clone();
        }
        info!("[policy-registry] New session for user {}", user_id);
        let session = Arc::new(Mutex::new(CompanionSession::with_tz(
            self.config.clone(),
            self.tz,
            self.clock.clone(),
            (self.random)(),
        )));
        sessions.insert(user_id.to_string(), session.clone());
        session
    }

    /// Drop a user's session. Handles already given out stay usable.
    pub fn remove(&self, user_id: &str) -> bool {
        self.sessions.lock().remove(user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    pub fn user_ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }
}
