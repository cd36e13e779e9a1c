// ── Kindred: Companion Session ──────────────────────────────────────────────
//
// Per-user facade that wires the policy modules together in the order the
// host needs them:
//
//   inbound:  crisis net → classify → strategy → trajectory → memory
//   outbound: patterns → decision → text → send time → scheduler
//
// The crisis net is checked first and returns before the classifier runs.
// Nothing here performs I/O; the clock and random source are injected.

use crate::atoms::error::PolicyResult;
use crate::atoms::policy_types::{
    ChatMessage, EmotionReading, EmotionalTrajectory, MemoryTag, PolicyConfig, Priority,
    ProactiveMessage, ProactiveType, ResponseStrategy, TrajectorySnapshot, UserState,
};
use crate::atoms::traits::{Clock, RandomSource};
use crate::engine::policy::crisis::{crisis_resource_message, detect_crisis};
use crate::engine::policy::emotion_classifier::analyze_emotion;
use crate::engine::policy::engagement::{
    analyze_engagement_patterns, generate_proactive_message, get_optimal_send_time,
    should_send_proactive_message,
};
use crate::engine::policy::memory_surfacing::{
    build_memory_surfacing_prompt, clean_subject, extract_memory_tags,
};
use crate::engine::policy::proactive_scheduler::ProactiveScheduler;
use crate::engine::policy::response_strategy::select_strategy;
use crate::engine::policy::trajectory::TrajectoryTracker;
use chrono::Duration;
use chrono_tz::Tz;
use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of assessing one inbound user message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundAssessment {
    /// Crisis language detected. The host must send `resources` verbatim
    /// and skip every other policy and the LLM call.
    Crisis { resources: String },
    Assessed {
        reading: EmotionReading,
        strategy: ResponseStrategy,
        /// Advisory memory callbacks for the outbound context, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        memory_prompt: Option<String>,
        new_tags: Vec<MemoryTag>,
    },
}

impl InboundAssessment {
    pub fn is_crisis(&self) -> bool {
        matches!(self, InboundAssessment::Crisis { .. })
    }
}

pub struct CompanionSession {
    config: PolicyConfig,
    tz: Tz,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RandomSource>,
    trajectory: TrajectoryTracker,
    scheduler: ProactiveScheduler,
    memory_tags: Vec<MemoryTag>,
}

impl CompanionSession {
    /// Validate `config` and build an empty session.
    pub fn new(
        config: PolicyConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource>,
    ) -> PolicyResult<Self> {
        config.validate()?;
        let tz = config.tz()?;
        Ok(Self::with_tz(config, tz, clock, rng))
    }

    /// Build from an already-validated config.
    pub(crate) fn with_tz(
        config: PolicyConfig,
        tz: Tz,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            trajectory: TrajectoryTracker::from_config(&config),
            scheduler: ProactiveScheduler::new(config.max_daily_proactive, tz),
            memory_tags: Vec::new(),
            config,
            tz,
            clock,
            rng,
        }
    }

    // ── Inbound ────────────────────────────────────────────────────────────

    /// Assess a user message. `history` is the recent conversation, oldest
    /// first, not including `text`.
    pub fn handle_inbound(&mut self, text: &str, history: &[ChatMessage]) -> InboundAssessment {
        if detect_crisis(text) {
            return InboundAssessment::Crisis { resources: crisis_resource_message() };
        }

        let now = self.clock.now();
        let reading = analyze_emotion(text, history, &now.with_timezone(&self.tz));
        let strategy = select_strategy(&reading);
        debug!(
            "[policy-session] {} ({:?}, conf {:.2}) → {}",
            reading.primary_emotion, reading.intensity, reading.confidence, strategy.name
        );

        self.trajectory.add_reading(reading.clone(), Some(text.to_string()), now);

        let memory_prompt = build_memory_surfacing_prompt(
            &mut self.memory_tags,
            now,
            self.config.max_surfaced_memories,
            self.rng.as_mut(),
        );
        let new_tags = extract_memory_tags(text, now);
        self.memory_tags.extend(new_tags.iter().cloned());

        InboundAssessment::Assessed { reading, strategy, memory_prompt, new_tags }
    }

    // ── Outbound ───────────────────────────────────────────────────────────

    /// Decide whether to reach out unprompted and, if so, queue the message.
    /// Returns the scheduled message, or None when declined or capped.
    pub fn poll_engagement(
        &mut self,
        history: &[ChatMessage],
        user_state: &UserState,
    ) -> Option<ProactiveMessage> {
        let now = self.clock.now();
        let patterns = analyze_engagement_patterns(
            history,
            &self.tz,
            Duration::minutes(self.config.session_gap_minutes),
        );
        let trajectory = (!self.trajectory.is_empty()).then(|| self.trajectory.get_trajectory(now));

        let decision = should_send_proactive_message(
            &patterns,
            user_state,
            trajectory.as_ref(),
            now,
            self.config.min_inactivity_hours,
            self.rng.as_mut(),
        );
        let message_type = match decision.message_type {
            Some(t) if decision.should_send => t,
            _ => {
                debug!("[policy-session] No proactive message: {}", decision.reason);
                return None;
            }
        };
        if self.scheduler.has_outstanding(message_type, now) {
            debug!("[policy-session] {} already pending or sent today, skipping", message_type);
            return None;
        }

        let context = match message_type {
            ProactiveType::MemoryFollowup
            | ProactiveType::GoalReminder
            | ProactiveType::ConversationContinuation => self
                .memory_tags
                .iter()
                .rev()
                .find(|t| !t.resolved)
                .map(|t| clean_subject(&t.topic)),
            _ => None,
        };
        let text = generate_proactive_message(
            message_type,
            user_state.user_name.as_deref(),
            context.as_deref(),
            self.rng.as_mut(),
        );
        let scheduled_for = get_optimal_send_time(message_type, history, now, &self.tz);
        let message = ProactiveMessage::new(
            message_type,
            text,
            priority_for(message_type),
            scheduled_for,
            context,
        );

        if self.scheduler.schedule_message(message.clone(), now) {
            info!(
                "[policy-session] Queued {} for {} ({})",
                message.message_type, message.scheduled_for, decision.reason
            );
            Some(message)
        } else {
            None
        }
    }

    /// Pop every queued message that is due now.
    pub fn due_messages(&mut self) -> Vec<ProactiveMessage> {
        let now = self.clock.now();
        self.scheduler.get_due_messages(now)
    }

    pub fn cancel_message(&mut self, id: &str) -> bool {
        self.scheduler.cancel(id)
    }

    pub fn pending_messages(&self) -> &[ProactiveMessage] {
        self.scheduler.pending()
    }

    // ── State ──────────────────────────────────────────────────────────────

    pub fn trajectory(&self) -> EmotionalTrajectory {
        self.trajectory.get_trajectory(self.clock.now())
    }

    pub fn trajectory_snapshot(&self) -> TrajectorySnapshot {
        self.trajectory.snapshot(self.clock.now())
    }

    /// Replace the trajectory window with a persisted one.
    pub fn restore_trajectory(&mut self, snapshot: TrajectorySnapshot) {
        self.trajectory = TrajectoryTracker::from_snapshot(snapshot, self.config.trajectory_window);
    }

    pub fn memory_tags(&self) -> &[MemoryTag] {
        &self.memory_tags
    }

    /// Seed previously persisted tags.
    pub fn add_memory_tags(&mut self, tags: impl IntoIterator<Item = MemoryTag>) {
        self.memory_tags.extend(tags);
    }

    /// Mark a tag resolved so it is never surfaced again.
    pub fn resolve_tag(&mut self, id: &str) -> bool {
        match self.memory_tags.iter_mut().find(|t| t.id == id) {
            Some(tag) => {
                tag.resolve();
                true
            }
            None => false,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }
}

fn priority_for(message_type: ProactiveType) -> Priority {
    match message_type {
        ProactiveType::WellbeingCheck => Priority::High,
        ProactiveType::MorningCheckin
        | ProactiveType::EveningCheckin
        | ProactiveType::MemoryFollowup
        | ProactiveType::GoalReminder => Priority::Medium,
        _ => Priority::Low,
    }
}
