// ── Kindred Atoms: Policy Engine Types ─────────────────────────────────────
//
// Type definitions for the conversational policy engine.
// These are pure data types (no pattern tables, no scheduling logic).
//
// Follows the project pattern: structs in atoms/, impls in engine/.

use crate::atoms::constants::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 1: Emotions
// ═══════════════════════════════════════════════════════════════════════════

/// The eight core emotions. Declaration order is the tie-break order for
/// argmax: the first-declared emotion wins a tie.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CoreEmotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Disgust,
    Surprise,
    Trust,
    Anticipation,
}

impl CoreEmotion {
    pub const ALL: [CoreEmotion; 8] = [
        CoreEmotion::Joy,
        CoreEmotion::Sadness,
        CoreEmotion::Anger,
        CoreEmotion::Fear,
        CoreEmotion::Disgust,
        CoreEmotion::Surprise,
        CoreEmotion::Trust,
        CoreEmotion::Anticipation,
    ];

    /// Position in `ALL`; used to index score arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoreEmotion::Joy => "joy",
            CoreEmotion::Sadness => "sadness",
            CoreEmotion::Anger => "anger",
            CoreEmotion::Fear => "fear",
            CoreEmotion::Disgust => "disgust",
            CoreEmotion::Surprise => "surprise",
            CoreEmotion::Trust => "trust",
            CoreEmotion::Anticipation => "anticipation",
        }
    }
}

impl std::fmt::Display for CoreEmotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extended emotions layered on top of the primary one. Non-exclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryEmotion {
    Anxiety,
    Frustration,
    Loneliness,
    Overwhelm,
    Disappointment,
    Gratitude,
    Excitement,
    Hopefulness,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Subtle,
    Moderate,
    Strong,
    Overwhelming,
}

/// Heuristic booleans encoded as floats: each is 0.0 or `MICRO_SIGNAL_HIT`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MicroSignals {
    pub sarcasm: f32,
    pub frustration: f32,
    pub hidden_sadness: f32,
    pub suppressed_anger: f32,
    pub faking_happiness: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket a local hour (0–23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConversationTone {
    Casual,
    Playful,
    Serious,
    Vulnerable,
}

/// Coarse proxy for relationship depth, bucketed by message count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStage {
    New,
    Acquainted,
    Friend,
    Close,
}

impl RelationshipStage {
    pub fn from_message_count(count: usize) -> Self {
        if count < STAGE_NEW_MAX {
            RelationshipStage::New
        } else if count < STAGE_ACQUAINTED_MAX {
            RelationshipStage::Acquainted
        } else if count < STAGE_FRIEND_MAX {
            RelationshipStage::Friend
        } else {
            RelationshipStage::Close
        }
    }
}

/// Derived from the clock and the conversation history; never stored alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReadingContext {
    pub time_of_day: TimeOfDay,
    pub conversation_tone: ConversationTone,
    pub relationship_stage: RelationshipStage,
}

/// Result of classifying one inbound message. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionReading {
    pub primary_emotion: CoreEmotion,
    pub secondary_emotions: Vec<SecondaryEmotion>,
    pub intensity: Intensity,
    /// 0.0–1.0, crude signal strength (not calibrated).
    pub confidence: f32,
    /// -1.0 (negative) to 1.0 (positive).
    pub valence: f32,
    /// 0.0 (calm) to 1.0 (excited).
    pub arousal: f32,
    pub micro_signals: MicroSignals,
    pub context: ReadingContext,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 2: Response Strategy
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Supportive,
    Celebratory,
    Calming,
    Validating,
    Gentle,
    Energizing,
    Playful,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

/// Policy output for one message. Computed fresh, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseStrategy {
    /// Which named strategy produced this (e.g. "celebration").
    pub name: String,
    pub tone: Tone,
    pub urgency: Urgency,
    /// Behaviour tags the responder must not exhibit.
    pub avoid: Vec<String>,
    /// Ordered, advisory guidance.
    pub suggestions: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 3: Emotional Trajectory
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryEntry {
    pub timestamp: DateTime<Utc>,
    pub reading: EmotionReading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryPatterns {
    /// Mode of primary emotions; `None` when there is too little data.
    pub dominant_emotion: Option<CoreEmotion>,
    /// Fraction of adjacent pairs whose primary emotion changed.
    pub volatility: f32,
    /// 1.0 = recovers from negative episodes quickly, 0.0 = takes a day or more.
    pub resilience: f32,
    /// Distinct primary emotions seen / 8.
    pub emotional_range: f32,
}

impl Default for TrajectoryPatterns {
    fn default() -> Self {
        Self {
            dominant_emotion: None,
            volatility: 0.0,
            resilience: DEFAULT_RESILIENCE,
            emotional_range: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    ProlongedSadness,
    EmotionalVolatility,
    Withdrawal,
    CrisisIndicator,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A view over the current window, recomputed on every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionalTrajectory {
    /// Oldest first.
    pub timeline: Vec<TrajectoryEntry>,
    pub patterns: TrajectoryPatterns,
    pub alerts: Vec<TrajectoryAlert>,
}

impl EmotionalTrajectory {
    /// True if any alert is high or critical.
    pub fn has_serious_alert(&self) -> bool {
        self.alerts.iter().any(|a| a.severity >= AlertSeverity::High)
    }
}

/// Serializable window contents for the host to persist across restarts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrajectorySnapshot {
    pub entries: Vec<TrajectoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 4: Engagement
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProactiveType {
    MorningCheckin,
    EveningCheckin,
    WellbeingCheck,
    RandomAppreciation,
    MemoryFollowup,
    GoalReminder,
    MilestoneCelebration,
    ConversationContinuation,
}

impl std::fmt::Display for ProactiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProactiveType::MorningCheckin => "morning_checkin",
            ProactiveType::EveningCheckin => "evening_checkin",
            ProactiveType::WellbeingCheck => "wellbeing_check",
            ProactiveType::RandomAppreciation => "random_appreciation",
            ProactiveType::MemoryFollowup => "memory_followup",
            ProactiveType::GoalReminder => "goal_reminder",
            ProactiveType::MilestoneCelebration => "milestone_celebration",
            ProactiveType::ConversationContinuation => "conversation_continuation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A scheduled outbound nudge. Identity is `id`; delivered exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProactiveMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: ProactiveType,
    pub message: String,
    pub priority: Priority,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ProactiveMessage {
    pub fn new(
        message_type: ProactiveType,
        message: String,
        priority: Priority,
        scheduled_for: DateTime<Utc>,
        context: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message_type,
            message,
            priority,
            scheduled_for,
            context,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProactiveDecision {
    pub should_send: bool,
    pub reason: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<ProactiveType>,
}

impl ProactiveDecision {
    pub fn no(reason: impl Into<String>) -> Self {
        Self { should_send: false, reason: reason.into(), message_type: None }
    }

    pub fn send(message_type: ProactiveType, reason: impl Into<String>) -> Self {
        Self { should_send: true, reason: reason.into(), message_type: Some(message_type) }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EngagementFrequency {
    Daily,
    Frequent,
    Weekly,
    Occasional,
}

/// Derived per user from message history; not persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngagementPatterns {
    /// Mean session duration in minutes.
    pub average_session_minutes: f64,
    pub messages_per_session: f64,
    /// Buckets holding at least a quarter of user messages, busiest first.
    pub preferred_times: Vec<TimeOfDay>,
    /// Mean delay between an assistant message and the user's next reply.
    pub typical_response_secs: f64,
    pub engagement_frequency: EngagementFrequency,
    pub total_user_messages: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_at: Option<DateTime<Utc>>,
}

impl Default for EngagementPatterns {
    fn default() -> Self {
        Self {
            average_session_minutes: 0.0,
            messages_per_session: 0.0,
            preferred_times: Vec::new(),
            typical_response_secs: 0.0,
            engagement_frequency: EngagementFrequency::Occasional,
            total_user_messages: 0,
            last_active_at: None,
        }
    }
}

/// What the host knows about the user when polling for proactive messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub last_active_at: DateTime<Utc>,
    pub relationship_started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { role: MessageRole::User, content: content.into(), timestamp }
    }

    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into(), timestamp }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 5: Memory Tags
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemoryCategory {
    Goal,
    Problem,
    Person,
    Event,
    Interest,
    Pattern,
    Achievement,
    Preference,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

/// A candidate topic the companion may bring up again later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryTag {
    pub id: String,
    /// Raw excerpt that triggered extraction.
    pub topic: String,
    pub category: MemoryCategory,
    /// The full message the tag was extracted from.
    pub context: String,
    pub importance: Importance,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_surfaced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Utc>>,
}

impl MemoryTag {
    pub fn resolve(&mut self) {
        self.resolved = true;
    }

    pub fn mark_surfaced(&mut self, now: DateTime<Utc>) {
        self.last_surfaced_at = Some(now);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SECTION 6: Configuration
// ═══════════════════════════════════════════════════════════════════════════

/// Every previously-hardcoded knob, with a documented default.
/// Loaded from TOML by `engine::config`; every field may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Readings kept per user in the trajectory window.
    pub trajectory_window: usize,
    /// Non-high-priority proactive messages allowed per calendar day.
    pub max_daily_proactive: u32,
    /// IANA timezone used for time-of-day buckets and the daily rollover.
    pub timezone: String,
    /// No proactive message while the user was active this recently.
    pub min_inactivity_hours: i64,
    /// Gap that splits message history into sessions.
    pub session_gap_minutes: i64,
    /// Memory suggestions woven into one outbound context at most.
    pub max_surfaced_memories: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            trajectory_window: DEFAULT_TRAJECTORY_WINDOW,
            max_daily_proactive: DEFAULT_MAX_DAILY_PROACTIVE,
            timezone: "UTC".into(),
            min_inactivity_hours: DEFAULT_MIN_INACTIVITY_HOURS,
            session_gap_minutes: DEFAULT_SESSION_GAP_MINUTES,
            max_surfaced_memories: DEFAULT_MAX_SURFACED_MEMORIES,
        }
    }
}
