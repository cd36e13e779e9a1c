// ── Kindred Atoms: Constants ───────────────────────────────────────────────
// Every threshold, weight and window the policy engine compares against.

// ── Emotion classifier weights ────────────────────────────────────────────
/// Score added when a core-emotion keyword pattern matches.
pub const KEYWORD_WEIGHT: f32 = 2.0;
/// Score added when a secondary/modifier pattern of an emotion matches.
pub const MODIFIER_WEIGHT: f32 = 1.0;
/// Value a micro-signal takes when any of its patterns fire.
pub const MICRO_SIGNAL_HIT: f32 = 0.7;
/// Micro-signals above this are treated as "present" by the strategy selector.
pub const MICRO_SIGNAL_THRESHOLD: f32 = 0.6;
/// Frustration micro-signal requires an angry message shorter than this.
pub const FRUSTRATION_MAX_CHARS: usize = 50;
/// Suppressed-anger micro-signal requires a terse reply shorter than this.
pub const SUPPRESSED_ANGER_MAX_CHARS: usize = 20;
/// Sum of all emotion scores that maps to confidence 1.0.
pub const CONFIDENCE_DIVISOR: f32 = 5.0;
/// Exclamation marks needed (strictly more than) to count as "strong".
pub const EXCLAMATION_STRONG_COUNT: usize = 2;
/// How many trailing history messages feed the conversation-tone rules.
pub const TONE_HISTORY_MESSAGES: usize = 5;

// ── Relationship stage thresholds (message counts) ────────────────────────
pub const STAGE_NEW_MAX: usize = 10;
pub const STAGE_ACQUAINTED_MAX: usize = 50;
pub const STAGE_FRIEND_MAX: usize = 200;

// ── Trajectory tracker ────────────────────────────────────────────────────
pub const DEFAULT_TRAJECTORY_WINDOW: usize = 50;
/// Below this many readings, patterns fall back to the neutral default.
pub const MIN_READINGS_FOR_PATTERNS: usize = 5;
/// Alerts only look at this many most-recent readings.
pub const ALERT_LOOKBACK: usize = 10;
/// Valence below this opens a "negative episode" for resilience tracking.
pub const NEGATIVE_EPISODE_VALENCE: f32 = -0.3;
/// Resilience used when no completed negative episode exists.
pub const DEFAULT_RESILIENCE: f32 = 0.5;
pub const MS_PER_DAY: f64 = 86_400_000.0;
pub const PROLONGED_SADNESS_MEDIUM: usize = 7;
pub const PROLONGED_SADNESS_HIGH: usize = 9;
pub const VOLATILITY_ALERT_THRESHOLD: f32 = 0.7;
pub const WITHDRAWAL_MIN_COUNT: usize = 6;
pub const WITHDRAWAL_MAX_AROUSAL: f32 = 0.3;
pub const WITHDRAWAL_MAX_VALENCE: f32 = -0.2;
pub const CRISIS_INDICATOR_MIN_COUNT: usize = 2;

// ── Engagement scheduler ──────────────────────────────────────────────────
pub const DEFAULT_MIN_INACTIVITY_HOURS: i64 = 4;
pub const ALERT_CHECKIN_INACTIVITY_HOURS: i64 = 12;
pub const DAILY_CHECKIN_INACTIVITY_HOURS: i64 = 24;
pub const FREQUENT_MIN_INACTIVITY_DAYS: i64 = 2;
pub const FREQUENT_MAX_INACTIVITY_DAYS: i64 = 4;
pub const WEEKLY_MIN_INACTIVITY_DAYS: i64 = 7;
pub const WEEKLY_MAX_INACTIVITY_DAYS: i64 = 10;
pub const APPRECIATION_MIN_RELATIONSHIP_DAYS: i64 = 14;
pub const APPRECIATION_MIN_INACTIVITY_HOURS: i64 = 48;
pub const APPRECIATION_CHANCE: f64 = 0.10;
pub const DEFAULT_MAX_DAILY_PROACTIVE: u32 = 2;
pub const DEFAULT_SESSION_GAP_MINUTES: i64 = 30;
/// Messages-per-day thresholds for the engagement frequency buckets.
pub const FREQUENCY_DAILY_MIN: f64 = 10.0;
pub const FREQUENCY_FREQUENT_MIN: f64 = 3.0;
pub const FREQUENCY_WEEKLY_MIN: f64 = 1.0;
/// A time-of-day bucket counts as "preferred" at or above this share of messages.
pub const PREFERRED_BUCKET_SHARE: f64 = 0.25;

// ── Memory surfacing ──────────────────────────────────────────────────────
pub const DEFAULT_MAX_SURFACED_MEMORIES: usize = 2;
pub const SURFACE_COOLDOWN_DAYS: i64 = 2;
pub const EVENT_REMINDER_CHANCE: f64 = 0.90;
/// "today"/"tonight" events are assumed to be over this long after mention.
pub const SAME_DAY_EVENT_OFFSET_HOURS: i64 = 6;
pub const GOAL_MIN_AGE_DAYS: i64 = 3;
pub const GOAL_QUIET_DAYS: i64 = 5;
pub const GOAL_CHANCE: f64 = 0.30;
pub const PROBLEM_MIN_AGE_DAYS: i64 = 1;
pub const PROBLEM_QUIET_DAYS: i64 = 3;
pub const PROBLEM_CHANCE: f64 = 0.40;
pub const PERSON_QUIET_DAYS: i64 = 7;
pub const PERSON_CHANCE: f64 = 0.20;
pub const FALLBACK_QUIET_DAYS: i64 = 7;
pub const FALLBACK_CHANCE: f64 = 0.15;
pub const MEMORY_SUBJECT_MAX_CHARS: usize = 50;

// ── Crisis resources ──────────────────────────────────────────────────────
// Rendered verbatim by `crisis_resource_message()`. (name, contact) pairs.
pub const CRISIS_RESOURCES: &[(&str, &str)] = &[
    ("988 Suicide & Crisis Lifeline (US)", "call or text 988"),
    ("Crisis Text Line", "text HOME to 741741"),
    ("Samaritans (UK & Ireland)", "call 116 123"),
    ("International Association for Suicide Prevention", "https://www.iasp.info/resources/Crisis_Centres/"),
    ("Emergency services", "call your local emergency number"),
];
