// ── Kindred: Emotional Trajectory Tracker ───────────────────────────────────
//
// A bounded FIFO of the user's most recent EmotionReadings, plus the
// patterns and alerts derived from it.
//
// Key properties:
//   - One tracker per user; the tracker is the sole mutator of its window
//   - O(1) push with oldest-first eviction at capacity (FIFO, not LRU)
//   - Patterns and alerts are views: recomputed from the window on every
//     query, never stored
//   - Snapshot-saveable so the host can persist the window across restarts

use crate::atoms::constants::*;
use crate::atoms::policy_types::{
    AlertSeverity, AlertType, CoreEmotion, EmotionReading, EmotionalTrajectory, Intensity,
    PolicyConfig, TrajectoryAlert, TrajectoryEntry, TrajectoryPatterns, TrajectorySnapshot,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::{HashSet, VecDeque};

/// Per-user rolling window of emotion readings.
///
/// Thread-safety: NOT internally synchronized. Callers serving the same user
/// from several threads must wrap it in a Mutex (see `SessionRegistry`).
#[derive(Debug, Clone)]
pub struct TrajectoryTracker {
    entries: VecDeque<TrajectoryEntry>,
    capacity: usize,
}

impl TrajectoryTracker {
    /// Create a tracker holding at most `capacity` readings (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(config.trajectory_window)
    }

    /// Restore a persisted window. If the snapshot holds more entries than
    /// `capacity`, only the most recent ones are kept.
    pub fn from_snapshot(snapshot: TrajectorySnapshot, capacity: usize) -> Self {
        let mut tracker = Self::new(capacity);
        let skip = snapshot.entries.len().saturating_sub(tracker.capacity);
        tracker.entries.extend(snapshot.entries.into_iter().skip(skip));
        tracker
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TrajectorySnapshot {
        TrajectorySnapshot {
            entries: self.entries.iter().cloned().collect(),
            saved_at: Some(now),
        }
    }

    /// Append a reading. Evicts and returns the oldest entry when full.
    pub fn add_reading(
        &mut self,
        reading: EmotionReading,
        trigger: Option<String>,
        at: DateTime<Utc>,
    ) -> Option<TrajectoryEntry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };

        self.entries.push_back(TrajectoryEntry {
            timestamp: at,
            reading,
            trigger,
        });

        evicted
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &TrajectoryEntry> {
        self.entries.iter()
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &TrajectoryEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Recompute patterns and alerts from the current window.
    pub fn get_trajectory(&self, now: DateTime<Utc>) -> EmotionalTrajectory {
        let all: Vec<&TrajectoryEntry> = self.entries.iter().collect();
        let recent: Vec<&TrajectoryEntry> = self.recent(ALERT_LOOKBACK).collect();

        let patterns = compute_patterns(&all);
        let alerts = compute_alerts(&recent, now);

        if !alerts.is_empty() {
            info!(
                "[policy-trajectory] {} alert(s): {:?}",
                alerts.len(),
                alerts.iter().map(|a| a.alert_type).collect::<Vec<_>>()
            );
        }
        debug!(
            "[policy-trajectory] n={} volatility={:.2} resilience={:.2}",
            all.len(),
            patterns.volatility,
            patterns.resilience
        );

        EmotionalTrajectory {
            timeline: self.entries.iter().cloned().collect(),
            patterns,
            alerts,
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Patterns
// ═════════════════════════════════════════════════════════════════════════════

fn volatility(entries: &[&TrajectoryEntry]) -> f32 {
    if entries.len() < 2 {
        return 0.0;
    }
    let changes = entries
        .windows(2)
        .filter(|w| w[0].reading.primary_emotion != w[1].reading.primary_emotion)
        .count();
    changes as f32 / (entries.len() - 1) as f32
}

/// Mode of primary emotions; ties go to the first-declared emotion.
fn dominant_emotion(entries: &[&TrajectoryEntry]) -> Option<CoreEmotion> {
    if entries.is_empty() {
        return None;
    }
    let mut counts = [0usize; 8];
    for e in entries {
        counts[e.reading.primary_emotion.index()] += 1;
    }
    let mut best = CoreEmotion::Joy;
    for emotion in CoreEmotion::ALL {
        if counts[emotion.index()] > counts[best.index()] {
            best = emotion;
        }
    }
    Some(best)
}

/// 1 − (mean recovery time / one day), floored at 0. Only completed
/// negative episodes count; none at all gives the default.
fn resilience(entries: &[&TrajectoryEntry]) -> f32 {
    let mut episode_start: Option<DateTime<Utc>> = None;
    let mut recoveries_ms: Vec<f64> = Vec::new();

    for e in entries {
        let negative = e.reading.valence < NEGATIVE_EPISODE_VALENCE;
        match (negative, episode_start) {
            (true, None) => episode_start = Some(e.timestamp),
            (false, Some(start)) => {
                recoveries_ms.push((e.timestamp - start).num_milliseconds() as f64);
                episode_start = None;
            }
            _ => {}
        }
    }

    if recoveries_ms.is_empty() {
        return DEFAULT_RESILIENCE;
    }
    let avg = recoveries_ms.iter().sum::<f64>() / recoveries_ms.len() as f64;
    (1.0 - avg / MS_PER_DAY).max(0.0) as f32
}

fn compute_patterns(entries: &[&TrajectoryEntry]) -> TrajectoryPatterns {
    if entries.len() < MIN_READINGS_FOR_PATTERNS {
        return TrajectoryPatterns::default();
    }
    let distinct: HashSet<CoreEmotion> = entries.iter().map(|e| e.reading.primary_emotion).collect();

    TrajectoryPatterns {
        dominant_emotion: dominant_emotion(entries),
        volatility: volatility(entries),
        resilience: resilience(entries),
        emotional_range: distinct.len() as f32 / CoreEmotion::ALL.len() as f32,
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Alerts
// ═════════════════════════════════════════════════════════════════════════════

fn compute_alerts(recent: &[&TrajectoryEntry], now: DateTime<Utc>) -> Vec<TrajectoryAlert> {
    let mut alerts = Vec::new();
    let alert = |alert_type, severity, message: String| TrajectoryAlert {
        alert_type,
        severity,
        message,
        timestamp: now,
    };

    let sadness = recent
        .iter()
        .filter(|e| e.reading.primary_emotion == CoreEmotion::Sadness)
        .count();
    if sadness >= PROLONGED_SADNESS_MEDIUM {
        let severity = if sadness >= PROLONGED_SADNESS_HIGH {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };
        alerts.push(alert(
            AlertType::ProlongedSadness,
            severity,
            format!("{} of the last {} messages were sad", sadness, recent.len()),
        ));
    }

    let recent_volatility = volatility(recent);
    if recent_volatility > VOLATILITY_ALERT_THRESHOLD {
        alerts.push(alert(
            AlertType::EmotionalVolatility,
            AlertSeverity::Medium,
            format!("Emotions are shifting rapidly (volatility {:.2})", recent_volatility),
        ));
    }

    let withdrawn = recent
        .iter()
        .filter(|e| e.reading.arousal < WITHDRAWAL_MAX_AROUSAL && e.reading.valence < WITHDRAWAL_MAX_VALENCE)
        .count();
    if withdrawn >= WITHDRAWAL_MIN_COUNT {
        alerts.push(alert(
            AlertType::Withdrawal,
            AlertSeverity::High,
            format!("{} recent messages read as low-energy and negative", withdrawn),
        ));
    }

    let crisis = recent
        .iter()
        .filter(|e| {
            matches!(e.reading.primary_emotion, CoreEmotion::Sadness | CoreEmotion::Fear)
                && e.reading.intensity == Intensity::Overwhelming
        })
        .count();
    if crisis >= CRISIS_INDICATOR_MIN_COUNT {
        alerts.push(alert(
            AlertType::CrisisIndicator,
            AlertSeverity::Critical,
            format!("{} recent messages were overwhelming sadness or fear", crisis),
        ));
    }

    alerts
}

impl EmotionalTrajectory {
    /// One-paragraph description for prompt context.
    pub fn summary(&self) -> String {
        let p = &self.patterns;
        let mut out = match p.dominant_emotion {
            Some(e) => format!(
                "Recent mood is mostly {} (volatility {:.2}, resilience {:.2}, range {:.2}).",
                e, p.volatility, p.resilience, p.emotional_range
            ),
            None => "Not enough conversation yet to describe a mood trend.".to_string(),
        };
        for a in &self.alerts {
            out.push_str(&format!(" [{:?}/{:?}] {}.", a.alert_type, a.severity, a.message));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::policy_types::{
        ConversationTone, MicroSignals, ReadingContext, RelationshipStage, TimeOfDay,
    };
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn reading(primary: CoreEmotion, valence: f32, arousal: f32, intensity: Intensity) -> EmotionReading {
        EmotionReading {
            primary_emotion: primary,
            secondary_emotions: vec![],
            intensity,
            confidence: 0.5,
            valence,
            arousal,
            micro_signals: MicroSignals::default(),
            context: ReadingContext {
                time_of_day: TimeOfDay::Morning,
                conversation_tone: ConversationTone::Casual,
                relationship_stage: RelationshipStage::New,
            },
        }
    }

    fn sad() -> EmotionReading {
        reading(CoreEmotion::Sadness, -0.6, 0.1, Intensity::Moderate)
    }

    fn happy() -> EmotionReading {
        reading(CoreEmotion::Joy, 0.8, 0.5, Intensity::Moderate)
    }

    fn feed(tracker: &mut TrajectoryTracker, readings: Vec<EmotionReading>) {
        for (i, r) in readings.into_iter().enumerate() {
            tracker.add_reading(r, None, base_time() + Duration::minutes(i as i64));
        }
    }

    fn alert_of(t: &EmotionalTrajectory, ty: AlertType) -> Option<&TrajectoryAlert> {
        t.alerts.iter().find(|a| a.alert_type == ty)
    }

    #[test]
    fn fifo_eviction_keeps_most_recent() {
        let mut tracker = TrajectoryTracker::new(50);
        for i in 0..51 {
            tracker.add_reading(happy(), Some(format!("msg-{}", i)), base_time() + Duration::minutes(i));
        }
        let t = tracker.get_trajectory(base_time());
        assert_eq!(t.timeline.len(), 50);
        assert_eq!(t.timeline[0].trigger.as_deref(), Some("msg-1"));
        assert_eq!(t.timeline[49].trigger.as_deref(), Some("msg-50"));
    }

    #[test]
    fn add_reading_returns_evicted() {
        let mut tracker = TrajectoryTracker::new(2);
        assert!(tracker.add_reading(happy(), Some("a".into()), base_time()).is_none());
        tracker.add_reading(happy(), Some("b".into()), base_time());
        let evicted = tracker.add_reading(happy(), Some("c".into()), base_time());
        assert_eq!(evicted.and_then(|e| e.trigger).as_deref(), Some("a"));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn small_window_uses_neutral_patterns() {
        let mut tracker = TrajectoryTracker::new(10);
        feed(&mut tracker, vec![sad(), happy(), sad()]);
        let t = tracker.get_trajectory(base_time());
        assert_eq!(t.patterns, TrajectoryPatterns::default());
        assert_eq!(t.patterns.resilience, DEFAULT_RESILIENCE);
    }

    #[test]
    fn prolonged_sadness_medium_at_seven() {
        let mut tracker = TrajectoryTracker::new(50);
        let mut readings = vec![sad(); 7];
        readings.extend(vec![happy(); 3]);
        feed(&mut tracker, readings);
        let t = tracker.get_trajectory(base_time());
        let a = alert_of(&t, AlertType::ProlongedSadness).expect("prolonged_sadness alert");
        assert_eq!(a.severity, AlertSeverity::Medium);
    }

    #[test]
    fn prolonged_sadness_high_at_nine() {
        let mut tracker = TrajectoryTracker::new(50);
        let mut readings = vec![sad(); 9];
        readings.push(happy());
        feed(&mut tracker, readings);
        let t = tracker.get_trajectory(base_time());
        let a = alert_of(&t, AlertType::ProlongedSadness).expect("prolonged_sadness alert");
        assert_eq!(a.severity, AlertSeverity::High);
    }

    #[test]
    fn alerts_only_look_at_last_ten() {
        let mut tracker = TrajectoryTracker::new(50);
        let mut readings = vec![sad(); 8];
        readings.extend(vec![happy(); 10]);
        feed(&mut tracker, readings);
        let t = tracker.get_trajectory(base_time());
        assert!(alert_of(&t, AlertType::ProlongedSadness).is_none());
    }

    #[test]
    fn alternating_emotions_raise_volatility_alert() {
        let mut tracker = TrajectoryTracker::new(50);
        let readings = (0..10).map(|i| if i % 2 == 0 { happy() } else { sad() }).collect();
        feed(&mut tracker, readings);
        let t = tracker.get_trajectory(base_time());
        assert!((t.patterns.volatility - 1.0).abs() < f32::EPSILON);
        assert!(alert_of(&t, AlertType::EmotionalVolatility).is_some());
    }

    #[test]
    fn withdrawal_and_crisis_can_co_occur() {
        let mut tracker = TrajectoryTracker::new(50);
        let heavy = reading(CoreEmotion::Fear, -0.7, 0.2, Intensity::Overwhelming);
        feed(&mut tracker, vec![heavy; 6]);
        let t = tracker.get_trajectory(base_time());
        assert_eq!(alert_of(&t, AlertType::Withdrawal).map(|a| a.severity), Some(AlertSeverity::High));
        assert_eq!(alert_of(&t, AlertType::CrisisIndicator).map(|a| a.severity), Some(AlertSeverity::Critical));
        assert!(t.has_serious_alert());
    }

    #[test]
    fn resilience_reflects_recovery_time() {
        let mut quick = TrajectoryTracker::new(50);
        let t0 = base_time();
        quick.add_reading(sad(), None, t0);
        quick.add_reading(happy(), None, t0 + Duration::hours(1));
        for i in 2..6 {
            quick.add_reading(happy(), None, t0 + Duration::hours(i));
        }
        let r = quick.get_trajectory(t0).patterns.resilience;
        assert!(r > 0.9, "resilience={}", r);

        let mut slow = TrajectoryTracker::new(50);
        slow.add_reading(sad(), None, t0);
        slow.add_reading(happy(), None, t0 + Duration::days(2));
        for i in 3..6 {
            slow.add_reading(happy(), None, t0 + Duration::days(i));
        }
        assert_eq!(slow.get_trajectory(t0).patterns.resilience, 0.0);
    }

    #[test]
    fn dominant_and_range() {
        let mut tracker = TrajectoryTracker::new(50);
        feed(&mut tracker, vec![sad(), sad(), happy(), sad(), happy()]);
        let p = tracker.get_trajectory(base_time()).patterns;
        assert_eq!(p.dominant_emotion, Some(CoreEmotion::Sadness));
        assert!((p.emotional_range - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_restore_into_smaller_window() {
        let mut tracker = TrajectoryTracker::new(10);
        for i in 0..6 {
            tracker.add_reading(happy(), Some(i.to_string()), base_time());
        }
        let snap = tracker.snapshot(base_time());
        let json = serde_json::to_string(&snap).unwrap();
        let restored: TrajectorySnapshot = serde_json::from_str(&json).unwrap();
        let small = TrajectoryTracker::from_snapshot(restored, 4);
        let triggers: Vec<_> = small.entries().filter_map(|e| e.trigger.clone()).collect();
        assert_eq!(triggers, vec!["2", "3", "4", "5"]);
    }

    #[test]
    fn summary_mentions_alerts() {
        let mut tracker = TrajectoryTracker::new(50);
        feed(&mut tracker, vec![sad(); 10]);
        let s = tracker.get_trajectory(base_time()).summary();
        assert!(s.contains("sadness"), "{}", s);
        assert!(s.contains("ProlongedSadness"), "{}", s);
    }
}
