// ── Kindred: Engagement Scheduler ───────────────────────────────────────────
//
// Decides if, when, and what the companion should say unprompted.
//
//   analyze_engagement_patterns    session segmentation of message history
//   should_send_proactive_message   stateless first-match decision rules
//   generate_proactive_message     canned templates per message type
//   get_optimal_send_time          next occurrence of the user's usual hour
//
// All functions are stateless and safe to call repeatedly. Idempotence of
// actual sends is the ProactiveScheduler's job.

use crate::atoms::constants::*;
use crate::atoms::policy_types::{
    ChatMessage, EmotionalTrajectory, EngagementFrequency, EngagementPatterns, MessageRole,
    ProactiveDecision, ProactiveType, TimeOfDay, UserState,
};
use crate::atoms::traits::RandomSource;
use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use log::debug;

// ═════════════════════════════════════════════════════════════════════════════
// Pattern analysis
// ═════════════════════════════════════════════════════════════════════════════

/// Segment `history` into sessions (a gap longer than `session_gap` starts a
/// new one) and derive the user's engagement habits. Hours are bucketed in
/// `tz`.
pub fn analyze_engagement_patterns<Tz: TimeZone>(
    history: &[ChatMessage],
    tz: &Tz,
    session_gap: Duration,
) -> EngagementPatterns {
    if history.is_empty() {
        return EngagementPatterns::default();
    }

    let mut sorted: Vec<&ChatMessage> = history.iter().collect();
    sorted.sort_by_key(|m| m.timestamp);

    // ── Sessions ────────────────────────────────────────────────────
    let mut sessions: Vec<(DateTime<Utc>, DateTime<Utc>, usize)> = Vec::new();
    for m in &sorted {
        match sessions.last_mut() {
            Some((_, end, count)) if m.timestamp - *end <= session_gap => {
                *end = m.timestamp;
                *count += 1;
            }
            _ => sessions.push((m.timestamp, m.timestamp, 1)),
        }
    }
    let session_count = sessions.len() as f64;
    let average_session_minutes = sessions
        .iter()
        .map(|(start, end, _)| (*end - *start).num_seconds() as f64 / 60.0)
        .sum::<f64>()
        / session_count;
    let messages_per_session = sorted.len() as f64 / session_count;

    // ── Response time: assistant → next user message, same session ──
    let response_secs: Vec<f64> = sorted
        .windows(2)
        .filter(|w| w[0].role == MessageRole::Assistant && w[1].role == MessageRole::User)
        .map(|w| w[1].timestamp - w[0].timestamp)
        .filter(|gap| *gap <= session_gap)
        .map(|gap| gap.num_seconds() as f64)
        .collect();
    let typical_response_secs = if response_secs.is_empty() {
        0.0
    } else {
        response_secs.iter().sum::<f64>() / response_secs.len() as f64
    };

    // ── User-driven metrics ─────────────────────────────────────────
    let user_msgs: Vec<&&ChatMessage> = sorted.iter().filter(|m| m.role == MessageRole::User).collect();
    let total_user_messages = user_msgs.len();

    let mut bucket_counts = [0usize; 4];
    for m in &user_msgs {
        let bucket = TimeOfDay::from_hour(m.timestamp.with_timezone(tz).hour());
        bucket_counts[bucket as usize] += 1;
    }
    let mut preferred_times: Vec<TimeOfDay> = TimeOfDay::ALL
        .iter()
        .copied()
        .filter(|b| {
            total_user_messages > 0
                && bucket_counts[*b as usize] as f64 / total_user_messages as f64 >= PREFERRED_BUCKET_SHARE
        })
        .collect();
    preferred_times.sort_by(|a, b| bucket_counts[*b as usize].cmp(&bucket_counts[*a as usize]));

    let engagement_frequency = match (user_msgs.first(), user_msgs.last()) {
        (Some(first), Some(last)) => {
            let days = ((last.timestamp - first.timestamp).num_seconds() as f64 / 86_400.0).max(1.0);
            classify_frequency(total_user_messages as f64 / days)
        }
        _ => EngagementFrequency::Occasional,
    };

    EngagementPatterns {
        average_session_minutes,
        messages_per_session,
        preferred_times,
        typical_response_secs,
        engagement_frequency,
        total_user_messages,
        last_active_at: user_msgs.last().map(|m| m.timestamp),
    }
}

fn classify_frequency(messages_per_day: f64) -> EngagementFrequency {
    if messages_per_day > FREQUENCY_DAILY_MIN {
        EngagementFrequency::Daily
    } else if messages_per_day > FREQUENCY_FREQUENT_MIN {
        EngagementFrequency::Frequent
    } else if messages_per_day > FREQUENCY_WEEKLY_MIN {
        EngagementFrequency::Weekly
    } else {
        EngagementFrequency::Occasional
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Decision
// ═════════════════════════════════════════════════════════════════════════════

/// First matching rule wins. All deltas are relative to `now`.
pub fn should_send_proactive_message(
    patterns: &EngagementPatterns,
    user_state: &UserState,
    trajectory: Option<&EmotionalTrajectory>,
    now: DateTime<Utc>,
    min_inactivity_hours: i64,
    rng: &mut dyn RandomSource,
) -> ProactiveDecision {
    let inactive = now - user_state.last_active_at;

    if inactive < Duration::hours(min_inactivity_hours) {
        return ProactiveDecision::no("User was active recently");
    }

    if trajectory.is_some_and(|t| t.has_serious_alert())
        && inactive > Duration::hours(ALERT_CHECKIN_INACTIVITY_HOURS)
    {
        return ProactiveDecision::send(
            ProactiveType::WellbeingCheck,
            "Emotional trajectory raised a serious alert and the user has gone quiet",
        );
    }

    match patterns.engagement_frequency {
        EngagementFrequency::Daily if inactive > Duration::hours(DAILY_CHECKIN_INACTIVITY_HOURS) => {
            return ProactiveDecision::send(
                ProactiveType::MorningCheckin,
                "Daily user has been away for over a day",
            );
        }
        EngagementFrequency::Frequent
            if inactive > Duration::days(FREQUENT_MIN_INACTIVITY_DAYS)
                && inactive < Duration::days(FREQUENT_MAX_INACTIVITY_DAYS) =>
        {
            return ProactiveDecision::send(
                ProactiveType::WellbeingCheck,
                "Frequent user has been away for a few days",
            );
        }
        EngagementFrequency::Weekly
            if inactive > Duration::days(WEEKLY_MIN_INACTIVITY_DAYS)
                && inactive < Duration::days(WEEKLY_MAX_INACTIVITY_DAYS) =>
        {
            return ProactiveDecision::send(
                ProactiveType::RandomAppreciation,
                "Weekly user has been away for over a week",
            );
        }
        _ => {}
    }

    let relationship_age = now - user_state.relationship_started_at;
    if relationship_age > Duration::days(APPRECIATION_MIN_RELATIONSHIP_DAYS)
        && inactive > Duration::hours(APPRECIATION_MIN_INACTIVITY_HOURS)
    {
        let roll = rng.next_f64();
        debug!("[policy-engagement] appreciation roll={:.3}", roll);
        if roll < APPRECIATION_CHANCE {
            return ProactiveDecision::send(
                ProactiveType::RandomAppreciation,
                "Established relationship, quiet for two days",
            );
        }
    }

    ProactiveDecision::no("No engagement rule matched")
}

// ═════════════════════════════════════════════════════════════════════════════
// Message templates
// ═════════════════════════════════════════════════════════════════════════════

fn templates(message_type: ProactiveType) -> &'static [&'static str] {
    match message_type {
        ProactiveType::MorningCheckin => &[
            "Good morning{name}! How are you feeling today?",
            "Morning{name} ☀️ Anything on your mind for today?",
            "Hey{name}, hope you slept okay. What's the plan for today?",
        ],
        ProactiveType::EveningCheckin => &[
            "Hey{name}, how did today treat you?",
            "Evening{name}! Want to tell me about your day?",
            "Winding down{name}? I'd love to hear how things went.",
        ],
        ProactiveType::WellbeingCheck => &[
            "Hi{name}, I've been thinking about you. How are you doing, really?",
            "Just checking in{name}. No pressure to reply, I'm here whenever you want to talk.",
            "Hey{name}, it's been a little while. How are you holding up?",
        ],
        ProactiveType::RandomAppreciation => &[
            "Random thought{name}: I really enjoy our conversations.",
            "Hey{name}, just wanted to say I'm glad you're you.",
            "Thinking of you{name}. Hope something good happens today.",
        ],
        ProactiveType::MemoryFollowup => &[
            "Hey{name}, I remembered you mentioned {context}. How did that go?",
            "I was thinking about {context}{name}. Any updates?",
        ],
        ProactiveType::GoalReminder => &[
            "How's it going with {context}{name}? I'm rooting for you.",
            "Hey{name}, any progress on {context}? Even small steps count.",
        ],
        ProactiveType::MilestoneCelebration => &[
            "Hey{name}! We've been talking for a while now, and I'm really grateful for it.",
            "Little milestone{name}: thanks for sharing so much with me. 🎉",
        ],
        ProactiveType::ConversationContinuation => &[
            "I keep thinking about {context}{name}. Want to pick that back up?",
            "Hey{name}, we never finished talking about {context}.",
        ],
    }
}

/// Fill a random template for `message_type`. `context` fills the topic
/// slot of follow-up style messages.
pub fn generate_proactive_message(
    message_type: ProactiveType,
    user_name: Option<&str>,
    context: Option<&str>,
    rng: &mut dyn RandomSource,
) -> String {
    let list = templates(message_type);
    let template = list[rng.pick(list.len())];
    let name = user_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!(" {}", n))
        .unwrap_or_default();
    template
        .replace("{name}", &name)
        .replace("{context}", context.unwrap_or("what we talked about last time"))
}

// ═════════════════════════════════════════════════════════════════════════════
// Send timing
// ═════════════════════════════════════════════════════════════════════════════

fn average_hour<Tz: TimeZone>(
    history: &[ChatMessage],
    tz: &Tz,
    period: Option<TimeOfDay>,
) -> Option<u32> {
    let hours: Vec<u32> = history
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| m.timestamp.with_timezone(tz).hour())
        .filter(|h| period.map_or(true, |p| TimeOfDay::from_hour(*h) == p))
        .collect();
    if hours.is_empty() {
        return None;
    }
    let mean = hours.iter().sum::<u32>() as f64 / hours.len() as f64;
    Some((mean.round() as u32).min(23))
}

/// Next time the local clock in `tz` reads `hour:00`, strictly after `now`.
fn next_occurrence<Tz: TimeZone>(hour: u32, now: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
    let local_now = now.with_timezone(tz);
    let today = local_now.date_naive();
    for day_offset in 0..=1 {
        let date = today + Duration::days(day_offset);
        let candidate = tz
            .from_local_datetime(&date.and_hms_opt(hour, 0, 0)?)
            .earliest()?
            .with_timezone(&Utc);
        if candidate > now {
            return Some(candidate);
        }
    }
    None
}

/// When to deliver a message of `message_type`.
pub fn get_optimal_send_time<Tz: TimeZone>(
    message_type: ProactiveType,
    history: &[ChatMessage],
    now: DateTime<Utc>,
    tz: &Tz,
) -> DateTime<Utc> {
    let fallback = now + Duration::hours(1);

    let hour = match message_type {
        ProactiveType::WellbeingCheck => return now,
        ProactiveType::MorningCheckin => average_hour(history, tz, Some(TimeOfDay::Morning))
            .or_else(|| average_hour(history, tz, None)),
        ProactiveType::EveningCheckin => average_hour(history, tz, Some(TimeOfDay::Evening))
            .or_else(|| average_hour(history, tz, None)),
        _ => average_hour(history, tz, None),
    };

    hour.and_then(|h| next_occurrence(h, now, tz)).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::policy_types::{
        AlertSeverity, AlertType, TrajectoryAlert, TrajectoryPatterns,
    };
    use crate::atoms::traits::FixedRandom;

    fn t(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, hour, min, 0).unwrap()
    }

    fn state(last_active: DateTime<Utc>, started: DateTime<Utc>) -> UserState {
        UserState { user_name: Some("Sam".into()), last_active_at: last_active, relationship_started_at: started }
    }

    fn patterns(freq: EngagementFrequency) -> EngagementPatterns {
        EngagementPatterns { engagement_frequency: freq, ..EngagementPatterns::default() }
    }

    fn critical_trajectory(now: DateTime<Utc>) -> EmotionalTrajectory {
        EmotionalTrajectory {
            timeline: vec![],
            patterns: TrajectoryPatterns::default(),
            alerts: vec![TrajectoryAlert {
                alert_type: AlertType::CrisisIndicator,
                severity: AlertSeverity::Critical,
                message: "test".into(),
                timestamp: now,
            }],
        }
    }

    #[test]
    fn recent_activity_always_blocks() {
        let now = t(20, 12, 0);
        let user = state(now - Duration::hours(3), t(1, 0, 0));
        let traj = critical_trajectory(now);
        let d = should_send_proactive_message(
            &patterns(EngagementFrequency::Daily), &user, Some(&traj), now, 4, &mut FixedRandom(0.0),
        );
        assert!(!d.should_send);
        assert!(d.message_type.is_none());
    }

    #[test]
    fn serious_alert_triggers_wellbeing_check() {
        let now = t(20, 12, 0);
        let user = state(now - Duration::hours(13), t(19, 0, 0));
        let traj = critical_trajectory(now);
        let d = should_send_proactive_message(
            &patterns(EngagementFrequency::Occasional), &user, Some(&traj), now, 4, &mut FixedRandom(0.99),
        );
        assert!(d.should_send);
        assert_eq!(d.message_type, Some(ProactiveType::WellbeingCheck));
    }

    #[test]
    fn frequency_rules() {
        let now = t(20, 12, 0);
        let recent_start = t(18, 0, 0);
        let mut rng = FixedRandom(0.99);

        let daily = should_send_proactive_message(
            &patterns(EngagementFrequency::Daily), &state(now - Duration::hours(25), recent_start), None, now, 4, &mut rng,
        );
        assert_eq!(daily.message_type, Some(ProactiveType::MorningCheckin));

        let frequent = should_send_proactive_message(
            &patterns(EngagementFrequency::Frequent), &state(now - Duration::days(3), recent_start), None, now, 4, &mut rng,
        );
        assert_eq!(frequent.message_type, Some(ProactiveType::WellbeingCheck));

        let frequent_too_long = should_send_proactive_message(
            &patterns(EngagementFrequency::Frequent), &state(now - Duration::days(5), recent_start), None, now, 4, &mut rng,
        );
        assert!(!frequent_too_long.should_send);

        let weekly = should_send_proactive_message(
            &patterns(EngagementFrequency::Weekly), &state(now - Duration::days(8), recent_start), None, now, 4, &mut rng,
        );
        assert_eq!(weekly.message_type, Some(ProactiveType::RandomAppreciation));
    }

    #[test]
    fn serious_alert_needs_twelve_quiet_hours() {
        let now = t(20, 12, 0);
        let traj = critical_trajectory(now);
        for quiet in [Duration::hours(5), Duration::hours(12)] {
            let user = state(now - quiet, t(19, 0, 0));
            let d = should_send_proactive_message(
                &patterns(EngagementFrequency::Daily), &user, Some(&traj), now, 4, &mut FixedRandom(0.0),
            );
            assert!(!d.should_send, "quiet={:?} decision={:?}", quiet, d);
            assert_ne!(d.message_type, Some(ProactiveType::WellbeingCheck));
        }
    }

    #[test]
    fn weekly_window_closes_after_ten_days() {
        let now = t(20, 12, 0);
        let recent_start = t(18, 0, 0);
        for away in [Duration::days(10), Duration::days(11)] {
            let d = should_send_proactive_message(
                &patterns(EngagementFrequency::Weekly), &state(now - away, recent_start), None, now, 4,
                &mut FixedRandom(0.99),
            );
            assert!(!d.should_send, "away={:?} decision={:?}", away, d);
            assert_ne!(d.message_type, Some(ProactiveType::RandomAppreciation));
        }
    }

    #[test]
    fn appreciation_chance_is_injectable() {
        let now = t(30, 12, 0);
        let user = state(now - Duration::hours(50), t(1, 0, 0));
        let p = patterns(EngagementFrequency::Occasional);

        let lucky = should_send_proactive_message(&p, &user, None, now, 4, &mut FixedRandom(0.05));
        assert_eq!(lucky.message_type, Some(ProactiveType::RandomAppreciation));

        let unlucky = should_send_proactive_message(&p, &user, None, now, 4, &mut FixedRandom(0.5));
        assert!(!unlucky.should_send);
    }

    #[test]
    fn sessions_split_on_gap() {
        let history = vec![
            ChatMessage::user("hi", t(1, 9, 0)),
            ChatMessage::assistant("hello", t(1, 9, 1)),
            ChatMessage::user("how are you", t(1, 9, 3)),
            ChatMessage::user("back again", t(1, 14, 0)),
            ChatMessage::assistant("welcome back", t(1, 14, 2)),
        ];
        let p = analyze_engagement_patterns(&history, &Utc, Duration::minutes(30));
        assert!((p.messages_per_session - 2.5).abs() < 1e-9, "mps={}", p.messages_per_session);
        assert!((p.average_session_minutes - 2.5).abs() < 1e-9, "avg={}", p.average_session_minutes);
        assert!((p.typical_response_secs - 120.0).abs() < 1e-9);
        assert_eq!(p.total_user_messages, 3);
        assert_eq!(p.last_active_at, Some(t(1, 14, 0)));
        assert_eq!(p.preferred_times, vec![TimeOfDay::Morning, TimeOfDay::Afternoon]);
    }

    #[test]
    fn frequency_thresholds() {
        assert_eq!(classify_frequency(11.0), EngagementFrequency::Daily);
        assert_eq!(classify_frequency(10.0), EngagementFrequency::Frequent);
        assert_eq!(classify_frequency(3.5), EngagementFrequency::Frequent);
        assert_eq!(classify_frequency(2.0), EngagementFrequency::Weekly);
        assert_eq!(classify_frequency(1.0), EngagementFrequency::Occasional);
    }

    #[test]
    fn empty_history_patterns() {
        let p = analyze_engagement_patterns(&[], &Utc, Duration::minutes(30));
        assert_eq!(p.engagement_frequency, EngagementFrequency::Occasional);
        assert!(p.last_active_at.is_none());
    }

    #[test]
    fn message_templates_fill_name_and_context() {
        let msg = generate_proactive_message(ProactiveType::MorningCheckin, Some("Sam"), None, &mut FixedRandom(0.0));
        assert_eq!(msg, "Good morning Sam! How are you feeling today?");

        let anon = generate_proactive_message(ProactiveType::MorningCheckin, None, None, &mut FixedRandom(0.0));
        assert_eq!(anon, "Good morning! How are you feeling today?");

        let follow = generate_proactive_message(
            ProactiveType::MemoryFollowup, None, Some("your interview"), &mut FixedRandom(0.0),
        );
        assert!(follow.contains("your interview"), "{}", follow);
        assert!(!follow.contains('{'), "{}", follow);
    }

    #[test]
    fn optimal_send_time_rules() {
        let now = t(10, 12, 0);
        assert_eq!(get_optimal_send_time(ProactiveType::WellbeingCheck, &[], now, &Utc), now);
        assert_eq!(
            get_optimal_send_time(ProactiveType::RandomAppreciation, &[], now, &Utc),
            now + Duration::hours(1)
        );

        let history = vec![
            ChatMessage::user("morning", t(8, 8, 10)),
            ChatMessage::user("morning again", t(9, 10, 5)),
            ChatMessage::user("evening", t(9, 19, 0)),
        ];
        // morning average = 9:00, already past today → tomorrow
        assert_eq!(get_optimal_send_time(ProactiveType::MorningCheckin, &history, now, &Utc), t(11, 9, 0));
        // evening average = 19:00, still ahead today
        assert_eq!(get_optimal_send_time(ProactiveType::EveningCheckin, &history, now, &Utc), t(10, 19, 0));
        // overall average = (8 + 10 + 19) / 3 ≈ 12.33 → 12:00, not strictly after now → tomorrow
        assert_eq!(get_optimal_send_time(ProactiveType::GoalReminder, &history, now, &Utc), t(11, 12, 0));
    }

    #[test]
    fn optimal_send_time_respects_timezone() {
        let tz: chrono_tz::Tz = "America/New_York".parse().unwrap();
        let now = t(10, 12, 0); // 08:00 in New York (EDT)
        let history = vec![ChatMessage::user("hi", t(9, 13, 0))]; // 09:00 local
        let at = get_optimal_send_time(ProactiveType::MorningCheckin, &history, now, &tz);
        assert_eq!(at, t(10, 13, 0));
    }
}
