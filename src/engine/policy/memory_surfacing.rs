// ── Kindred: Memory Surfacing ───────────────────────────────────────────────
//
// Extract candidate "memory tags" from user messages and decide when to
// bring them back up, so the companion can simulate continuity.
//
//   extract_memory_tags            independent per-category trigger checks
//   should_surface_memory          cooldown + category-specific chances
//   generate_memory_prompt         per-category phrasing templates
//   build_memory_surfacing_prompt   advisory block for the outbound context
//
// Surfacing is probabilistic by design; the random source is injected.
// Output is advisory only and never auto-sent.

use crate::atoms::constants::*;
use crate::atoms::policy_types::{Importance, MemoryCategory, MemoryTag};
use crate::atoms::traits::RandomSource;
use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

// ═════════════════════════════════════════════════════════════════════════════
// Extraction patterns
// ═════════════════════════════════════════════════════════════════════════════

struct CategoryRule {
    category: MemoryCategory,
    importance: Importance,
    /// Tried in order; the first match yields the category's single tag.
    /// A named `topic` group, when present and non-empty, is the excerpt.
    patterns: Vec<Regex>,
}

static CATEGORY_RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    let table: Vec<(MemoryCategory, Importance, &[&str])> = vec![
        (
            MemoryCategory::Goal,
            Importance::Medium,
            &[
                r"(?i)\b(?:i want to|i wanna|i['’]?m going to|i plan to|i['’]?m planning to|my goal is to|my goal is|i['’]?m trying to|i hope to|i['’]?d love to)\s+(?P<topic>[^.!?,;]+)",
            ],
        ),
        (
            MemoryCategory::Event,
            Importance::High,
            &[
                r"(?i)\b(?P<topic>(?:my |the |a |an )?(?:job interview|interview|presentation|exam|test|appointment|meeting|birthday|wedding|date|trip|party|concert|surgery|deadline|recital|audition)\b[^.!?,;]*)",
                r"(?i)(?P<topic>[^.!?,;]*\b(?:tomorrow|tonight|next week|this weekend|on (?:mon|tues|wednes|thurs|fri|satur|sun)day)\b[^.!?,;]*)",
            ],
        ),
        (
            MemoryCategory::Person,
            Importance::Medium,
            &[
                r"(?i)\b(?P<topic>my (?:best friend|mom|mother|dad|father|sister|brother|friend|boss|partner|girlfriend|boyfriend|wife|husband|coworker|colleague|roommate|son|daughter|grandma|grandpa|therapist))\b",
            ],
        ),
        (
            MemoryCategory::Problem,
            Importance::High,
            &[
                r"(?i)\b(?:stressed|worried|anxious|nervous|upset|struggling|freaking out)\s+(?:about|with|over)\s+(?P<topic>[^.!?,;]+)",
                r"(?i)\b(?:problem|issue|trouble)s?\s+(?:with|at)\s+(?P<topic>[^.!?,;]+)",
                r"(?i)\b(?:i can['’]?t figure out|i['’]?m stuck on|i['’]?m having a hard time with)\s+(?P<topic>[^.!?,;]+)",
            ],
        ),
        (
            MemoryCategory::Achievement,
            Importance::Medium,
            &[
                r"(?i)\bi (?:finally |just )?(?:finished|passed|won|completed|graduated|got promoted|got the job|got accepted|nailed|aced)\b[^.!?,;]*",
                r"(?i)\bproud of (?:myself )?(?:for )?(?P<topic>[^.!?,;]+)",
            ],
        ),
        (
            MemoryCategory::Interest,
            Importance::Low,
            &[
                r"(?i)\b(?:i really love|i love|i enjoy|i['’]?m into|i['’]?m obsessed with|my favou?rite (?:\w+ )?is|i['’]?ve been (?:watching|reading|playing|listening to))\s+(?P<topic>[^.!?,;]+)",
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(category, importance, patterns)| CategoryRule {
            category,
            importance,
            patterns: patterns
                .iter()
                .filter_map(|p| match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!("[policy-memory] Failed to compile pattern '{}': {}", p, e);
                        None
                    }
                })
                .collect(),
        })
        .collect()
});

fn excerpt(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let topic = caps
        .name("topic")
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| caps.get(0).map_or("", |m| m.as_str().trim()));
    (!topic.is_empty()).then(|| topic.to_string())
}

fn next_weekday(now: DateTime<Utc>, target: Weekday) -> DateTime<Utc> {
    let from = now.weekday().num_days_from_monday() as i64;
    let to = target.num_days_from_monday() as i64;
    let mut ahead = (to - from).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    now + Duration::days(ahead)
}

/// Best-effort date for an event mentioned in `text`, relative to `now`.
fn infer_reminder_date(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_lowercase();
    if lower.contains("today") || lower.contains("tonight") {
        return Some(now + Duration::hours(SAME_DAY_EVENT_OFFSET_HOURS));
    }
    if lower.contains("tomorrow") {
        return Some(now + Duration::days(1));
    }
    if lower.contains("next week") {
        return Some(now + Duration::days(7));
    }
    if lower.contains("this weekend") {
        return Some(next_weekday(now, Weekday::Sat));
    }
    let weekdays = [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ];
    weekdays
        .iter()
        .find(|(name, _)| lower.contains(name))
        .map(|(_, day)| next_weekday(now, *day))
}

/// Extract 0..n tags from one message, at most one per category. Each
/// category is checked independently.
pub fn extract_memory_tags(text: &str, now: DateTime<Utc>) -> Vec<MemoryTag> {
    let mut tags = Vec::new();

    for rule in CATEGORY_RULES.iter() {
        let Some(topic) = rule.patterns.iter().find_map(|re| excerpt(re, text)) else {
            continue;
        };
        let reminder_date = if rule.category == MemoryCategory::Event {
            infer_reminder_date(text, now)
        } else {
            None
        };
        tags.push(MemoryTag {
            id: uuid::Uuid::new_v4().to_string(),
            topic,
            category: rule.category,
            context: text.to_string(),
            importance: rule.importance,
            created_at: now,
            last_surfaced_at: None,
            resolved: false,
            reminder_date,
        });
    }

    if !tags.is_empty() {
        debug!(
            "[policy-memory] Extracted {} tag(s): {:?}",
            tags.len(),
            tags.iter().map(|t| t.category).collect::<Vec<_>>()
        );
    }
    tags
}

// ═════════════════════════════════════════════════════════════════════════════
// Surfacing decision
// ═════════════════════════════════════════════════════════════════════════════

/// True if the tag has not been surfaced within `days` (or never was).
fn quiet_for(tag: &MemoryTag, now: DateTime<Utc>, days: i64) -> bool {
    tag.last_surfaced_at.map_or(true, |last| now - last >= Duration::days(days))
}

/// Chance in [0, 1] that `tag` should be surfaced right now.
fn surface_chance(tag: &MemoryTag, now: DateTime<Utc>) -> f64 {
    if tag.resolved {
        return 0.0;
    }
    if !quiet_for(tag, now, SURFACE_COOLDOWN_DAYS) {
        return 0.0;
    }

    let age = now - tag.created_at;
    match tag.category {
        MemoryCategory::Event if tag.reminder_date.is_some_and(|d| d <= now) => EVENT_REMINDER_CHANCE,
        MemoryCategory::Goal
            if age > Duration::days(GOAL_MIN_AGE_DAYS) && quiet_for(tag, now, GOAL_QUIET_DAYS) =>
        {
            GOAL_CHANCE
        }
        MemoryCategory::Problem
            if age > Duration::days(PROBLEM_MIN_AGE_DAYS) && quiet_for(tag, now, PROBLEM_QUIET_DAYS) =>
        {
            PROBLEM_CHANCE
        }
        _ => {
            let since = now - tag.last_surfaced_at.unwrap_or(tag.created_at);
            if tag.category == MemoryCategory::Person && since >= Duration::days(PERSON_QUIET_DAYS) {
                PERSON_CHANCE
            } else if since >= Duration::days(FALLBACK_QUIET_DAYS) {
                FALLBACK_CHANCE
            } else {
                0.0
            }
        }
    }
}

/// Roll against the tag's surfacing chance. Never surfaces within
/// `SURFACE_COOLDOWN_DAYS` of the last time, or once resolved.
pub fn should_surface_memory(tag: &MemoryTag, now: DateTime<Utc>, rng: &mut dyn RandomSource) -> bool {
    let chance = surface_chance(tag, now);
    chance > 0.0 && rng.next_f64() < chance
}

// ═════════════════════════════════════════════════════════════════════════════
// Rendering
// ═════════════════════════════════════════════════════════════════════════════

const LEADING_WORDS: &[&str] = &["the ", "a ", "an ", "my ", "your ", "his ", "her ", "their ", "our "];

/// Strip leading articles/possessives, trailing punctuation, and cap length.
pub fn clean_subject(topic: &str) -> String {
    let mut s = topic.trim();
    loop {
        let lower = s.to_lowercase();
        match LEADING_WORDS.iter().find(|w| lower.starts_with(**w)) {
            Some(w) => s = s[w.len()..].trim_start(),
            None => break,
        }
    }
    let s = s.trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace());
    s.chars().take(MEMORY_SUBJECT_MAX_CHARS).collect::<String>().trim_end().to_string()
}

fn memory_templates(category: MemoryCategory) -> &'static [&'static str] {
    match category {
        MemoryCategory::Goal => &[
            "How's it going with {subject}?",
            "Have you made any progress on {subject}?",
            "Still working toward {subject}? I'd love an update.",
        ],
        MemoryCategory::Problem => &[
            "Last time you were worried about {subject}. How's that going?",
            "Is {subject} still weighing on you?",
            "I've been wondering how things turned out with {subject}.",
        ],
        MemoryCategory::Person => &[
            "How's your {subject} doing?",
            "Have you talked to your {subject} lately?",
        ],
        MemoryCategory::Event => &[
            "How did {subject} go?",
            "Wasn't {subject} coming up? How did it turn out?",
        ],
        MemoryCategory::Interest => &[
            "Been enjoying {subject} lately?",
            "Anything new with {subject}?",
        ],
        MemoryCategory::Pattern => &["I've noticed {subject} comes up a lot. Want to talk about it?"],
        MemoryCategory::Achievement => &[
            "Still thinking about this win of yours: \"{subject}\". How does it feel now?",
            "You mentioned \"{subject}\" a while back. That was a big deal!",
        ],
        MemoryCategory::Preference => &["You mentioned {subject}. Is that still true?"],
    }
}

/// Phrase a natural callback to `tag`.
pub fn generate_memory_prompt(tag: &MemoryTag, rng: &mut dyn RandomSource) -> String {
    let list = memory_templates(tag.category);
    list[rng.pick(list.len())].replace("{subject}", &clean_subject(&tag.topic))
}

/// Pick at most `max` tags that pass `should_surface_memory` (most important
/// first), mark them surfaced, and render an advisory block. `None` when
/// nothing qualifies.
pub fn build_memory_surfacing_prompt(
    tags: &mut [MemoryTag],
    now: DateTime<Utc>,
    max: usize,
    rng: &mut dyn RandomSource,
) -> Option<String> {
    let mut order: Vec<usize> = (0..tags.len()).collect();
    order.sort_by(|a, b| tags[*b].importance.cmp(&tags[*a].importance));

    let mut lines = Vec::new();
    for i in order {
        if lines.len() >= max {
            break;
        }
        if should_surface_memory(&tags[i], now, rng) {
            lines.push(format!("- {}", generate_memory_prompt(&tags[i], rng)));
            tags[i].mark_surfaced(now);
        }
    }

    if lines.is_empty() {
        return None;
    }
    debug!("[policy-memory] Surfacing {} memory suggestion(s)", lines.len());
    Some(format!(
        "## Things you could naturally bring up\n\
         Only if it fits the flow of the conversation. Never force it.\n{}",
        lines.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::traits::FixedRandom;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // A Wednesday.
        Utc.with_ymd_and_hms(2024, 10, 16, 18, 0, 0).unwrap()
    }

    fn tag(category: MemoryCategory, created_days_ago: i64) -> MemoryTag {
        MemoryTag {
            id: "t".into(),
            topic: "my driving test".into(),
            category,
            context: "ctx".into(),
            importance: Importance::Medium,
            created_at: now() - Duration::days(created_days_ago),
            last_surfaced_at: None,
            resolved: false,
            reminder_date: None,
        }
    }

    #[test]
    fn stressed_presentation_yields_problem_and_event() {
        let text = "I'm stressed about my presentation next week";
        let tags = extract_memory_tags(text, now());
        assert!(tags.len() >= 2, "tags={:?}", tags);

        let problem = tags.iter().find(|t| t.category == MemoryCategory::Problem).expect("problem tag");
        let event = tags.iter().find(|t| t.category == MemoryCategory::Event).expect("event tag");
        assert_eq!(problem.context, text);
        assert_eq!(event.context, text);
        assert_eq!(problem.topic, "my presentation next week");
        assert_eq!(event.reminder_date, Some(now() + Duration::days(7)));
    }

    #[test]
    fn categories_are_independent() {
        let tags = extract_memory_tags(
            "My mom says I want to run a marathon, and I really love hiking",
            now(),
        );
        let cats: Vec<_> = tags.iter().map(|t| t.category).collect();
        assert!(cats.contains(&MemoryCategory::Person), "{:?}", cats);
        assert!(cats.contains(&MemoryCategory::Goal), "{:?}", cats);
        assert!(cats.contains(&MemoryCategory::Interest), "{:?}", cats);
    }

    #[test]
    fn nothing_to_extract() {
        assert!(extract_memory_tags("ok", now()).is_empty());
        assert!(extract_memory_tags("", now()).is_empty());
    }

    #[test]
    fn weekday_reminder_is_next_occurrence() {
        let tags = extract_memory_tags("I have a dentist appointment on friday", now());
        let event = tags.iter().find(|t| t.category == MemoryCategory::Event).expect("event");
        assert_eq!(event.reminder_date, Some(now() + Duration::days(2)));
    }

    #[test]
    fn same_day_event_waits_until_it_is_over() {
        let tags = extract_memory_tags("I have my piano recital tonight", now());
        let event = tags.iter().find(|t| t.category == MemoryCategory::Event).expect("event");
        assert_eq!(event.reminder_date, Some(now() + Duration::hours(SAME_DAY_EVENT_OFFSET_HOURS)));

        for later in [Duration::minutes(2), Duration::hours(1)] {
            assert!(
                !should_surface_memory(event, now() + later, &mut FixedRandom(0.0)),
                "surfaced {:?} after mention",
                later
            );
        }
        let after = now() + Duration::hours(SAME_DAY_EVENT_OFFSET_HOURS + 1);
        assert!(should_surface_memory(event, after, &mut FixedRandom(0.5)));
    }

    #[test]
    fn cooldown_is_a_hard_stop() {
        let mut t = tag(MemoryCategory::Event, 10);
        t.reminder_date = Some(now() - Duration::days(1));
        t.last_surfaced_at = Some(now() - Duration::days(1));
        assert!(!should_surface_memory(&t, now(), &mut FixedRandom(0.0)));
    }

    #[test]
    fn passed_event_surfaces_at_ninety_percent() {
        let mut t = tag(MemoryCategory::Event, 1);
        t.reminder_date = Some(now() - Duration::hours(2));
        assert!(should_surface_memory(&t, now(), &mut FixedRandom(0.89)));
        assert!(!should_surface_memory(&t, now(), &mut FixedRandom(0.91)));
    }

    #[test]
    fn goal_rules() {
        let young = tag(MemoryCategory::Goal, 2);
        assert!(!should_surface_memory(&young, now(), &mut FixedRandom(0.0)));

        let old = tag(MemoryCategory::Goal, 4);
        assert!(should_surface_memory(&old, now(), &mut FixedRandom(0.29)));
        assert!(!should_surface_memory(&old, now(), &mut FixedRandom(0.31)));

        let mut recently = tag(MemoryCategory::Goal, 20);
        recently.last_surfaced_at = Some(now() - Duration::days(4));
        assert!(!should_surface_memory(&recently, now(), &mut FixedRandom(0.0)));
    }

    #[test]
    fn fallback_after_a_week() {
        let t = tag(MemoryCategory::Interest, 8);
        assert!(should_surface_memory(&t, now(), &mut FixedRandom(0.14)));
        assert!(!should_surface_memory(&t, now(), &mut FixedRandom(0.16)));
        assert!(!should_surface_memory(&tag(MemoryCategory::Interest, 3), now(), &mut FixedRandom(0.0)));
    }

    #[test]
    fn resolved_tags_never_surface() {
        let mut t = tag(MemoryCategory::Interest, 30);
        t.resolve();
        assert!(!should_surface_memory(&t, now(), &mut FixedRandom(0.0)));
    }

    #[test]
    fn subject_cleaning() {
        assert_eq!(clean_subject("my presentation next week"), "presentation next week");
        assert_eq!(clean_subject("The   a big trip!!"), "big trip");
        let long = "x".repeat(80);
        assert_eq!(clean_subject(&long).chars().count(), MEMORY_SUBJECT_MAX_CHARS);
    }

    #[test]
    fn memory_prompt_uses_clean_subject() {
        let t = tag(MemoryCategory::Event, 1);
        let p = generate_memory_prompt(&t, &mut FixedRandom(0.0));
        assert_eq!(p, "How did driving test go?");
    }

    #[test]
    fn surfacing_block_caps_and_marks() {
        let mut tags: Vec<MemoryTag> = (0..4).map(|_| tag(MemoryCategory::Interest, 10)).collect();
        tags[3].importance = Importance::High;
        let block = build_memory_surfacing_prompt(&mut tags, now(), 2, &mut FixedRandom(0.0)).expect("block");
        assert_eq!(block.lines().filter(|l| l.starts_with("- ")).count(), 2);
        assert_eq!(tags.iter().filter(|t| t.last_surfaced_at == Some(now())).count(), 2);
        assert_eq!(tags[3].last_surfaced_at, Some(now()), "most important goes first");
    }

    #[test]
    fn surfacing_block_none_when_nothing_qualifies() {
        let mut tags = vec![tag(MemoryCategory::Interest, 1)];
        assert!(build_memory_surfacing_prompt(&mut tags, now(), 2, &mut FixedRandom(0.0)).is_none());
        assert!(tags[0].last_surfaced_at.is_none());
    }
}
