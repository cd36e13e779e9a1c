// ── Kindred: Emotion Classifier ─────────────────────────────────────────────
//
// Weighted pattern scoring over the eight core emotions.
//
// Pipeline: text → per-emotion pattern groups → 8 independent scores
//           → joy negation transfer → argmax → micro-signals → intensity
//           → valence / arousal / confidence → secondary emotions → context
//
// No ML model: pure regex heuristics, deterministic for identical input
// and clock. Scores are additive and non-exclusive (a message may score on
// several emotions at once).
//
// Known asymmetry: only the joy group has negation handling. "not happy"
// moves the joy score onto sadness; "not angry" still scores anger.
//
// Zero-signal input yields the all-zero reading, which resolves to `joy`
// through the declaration-order tie-break with confidence 0.

use crate::atoms::constants::*;
use crate::atoms::policy_types::{
    ChatMessage, ConversationTone, CoreEmotion, EmotionReading, Intensity, MicroSignals,
    ReadingContext, RelationshipStage, SecondaryEmotion, TimeOfDay,
};
use chrono::{DateTime, TimeZone, Timelike};
use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

// ═════════════════════════════════════════════════════════════════════════════
// Pattern Tables (compiled once, stored in statics)
// ═════════════════════════════════════════════════════════════════════════════

struct PatternGroup {
    emotion: CoreEmotion,
    /// +KEYWORD_WEIGHT per matching pattern.
    keywords: Vec<Regex>,
    /// +MODIFIER_WEIGHT per matching pattern.
    modifiers: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("[policy-emotion] Failed to compile pattern '{}': {}", p, e);
                None
            }
        })
        .collect()
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|re| re.is_match(text))
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|re| re.is_match(text)).count()
}

static EMOTION_GROUPS: LazyLock<Vec<PatternGroup>> = LazyLock::new(|| {
    let table: Vec<(CoreEmotion, &[&str], &[&str])> = vec![
        (
            CoreEmotion::Joy,
            &[
                r"(?i)\b(happy|happier|happiest)\b",
                r"(?i)\b(glad|joyful|cheerful|delighted|thrilled|ecstatic|overjoyed)\b",
                r"(?i)\b(excited|exciting)\b",
                r"(?i)\b(amazing|awesome|wonderful|fantastic|brilliant)\b",
                r"(?i)\b(love|loving|loved) (it|this|that)\b",
                r"(?i)\b(got|landed|nailed|passed|aced|won) (the|my|a|an) (job|offer|promotion|interview|exam|test|game|award)\b",
                r"(?i)\bbest (day|news|feeling)\b",
                r"(?i)\b(proud of (myself|me)|so proud)\b",
            ],
            &[
                r"(?i)\b(yay|woo+|woohoo|yes{2,}|finally)\b",
                r"!{2,}",
                r"(?i)\b(haha+|hehe+|lol|lmao)\b",
                r":\)|:D|\(:",
            ],
        ),
        (
            CoreEmotion::Sadness,
            &[
                r"(?i)\b(sad|sadder|saddest|unhappy|miserable|depressed|heartbroken|devastated)\b",
                r"(?i)\b(cry|crying|cried|tears)\b",
                r"(?i)\b(lonely|alone|isolated)\b",
                r"(?i)\b(grief|grieving|mourning|miss (him|her|them|you|my))\b",
                r"(?i)\bfeel(ing)? (down|low|blue|empty|numb)\b",
                r"(?i)\b(hopeless|worthless|pointless)\b",
                r"(?i)\b(disappointed|disappointing|let down)\b",
            ],
            &[
                r"(?i)\b(sigh|ugh)\b",
                r":\(|:'\(",
                r"(?i)\b(tired of|exhausted|drained)\b",
                r"(?i)\bnobody (cares|understands)\b",
            ],
        ),
        (
            CoreEmotion::Anger,
            &[
                r"(?i)\b(angry|mad|furious|livid|pissed|enraged)\b",
                r"(?i)\b(hate|hated|hating)\b",
                r"(?i)\b(annoyed|annoying|irritated|irritating|frustrated|frustrating)\b",
                r"(?i)\b(sick of|fed up)\b",
                r"(?i)\bunfair\b",
            ],
            &[
                r"(?i)\b(seriously|ridiculous)\b",
                r"(?i)\b(wtf|damn|dammit|ffs)\b",
            ],
        ),
        (
            CoreEmotion::Fear,
            &[
                r"(?i)\b(scared|afraid|frightened|terrified)\b",
                r"(?i)\b(anxious|anxiety|nervous|panic|panicking)\b",
                r"(?i)\b(worried|worry|worrying)\b",
                r"(?i)\b(stressed|stress|stressful)\b",
                r"(?i)\bwhat if\b",
            ],
            &[
                r"(?i)\b(can['’]?t sleep|insomnia)\b",
                r"(?i)\b(dread|dreading|uneasy|tense)\b",
            ],
        ),
        (
            CoreEmotion::Disgust,
            &[
                r"(?i)\b(disgusting|disgusted|gross|revolting|nasty)\b",
                r"(?i)\b(sickening|repulsive|vile)\b",
                r"(?i)\bmakes me sick\b",
            ],
            &[r"(?i)\b(e+w+|yuck)\b"],
        ),
        (
            CoreEmotion::Surprise,
            &[
                r"(?i)\b(surprised|surprising|shocked|shocking|stunned)\b",
                r"(?i)\b(can['’]?t believe|cannot believe)\b",
                r"(?i)\b(wow|whoa|omg)\b",
                r"(?i)\bno way\b",
            ],
            &[
                r"\?!|!\?",
                r"(?i)\bout of nowhere\b",
                r"(?i)\bunexpected(ly)?\b",
            ],
        ),
        (
            CoreEmotion::Trust,
            &[
                r"(?i)\b(trust|trusted|rely on|count on)\b",
                r"(?i)\b(thank you|thanks|grateful|appreciate)\b",
                r"(?i)\b(safe with you|you understand me|you get me)\b",
            ],
            &[
                r"(?i)\b(honestly|to be honest)\b",
                r"(?i)\bbelieve in\b",
            ],
        ),
        (
            CoreEmotion::Anticipation,
            &[
                r"(?i)\b(can['’]?t wait|looking forward)\b",
                r"(?i)\b(tomorrow|next week|soon|upcoming)\b",
                r"(?i)\b(hope|hoping|hopefully)\b",
                r"(?i)\b(planning|plan to|going to)\b",
            ],
            &[r"(?i)\b(ready for|countdown)\b"],
        ),
    ];

    table
        .into_iter()
        .map(|(emotion, keywords, modifiers)| PatternGroup {
            emotion,
            keywords: compile(keywords),
            modifiers: compile(modifiers),
        })
        .collect()
});

/// Negators that flip a joy match into sadness.
static JOY_NEGATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(not|never|isn['’]?t|wasn['’]?t|aren['’]?t|no longer|don['’]?t feel)\s+(very\s+|so\s+|really\s+|that\s+|feeling\s+)?(happy|glad|excited|good|great|joyful|okay)\b",
        r"(?i)\bwish (i|i['’]?d) (was|were|had been|felt|could be)\b",
        r"(?i)\b(can['’]?t|cannot) be happy\b",
        r"(?i)\bhaven['’]?t been (happy|okay|good)\b",
    ])
});

static SARCASM: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(oh great|oh wonderful|oh perfect|just perfect|just great|yeah right|sure you do|thanks a lot|thanks for nothing|how lovely)\b",
        r"(?i)\bwow,? (thanks|great|amazing)\b",
        r"(?i)\bwhat a (surprise|shock)\b",
        r"(?i)\bbecause that['’]?s (exactly )?what i needed\b",
    ])
});

static HIDDEN_SADNESS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(i['’]?m|im|i am) (fine|okay|ok)\s*(\.{2,}|…)",
        r"(?i)\b(it['’]?s|its) (fine|whatever|nothing)\b",
        r"(?i)\b(doesn['’]?t|does not) matter( anyway)?\b",
        r"(?i)\bnever ?mind\b",
        r"(?i)\bno one (cares|would notice)\b",
        r"(?i)\bused to (love|enjoy)\b",
    ])
});

static FAKING_HAPPINESS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(i['’]?m|im|i am) (fine|okay|ok|good|great)\b.{0,15}\b(haha+|hehe+|lol|lmao)\b",
        r"(?i)\b(haha+|lol)\b.{0,15}\b(i['’]?m|im|i am) (fine|okay|ok)\b",
        r"(?i)\b(totally|completely|perfectly) (fine|okay|ok)\b",
        r"(?i)\beverything['’]?s? (is )?(fine|great|perfect)\b",
        r"(?i)\bsmil(e|ing) through\b",
    ])
});

static TERSE_DISMISSAL: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?i)\b(fine|whatever|okay|ok|sure|k)\b"]));

static OVERWHELM_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\boverwhelm(ed|ing)?\b",
        r"(?i)\bcan['’]?t (take|handle|cope with|do) (it|this|any ?more)\b",
        r"(?i)\btoo much\b",
        r"(?i)\b(falling apart|breaking down|drowning|at my limit|breaking point)\b",
        r"(?i)\bcompletely (lost|broken|destroyed)\b",
    ])
});

static INTENSIFIERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(very|so|really|extremely|incredibly|super|totally|absolutely|deeply|utterly)\b",
    ])
});

/// Case-sensitive: a run of three capitalised words, or one long shouted word.
static ALL_CAPS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"\b[A-Z]{2,}(\s+[A-Z]{2,}){2,}\b", r"\b[A-Z]{5,}\b"]));

static LONELINESS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"(?i)\b(lonely|alone|isolated|no one to talk to|nobody to talk to)\b"])
});

static DISAPPOINTMENT: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?i)\b(disappoint(ed|ing|ment)?|let down)\b"]));

static GRATITUDE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?i)\b(thank|grateful|appreciate)"]));

static TONE_VULNERABLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"(?i)\b(feel|feeling|scared|hurt|alone|cry|crying|afraid|lonely)\b"])
});

static TONE_SERIOUS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"(?i)\b(work|job|problem|important|worried|need to|deadline|money|health)\b"])
});

static TONE_PLAYFUL: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?i)\b(haha+|hehe+|lol|lmao|joke|joking|funny)\b"]));

// ═════════════════════════════════════════════════════════════════════════════
// Scoring
// ═════════════════════════════════════════════════════════════════════════════

/// Raw additive scores for the eight core emotions, indexed by
/// `CoreEmotion::index()`. Joy negation is already applied.
pub fn score_emotions(text: &str) -> [f32; 8] {
    let mut scores = [0.0_f32; 8];

    for group in EMOTION_GROUPS.iter() {
        let keyword_hits = count_matches(&group.keywords, text) as f32;
        let modifier_hits = count_matches(&group.modifiers, text) as f32;
        scores[group.emotion.index()] += keyword_hits * KEYWORD_WEIGHT + modifier_hits * MODIFIER_WEIGHT;
    }

    let joy = CoreEmotion::Joy.index();
    if scores[joy] > 0.0 && any_match(&JOY_NEGATORS, text) {
        scores[CoreEmotion::Sadness.index()] += scores[joy];
        scores[joy] = 0.0;
    }

    scores
}

/// Argmax with declaration-order tie-break (first-declared wins).
fn primary_of(scores: &[f32; 8]) -> CoreEmotion {
    let mut best = CoreEmotion::Joy;
    for emotion in CoreEmotion::ALL {
        if scores[emotion.index()] > scores[best.index()] {
            best = emotion;
        }
    }
    best
}

fn micro_signals(text: &str, scores: &[f32; 8]) -> MicroSignals {
    let hit = |fired: bool| if fired { MICRO_SIGNAL_HIT } else { 0.0 };
    let len = text.trim().chars().count();

    MicroSignals {
        sarcasm: hit(any_match(&SARCASM, text)),
        frustration: hit(scores[CoreEmotion::Anger.index()] > 0.0 && len < FRUSTRATION_MAX_CHARS),
        hidden_sadness: hit(any_match(&HIDDEN_SADNESS, text)),
        suppressed_anger: hit(any_match(&TERSE_DISMISSAL, text) && len < SUPPRESSED_ANGER_MAX_CHARS),
        faking_happiness: hit(any_match(&FAKING_HAPPINESS, text)),
    }
}

fn intensity_of(text: &str, primary_score: f32, total: f32) -> Intensity {
    // No pattern matched: never fabricate intensity from punctuation alone.
    if total <= 0.0 {
        return Intensity::Subtle;
    }
    if any_match(&OVERWHELM_MARKERS, text) {
        return Intensity::Overwhelming;
    }
    let exclamations = text.chars().filter(|c| *c == '!').count();
    if any_match(&INTENSIFIERS, text)
        || exclamations > EXCLAMATION_STRONG_COUNT
        || any_match(&ALL_CAPS, text)
    {
        return Intensity::Strong;
    }
    if primary_score > 1.0 {
        Intensity::Moderate
    } else {
        Intensity::Subtle
    }
}

fn secondary_emotions(
    text: &str,
    scores: &[f32; 8],
    micro: &MicroSignals,
    intensity: Intensity,
    valence: f32,
) -> Vec<SecondaryEmotion> {
    let s = |e: CoreEmotion| scores[e.index()];
    let mut out = Vec::new();

    if s(CoreEmotion::Fear) > 1.0 {
        out.push(SecondaryEmotion::Anxiety);
    }
    if s(CoreEmotion::Anger) > 1.0 || micro.frustration > 0.0 {
        out.push(SecondaryEmotion::Frustration);
    }
    if any_match(&LONELINESS, text) {
        out.push(SecondaryEmotion::Loneliness);
    }
    if intensity == Intensity::Overwhelming {
        out.push(SecondaryEmotion::Overwhelm);
    }
    if s(CoreEmotion::Sadness) > 0.0 && any_match(&DISAPPOINTMENT, text) {
        out.push(SecondaryEmotion::Disappointment);
    }
    if s(CoreEmotion::Trust) > 1.0 && any_match(&GRATITUDE, text) {
        out.push(SecondaryEmotion::Gratitude);
    }
    if s(CoreEmotion::Joy) > 1.0 && (s(CoreEmotion::Anticipation) > 0.0 || text.contains("!!")) {
        out.push(SecondaryEmotion::Excitement);
    }
    if s(CoreEmotion::Anticipation) > 1.0 && valence > 0.0 {
        out.push(SecondaryEmotion::Hopefulness);
    }

    out
}

// ═════════════════════════════════════════════════════════════════════════════
// Context
// ═════════════════════════════════════════════════════════════════════════════

fn conversation_tone(history: &[ChatMessage]) -> ConversationTone {
    let skip = history.len().saturating_sub(TONE_HISTORY_MESSAGES);
    let recent = history[skip..]
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if any_match(&TONE_VULNERABLE, &recent) {
        ConversationTone::Vulnerable
    } else if any_match(&TONE_SERIOUS, &recent) {
        ConversationTone::Serious
    } else if any_match(&TONE_PLAYFUL, &recent) {
        ConversationTone::Playful
    } else {
        ConversationTone::Casual
    }
}

/// Derive the reading context from the local clock and the history.
pub fn reading_context<Tz: TimeZone>(history: &[ChatMessage], now: &DateTime<Tz>) -> ReadingContext {
    ReadingContext {
        time_of_day: TimeOfDay::from_hour(now.hour()),
        conversation_tone: conversation_tone(history),
        relationship_stage: RelationshipStage::from_message_count(history.len()),
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Public entry point
// ═════════════════════════════════════════════════════════════════════════════

/// Classify one message. `now` should be expressed in the user's timezone;
/// it only feeds the time-of-day bucket. Never fails.
pub fn analyze_emotion<Tz: TimeZone>(
    text: &str,
    recent_history: &[ChatMessage],
    now: &DateTime<Tz>,
) -> EmotionReading {
    let scores = score_emotions(text);
    let s = |e: CoreEmotion| scores[e.index()];
    let total: f32 = scores.iter().sum();

    let primary = primary_of(&scores);
    let micro = micro_signals(text, &scores);
    let intensity = intensity_of(text, s(primary), total);

    let valence = ((s(CoreEmotion::Joy) + s(CoreEmotion::Trust)) / 2.0
        - (s(CoreEmotion::Sadness) + s(CoreEmotion::Anger) + s(CoreEmotion::Fear)) / 3.0)
        .clamp(-1.0, 1.0);
    let arousal = ((s(CoreEmotion::Anger)
        + s(CoreEmotion::Fear)
        + s(CoreEmotion::Surprise)
        + s(CoreEmotion::Anticipation))
        / 4.0)
        .clamp(0.0, 1.0);
    let confidence = (total / CONFIDENCE_DIVISOR).min(1.0);

    let secondary = secondary_emotions(text, &scores, &micro, intensity, valence);

    debug!(
        "[policy-emotion] primary={} intensity={:?} confidence={:.2} valence={:.2} arousal={:.2}",
        primary, intensity, confidence, valence, arousal
    );

    EmotionReading {
        primary_emotion: primary,
        secondary_emotions: secondary,
        intensity,
        confidence,
        valence,
        arousal,
        micro_signals: micro,
        context: reading_context(recent_history, now),
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Tests
// ═════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, hour, 30, 0).unwrap()
    }

    fn analyze(text: &str) -> EmotionReading {
        analyze_emotion(text, &[], &at_hour(10))
    }

    #[test]
    fn no_signal_defaults_to_joy_with_zero_confidence() {
        for text in ["", "the table is brown", "1234 5678"] {
            let r = analyze(text);
            assert_eq!(score_emotions(text).iter().sum::<f32>(), 0.0, "text={:?}", text);
            assert_eq!(r.confidence, 0.0, "text={:?}", text);
            assert_eq!(r.intensity, Intensity::Subtle, "text={:?}", text);
            assert_eq!(r.primary_emotion, CoreEmotion::Joy, "text={:?}", text);
        }
        let r = analyze("the table is brown");
        assert_eq!(r.valence, 0.0);
        assert_eq!(r.arousal, 0.0);
        assert!(r.secondary_emotions.is_empty());
    }

    #[test]
    fn negated_joy_becomes_sadness() {
        let r = analyze("I am not happy");
        assert_eq!(r.primary_emotion, CoreEmotion::Sadness);
        assert!(r.valence < 0.0, "valence={}", r.valence);

        let scores = score_emotions("I am not happy");
        assert_eq!(scores[CoreEmotion::Joy.index()], 0.0);
        assert_eq!(scores[CoreEmotion::Sadness.index()], KEYWORD_WEIGHT);
    }

    #[test]
    fn negation_only_applies_to_joy() {
        let scores = score_emotions("I'm not angry");
        assert!(scores[CoreEmotion::Anger.index()] > 0.0);
    }

    #[test]
    fn scores_are_not_mutually_exclusive() {
        let scores = score_emotions("I'm so happy but also really scared");
        assert!(scores[CoreEmotion::Joy.index()] > 0.0);
        assert!(scores[CoreEmotion::Fear.index()] > 0.0);
    }

    #[test]
    fn tie_breaks_by_declaration_order() {
        // fear ("stressed") and anticipation ("next week") both score 2
        let r = analyze("stressed about next week");
        assert_eq!(r.primary_emotion, CoreEmotion::Fear);
    }

    #[test]
    fn job_news_is_strong_joy() {
        let r = analyze("I GOT THE JOB!!! I can't believe it!!!");
        assert_eq!(r.primary_emotion, CoreEmotion::Joy);
        assert!(r.intensity >= Intensity::Strong, "intensity={:?}", r.intensity);
        assert!(r.secondary_emotions.contains(&SecondaryEmotion::Excitement));
    }

    #[test]
    fn overwhelm_marker_sets_overwhelming() {
        let r = analyze("I'm so sad and I can't take it anymore, everything is too much");
        assert_eq!(r.intensity, Intensity::Overwhelming);
        assert!(r.confidence > 0.0);
        assert!(r.secondary_emotions.contains(&SecondaryEmotion::Overwhelm));
    }

    #[test]
    fn overwhelm_marker_alone_does_not_fabricate_intensity() {
        // "too much" with no emotion keyword
        let r = analyze("that is too much paperwork");
        assert_eq!(score_emotions("that is too much paperwork").iter().sum::<f32>(), 0.0);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.intensity, Intensity::Subtle);
    }

    #[test]
    fn moderate_when_primary_score_above_one() {
        let r = analyze("I feel sad");
        assert_eq!(r.primary_emotion, CoreEmotion::Sadness);
        assert_eq!(r.intensity, Intensity::Moderate);
    }

    #[test]
    fn faking_happiness_and_hidden_sadness() {
        let r = analyze("I'm fine... haha");
        assert!(r.micro_signals.faking_happiness > MICRO_SIGNAL_THRESHOLD);
        assert!(r.micro_signals.hidden_sadness > MICRO_SIGNAL_THRESHOLD);
    }

    #[test]
    fn sarcasm_signal() {
        let r = analyze("Oh great, another Monday meeting");
        assert_eq!(r.micro_signals.sarcasm, MICRO_SIGNAL_HIT);
    }

    #[test]
    fn frustration_requires_short_angry_text() {
        let short = analyze("so annoyed rn");
        assert_eq!(short.micro_signals.frustration, MICRO_SIGNAL_HIT);
        assert!(short.secondary_emotions.contains(&SecondaryEmotion::Frustration));

        let long = analyze(
            "I am annoyed because the train was late again and then the meeting ran over by an hour",
        );
        assert_eq!(long.micro_signals.frustration, 0.0);
    }

    #[test]
    fn suppressed_anger_on_terse_dismissal() {
        assert_eq!(analyze("whatever.").micro_signals.suppressed_anger, MICRO_SIGNAL_HIT);
        assert_eq!(
            analyze("whatever you think is best for the whole team").micro_signals.suppressed_anger,
            0.0
        );
    }

    #[test]
    fn anxiety_from_fear_score() {
        let r = analyze("I'm nervous about tomorrow");
        assert!(r.secondary_emotions.contains(&SecondaryEmotion::Anxiety));
    }

    #[test]
    fn valence_and_arousal_are_clamped() {
        let r = analyze("I hate this, I'm furious and scared and terrified and sad and crying");
        assert!((-1.0..=1.0).contains(&r.valence), "valence={}", r.valence);
        assert!((0.0..=1.0).contains(&r.arousal), "arousal={}", r.arousal);
        assert!(r.confidence <= 1.0);
    }

    #[test]
    fn context_from_clock_and_history() {
        let now = at_hour(22);
        let history: Vec<ChatMessage> = (0..12)
            .map(|i| ChatMessage::user(format!("message {} lol", i), now))
            .collect();
        let r = analyze_emotion("hey", &history, &now);
        assert_eq!(r.context.time_of_day, TimeOfDay::Night);
        assert_eq!(r.context.relationship_stage, RelationshipStage::Acquainted);
        assert_eq!(r.context.conversation_tone, ConversationTone::Playful);
    }

    #[test]
    fn tone_prefers_vulnerable_over_playful() {
        let now = at_hour(9);
        let history = vec![
            ChatMessage::user("haha that was funny", now),
            ChatMessage::user("but honestly I feel alone lately", now),
        ];
        assert_eq!(conversation_tone(&history), ConversationTone::Vulnerable);
        assert_eq!(conversation_tone(&[]), ConversationTone::Casual);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let a = analyze("I'm worried, what if it goes wrong?!");
        let b = analyze("I'm worried, what if it goes wrong?!");
        assert_eq!(a, b);
    }
}
