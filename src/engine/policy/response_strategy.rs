// ── Kindred: Response Strategy Selector ─────────────────────────────────────
//
// Maps an EmotionReading to a tone/urgency directive for the responder.
// Pure and total: every branch returns a strategy.
//
// Precedence (first match wins):
//   1. overwhelming sadness/fear     → crisis_support     (supportive, critical)
//   2. faking happiness / hidden sad → gentle_incongruence (gentle, medium)
//   3. sarcasm                       → playful_pivot      (playful, low)
//   4. dispatch on primary emotion
//
// Rule 1 complements the crisis keyword net: it catches overwhelming text
// that never used a literal crisis phrase.

use crate::atoms::constants::MICRO_SIGNAL_THRESHOLD;
use crate::atoms::policy_types::{CoreEmotion, EmotionReading, Intensity, ResponseStrategy, Tone, Urgency};

fn strategy(name: &str, tone: Tone, urgency: Urgency, avoid: &[&str], suggestions: &[&str]) -> ResponseStrategy {
    ResponseStrategy {
        name: name.to_string(),
        tone,
        urgency,
        avoid: avoid.iter().map(|s| s.to_string()).collect(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}

fn urgency_for(intensity: Intensity) -> Urgency {
    match intensity {
        Intensity::Subtle => Urgency::Low,
        Intensity::Moderate => Urgency::Medium,
        Intensity::Strong | Intensity::Overwhelming => Urgency::High,
    }
}

/// Choose how to respond to a reading.
pub fn select_strategy(reading: &EmotionReading) -> ResponseStrategy {
    let micro = &reading.micro_signals;

    if reading.intensity == Intensity::Overwhelming
        && matches!(reading.primary_emotion, CoreEmotion::Sadness | CoreEmotion::Fear)
    {
        return strategy(
            "crisis_support",
            Tone::Supportive,
            Urgency::Critical,
            &["humor", "advice", "toxic_positivity", "minimizing", "changing_subject"],
            &[
                "Slow down and acknowledge how much they are carrying right now",
                "Reflect their feelings back without trying to fix anything",
                "Ask gently whether they are safe",
                "Remind them they are not alone and that support is available",
            ],
        );
    }

    if micro.faking_happiness > MICRO_SIGNAL_THRESHOLD || micro.hidden_sadness > MICRO_SIGNAL_THRESHOLD {
        return strategy(
            "gentle_incongruence",
            Tone::Gentle,
            Urgency::Medium,
            &["taking_at_face_value", "pushing", "humor"],
            &[
                "Notice softly that their words and tone might not match",
                "Offer an open door: it's okay to not be okay",
                "Let them choose whether to open up",
            ],
        );
    }

    if micro.sarcasm > MICRO_SIGNAL_THRESHOLD {
        return strategy(
            "playful_pivot",
            Tone::Playful,
            Urgency::Low,
            &["literal_interpretation", "lecturing"],
            &[
                "Match their dry humor briefly",
                "Pivot to what is actually bothering them",
            ],
        );
    }

    match reading.primary_emotion {
        CoreEmotion::Joy => strategy(
            "celebration",
            Tone::Celebratory,
            Urgency::Low,
            &["dampening", "changing_subject", "one_upping"],
            &[
                "Match their energy and celebrate with them",
                "Ask for the details of what happened",
                "Reflect on the effort that led here",
            ],
        ),
        CoreEmotion::Sadness if reading.intensity >= Intensity::Strong => strategy(
            "deep_support",
            Tone::Supportive,
            urgency_for(reading.intensity),
            &["toxic_positivity", "silver_linings", "advice", "humor"],
            &[
                "Acknowledge the pain plainly",
                "Stay with the feeling instead of solving it",
                "Ask what would feel supportive right now",
            ],
        ),
        CoreEmotion::Sadness => strategy(
            "validation",
            Tone::Validating,
            urgency_for(reading.intensity),
            &["toxic_positivity", "minimizing"],
            &[
                "Validate that it makes sense to feel this way",
                "Invite them to share more if they want",
            ],
        ),
        CoreEmotion::Anger => strategy(
            "anger_validation",
            Tone::Validating,
            urgency_for(reading.intensity),
            &["defending_the_target", "telling_them_to_calm_down", "minimizing"],
            &[
                "Acknowledge that the frustration is legitimate",
                "Let them vent before exploring next steps",
                "Name the unfairness if there is one",
            ],
        ),
        CoreEmotion::Fear | CoreEmotion::Anticipation => strategy(
            "calming",
            Tone::Calming,
            urgency_for(reading.intensity),
            &["catastrophizing", "dismissing_worries", "information_overload"],
            &[
                "Ground them in what is known right now",
                "Break the worry into smaller, manageable pieces",
                "Offer steady reassurance without false promises",
            ],
        ),
        _ => strategy(
            "general_support",
            Tone::Supportive,
            urgency_for(reading.intensity),
            &["judgment"],
            &[
                "Respond warmly and with curiosity",
                "Ask an open question to learn more",
            ],
        ),
    }
}

impl ResponseStrategy {
    /// Render as a block the host can fold into the system prompt.
    pub fn render_directive(&self) -> String {
        let mut out = format!(
            "## Response guidance ({})\nTone: {:?}\nUrgency: {:?}\n",
            self.name, self.tone, self.urgency
        );
        if !self.avoid.is_empty() {
            out.push_str(&format!("Avoid: {}\n", self.avoid.join(", ")));
        }
        for (i, s) in self.suggestions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, s));
        }
        out
    }
}
