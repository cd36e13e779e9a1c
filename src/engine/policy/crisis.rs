// ── Kindred: Crisis Keyword Net ──────────────────────────────────────────────
//
// A blunt, conservative substring scan for self-harm and suicide language.
// Runs before, and independently of, the emotion classifier: a crisis must
// never be masked by low confidence or a misconfigured heuristic elsewhere.
//
// Prefers false positives. This is a safety floor, not a clinical tool.
// The host must short-circuit all other policy when this fires (no humor,
// no sarcasm, no LLM call) and send `crisis_resource_message()` instead.

use crate::atoms::constants::CRISIS_RESOURCES;
use log::warn;

/// High-risk phrases, lowercase. Matching is case-insensitive substring.
pub const CRISIS_PHRASES: &[&str] = &[
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "take my own life",
    "want to die",
    "wanna die",
    "wish i was dead",
    "wish i were dead",
    "better off dead",
    "better off without me",
    "suicide",
    "suicidal",
    "self harm",
    "self-harm",
    "hurt myself",
    "hurting myself",
    "cut myself",
    "cutting myself",
    "no reason to live",
    "nothing to live for",
    "don't want to be alive",
    "dont want to be alive",
    "don't want to live",
    "end it all",
    "overdose",
    "not worth living",
];

/// Return the first crisis phrase found in `text`, if any.
pub fn scan_crisis(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    CRISIS_PHRASES.iter().copied().find(|p| lower.contains(p))
}

/// True if `text` contains any crisis phrase. Logs the matched phrase (never
/// the message itself).
pub fn detect_crisis(text: &str) -> bool {
    match scan_crisis(text) {
        Some(phrase) => {
            warn!("[policy-crisis] Crisis phrase matched: '{}'", phrase);
            true
        }
        None => false,
    }
}

/// The fixed message sent in place of a generated reply when a crisis fires.
pub fn crisis_resource_message() -> String {
    let mut out = String::from(
        "I'm really glad you told me, and I'm worried about you. You don't have to \
         go through this alone. Please reach out to someone who can help right now:\n",
    );
    for (name, contact) in CRISIS_RESOURCES {
        out.push_str(&format!("\n• {}: {}", name, contact));
    }
    out.push_str(
        "\n\nIf you are in immediate danger, please contact emergency services. \
         I'm here with you, and I'll keep listening.",
    );
    out
}
