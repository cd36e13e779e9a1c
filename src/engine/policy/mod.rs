// Kindred Policy Engine
//
// Heuristic conversational policy for an AI companion. Every module is pure
// and in-memory; the host owns persistence, transport and the LLM call.
//
//   crisis              crisis keyword net (always first)
//   emotion_classifier  lexical emotion reading
//   response_strategy   reading → tone/urgency directive
//   trajectory          bounded per-user emotion window, patterns, alerts
//   engagement          proactive message decisions and timing
//   proactive_scheduler pending queue + daily cap
//   memory_surfacing    memory tag extraction and callbacks
//   session / registry  per-user facade over all of the above

pub mod crisis;
pub mod emotion_classifier;
pub mod engagement;
pub mod memory_surfacing;
pub mod proactive_scheduler;
pub mod registry;
pub mod response_strategy;
pub mod session;
pub mod trajectory;

pub use crisis::{crisis_resource_message, detect_crisis, scan_crisis};
pub use emotion_classifier::analyze_emotion;
pub use engagement::{
    analyze_engagement_patterns, generate_proactive_message, get_optimal_send_time,
    should_send_proactive_message,
};
pub use memory_surfacing::{
    build_memory_surfacing_prompt, extract_memory_tags, generate_memory_prompt,
    should_surface_memory,
};
pub use proactive_scheduler::ProactiveScheduler;
pub use registry::SessionRegistry;
pub use response_strategy::select_strategy;
pub use session::{CompanionSession, InboundAssessment};
pub use trajectory::TrajectoryTracker;
