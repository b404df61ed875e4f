//! Clinical summary text

use crate::exercises::types::ExerciseCounts;

pub const RECOMMENDATIONS: &[&str] = &[
    "Continue regular CBT practice",
    "Focus on identifying patterns in thought records",
    "Implement behavioral activation strategies consistently",
    "Consider professional therapy support for deeper exploration",
];

/// Build the summary a reviewer starts from
///
/// Paragraphs for record kinds with no entries are left out. The
/// recommendation list is always present.
pub fn generate_review(counts: &ExerciseCounts) -> String {
    let mut out = String::from("Clinical Summary:\n\n");
    let total = counts.total_exercises();

    if total > 0 {
        out.push_str(&format!(
            "The client has completed {} CBT exercises, demonstrating engagement with therapeutic interventions.\n\n",
            total
        ));
        if counts.thought_records > 0 {
            out.push_str(&format!(
                "Thought Record Analysis: {} entries show the client is actively identifying triggers and challenging automatic thoughts.\n\n",
                counts.thought_records
            ));
        }
        if counts.distortion_records > 0 {
            out.push_str(&format!(
                "Cognitive Distortion Work: {} exercises indicate awareness of thinking patterns and efforts to reframe negative thoughts.\n\n",
                counts.distortion_records
            ));
        }
        if counts.behavioral_activation > 0 {
            out.push_str(&format!(
                "Behavioral Activation: {} activity plans suggest proactive approach to mood management.\n\n",
                counts.behavioral_activation
            ));
        }
    }

    if counts.therapy_sessions > 0 {
        out.push_str(&format!(
            "Therapy Check-ins: {} sessions completed, showing consistent self-monitoring and reflection.\n\n",
            counts.therapy_sessions
        ));
    }

    out.push_str("Recommendations:\n");
    let lines: Vec<String> = RECOMMENDATIONS.iter().map(|r| format!("- {}", r)).collect();
    out.push_str(&lines.join("\n"));
    out
}
