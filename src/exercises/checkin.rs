//! Scripted check-in
//!
//! A check-in walks a fixed list of prompts. Each non-blank answer is captured
//! against the prompt it answers and acknowledged with one of a small set of
//! supportive replies, taken in rotation.

use crate::exercises::types::{default_session_type, Exchange, TherapySession};
use crate::storage::ValidationError;

pub const DEFAULT_PROMPTS: &[&str] = &[
    "Hello! I'm here to support your mental wellness journey. How are you feeling today?",
    "What has been on your mind the most lately?",
    "What is one thing that went well for you recently?",
    "What would help you feel better right now?",
];

pub const SUPPORTIVE_REPLIES: &[&str] = &[
    "Thank you for sharing that with me. Your feelings are valid.",
    "I appreciate you being open about this. How does it feel to express that?",
    "That sounds challenging. You're doing great by talking about it.",
    "Thank you for trusting me with this. What would help you feel better right now?",
];

/// Returned for every accepted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub acknowledgement: &'static str,
    /// `None` once every prompt has been answered
    pub next_prompt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckIn {
    prompts: Vec<String>,
    exchanges: Vec<Exchange>,
}

impl Default for CheckIn {
    fn default() -> Self {
        Self::with_prompts(DEFAULT_PROMPTS.iter().copied())
    }
}

impl CheckIn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-in over a custom prompt list; blank prompts are skipped
    pub fn with_prompts<I, T>(prompts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            prompts: prompts
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
            exchanges: Vec::new(),
        }
    }

    /// The prompt awaiting an answer
    pub fn current_prompt(&self) -> Option<&str> {
        self.prompts.get(self.exchanges.len()).map(String::as_str)
    }

    /// Record an answer to the current prompt
    ///
    /// Blank answers, and answers after the last prompt, are ignored and
    /// return `None`.
    pub fn respond(&mut self, answer: &str) -> Option<Reply> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        let prompt = self.current_prompt()?.to_string();

        let acknowledgement = SUPPORTIVE_REPLIES[self.exchanges.len() % SUPPORTIVE_REPLIES.len()];
        self.exchanges.push(Exchange {
            prompt,
            answer: answer.to_string(),
        });

        Some(Reply {
            acknowledgement,
            next_prompt: self.current_prompt().map(str::to_string),
        })
    }

    pub fn is_complete(&self) -> bool {
        self.current_prompt().is_none()
    }

    pub fn answered(&self) -> usize {
        self.exchanges.len()
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Close the check-in as a session with the given identity
    pub fn finish(self, id: String, timestamp: i64) -> Result<TherapySession, ValidationError> {
        if self.exchanges.is_empty() {
            return Err(ValidationError::EmptySession);
        }
        Ok(TherapySession {
            id,
            timestamp,
            responses: self.exchanges,
            session_type: default_session_type(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_prompts_in_order() {
        let mut check_in = CheckIn::with_prompts(["First?", "Second?"]);
        assert_eq!(check_in.current_prompt(), Some("First?"));

        let reply = check_in.respond("fine").unwrap();
        assert_eq!(reply.acknowledgement, SUPPORTIVE_REPLIES[0]);
        assert_eq!(reply.next_prompt.as_deref(), Some("Second?"));

        let reply = check_in.respond("busy week").unwrap();
        assert_eq!(reply.acknowledgement, SUPPORTIVE_REPLIES[1]);
        assert_eq!(reply.next_prompt, None);
        assert!(check_in.is_complete());

        assert_eq!(check_in.respond("one more"), None);
        assert_eq!(check_in.answered(), 2);
    }

    #[test]
    fn test_blank_answer_ignored() {
        let mut check_in = CheckIn::new();
        assert_eq!(check_in.respond("   "), None);
        assert_eq!(check_in.answered(), 0);
        assert_eq!(check_in.current_prompt(), Some(DEFAULT_PROMPTS[0]));
    }

    #[test]
    fn test_finish_requires_an_answer() {
        let err = CheckIn::new().finish("1".to_string(), 0).unwrap_err();
        assert_eq!(err, ValidationError::EmptySession);
    }

    #[test]
    fn test_finish_captures_transcript() {
        let mut check_in = CheckIn::new();
        check_in.respond("  okay, a bit tired ");
        let session = check_in.finish("42".to_string(), 1_000).unwrap();

        assert_eq!(session.id, "42");
        assert_eq!(session.session_type, "check-in");
        assert_eq!(session.responses.len(), 1);
        assert_eq!(session.responses[0].prompt, DEFAULT_PROMPTS[0]);
        assert_eq!(session.responses[0].answer, "okay, a bit tired");
    }

    #[test]
    fn test_replies_rotate() {
        let prompts: Vec<String> = (0..6).map(|i| format!("Q{}", i)).collect();
        let mut check_in = CheckIn::with_prompts(prompts);
        let acks: Vec<&str> = (0..6)
            .map(|_| check_in.respond("yes").unwrap().acknowledgement)
            .collect();
        assert_eq!(acks[4], SUPPORTIVE_REPLIES[0]);
        assert_eq!(acks[5], SUPPORTIVE_REPLIES[1]);
    }
}
