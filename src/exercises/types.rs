//! CBT exercise records
//!
//! Field names are camelCase on disk so collections written by the browser
//! build load unchanged.

use crate::storage::compat;
use crate::storage::{Record, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const THOUGHT_RECORDS_KEY: &str = "thoughtRecords";
pub const DISTORTION_RECORDS_KEY: &str = "distortionRecords";
pub const ACTIVITY_PLANS_KEY: &str = "behavioralActivation";
pub const THERAPY_SESSIONS_KEY: &str = "therapySessions";
pub const THERAPIST_REVIEWS_KEY: &str = "therapistReviews";

fn intensity<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    compat::optional_number(deserializer)?
        .map(|n| u8::try_from(n).map_err(|_| D::Error::custom(format!("intensity {} out of range", n))))
        .transpose()
}

fn required(field: &str) -> bool {
    !field.trim().is_empty()
}

/// A completed thought record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtRecord {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    #[serde(deserialize_with = "compat::timestamp")]
    pub timestamp: i64,
    pub situation: String,
    pub emotion: String,
    /// 1..=10 when given
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "intensity"
    )]
    pub emotion_intensity: Option<u8>,
    pub automatic_thought: String,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub alternative_thought: String,
}

impl Record for ThoughtRecord {
    const KEY: &'static str = THOUGHT_RECORDS_KEY;
    const KIND: &'static str = "thought-record";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewThoughtRecord {
    pub situation: String,
    pub emotion: String,
    pub emotion_intensity: Option<i64>,
    pub automatic_thought: String,
    pub evidence: String,
    pub alternative_thought: String,
}

impl NewThoughtRecord {
    pub fn new(
        situation: impl Into<String>,
        emotion: impl Into<String>,
        automatic_thought: impl Into<String>,
    ) -> Self {
        Self {
            situation: situation.into(),
            emotion: emotion.into(),
            automatic_thought: automatic_thought.into(),
            ..Default::default()
        }
    }

    pub fn intensity(mut self, intensity: i64) -> Self {
        self.emotion_intensity = Some(intensity);
        self
    }

    pub fn evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = evidence.into();
        self
    }

    pub fn alternative(mut self, thought: impl Into<String>) -> Self {
        self.alternative_thought = thought.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<Option<u8>, ValidationError> {
        if !required(&self.situation) || !required(&self.emotion) || !required(&self.automatic_thought)
        {
            return Err(ValidationError::IncompleteThoughtRecord);
        }
        match self.emotion_intensity {
            None => Ok(None),
            Some(n @ 1..=10) => Ok(Some(n as u8)),
            Some(n) => Err(ValidationError::IntensityOutOfRange(n)),
        }
    }
}

/// The fixed catalogue of cognitive distortions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CognitiveDistortion {
    AllOrNothing,
    Overgeneralization,
    MentalFilter,
    JumpingConclusions,
    Catastrophizing,
    EmotionalReasoning,
}

impl CognitiveDistortion {
    pub fn all() -> &'static [CognitiveDistortion] {
        &[
            CognitiveDistortion::AllOrNothing,
            CognitiveDistortion::Overgeneralization,
            CognitiveDistortion::MentalFilter,
            CognitiveDistortion::JumpingConclusions,
            CognitiveDistortion::Catastrophizing,
            CognitiveDistortion::EmotionalReasoning,
        ]
    }

    /// Stable identifier used on disk and on the command line
    pub fn id(self) -> &'static str {
        match self {
            CognitiveDistortion::AllOrNothing => "all-or-nothing",
            CognitiveDistortion::Overgeneralization => "overgeneralization",
            CognitiveDistortion::MentalFilter => "mental-filter",
            CognitiveDistortion::JumpingConclusions => "jumping-conclusions",
            CognitiveDistortion::Catastrophizing => "catastrophizing",
            CognitiveDistortion::EmotionalReasoning => "emotional-reasoning",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CognitiveDistortion::AllOrNothing => "All-or-Nothing Thinking",
            CognitiveDistortion::Overgeneralization => "Overgeneralization",
            CognitiveDistortion::MentalFilter => "Mental Filter",
            CognitiveDistortion::JumpingConclusions => "Jumping to Conclusions",
            CognitiveDistortion::Catastrophizing => "Catastrophizing",
            CognitiveDistortion::EmotionalReasoning => "Emotional Reasoning",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CognitiveDistortion::AllOrNothing => "Seeing things in black and white categories",
            CognitiveDistortion::Overgeneralization => "Drawing broad conclusions from single events",
            CognitiveDistortion::MentalFilter => "Focusing only on negative details",
            CognitiveDistortion::JumpingConclusions => {
                "Making negative assumptions without evidence"
            }
            CognitiveDistortion::Catastrophizing => "Expecting the worst possible outcome",
            CognitiveDistortion::EmotionalReasoning => "Believing that feelings reflect reality",
        }
    }

    pub fn example(self) -> &'static str {
        match self {
            CognitiveDistortion::AllOrNothing => "If I'm not perfect, I'm a failure",
            CognitiveDistortion::Overgeneralization => "I failed this test, I'll never succeed",
            CognitiveDistortion::MentalFilter => "Ignoring compliments and focusing on one criticism",
            CognitiveDistortion::JumpingConclusions => "They didn't text back, they must be angry",
            CognitiveDistortion::Catastrophizing => "If I make a mistake, I'll be fired",
            CognitiveDistortion::EmotionalReasoning => "I feel stupid, so I must be stupid",
        }
    }
}

impl fmt::Display for CognitiveDistortion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CognitiveDistortion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|d| d.id().eq_ignore_ascii_case(s) || d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let ids: Vec<&str> = Self::all().iter().map(|d| d.id()).collect();
                format!("unknown distortion {:?}; expected one of {}", s, ids.join(", "))
            })
    }
}

/// A thought analysed for distortions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistortionRecord {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    #[serde(deserialize_with = "compat::timestamp")]
    pub timestamp: i64,
    pub thought: String,
    pub selected_distortions: Vec<CognitiveDistortion>,
    #[serde(default)]
    pub reframed_thought: String,
}

impl Record for DistortionRecord {
    const KEY: &'static str = DISTORTION_RECORDS_KEY;
    const KIND: &'static str = "distortion-record";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewDistortionRecord {
    pub thought: String,
    pub distortions: Vec<CognitiveDistortion>,
    pub reframed_thought: String,
}

impl NewDistortionRecord {
    pub fn new(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            ..Default::default()
        }
    }

    /// Toggle a distortion on; selecting one twice keeps a single copy
    pub fn distortion(mut self, distortion: CognitiveDistortion) -> Self {
        if !self.distortions.contains(&distortion) {
            self.distortions.push(distortion);
        }
        self
    }

    pub fn reframed(mut self, thought: impl Into<String>) -> Self {
        self.reframed_thought = thought.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if !required(&self.thought) || self.distortions.is_empty() {
            return Err(ValidationError::IncompleteDistortionRecord);
        }
        Ok(())
    }
}

/// One scheduled activity inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Free-form, as typed by the user ("Saturday 10am")
    pub scheduled_time: String,
    #[serde(default)]
    pub completed: bool,
}

/// A behavioural activation schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPlan {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    #[serde(deserialize_with = "compat::timestamp")]
    pub timestamp: i64,
    pub activities: Vec<Activity>,
}

impl ActivityPlan {
    pub fn completed(&self) -> usize {
        self.activities.iter().filter(|a| a.completed).count()
    }
}

impl Record for ActivityPlan {
    const KEY: &'static str = ACTIVITY_PLANS_KEY;
    const KIND: &'static str = "activity-plan";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub name: String,
    pub description: String,
    pub scheduled_time: String,
    pub completed: bool,
}

impl NewActivity {
    pub fn new(name: impl Into<String>, scheduled_time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scheduled_time: scheduled_time.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if !required(&self.name) || !required(&self.scheduled_time) {
            return Err(ValidationError::IncompleteActivity);
        }
        Ok(())
    }
}

/// One answered check-in prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub prompt: String,
    pub answer: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResponses {
    List(Vec<Exchange>),
    Map(serde_json::Map<String, serde_json::Value>),
}

/// Accepts both the exchange list and the browser build's prompt → answer map
///
/// Map entries come back in stored order, which is the order they were asked.
fn responses<'de, D>(deserializer: D) -> Result<Vec<Exchange>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawResponses::deserialize(deserializer)? {
        RawResponses::List(list) => list,
        RawResponses::Map(map) => map
            .into_iter()
            .filter_map(|(prompt, answer)| {
                answer.as_str().map(|a| Exchange {
                    prompt,
                    answer: a.to_string(),
                })
            })
            .collect(),
    })
}

/// A saved check-in transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapySession {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    #[serde(deserialize_with = "compat::timestamp")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "responses")]
    pub responses: Vec<Exchange>,
    #[serde(default = "default_session_type")]
    pub session_type: String,
}

pub(crate) fn default_session_type() -> String {
    "check-in".to_string()
}

impl Record for TherapySession {
    const KEY: &'static str = THERAPY_SESSIONS_KEY;
    const KIND: &'static str = "therapy-session";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Record totals a review was written against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseCounts {
    #[serde(default)]
    pub thought_records: usize,
    #[serde(default)]
    pub distortion_records: usize,
    #[serde(default)]
    pub behavioral_activation: usize,
    #[serde(default)]
    pub therapy_sessions: usize,
}

impl ExerciseCounts {
    /// Completed CBT exercises, not counting check-ins
    pub fn total_exercises(&self) -> usize {
        self.thought_records + self.distortion_records + self.behavioral_activation
    }
}

/// A saved clinical review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistReview {
    #[serde(deserialize_with = "compat::id")]
    pub id: String,
    #[serde(deserialize_with = "compat::timestamp")]
    pub timestamp: i64,
    pub review: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default)]
    pub data_analyzed: ExerciseCounts,
}

impl Record for TherapistReview {
    const KEY: &'static str = THERAPIST_REVIEWS_KEY;
    const KIND: &'static str = "therapist-review";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
