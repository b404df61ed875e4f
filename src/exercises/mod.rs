//! CBT Exercise Log
//!
//! Thought records, distortion analyses, activity plans, check-in sessions
//! and therapist reviews. Each kind is its own collection on the same
//! substrate as the entry store, written in the same envelope.
//!
//! Unlike [`EntryStore`](crate::storage::EntryStore) the log keeps no
//! in-memory mirror: every call reads the collection it needs. Listing an
//! unreadable collection yields nothing, but saving into one fails with the
//! decode error and leaves the stored value as it was.

pub mod checkin;
pub mod review;
pub mod types;

pub use checkin::{CheckIn, Reply, DEFAULT_PROMPTS, SUPPORTIVE_REPLIES};
pub use review::{generate_review, RECOMMENDATIONS};
pub use types::{
    Activity, ActivityPlan, CognitiveDistortion, DistortionRecord, Exchange, ExerciseCounts,
    NewActivity, NewDistortionRecord, NewThoughtRecord, TherapistReview, TherapySession,
    ThoughtRecord,
};

use crate::storage::{
    load_records, read_records, store_records, Clock, IdGenerator, KeyValueStore, Record, StoreResult,
    SystemClock, ValidationError,
};

pub struct ExerciseLog<S: KeyValueStore> {
    substrate: S,
    clock: Box<dyn Clock>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> ExerciseLog<S> {
    pub fn open(substrate: S) -> Self {
        Self::with_clock(substrate, Box::new(SystemClock))
    }

    pub fn with_clock(substrate: S, clock: Box<dyn Clock>) -> Self {
        Self {
            substrate,
            clock,
            ids: IdGenerator::new(),
        }
    }

    fn list<T: Record>(&self) -> StoreResult<Vec<T>> {
        let (records, _) = load_records::<T, _>(&self.substrate)?;
        Ok(records)
    }

    /// Load, append and rewrite one collection
    fn append<T: Record>(
        &mut self,
        build: impl FnOnce(String, i64) -> Result<T, ValidationError>,
    ) -> StoreResult<T> {
        let mut records = read_records::<T, _>(&self.substrate)?;
        self.ids.observe(records.iter().map(|r| r.id()));

        let now = self.clock.now_millis();
        let record = build(self.ids.next_id(now), now)?;
        records.push(record.clone());
        store_records(&mut self.substrate, &records)?;

        tracing::debug!(key = T::KEY, id = record.id(), "Saved exercise record");
        Ok(record)
    }

    pub fn save_thought_record(&mut self, input: NewThoughtRecord) -> StoreResult<ThoughtRecord> {
        let emotion_intensity = input.validate()?;
        self.append(|id, timestamp| {
            Ok(ThoughtRecord {
                id,
                timestamp,
                situation: input.situation.trim().to_string(),
                emotion: input.emotion.trim().to_string(),
                emotion_intensity,
                automatic_thought: input.automatic_thought.trim().to_string(),
                evidence: input.evidence.trim().to_string(),
                alternative_thought: input.alternative_thought.trim().to_string(),
            })
        })
    }

    pub fn thought_records(&self) -> StoreResult<Vec<ThoughtRecord>> {
        self.list()
    }

    pub fn save_distortion_record(
        &mut self,
        input: NewDistortionRecord,
    ) -> StoreResult<DistortionRecord> {
        input.validate()?;
        self.append(|id, timestamp| {
            Ok(DistortionRecord {
                id,
                timestamp,
                thought: input.thought.trim().to_string(),
                selected_distortions: input.distortions,
                reframed_thought: input.reframed_thought.trim().to_string(),
            })
        })
    }

    pub fn distortion_records(&self) -> StoreResult<Vec<DistortionRecord>> {
        self.list()
    }

    /// Save a schedule of at least one activity
    pub fn save_activity_plan(&mut self, activities: Vec<NewActivity>) -> StoreResult<ActivityPlan> {
        if activities.is_empty() {
            return Err(ValidationError::NoActivities.into());
        }
        for activity in &activities {
            activity.validate()?;
        }

        let now = self.clock.now_millis();
        let activities: Vec<Activity> = activities
            .into_iter()
            .map(|a| Activity {
                id: self.ids.next_id(now),
                name: a.name.trim().to_string(),
                description: a.description.trim().to_string(),
                scheduled_time: a.scheduled_time.trim().to_string(),
                completed: a.completed,
            })
            .collect();

        self.append(|id, timestamp| {
            Ok(ActivityPlan {
                id,
                timestamp,
                activities,
            })
        })
    }

    pub fn activity_plans(&self) -> StoreResult<Vec<ActivityPlan>> {
        self.list()
    }

    /// Close a check-in and persist its transcript
    pub fn save_check_in(&mut self, check_in: CheckIn) -> StoreResult<TherapySession> {
        self.append(|id, timestamp| check_in.finish(id, timestamp))
    }

    pub fn therapy_sessions(&self) -> StoreResult<Vec<TherapySession>> {
        self.list()
    }

    /// Record totals across every exercise collection
    pub fn counts(&self) -> StoreResult<ExerciseCounts> {
        Ok(ExerciseCounts {
            thought_records: self.thought_records()?.len(),
            distortion_records: self.distortion_records()?.len(),
            behavioral_activation: self.activity_plans()?.len(),
            therapy_sessions: self.therapy_sessions()?.len(),
        })
    }

    /// Persist a review alongside the totals it was written against
    pub fn save_review(
        &mut self,
        review: impl Into<String>,
        recommendations: impl Into<String>,
    ) -> StoreResult<TherapistReview> {
        let review = review.into();
        if review.trim().is_empty() {
            return Err(ValidationError::EmptyReview.into());
        }
        let data_analyzed = self.counts()?;
        let recommendations = recommendations.into();

        self.append(|id, timestamp| {
            Ok(TherapistReview {
                id,
                timestamp,
                review,
                recommendations: recommendations.trim().to_string(),
                data_analyzed,
            })
        })
    }

    pub fn reviews(&self) -> StoreResult<Vec<TherapistReview>> {
        self.list()
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, FixedClock, MemoryStore, StoreError};
    use std::rc::Rc;
    use tempfile::tempdir;

    const NOW: i64 = 1_712_345_678_901;

    fn create_test_log() -> (ExerciseLog<MemoryStore>, Rc<FixedClock>) {
        let clock = Rc::new(FixedClock::new(NOW));
        let log = ExerciseLog::with_clock(MemoryStore::new(), Box::new(clock.clone()));
        (log, clock)
    }

    #[test]
    fn test_thought_record_round_trip() {
        let (mut log, _) = create_test_log();
        let saved = log
            .save_thought_record(
                NewThoughtRecord::new(" Presentation ", "Anxious", "Everyone will notice")
                    .intensity(7)
                    .alternative("Most people are focused on the content"),
            )
            .unwrap();

        assert_eq!(saved.situation, "Presentation");
        assert_eq!(saved.timestamp, NOW);
        assert_eq!(log.thought_records().unwrap(), vec![saved]);
    }

    #[test]
    fn test_invalid_input_not_persisted() {
        let (mut log, _) = create_test_log();
        let err = log
            .save_thought_record(NewThoughtRecord::new("", "sad", "thought"))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::IncompleteThoughtRecord)
        ));
        assert!(log.substrate().get(types::THOUGHT_RECORDS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_distortion_record() {
        let (mut log, _) = create_test_log();
        log.save_distortion_record(
            NewDistortionRecord::new("I ruin everything")
                .distortion(CognitiveDistortion::AllOrNothing)
                .distortion(CognitiveDistortion::Catastrophizing)
                .reframed("One mistake is not everything"),
        )
        .unwrap();

        let records = log.distortion_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].selected_distortions,
            vec![
                CognitiveDistortion::AllOrNothing,
                CognitiveDistortion::Catastrophizing
            ]
        );
    }

    #[test]
    fn test_activity_plan() {
        let (mut log, _) = create_test_log();
        assert!(matches!(
            log.save_activity_plan(Vec::new()),
            Err(StoreError::Validation(ValidationError::NoActivities))
        ));
        assert!(matches!(
            log.save_activity_plan(vec![NewActivity::new("", "Monday")]),
            Err(StoreError::Validation(ValidationError::IncompleteActivity))
        ));

        let plan = log
            .save_activity_plan(vec![
                NewActivity::new("Walk", "Saturday 10am").description("Park loop"),
                NewActivity::new("Call a friend", "Sunday").completed(true),
            ])
            .unwrap();

        assert_eq!(plan.activities.len(), 2);
        assert_ne!(plan.activities[0].id, plan.activities[1].id);
        assert_eq!(plan.completed(), 1);
        assert_eq!(log.activity_plans().unwrap().len(), 1);
    }

    #[test]
    fn test_check_in_saved() {
        let (mut log, _) = create_test_log();

        let err = log.save_check_in(CheckIn::new()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptySession)
        ));

        let mut check_in = CheckIn::new();
        check_in.respond("Pretty good");
        let session = log.save_check_in(check_in).unwrap();

        assert_eq!(log.therapy_sessions().unwrap(), vec![session]);
    }

    #[test]
    fn test_counts_and_review() {
        let (mut log, clock) = create_test_log();
        log.save_thought_record(NewThoughtRecord::new("a", "b", "c"))
            .unwrap();
        clock.advance(1);
        log.save_thought_record(NewThoughtRecord::new("d", "e", "f"))
            .unwrap();
        log.save_activity_plan(vec![NewActivity::new("Walk", "Today")])
            .unwrap();

        let counts = log.counts().unwrap();
        assert_eq!(
            counts,
            ExerciseCounts {
                thought_records: 2,
                distortion_records: 0,
                behavioral_activation: 1,
                therapy_sessions: 0,
            }
        );

        assert!(matches!(
            log.save_review("  ", ""),
            Err(StoreError::Validation(ValidationError::EmptyReview))
        ));

        let text = generate_review(&counts);
        let review = log.save_review(text.clone(), "Weekly sessions").unwrap();
        assert_eq!(review.review, text);
        assert_eq!(review.data_analyzed, counts);
        assert_eq!(log.reviews().unwrap().len(), 1);
    }

    #[test]
    fn test_ids_unique_under_frozen_clock() {
        let (mut log, _) = create_test_log();
        let a = log
            .save_thought_record(NewThoughtRecord::new("a", "b", "c"))
            .unwrap();
        let b = log
            .save_thought_record(NewThoughtRecord::new("a", "b", "c"))
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reads_browser_collections() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("thoughtRecords.json"),
            r#"[{"situation":"Exam","emotion":"Fear","emotionIntensity":"8",
                "automaticThought":"I'll fail","evidence":"","alternativeThought":"",
                "id":1712345678901,"timestamp":"2024-04-05T19:34:38.901Z"}]"#,
        )
        .unwrap();

        let mut log = ExerciseLog::open(FileStore::open(dir.path()).unwrap());
        assert_eq!(log.thought_records().unwrap().len(), 1);

        // Appending upgrades the collection to the current envelope
        log.save_thought_record(NewThoughtRecord::new("a", "b", "c"))
            .unwrap();
        let raw = std::fs::read_to_string(dir.path().join("thoughtRecords.json")).unwrap();
        assert!(raw.starts_with("{\"format\":\"mindtrack\""));
        assert_eq!(log.thought_records().unwrap().len(), 2);
    }

    #[test]
    fn test_unreadable_collection_not_overwritten() {
        let mut substrate = MemoryStore::new();
        let legacy = r#"[{"situation":"Exam","emotion":"Fear","emotionIntensity":"8",
                "automaticThought":"I'll fail","id":1,"timestamp":1712345678000},
            {"situation":"Party","emotion":"Nervous","emotionIntensity":"7.5",
                "automaticThought":"Nobody likes me","id":2,"timestamp":1712345679000}]"#;
        substrate.set(types::THOUGHT_RECORDS_KEY, legacy).unwrap();
        let mut log = ExerciseLog::with_clock(substrate, Box::new(FixedClock::new(NOW)));

        assert!(log.thought_records().unwrap().is_empty());

        let err = log
            .save_thought_record(NewThoughtRecord::new("a", "b", "c"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Corruption { .. }));
        assert_eq!(
            log.substrate().get(types::THOUGHT_RECORDS_KEY).unwrap().as_deref(),
            Some(legacy)
        );

        // Other collections are unaffected
        log.save_activity_plan(vec![NewActivity::new("Walk", "Today")])
            .unwrap();
        assert_eq!(log.counts().unwrap().behavioral_activation, 1);
    }

    #[test]
    fn test_newer_format_collection_not_overwritten() {
        let mut substrate = MemoryStore::new();
        let future = r#"{"format":"mindtrack","version":3,"kind":"therapist-review","checksum":0,"entries":[]}"#;
        substrate.set(types::THERAPIST_REVIEWS_KEY, future).unwrap();
        let mut log = ExerciseLog::with_clock(substrate, Box::new(FixedClock::new(NOW)));

        let err = log.save_review("Fine week", "").unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedVersion { found: 3, .. }));
        assert_eq!(
            log.substrate().get(types::THERAPIST_REVIEWS_KEY).unwrap().as_deref(),
            Some(future)
        );
    }
}
