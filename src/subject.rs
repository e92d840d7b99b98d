//! Questionnaire attributes, the validated answer set, and the subject record.
//!
//! The input boundary lives here: raw key/value answers are validated once
//! (`1..=5`, integers only, offending key named on failure) and everything
//! downstream works with the closed [`Attribute`] enum. Unknown keys are
//! ignored; unanswered attributes default to 1.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::fact::{Fact, Metric};
use crate::level::StressLevel;
use crate::store::FactStore;

/// A questionnaire attribute. The set is fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// How often the subject feels anxious or tense.
    AnxietyLevel,
    /// Confidence in oneself (higher answer = better).
    SelfEsteem,
    /// History of mental health issues.
    MentalHealthHistory,
    /// How often the subject feels depressed or hopeless.
    Depression,
    /// Frequency of headaches.
    Headache,
    /// Recent blood pressure level.
    BloodPressure,
    /// Sleep quality (higher answer = worse).
    SleepQuality,
    /// Breathing difficulties.
    BreathingProblem,
    /// Irritability.
    Irritability,
    /// Noise in the living or study environment.
    NoiseLevel,
    /// Comfort of living conditions.
    LivingConditions,
    /// Perceived safety of the environment.
    Safety,
    /// Whether basic needs are supported.
    BasicNeeds,
    /// Satisfaction with academic performance.
    AcademicPerformance,
    /// Heaviness of the study load.
    StudyLoad,
    /// Relationship with teachers.
    TeacherStudentRelationship,
    /// Worry about the future career.
    FutureCareerConcerns,
    /// Amount of social support received.
    SocialSupport,
    /// Strength of peer pressure felt.
    PeerPressure,
    /// Participation in extracurricular activities.
    ExtracurricularActivities,
    /// Experience of bullying.
    Bullying,
}

impl Attribute {
    /// Every questionnaire attribute.
    pub const ALL: [Self; 21] = [
        Self::AnxietyLevel,
        Self::SelfEsteem,
        Self::MentalHealthHistory,
        Self::Depression,
        Self::Headache,
        Self::BloodPressure,
        Self::SleepQuality,
        Self::BreathingProblem,
        Self::Irritability,
        Self::NoiseLevel,
        Self::LivingConditions,
        Self::Safety,
        Self::BasicNeeds,
        Self::AcademicPerformance,
        Self::StudyLoad,
        Self::TeacherStudentRelationship,
        Self::FutureCareerConcerns,
        Self::SocialSupport,
        Self::PeerPressure,
        Self::ExtracurricularActivities,
        Self::Bullying,
    ];

    /// The five core attributes used for the `overall` stress score.
    pub const CORE: [Self; 5] = [
        Self::AnxietyLevel,
        Self::SelfEsteem,
        Self::Depression,
        Self::SleepQuality,
        Self::StudyLoad,
    ];

    /// Canonical snake_case key, as used in the input mapping.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AnxietyLevel => "anxiety_level",
            Self::SelfEsteem => "self_esteem",
            Self::MentalHealthHistory => "mental_health_history",
            Self::Depression => "depression",
            Self::Headache => "headache",
            Self::BloodPressure => "blood_pressure",
            Self::SleepQuality => "sleep_quality",
            Self::BreathingProblem => "breathing_problem",
            Self::Irritability => "irritability",
            Self::NoiseLevel => "noise_level",
            Self::LivingConditions => "living_conditions",
            Self::Safety => "safety",
            Self::BasicNeeds => "basic_needs",
            Self::AcademicPerformance => "academic_performance",
            Self::StudyLoad => "study_load",
            Self::TeacherStudentRelationship => "teacher_student_relationship",
            Self::FutureCareerConcerns => "future_career_concerns",
            Self::SocialSupport => "social_support",
            Self::PeerPressure => "peer_pressure",
            Self::ExtracurricularActivities => "extracurricular_activities",
            Self::Bullying => "bullying",
        }
    }

    /// Looks up an attribute by key. Unknown keys yield `None`.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == key)
    }

    /// Returns true for attributes where a higher answer means a better
    /// state, so the stress score is the reversed answer (`6 - v`).
    #[must_use]
    pub const fn is_positively_phrased(&self) -> bool {
        matches!(self, Self::SelfEsteem | Self::SleepQuality)
    }

    /// The symptom fact asserted for an answer to this attribute, if any.
    ///
    /// High answers (4-5) map most attributes to a symptom; for
    /// `social_support` and `peer_pressure` it is the low answers (1-2)
    /// that indicate withdrawal or minor worry.
    #[must_use]
    pub const fn symptom_for(&self, answer: i64) -> Option<Fact> {
        match self {
            Self::SleepQuality if answer >= 4 => Some(Fact::PoorSleep),
            Self::Irritability if answer >= 4 => Some(Fact::Irritability),
            Self::StudyLoad if answer >= 4 => Some(Fact::DeadlinePressure),
            Self::Depression if answer >= 4 => Some(Fact::PersistentFatigue),
            Self::AcademicPerformance if answer >= 4 => Some(Fact::DifficultyConcentrating),
            Self::BasicNeeds if answer >= 4 => Some(Fact::SkipMeals),
            Self::AnxietyLevel if answer >= 4 => Some(Fact::RacingThoughts),
            Self::FutureCareerConcerns if answer >= 4 => Some(Fact::Procrastination),
            Self::SocialSupport if answer <= 2 => Some(Fact::SocialWithdrawal),
            Self::PeerPressure if answer <= 2 => Some(Fact::MinorWorryOnly),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named explanation buckets for the screening evaluator.
///
/// Sections serialize under their display names, so the keys of
/// `section_explanations` render directly ("Mental State", not a code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Anxiety, depression, self-esteem, history.
    #[serde(rename = "Mental State")]
    MentalState,
    /// Headache, sleep, breathing, blood pressure.
    #[serde(rename = "Physical Symptoms")]
    PhysicalSymptoms,
    /// Noise, living conditions, safety, basic needs.
    #[serde(rename = "Environmental Factors")]
    EnvironmentalFactors,
    /// Study load, performance, career concerns.
    #[serde(rename = "Academic Pressure")]
    AcademicPressure,
    /// Support, peer pressure, bullying.
    #[serde(rename = "Social Support")]
    SocialSupport,
}

impl Section {
    /// All sections, in display order.
    pub const ALL: [Self; 5] = [
        Self::MentalState,
        Self::PhysicalSymptoms,
        Self::EnvironmentalFactors,
        Self::AcademicPressure,
        Self::SocialSupport,
    ];

    /// Display name, as rendered to callers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MentalState => "Mental State",
            Self::PhysicalSymptoms => "Physical Symptoms",
            Self::EnvironmentalFactors => "Environmental Factors",
            Self::AcademicPressure => "Academic Pressure",
            Self::SocialSupport => "Social Support",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest answer value.
pub const MAX_ANSWER: i64 = 5;

/// A validated set of questionnaire answers.
///
/// # Examples
///
/// ```
/// use stresslens::{Attribute, ResponseSet};
///
/// let responses = ResponseSet::from_pairs([("sleep_quality", 5), ("study_load", 4)]).unwrap();
/// assert_eq!(responses.answer(Attribute::SleepQuality), 5);
/// // Unanswered attributes default to 1.
/// assert_eq!(responses.answer(Attribute::Bullying), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSet {
    answers: BTreeMap<Attribute, i64>,
}

impl ResponseSet {
    /// Creates an empty response set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses answers from key/value pairs.
    ///
    /// Unknown keys are ignored; out-of-range values are rejected with the
    /// offending key named.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let Some(attribute) = Attribute::from_key(key) else {
                continue;
            };
            if !(1..=MAX_ANSWER).contains(&value) {
                return Err(ValidationError::AnswerOutOfRange {
                    key: key.to_string(),
                    value,
                });
            }
            set.answers.insert(attribute, value);
        }
        Ok(set)
    }

    /// Parses answers from a JSON object of question keys to integers.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
        let mut pairs = Vec::with_capacity(object.len());
        for (key, raw) in object {
            if Attribute::from_key(key).is_none() {
                continue;
            }
            let Some(answer) = raw.as_i64() else {
                return Err(ValidationError::AnswerNotInteger { key: key.clone() });
            };
            pairs.push((key.clone(), answer));
        }
        Self::from_pairs(pairs)
    }

    /// Records an answer for one attribute.
    pub fn set(&mut self, attribute: Attribute, value: i64) -> Result<(), ValidationError> {
        if !(1..=MAX_ANSWER).contains(&value) {
            return Err(ValidationError::AnswerOutOfRange {
                key: attribute.as_str().to_string(),
                value,
            });
        }
        self.answers.insert(attribute, value);
        Ok(())
    }

    /// The answer for an attribute, defaulting to 1 when unanswered.
    #[must_use]
    pub fn answer(&self, attribute: Attribute) -> i64 {
        self.answers.get(&attribute).copied().unwrap_or(1)
    }

    /// The answer actually provided, if any.
    #[must_use]
    pub fn provided(&self, attribute: Attribute) -> Option<i64> {
        self.answers.get(&attribute).copied()
    }

    /// Number of answered attributes.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// Sum of the provided answers only.
    #[must_use]
    pub fn provided_total(&self) -> i64 {
        self.answers.values().sum()
    }

    /// Sum over all attributes with unanswered ones defaulted to 1.
    #[must_use]
    pub fn defaulted_total(&self) -> i64 {
        Attribute::ALL.iter().map(|&a| self.answer(a)).sum()
    }

    /// Maximum attainable answer sum over the full attribute set.
    #[must_use]
    pub const fn max_total() -> i64 {
        Attribute::ALL.len() as i64 * MAX_ANSWER
    }

    /// Stress-adjusted score for one attribute (positively phrased
    /// attributes are reversed).
    #[must_use]
    pub fn stress_score(&self, attribute: Attribute) -> i64 {
        let answer = self.answer(attribute);
        if attribute.is_positively_phrased() {
            MAX_ANSWER + 1 - answer
        } else {
            answer
        }
    }

    /// Mean stress-adjusted score over the answered core attributes, or
    /// `None` when no core question was answered.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn overall_core_score(&self) -> Option<f64> {
        let answered: Vec<Attribute> = Attribute::CORE
            .iter()
            .copied()
            .filter(|&a| self.provided(a).is_some())
            .collect();
        if answered.is_empty() {
            return None;
        }
        let sum: i64 = answered.iter().map(|&a| self.stress_score(a)).sum();
        Some(sum as f64 / answered.len() as f64)
    }

    /// Populates a fresh fact store: one symptom fact per mapped answer,
    /// plus the score metrics read by the aggregate and fallback layers.
    #[must_use]
    pub fn to_fact_store(&self) -> FactStore {
        let mut store = FactStore::new();
        for (&attribute, &answer) in &self.answers {
            if let Some(fact) = attribute.symptom_for(answer) {
                store.assert_fact(fact);
            }
        }
        #[allow(clippy::cast_precision_loss)]
        store.assert_metric(Metric::TotalScore, self.provided_total() as f64);
        #[allow(clippy::cast_precision_loss)]
        store.assert_metric(Metric::MaxScore, Self::max_total() as f64);
        if let Some(overall) = self.overall_core_score() {
            store.assert_metric(Metric::Overall, overall);
        }
        store
    }
}

/// The typed attribute view of one respondent, mutated by the screening
/// evaluator as its rules fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// The validated answers this record was built from.
    pub responses: ResponseSet,
    /// Classification accumulated by the evaluator's overall-score rule.
    pub classification: StressLevel,
    /// Explanation strings, bucketed by section.
    pub sections: BTreeMap<Section, Vec<String>>,
}

impl SubjectRecord {
    /// Creates a record from validated answers, with every section bucket
    /// present and empty.
    #[must_use]
    pub fn new(responses: ResponseSet) -> Self {
        let sections = Section::ALL.iter().map(|&s| (s, Vec::new())).collect();
        Self {
            responses,
            classification: StressLevel::Undetermined,
            sections,
        }
    }

    /// The (defaulted) answer for an attribute.
    #[must_use]
    pub fn answer(&self, attribute: Attribute) -> i64 {
        self.responses.answer(attribute)
    }

    /// Appends an explanation to a section bucket.
    pub fn flag(&mut self, section: Section, note: impl Into<String>) {
        self.sections.entry(section).or_default().push(note.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_round_trip() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_key(attribute.as_str()), Some(attribute));
        }
        assert_eq!(Attribute::from_key("shoe_size"), None);
    }

    #[test]
    fn unknown_keys_ignored() {
        let set = ResponseSet::from_pairs([("shoe_size", 99), ("bullying", 4)]).unwrap();
        assert_eq!(set.answered(), 1);
        assert_eq!(set.answer(Attribute::Bullying), 4);
    }

    #[test]
    fn out_of_range_rejected_with_key() {
        let err = ResponseSet::from_pairs([("headache", 6)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::AnswerOutOfRange {
                key: "headache".to_string(),
                value: 6
            }
        );
    }

    #[test]
    fn json_boundary_rejects_non_integers() {
        let raw = serde_json::json!({"sleep_quality": "often"});
        let err = ResponseSet::from_json(&raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::AnswerNotInteger {
                key: "sleep_quality".to_string()
            }
        );

        let err = ResponseSet::from_json(&serde_json::json!([1, 2])).unwrap_err();
        assert_eq!(err, ValidationError::NotAnObject);
    }

    #[test]
    fn json_boundary_accepts_valid_object() {
        let raw = serde_json::json!({"sleep_quality": 5, "study_load": 4, "unknown": 3});
        let set = ResponseSet::from_json(&raw).unwrap();
        assert_eq!(set.answered(), 2);
        assert_eq!(set.answer(Attribute::SleepQuality), 5);
    }

    #[test]
    fn symptom_mapping_thresholds() {
        assert_eq!(
            Attribute::SleepQuality.symptom_for(4),
            Some(Fact::PoorSleep)
        );
        assert_eq!(Attribute::SleepQuality.symptom_for(3), None);
        assert_eq!(
            Attribute::SocialSupport.symptom_for(2),
            Some(Fact::SocialWithdrawal)
        );
        assert_eq!(Attribute::SocialSupport.symptom_for(3), None);
        assert_eq!(
            Attribute::PeerPressure.symptom_for(1),
            Some(Fact::MinorWorryOnly)
        );
        assert_eq!(Attribute::Headache.symptom_for(5), None);
    }

    #[test]
    fn positively_phrased_scores_reverse() {
        let set = ResponseSet::from_pairs([("self_esteem", 5), ("anxiety_level", 5)]).unwrap();
        assert_eq!(set.stress_score(Attribute::SelfEsteem), 1);
        assert_eq!(set.stress_score(Attribute::AnxietyLevel), 5);
    }

    #[test]
    fn overall_core_score_only_over_answered() {
        let set = ResponseSet::from_pairs([("sleep_quality", 5), ("study_load", 5)]).unwrap();
        // sleep_quality reversed to 1, study_load stays 5.
        assert_eq!(set.overall_core_score(), Some(3.0));

        let empty = ResponseSet::new();
        assert_eq!(empty.overall_core_score(), None);
    }

    #[test]
    fn fact_store_population() {
        let set = ResponseSet::from_pairs([
            ("sleep_quality", 5),
            ("irritability", 5),
            ("study_load", 5),
        ])
        .unwrap();
        let store = set.to_fact_store();

        assert!(store.has_fact(Fact::PoorSleep));
        assert!(store.has_fact(Fact::Irritability));
        assert!(store.has_fact(Fact::DeadlinePressure));
        assert_eq!(store.metric(Metric::TotalScore), Some(15.0));
        assert_eq!(store.metric(Metric::MaxScore), Some(105.0));
        assert_eq!(store.metric(Metric::Overall), Some(3.0));
    }

    #[test]
    fn empty_input_produces_no_facts_and_no_overall() {
        let store = ResponseSet::new().to_fact_store();
        assert!(store.is_empty());
        assert_eq!(store.metric(Metric::TotalScore), Some(0.0));
        assert_eq!(store.metric(Metric::Overall), None);
    }

    #[test]
    fn record_starts_with_empty_sections() {
        let record = SubjectRecord::new(ResponseSet::new());
        assert_eq!(record.sections.len(), Section::ALL.len());
        assert!(record.sections.values().all(Vec::is_empty));
        assert_eq!(record.classification, StressLevel::Undetermined);
    }

    #[test]
    fn sections_serialize_under_display_names() {
        let json = serde_json::to_string(&Section::MentalState).unwrap();
        assert_eq!(json, "\"Mental State\"");
        let back: Section = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Section::MentalState);

        for section in Section::ALL {
            let json = serde_json::to_value(section).unwrap();
            assert_eq!(json, section.as_str());
        }
    }

    #[test]
    fn defaulted_total_counts_every_attribute() {
        let set = ResponseSet::from_pairs([("bullying", 5)]).unwrap();
        // 20 defaults of 1 plus the answered 5.
        assert_eq!(set.defaulted_total(), 25);
        assert_eq!(ResponseSet::max_total(), 105);
    }
}
