//! Lecture content models: readings, prompts, concept graph, and curriculum categories.
//!
//! Field names serialize in camelCase so stored records keep the shape the
//! front end reads and writes.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub author: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub focus: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub passages: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub chapters: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReadingMaterials {
  #[serde(default)] pub required: Vec<Reading>,
  #[serde(default)] pub supplementary: Vec<Reading>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub bible_passages: Vec<String>,
}

/// Readiness question answered before the lecture is unlocked.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  #[serde(default)] pub id: String,
  pub text: String,
  /// Concept tags this question probes. Free-form, not checked against the concept graph.
  #[serde(default)] pub concepts: Vec<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub prerequisites: Vec<String>,
}

/// In-video focus point.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchPoint {
  pub timestamp: String,
  pub focus: String,
  pub prompt: String,
  #[serde(default)] pub concepts: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
  #[default]
  Initial,
  Mastery,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionPrompt {
  #[serde(default)] pub id: String,
  pub text: String,
  #[serde(rename = "type", default)] pub kind: ReflectionKind,
  #[serde(default)] pub concepts: Vec<String>,
}

/// Text pasted into an external AI assistant. `understanding` doubles as the
/// grading criteria for mastery reflections.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiDiscussion {
  #[serde(default)] pub understanding: String,
  #[serde(default)] pub exploration: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LecturePrompts {
  #[serde(default)] pub readiness: Vec<Question>,
  #[serde(default)] pub during: Vec<WatchPoint>,
  #[serde(default)] pub reflection: Vec<ReflectionPrompt>,
  #[serde(default)] pub ai_discussion: AiDiscussion,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
  BuildsOn,
  ContrastsWith,
  SimilarTo,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedConcept {
  pub concept_id: String,
  pub relationship: Relationship,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
  pub id: String,
  pub name: String,
  #[serde(default)] pub related_concepts: Vec<RelatedConcept>,
  /// Lecture ids where this concept appears.
  #[serde(default)] pub lectures: Vec<String>,
}

/// Immutable lecture definition served by the catalog.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
  pub id: String,
  pub title: String,
  pub video_url: String,
  #[serde(default)] pub prerequisites: Vec<String>,
  #[serde(default)] pub reading_materials: ReadingMaterials,
  #[serde(default)] pub prompts: LecturePrompts,
  #[serde(default)] pub concepts: Vec<ConceptNode>,
}

impl Lecture {
  pub fn mastery_prompts(&self) -> impl Iterator<Item = &ReflectionPrompt> {
    self.prompts.reflection.iter().filter(|p| p.kind == ReflectionKind::Mastery)
  }

  pub fn reflection_prompt(&self, id: &str) -> Option<&ReflectionPrompt> {
    self.prompts.reflection.iter().find(|p| p.id == id)
  }
}

/// Curriculum section an authored lecture is filed under.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LectureCategory {
  #[default]
  Introductions,
  Jerusalem,
  AthensToRome,
  MedievalRenaissance,
  EarlyModernity,
  Modernity,
  NineteenthCentury,
  Contemporary,
  Conclusions,
}

impl LectureCategory {
  pub const ALL: [LectureCategory; 9] = [
    LectureCategory::Introductions,
    LectureCategory::Jerusalem,
    LectureCategory::AthensToRome,
    LectureCategory::MedievalRenaissance,
    LectureCategory::EarlyModernity,
    LectureCategory::Modernity,
    LectureCategory::NineteenthCentury,
    LectureCategory::Contemporary,
    LectureCategory::Conclusions,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      LectureCategory::Introductions => "introductions",
      LectureCategory::Jerusalem => "jerusalem",
      LectureCategory::AthensToRome => "athens_to_rome",
      LectureCategory::MedievalRenaissance => "medieval_renaissance",
      LectureCategory::EarlyModernity => "early_modernity",
      LectureCategory::Modernity => "modernity",
      LectureCategory::NineteenthCentury => "nineteenth_century",
      LectureCategory::Contemporary => "contemporary",
      LectureCategory::Conclusions => "conclusions",
    }
  }
}
