//! Built-in curriculum content so the service is useful without a config file.

use crate::domain::{
  AiDiscussion, ConceptNode, Lecture, LecturePrompts, Question, ReadingMaterials, ReflectionKind,
  ReflectionPrompt,
};

pub const INTRO_LECTURE_ID: &str = "intro-philosophy-problems-and-scope";

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn question(id: &str, text: &str, concepts: &[&str]) -> Question {
  Question { id: id.into(), text: text.into(), concepts: strings(concepts), prerequisites: vec![] }
}

fn reflection(id: &str, kind: ReflectionKind, text: &str) -> ReflectionPrompt {
  ReflectionPrompt { id: id.into(), text: text.into(), kind, concepts: vec![] }
}

fn concept(id: &str, name: &str) -> ConceptNode {
  ConceptNode {
    id: id.into(),
    name: name.into(),
    related_concepts: vec![],
    lectures: vec![INTRO_LECTURE_ID.into()],
  }
}

pub fn seed_lectures() -> Vec<Lecture> {
  vec![Lecture {
    id: INTRO_LECTURE_ID.into(),
    title: "Introduction to the Problems and Scope of Philosophy".into(),
    video_url: "https://youtu.be/8ZoQ7wh9pSQ".into(),
    prerequisites: vec![],
    reading_materials: ReadingMaterials::default(),
    prompts: LecturePrompts {
      readiness: vec![
        question(
          "b2386a68-abe7-4f8b-b9d6-d0325c203f89",
          "What do you think is the fundamental nature of reality? Is it purely physical, or might there be something beyond the material world?",
          &["Ontology", "Metaphysics"],
        ),
        question(
          "c127073c-728b-4620-ac6a-6ae1a56d837e",
          "Do you tend to approach life's big questions through rational analysis, religious faith, or a combination of both? What influences your approach?",
          &["Epistemology", "Logos", "Rationality", "Faith", "Religious belief"],
        ),
        question(
          "59e671e5-28eb-4708-8ca6-3cd8179a4bbe",
          "When facing challenges or exploring the unknown, do you value human independence and innovation, or do you place more importance on faith, patience, and acceptance? Why?",
          &["Ethics", "Human nature", "Free will"],
        ),
      ],
      during: vec![],
      reflection: vec![
        reflection(
          "b65d76d5-812b-4f68-b864-1e36b1810fe8",
          ReflectionKind::Mastery,
          "Explain the difference between one-world and two-world ontological positions in philosophy. Identify which philosophical concepts (such as ethics, epistemology, etc.) are influenced by these positions, and how a philosopher's stance on this fundamental question shapes their overall philosophical system.",
        ),
        reflection(
          "3dc3ee8c-bd99-47d7-819b-da3b79ba0444",
          ReflectionKind::Mastery,
          "Compare and contrast the \"Athens\" and \"Jerusalem\" traditions in Western philosophy. Describe how each tradition approaches the concept of logos, their characteristic virtues, and provide an example of how these traditions might differ in their approach to a philosophical question (such as \"What is the good life?\").",
        ),
        reflection(
          "0e9fdd79-cc32-48a3-94b2-5714c7f43a6f",
          ReflectionKind::Mastery,
          "Choose three philosophical terms introduced in this lecture (such as epistemology, ontology, metaphysics, etc.) and explain how they relate to one another. Then, describe how a specific philosophical problem might be approached using these concepts.",
        ),
        reflection(
          "c50748b9-ebbb-4fd2-b49d-e29c824f08d8",
          ReflectionKind::Initial,
          "What aspects of philosophy discussed in this lecture remind you of ideas or questions you've encountered in your own life? Which philosophical concept from the lecture surprised you the most, and why? Which of the philosophical areas mentioned are you most curious to explore further?",
        ),
      ],
      ai_discussion: AiDiscussion {
        understanding: "You are a philosophy education assistant evaluating my understanding of an introductory philosophy lecture. Please assess my answers on the following criteria and provide a pass/fail recommendation:\n\nConceptual Understanding: Have I correctly explained the one-world vs. two-world ontological positions and the Athens vs. Jerusalem traditions?\nConcept Relationships: Have I accurately described three philosophical concepts from the lecture and shown how they relate to each other?\nDepth of Analysis: Have I gone beyond simple definitions?\n\nIf my understanding is insufficient, identify specific gaps, ask 2-3 probing questions, and suggest which concepts to revisit. If it is sufficient, highlight the strengths, suggest one area to deepen, and confirm I'm ready for the next lecture.".into(),
        exploration: "Explain the difference between one-world and two-world ontological positions in Western philosophy. Compare and contrast the \"Athens\" and \"Jerusalem\" traditions. Choose three philosophical concepts introduced in this lecture and explain how they relate to each other.".into(),
      },
    },
    concepts: vec![concept("metaphysics", "Metaphysics"), concept("ontology", "Ontology")],
  }]
}
