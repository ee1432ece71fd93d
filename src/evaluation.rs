//! Copy-out prompt for grading a mastery reflection with an external assistant.
//! The assistant's answer comes back only through manual feedback/status entry.

use crate::config::EvaluationPrompts;
use crate::domain::Lecture;
use crate::history::ReflectionAttempt;
use crate::util::fill_template;

pub fn evaluation_prompt(prompts: &EvaluationPrompts, lecture: &Lecture, attempt: &ReflectionAttempt) -> String {
  let addressed = attempt
    .prompt_ids
    .iter()
    .enumerate()
    .map(|(i, id)| {
      let text = lecture
        .reflection_prompt(id)
        .map(|p| p.text.as_str())
        .unwrap_or(prompts.unknown_prompt.as_str());
      format!("{}. {}", i + 1, text)
    })
    .collect::<Vec<_>>()
    .join("\n\n");

  fill_template(
    &prompts.template,
    &[
      ("prompts", addressed.as_str()),
      ("reflection", attempt.text.as_str()),
      ("criteria", lecture.prompts.ai_discussion.understanding.as_str()),
    ],
  )
  .trim()
  .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ReflectionKind, ReflectionPrompt};
  use crate::history::MasteryHistory;
  use chrono::Utc;

  #[test]
  fn prompt_lists_addressed_prompts_and_criteria() {
    let mut lecture = Lecture { id: "intro".into(), ..Default::default() };
    lecture.prompts.reflection.push(ReflectionPrompt {
      id: "m1".into(),
      text: "Compare Athens and Jerusalem.".into(),
      kind: ReflectionKind::Mastery,
      concepts: vec![],
    });
    lecture.prompts.ai_discussion.understanding = "Assess conceptual understanding.".into();

    let mut history = MasteryHistory::default();
    let attempt = history.record("My reflection.".into(), vec!["m1".into(), "gone".into()], Utc::now()).clone();

    let text = evaluation_prompt(&EvaluationPrompts::default(), &lecture, &attempt);
    assert!(text.starts_with("=== REFLECTION PROMPT(S) ===\n1. Compare Athens and Jerusalem.\n\n2. Unknown prompt"));
    assert!(text.contains("=== STUDENT REFLECTION ===\nMy reflection."));
    assert!(text.contains("=== EVALUATION CRITERIA ===\nAssess conceptual understanding."));
    assert!(text.ends_with("followed by detailed feedback."));
  }
}
