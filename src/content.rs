//! Read-only lecture catalog: built-in seeds, the config bank, and lectures
//! saved through authoring.

use std::collections::{BTreeMap, HashSet};

use crate::domain::Lecture;

#[derive(Clone, Debug, Default)]
pub struct Catalog {
  lectures: BTreeMap<String, Lecture>,
}

impl Catalog {
  pub fn new(lectures: impl IntoIterator<Item = Lecture>) -> Self {
    let mut catalog = Self::default();
    for l in lectures {
      catalog.insert(l);
    }
    catalog
  }

  /// Add or replace a lecture by id.
  pub fn insert(&mut self, lecture: Lecture) {
    self.lectures.insert(lecture.id.clone(), lecture);
  }

  pub fn get(&self, id: &str) -> Option<&Lecture> {
    self.lectures.get(id)
  }

  pub fn len(&self) -> usize {
    self.lectures.len()
  }

  /// Prerequisites first, otherwise id order. Unknown prerequisite ids are
  /// skipped and cycles are cut where first revisited.
  pub fn in_order(&self) -> Vec<&Lecture> {
    let mut sorted = Vec::with_capacity(self.lectures.len());
    let mut visited = HashSet::new();
    for lecture in self.lectures.values() {
      self.visit(lecture, &mut visited, &mut sorted);
    }
    sorted
  }

  fn visit<'a>(&'a self, lecture: &'a Lecture, visited: &mut HashSet<&'a str>, sorted: &mut Vec<&'a Lecture>) {
    if !visited.insert(lecture.id.as_str()) {
      return;
    }
    for prereq in &lecture.prerequisites {
      if let Some(p) = self.lectures.get(prereq) {
        self.visit(p, visited, sorted);
      }
    }
    sorted.push(lecture);
  }
}
