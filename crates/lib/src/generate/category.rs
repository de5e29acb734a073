//! Category selection shared by the patch and revert renderers.

use std::fmt::Write;

use crate::consts::CATEGORY_ALL;
use crate::definition::NamedPatch;

use super::shell::escape_double;

/// The set of category arguments that select a fragment.
///
/// Terms are kept in evaluation order: `all`, the short name, then the
/// definition's own categories, with duplicates removed. Blank terms are
/// dropped so an invocation without a category never selects a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelector {
  terms: Vec<String>,
}

impl CategorySelector {
  pub fn for_patch(def: &NamedPatch) -> Self {
    let mut terms: Vec<String> = Vec::with_capacity(def.patch.categories.len() + 2);
    let candidates = [CATEGORY_ALL, def.name_short.as_str()]
      .into_iter()
      .chain(def.patch.categories.iter().map(String::as_str));
    for term in candidates {
      if term.trim().is_empty() {
        continue;
      }
      if !terms.iter().any(|t| t == term) {
        terms.push(term.to_string());
      }
    }
    Self { terms }
  }

  pub fn terms(&self) -> &[String] {
    &self.terms
  }

  /// Whether a script invoked with `category` would run the fragment.
  pub fn matches(&self, category: &str) -> bool {
    self.terms.iter().any(|t| t == category)
  }

  /// Bash test expression, e.g. `[[ "$category" == "all" || "$category" == "sshd" ]]`.
  pub fn condition(&self) -> String {
    let mut out = String::from("[[");
    for (i, term) in self.terms.iter().enumerate() {
      if i > 0 {
        out.push_str(" ||");
      }
      // Writing to a String cannot fail.
      let _ = write!(out, r#" "$category" == "{}""#, escape_double(term));
    }
    out.push_str(" ]]");
    out
  }
}
