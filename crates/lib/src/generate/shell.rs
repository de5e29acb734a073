//! Quoting helpers for emitting bash.

/// Escape a value for use inside a double-quoted bash string.
pub fn escape_double(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    if matches!(c, '\\' | '"' | '$' | '`') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// Escape a value for use inside a single-quoted bash string.
pub fn escape_single(value: &str) -> String {
  value.replace('\'', r"'\''")
}

/// Escape a literal for use as a sed basic regular expression with `/` delimiters.
pub fn escape_sed_pattern(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for c in value.chars() {
    if matches!(c, '\\' | '/' | '.' | '*' | '[' | ']' | '^' | '$') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// Prefix every line of `text` with `prefix`, dropping trailing newlines first.
pub fn comment_lines(text: &str, prefix: &str) -> String {
  text
    .trim_end_matches('\n')
    .split('\n')
    .map(|line| format!("{}{}", prefix, line).trim_end().to_string())
    .collect::<Vec<_>>()
    .join("\n")
}
