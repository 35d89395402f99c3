use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Maps every physical line of the expanded source back to the file and
/// local line number it came from (§4.2).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginMap {
  entries: Vec<(String, usize)>,
}

impl OriginMap {
  pub fn origin_of(&self, expanded_line: usize) -> Option<(&str, usize)> {
    self.entries.get(expanded_line).map(|(f, l)| (f.as_str(), *l))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

const BEGIN_PREFIX: &str = "/* begin import: ";
const END_PREFIX: &str = "/* end import: ";
const SENTINEL_SUFFIX: &str = " */";

fn begin_sentinel(canonical_path: &str) -> String {
  format!("{}{}{}", BEGIN_PREFIX, canonical_path, SENTINEL_SUFFIX)
}

fn end_sentinel(canonical_path: &str) -> String {
  format!("{}{}{}", END_PREFIX, canonical_path, SENTINEL_SUFFIX)
}

/// The four directive spellings recognized after left-trimming a line.
const DIRECTIVE_PREFIXES: [&str; 4] = ["use \"", "import \"", "include \"", "#include \""];

fn include_path(trimmed: &str) -> Option<&str> {
  for prefix in DIRECTIVE_PREFIXES {
    if let Some(rest) = trimmed.strip_prefix(prefix) {
      if let Some(end) = rest.find('"') {
        return Some(&rest[..end]);
      }
    }
  }
  None
}

/// Recursively expands textual includes starting from `root`, returning the
/// fully spliced source text and its origin map. Missing/unreadable included
/// files are skipped (best effort); a file already being visited is skipped
/// silently to break cycles (§4.2 "Failure").
pub fn expand_includes(root: &Path) -> (String, OriginMap) {
  let mut visiting = HashSet::new();
  let canonical_root = canonicalize_lossy(root);
  visiting.insert(canonical_root.clone());

  let text = fs::read_to_string(root).unwrap_or_default();
  let lines = expand_lines(&text, root, &mut visiting);

  let origin = build_origin_map(&lines, &canonical_root);
  (lines.join("\n"), origin)
}

fn canonicalize_lossy(path: &Path) -> String {
  fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()).to_string_lossy().into_owned()
}

fn expand_lines(text: &str, file: &Path, visiting: &mut HashSet<String>) -> Vec<String> {
  let dir = file.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
  let mut out = Vec::new();

  for line in text.lines() {
    let trimmed = line.trim_start();
    match include_path(trimmed) {
      Some(rel_path) => {
        let included = dir.join(rel_path);
        let canonical = canonicalize_lossy(&included);
        if visiting.contains(&canonical) {
          log::warn!("include cycle detected, skipping {}", canonical);
          continue;
        }
        visiting.insert(canonical.clone());
        let child_text = fs::read_to_string(&included).unwrap_or_default();
        let child_lines = expand_lines(&child_text, &included, visiting);
        visiting.remove(&canonical);

        out.push(begin_sentinel(&canonical));
        out.extend(child_lines);
        out.push(end_sentinel(&canonical));
      }
      None => out.push(line.to_string()),
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn splices_included_file_with_sentinels() {
    let dir = tempfile::tempdir().unwrap();
    let child_path = dir.path().join("child.cb");
    std::fs::write(&child_path, "print 1\n").unwrap();

    let root_path = dir.path().join("root.cb");
    let mut f = std::fs::File::create(&root_path).unwrap();
    writeln!(f, "use \"child.cb\"").unwrap();
    writeln!(f, "print 2").unwrap();
    drop(f);

    let (text, origin) = expand_includes(&root_path);
    assert!(text.contains("begin import"));
    assert!(text.contains("print 1"));
    assert!(text.contains("end import"));
    assert!(text.contains("print 2"));
    assert_eq!(origin.len(), text.lines().count());
  }

  #[test]
  fn missing_include_yields_empty_body_not_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let root_path = dir.path().join("root.cb");
    std::fs::write(&root_path, "import \"missing.cb\"\nprint 1\n").unwrap();

    let (text, _origin) = expand_includes(&root_path);
    assert!(text.contains("print 1"));
  }

  #[test]
  fn self_include_cycle_is_silently_broken() {
    let dir = tempfile::tempdir().unwrap();
    let root_path = dir.path().join("root.cb");
    std::fs::write(&root_path, "include \"root.cb\"\nprint 1\n").unwrap();

    let (text, _origin) = expand_includes(&root_path);
    assert!(text.contains("print 1"));
  }

  #[test]
  fn origin_map_reconstructs_local_line_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let child_path = dir.path().join("child.cb");
    std::fs::write(&child_path, "a\nb\nc\n").unwrap();
    let root_path = dir.path().join("root.cb");
    std::fs::write(&root_path, "use \"child.cb\"\nafter\n").unwrap();

    let (text, origin) = expand_includes(&root_path);
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
      if *line == "b" {
        let (_, local_line) = origin.origin_of(i).unwrap();
        assert_eq!(local_line, 2);
      }
    }
  }
}

fn build_origin_map(lines: &[String], root_canonical: &str) -> OriginMap {
  let mut stack: Vec<(String, usize)> = vec![(root_canonical.to_string(), 0)];
  let mut entries = Vec::with_capacity(lines.len());

  for line in lines {
    if let Some(path) = line.strip_prefix(BEGIN_PREFIX).and_then(|s| s.strip_suffix(SENTINEL_SUFFIX)) {
      stack.push((path.to_string(), 0));
      let top = stack.last().unwrap();
      entries.push(top.clone());
    } else if line.strip_prefix(END_PREFIX).and_then(|s| s.strip_suffix(SENTINEL_SUFFIX)).is_some() {
      let top = stack.last().unwrap().clone();
      entries.push(top);
      if stack.len() > 1 {
        stack.pop();
      }
    } else {
      let top = stack.last_mut().unwrap();
      top.1 += 1;
      entries.push(top.clone());
    }
  }

  OriginMap { entries }
}
