use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;
use crate::model::{Category, FaqEntry};

/// Directory of per-category flat files (`hr_faq.txt`, `finance_faq.txt`, `it_faq.txt`).
#[derive(Debug, Clone)]
pub struct FaqStore {
    root: PathBuf,
}

impl FaqStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.root.join(format!("{}_faq.txt", category.slug()))
    }

    /// Reads the category file fresh. `Ok(None)` when the file does not exist.
    pub async fn load(&self, category: Category) -> Result<Option<Vec<FaqEntry>>> {
        let path = self.path_for(category);
        debug!(category = %category, path = %path.display(), "loading faq store");

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(parse_entries(&text))),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no faq store for category");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Parses `Q:` / `A:` line pairs. The `Q:` marker is case-insensitive, the `A:`
/// marker is not. A question without an answer on the very next line is dropped.
pub fn parse_entries(text: &str) -> Vec<FaqEntry> {
    let lines: Vec<&str> = text.lines().collect();
    let mut entries = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(question) = strip_question_marker(line) else {
            continue;
        };
        let Some(answer) = lines.get(idx + 1).and_then(|next| next.strip_prefix("A:")) else {
            debug!(line = idx + 1, "skipping question without answer line");
            continue;
        };
        entries.push(FaqEntry {
            line: idx + 1,
            question: question.trim().to_string(),
            answer: answer.trim().to_string(),
        });
    }

    entries
}

fn strip_question_marker(line: &str) -> Option<&str> {
    let marker = line.get(..2)?;
    marker.eq_ignore_ascii_case("q:").then(|| &line[2..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_question_answer_pairs() {
        let text = "Q: When is salary credited?\nA: On the 1st.\nq: lower marker?\nA: still works\n";
        let entries = parse_entries(text);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, 1);
        assert_eq!(entries[0].question, "When is salary credited?");
        assert_eq!(entries[0].answer, "On the 1st.");
        assert_eq!(entries[1].line, 3);
        assert_eq!(entries[1].question, "lower marker?");
    }

    #[test]
    fn skips_malformed_entries() {
        let text = "Q: orphan question\nQ: second\na: wrong case answer\nQ: good\nA: yes\nA: stray answer\nQ: last line question";
        let entries = parse_entries(text);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].question, "good");
        assert_eq!(entries[0].answer, "yes");
    }

    #[test]
    fn tolerates_crlf_and_blank_lines() {
        let text = "\r\nQ: one\r\nA: first\r\n\r\nQ: two\r\nA: second\r\n";
        let entries = parse_entries(text);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].answer, "second");
    }

    #[test]
    fn marker_check_is_utf8_safe() {
        assert!(parse_entries("é\nA: x").is_empty());
    }

    #[tokio::test]
    async fn missing_store_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FaqStore::new(dir.path());
        assert!(store.load(Category::It).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn loads_category_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("finance_faq.txt"), "Q: a\nA: b\n").unwrap();
        let store = FaqStore::new(dir.path());

        let entries = store.load(Category::Finance).await.unwrap().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.path_for(Category::Hr), dir.path().join("hr_faq.txt"));
    }
}
