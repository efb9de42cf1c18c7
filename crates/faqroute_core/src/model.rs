use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FaqError;

/// Department a question is routed to. `Hr` is the catch-all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "HR")]
    Hr,
    #[serde(rename = "Finance")]
    Finance,
    #[serde(rename = "IT")]
    It,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Hr, Category::Finance, Category::It];

    pub fn label(self) -> &'static str {
        match self {
            Category::Hr => "HR",
            Category::Finance => "Finance",
            Category::It => "IT",
        }
    }

    /// Lower-case name used for store file names.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Hr => "hr",
            Category::Finance => "finance",
            Category::It => "it",
        }
    }

    /// Maps a free-text model reply onto a category. Total: anything that names
    /// neither Finance nor IT is HR.
    ///
    /// Finance wins whenever "finance" appears anywhere in the reply. IT needs the
    /// whole word "it" (or "information technology") so that words like "digital"
    /// or "submit" do not route to IT.
    pub fn from_reply(reply: &str) -> Category {
        let lower = reply.to_lowercase();
        if lower.contains("finance") {
            return Category::Finance;
        }
        let names_it = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "it");
        if names_it || lower.contains("information technology") {
            return Category::It;
        }
        Category::Hr
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = FaqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FaqError::UnknownCategory(s.to_string()))
    }
}

/// One question/answer pair read from a category store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// 1-based line number of the `Q:` line.
    pub line: usize,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMatch {
    pub entry_line: Option<usize>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub score: f32,
    pub decision: Decision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Answer text came from a store entry.
    Stored,
    /// Answer text came from a model completion.
    Generated,
    /// Every attempt failed and a fixed apology was substituted.
    Apology,
}

/// Output of the retrieval stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retrieval {
    pub answer: String,
    pub matched: bool,
    pub provenance: Provenance,
    /// Best score seen in the store, if the store had any entries.
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Router,
    Domain,
    Explain,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Router => "router",
            Stage::Domain => "domain",
            Stage::Explain => "explain",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: Stage,
    pub message: String,
}

/// Diagnostic record of what each stage produced. Display only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    pub steps: Vec<TraceStep>,
}

impl Trace {
    pub fn push(&mut self, stage: Stage, message: impl Into<String>) {
        self.steps.push(TraceStep {
            stage,
            message: message.into(),
        });
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(move |s| s.stage == stage)
            .map(|s| s.message.as_str())
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "[{}] {}", step.stage.name(), step.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub question: String,
    pub category: Category,
    pub answer: String,
    pub provenance: Provenance,
    pub trace: Trace,
    pub resolved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_mapping_prefers_finance() {
        assert_eq!(Category::from_reply("Finance"), Category::Finance);
        assert_eq!(Category::from_reply("  FINANCE.  "), Category::Finance);
        assert_eq!(Category::from_reply("IT or finance?"), Category::Finance);
        assert_eq!(Category::from_reply("finance-related"), Category::Finance);
    }

    #[test]
    fn reply_mapping_needs_whole_word_it() {
        assert_eq!(Category::from_reply("IT"), Category::It);
        assert_eq!(Category::from_reply("it."), Category::It);
        assert_eq!(Category::from_reply("Information Technology"), Category::It);
        assert_eq!(Category::from_reply("submit to digital"), Category::Hr);
    }

    #[test]
    fn reply_mapping_defaults_to_hr() {
        assert_eq!(Category::from_reply("HR"), Category::Hr);
        assert_eq!(Category::from_reply(""), Category::Hr);
        assert_eq!(Category::from_reply("no idea"), Category::Hr);
    }

    #[test]
    fn parses_category_names() {
        assert_eq!("hr".parse::<Category>().unwrap(), Category::Hr);
        assert_eq!("Finance".parse::<Category>().unwrap(), Category::Finance);
        assert_eq!(" IT ".parse::<Category>().unwrap(), Category::It);
        assert!("legal".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_label() {
        let json = serde_json::to_string(&Category::It).unwrap();
        assert_eq!(json, "\"IT\"");
        let back: Category = serde_json::from_str("\"HR\"").unwrap();
        assert_eq!(back, Category::Hr);
    }

    #[test]
    fn trace_renders_one_line_per_step() {
        let mut trace = Trace::default();
        trace.push(Stage::Router, "Routed to domain: IT");
        trace.push(Stage::Explain, "Simplified");
        assert_eq!(
            trace.to_string(),
            "[router] Routed to domain: IT\n[explain] Simplified\n"
        );
        assert_eq!(trace.for_stage(Stage::Router).count(), 1);
    }
}
