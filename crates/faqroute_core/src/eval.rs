use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::RetrievalParams;
use crate::error::Result;
use crate::model::{Category, Decision, FaqEntry};
use crate::retrieval::decide;
use crate::storage::FaqStore;

/// Offline retrieval check: no model calls are made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    pub case_id: String,
    pub category: Category,
    pub question: String,
    pub expected_decision: Decision,
    #[serde(default)]
    pub expected_line: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalOutcome {
    pub case_id: String,
    pub passed: bool,
    pub actual_decision: Decision,
    pub actual_line: Option<usize>,
    pub actual_answer: Option<String>,
    pub score: f32,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f32,
    pub outcomes: Vec<EvalOutcome>,
}

pub struct CaseExpectation;

impl CaseExpectation {
    pub fn matches(
        expected_decision: Decision,
        expected_line: Option<usize>,
        min_score: Option<f32>,
        actual_decision: Decision,
        actual_line: Option<usize>,
        score: f32,
    ) -> bool {
        if expected_decision != actual_decision {
            return false;
        }

        if let Some(expected) = expected_line {
            if actual_line != Some(expected) {
                return false;
            }
        }

        if let Some(min) = min_score {
            if score < min {
                return false;
            }
        }

        true
    }
}

pub fn parse_cases(json: &str) -> Result<Vec<EvalCase>> {
    Ok(serde_json::from_str(json)?)
}

pub async fn evaluate_cases(
    store: &FaqStore,
    cases: &[EvalCase],
    params: RetrievalParams,
) -> Result<EvalSummary> {
    let mut stores: HashMap<Category, Vec<FaqEntry>> = HashMap::new();
    for category in Category::ALL {
        if cases.iter().any(|c| c.category == category) {
            let entries = store.load(category).await?.unwrap_or_default();
            stores.insert(category, entries);
        }
    }

    let mut outcomes = Vec::with_capacity(cases.len());

    for case in cases {
        let entries = stores.get(&case.category).map(Vec::as_slice).unwrap_or(&[]);
        let start = Instant::now();
        let result = decide(&case.question, entries, params);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let passed = CaseExpectation::matches(
            case.expected_decision,
            case.expected_line,
            case.min_score,
            result.decision,
            result.entry_line,
            result.score,
        );

        outcomes.push(EvalOutcome {
            case_id: case.case_id.clone(),
            passed,
            actual_decision: result.decision,
            actual_line: result.entry_line,
            actual_answer: result.answer,
            score: result.score,
            latency_ms,
        });
    }

    let total = outcomes.len();
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let failed = total.saturating_sub(passed);
    let pass_rate = if total == 0 {
        0.0
    } else {
        passed as f32 / total as f32
    };

    Ok(EvalSummary {
        total,
        passed,
        failed,
        pass_rate,
        outcomes,
    })
}
