use tracing::{debug, info, warn};

use crate::agents::DomainAgents;
use crate::config::RetrievalParams;
use crate::error::Result;
use crate::model::{Category, Decision, FaqEntry, Provenance, Retrieval, RetrievalMatch};
use crate::similarity::score;
use crate::storage::FaqStore;

pub const RETRIEVAL_APOLOGY: &str = "Sorry, I couldn't generate an answer right now.";

/// Highest-scoring entry. Ties keep the earliest entry.
pub fn top_match<'a>(
    question: &str,
    entries: &'a [FaqEntry],
    boost: f32,
) -> Option<(&'a FaqEntry, f32)> {
    let mut best: Option<(&FaqEntry, f32)> = None;

    for entry in entries {
        let s = score(question, &entry.question, boost);
        debug!(line = entry.line, score = s, candidate = %entry.question, "scored faq entry");
        if best.is_none_or(|(_, top)| s > top) {
            best = Some((entry, s));
        }
    }

    best
}

pub fn decide(question: &str, entries: &[FaqEntry], params: RetrievalParams) -> RetrievalMatch {
    match top_match(question, entries, params.boost) {
        Some((entry, score)) if score >= params.threshold => RetrievalMatch {
            entry_line: Some(entry.line),
            question: Some(entry.question.clone()),
            answer: Some(entry.answer.clone()),
            score,
            decision: Decision::Hit,
        },
        Some((entry, score)) => RetrievalMatch {
            entry_line: Some(entry.line),
            question: Some(entry.question.clone()),
            answer: None,
            score,
            decision: Decision::Miss,
        },
        None => RetrievalMatch {
            entry_line: None,
            question: None,
            answer: None,
            score: 0.0,
            decision: Decision::Miss,
        },
    }
}

pub fn generation_prompt(category: Category, question: &str) -> String {
    format!(
        "The user asked: '{question}'. Please give a clear and professional answer related to {}.",
        category.label().to_uppercase()
    )
}

/// Store lookup with model generation on a miss.
#[derive(Clone)]
pub struct Retriever {
    store: FaqStore,
    params: RetrievalParams,
    agents: DomainAgents,
}

impl Retriever {
    pub fn new(store: FaqStore, params: RetrievalParams, agents: DomainAgents) -> Self {
        Self {
            store,
            params,
            agents,
        }
    }

    /// Errors only when the store exists but cannot be read.
    pub async fn retrieve(&self, category: Category, question: &str) -> Result<Retrieval> {
        let mut best_score = None;

        if let Some(entries) = self.store.load(category).await? {
            let found = decide(question, &entries, self.params);
            if found.entry_line.is_some() {
                best_score = Some(found.score);
            }
            if let (Decision::Hit, Some(answer)) = (found.decision, found.answer) {
                info!(%category, score = found.score, line = ?found.entry_line, "faq match found");
                return Ok(Retrieval {
                    answer,
                    matched: true,
                    provenance: Provenance::Stored,
                    score: best_score,
                });
            }
            debug!(%category, best_score = found.score, "no strong faq match, generating");
        }

        let (answer, provenance) = self.generate(category, question).await;
        Ok(Retrieval {
            answer,
            matched: false,
            provenance,
            score: best_score,
        })
    }

    async fn generate(&self, category: Category, question: &str) -> (String, Provenance) {
        let prompt = generation_prompt(category, question);
        match self.agents.get(category).complete(&prompt).await {
            Ok(text) => (text, Provenance::Generated),
            Err(err) => {
                warn!(%category, error = %err, "fallback generation failed");
                (RETRIEVAL_APOLOGY.to_string(), Provenance::Apology)
            }
        }
    }
}
