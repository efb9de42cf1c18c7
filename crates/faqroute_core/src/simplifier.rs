use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::ProviderChain;

pub const SIMPLIFY_APOLOGY: &str = "Sorry, I couldn't find that information right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplifyOutcome {
    Rewritten,
    /// Blank or "not found" input, answered with the apology.
    ShortCircuited,
    /// Every provider failed; input returned trimmed.
    PassedThrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplified {
    pub text: String,
    pub outcome: SimplifyOutcome,
}

/// True for answers that are really a "no answer" sentinel. Matches ordinary
/// text containing "not found" too.
pub fn is_missing_answer(answer: &str) -> bool {
    answer.trim().is_empty() || answer.to_lowercase().contains("not found")
}

pub fn rewrite_prompt(answer: &str) -> String {
    format!(
        "Please rewrite the following answer in simple, friendly, and conversational language \
         while keeping all important details:\n\n{answer}"
    )
}

#[derive(Clone)]
pub struct Simplifier {
    chain: ProviderChain,
}

impl Simplifier {
    pub fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    pub async fn simplify(&self, answer: &str) -> String {
        self.simplify_detailed(answer).await.text
    }

    pub async fn simplify_detailed(&self, answer: &str) -> Simplified {
        if is_missing_answer(answer) {
            debug!("answer missing, skipping rewrite");
            return Simplified {
                text: SIMPLIFY_APOLOGY.to_string(),
                outcome: SimplifyOutcome::ShortCircuited,
            };
        }

        match self.chain.complete(&rewrite_prompt(answer)).await {
            Ok(text) => Simplified {
                text,
                outcome: SimplifyOutcome::Rewritten,
            },
            Err(err) => {
                warn!(error = %err, "simplification failed, passing answer through");
                Simplified {
                    text: answer.trim().to_string(),
                    outcome: SimplifyOutcome::PassedThrough,
                }
            }
        }
    }
}
