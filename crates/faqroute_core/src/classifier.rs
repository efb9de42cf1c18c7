use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::completion::ProviderChain;
use crate::model::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// Blank question, no call made.
    EmptyInput,
    /// Mapped from a model reply.
    Model,
    /// Every provider failed.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub source: ClassificationSource,
}

pub fn classification_prompt(question: &str) -> String {
    format!(
        "Classify this question into one of these categories: HR, Finance, or IT.\n\
         Question: {question}\n\
         Respond ONLY with one word: HR, Finance, or IT."
    )
}

/// Routes a question to a department. Never fails; HR is the fallback.
#[derive(Clone)]
pub struct Classifier {
    chain: ProviderChain,
}

impl Classifier {
    pub fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    pub async fn classify(&self, question: &str) -> Category {
        self.classify_detailed(question).await.category
    }

    pub async fn classify_detailed(&self, question: &str) -> Classification {
        if question.trim().is_empty() {
            return Classification {
                category: Category::default(),
                source: ClassificationSource::EmptyInput,
            };
        }

        match self.chain.complete(&classification_prompt(question)).await {
            Ok(reply) => {
                let category = Category::from_reply(&reply);
                info!(%category, reply = %reply, "question classified");
                Classification {
                    category,
                    source: ClassificationSource::Model,
                }
            }
            Err(err) => {
                warn!(error = %err, "classification failed, defaulting to HR");
                Classification {
                    category: Category::default(),
                    source: ClassificationSource::Default,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::testing::{chain, ScriptedProvider};

    #[tokio::test]
    async fn blank_question_is_hr_without_calls() {
        let primary = ScriptedProvider::replying("router", "IT");
        let classifier = Classifier::new(chain(&[&primary]));

        for question in ["", "   ", "\n\t"] {
            let result = classifier.classify_detailed(question).await;
            assert_eq!(result.category, Category::Hr);
            assert_eq!(result.source, ClassificationSource::EmptyInput);
        }
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn maps_primary_reply() {
        let primary = ScriptedProvider::replying("router", "IT");
        let secondary = ScriptedProvider::replying("client", "Finance");
        let classifier = Classifier::new(chain(&[&primary, &secondary]));

        let category = classifier.classify("My laptop will not boot").await;

        assert_eq!(category, Category::It);
        assert_eq!(secondary.calls(), 0);
        assert!(primary.prompts()[0].contains("Question: My laptop will not boot"));
    }

    #[tokio::test]
    async fn secondary_reply_containing_finance_wins() {
        let primary = ScriptedProvider::failing("router");
        let secondary = ScriptedProvider::replying("client", "finance.");
        let classifier = Classifier::new(chain(&[&primary, &secondary]));

        let result = classifier
            .classify_detailed("When will my salary be paid?")
            .await;

        assert_eq!(result.category, Category::Finance);
        assert_eq!(result.source, ClassificationSource::Model);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn retries_once_then_defaults_to_hr() {
        let primary = ScriptedProvider::failing("router");
        let secondary = ScriptedProvider::failing("client");
        let classifier = Classifier::new(chain(&[&primary, &secondary]));

        let result = classifier.classify_detailed("Reset my VPN").await;

        assert_eq!(result.category, Category::Hr);
        assert_eq!(result.source, ClassificationSource::Default);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }
}
