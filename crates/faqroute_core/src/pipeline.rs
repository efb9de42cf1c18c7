use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};

use crate::agents::{AgentSet, DomainAgents};
use crate::classifier::{ClassificationSource, Classifier};
use crate::config::{RetrievalParams, Settings};
use crate::error::Result;
use crate::model::{Category, Provenance, Resolution, Stage, Trace};
use crate::retrieval::{Retriever, RETRIEVAL_APOLOGY};
use crate::simplifier::{is_missing_answer, Simplifier, SimplifyOutcome};
use crate::storage::FaqStore;

pub const ESCALATION_APOLOGY: &str = "Sorry, I'm unable to generate an answer right now.";

pub fn escalation_prompt(category: Category, question: &str) -> String {
    format!(
        "You are an expert in {category} department.\n\
         Answer this employee's question accurately and professionally:\n\n\
         Question: {question}"
    )
}

/// Classify, retrieve or generate, simplify.
#[derive(Clone)]
pub struct Pipeline {
    classifier: Classifier,
    retriever: Retriever,
    simplifier: Simplifier,
    escalation: DomainAgents,
}

impl Pipeline {
    pub fn new(
        classifier: Classifier,
        retriever: Retriever,
        simplifier: Simplifier,
        escalation: DomainAgents,
    ) -> Self {
        Self {
            classifier,
            retriever,
            simplifier,
            escalation,
        }
    }

    pub fn from_agents(agents: AgentSet, store: FaqStore, params: RetrievalParams) -> Self {
        Self::new(
            Classifier::new(agents.router),
            Retriever::new(store, params, agents.domains.clone()),
            Simplifier::new(agents.explain),
            agents.domains,
        )
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder().build()?;
        let agents = AgentSet::from_settings(client, settings);
        Ok(Self::from_agents(
            agents,
            FaqStore::new(&settings.data_dir),
            settings.retrieval,
        ))
    }

    /// Always completes; stage failures become apology text.
    pub async fn resolve(&self, question: &str) -> Resolution {
        let mut trace = Trace::default();

        let classification = self.classifier.classify_detailed(question).await;
        let category = classification.category;
        let note = match classification.source {
            ClassificationSource::EmptyInput => " (empty question)",
            ClassificationSource::Model => "",
            ClassificationSource::Default => " (classifier unavailable, default)",
        };
        trace.push(Stage::Router, format!("Routed to domain: {category}{note}"));

        let (mut answer, mut provenance) = match self.retriever.retrieve(category, question).await {
            Ok(found) => {
                let origin = match (found.matched, found.score) {
                    (true, Some(score)) => format!("matched stored entry (score {score:.3})"),
                    (false, Some(score)) => format!("no stored match (best score {score:.3})"),
                    (_, None) => "no store for this domain".to_string(),
                };
                trace.push(Stage::Domain, format!("FAQ lookup, {origin}: {}", found.answer));
                (found.answer, found.provenance)
            }
            Err(err) => {
                warn!(%category, error = %err, "retrieval failed");
                trace.push(Stage::Domain, format!("Retrieval error: {err}"));
                (RETRIEVAL_APOLOGY.to_string(), Provenance::Apology)
            }
        };

        if is_missing_answer(&answer) {
            trace.push(
                Stage::Domain,
                "Not found in FAQ store, escalating to domain expert.",
            );
            let prompt = escalation_prompt(category, question);
            match self.escalation.get(category).complete(&prompt).await {
                Ok(text) => {
                    answer = text;
                    provenance = Provenance::Generated;
                }
                Err(err) => {
                    warn!(%category, error = %err, "escalation failed");
                    trace.push(Stage::Domain, format!("Error during generation: {err}"));
                    answer = ESCALATION_APOLOGY.to_string();
                    provenance = Provenance::Apology;
                }
            }
        }

        let simplified = self.simplifier.simplify_detailed(&answer).await;
        trace.push(
            Stage::Explain,
            match simplified.outcome {
                SimplifyOutcome::Rewritten => "Simplified and rewritten for clarity.",
                SimplifyOutcome::ShortCircuited => "No usable answer, replied with apology.",
                SimplifyOutcome::PassedThrough => "Simplification skipped, answer passed through.",
            },
        );
        if simplified.outcome == SimplifyOutcome::ShortCircuited {
            provenance = Provenance::Apology;
        }

        info!(%category, ?provenance, "question resolved");
        Resolution {
            question: question.to_string(),
            category,
            answer: simplified.text,
            provenance,
            trace,
            resolved_at: Utc::now(),
        }
    }
}
