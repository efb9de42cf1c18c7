use std::sync::Arc;

use reqwest::Client;

use crate::completion::{ChatCompletionsProvider, CompletionProvider, Persona, ProviderChain};
use crate::config::Settings;
use crate::model::Category;

pub fn router_persona() -> Persona {
    Persona::new(
        "Router Agent",
        "Identify which department (HR, Finance, or IT) the user's question belongs to.",
        "You are a smart classifier who reads a user's question and determines which \
         department is responsible for answering it. HR handles leaves, holidays, policies, \
         attendance, etc. Finance manages salaries, reimbursements, invoices, and tax queries. \
         IT deals with email setup, password resets, and technical issues.",
    )
}

pub fn domain_persona(category: Category) -> Persona {
    match category {
        Category::Hr => Persona::new(
            "HR Expert",
            "Answer company HR-related queries accurately and politely.",
            "You are an HR specialist responsible for answering employee questions related \
             to leaves, policies, attendance, recruitment, holidays, etc.",
        ),
        Category::Finance => Persona::new(
            "Finance Expert",
            "Answer financial and payroll-related questions with clarity and correctness.",
            "You are a Finance department specialist helping employees with salary \
             disbursement, reimbursements, invoices, and tax-related FAQs.",
        ),
        Category::It => Persona::new(
            "IT Support Specialist",
            "Provide answers and solutions to IT-related issues and technical queries.",
            "You are an IT helpdesk assistant responsible for helping users with email \
             setup, VPN access, password resets, and troubleshooting technical errors.",
        ),
    }
}

pub fn explain_persona() -> Persona {
    Persona::new(
        "Explanation Agent",
        "Simplify and refine the domain expert's answer into user-friendly language.",
        "You are a communication specialist who rewrites technical or policy-heavy \
         responses into clear, conversational, and easy-to-understand explanations for \
         employees.",
    )
}

/// One provider chain per department.
#[derive(Clone, Default)]
pub struct DomainAgents {
    pub hr: ProviderChain,
    pub finance: ProviderChain,
    pub it: ProviderChain,
}

impl DomainAgents {
    pub fn get(&self, category: Category) -> &ProviderChain {
        match category {
            Category::Hr => &self.hr,
            Category::Finance => &self.finance,
            Category::It => &self.it,
        }
    }
}

/// Every chain the pipeline needs.
#[derive(Clone, Default)]
pub struct AgentSet {
    pub router: ProviderChain,
    pub domains: DomainAgents,
    pub explain: ProviderChain,
}

impl AgentSet {
    /// Primary: persona-bearing agent on `model`. Secondary: bare client on
    /// `fallback_model`. The bare client is shared by all chains.
    pub fn from_settings(client: Client, settings: &Settings) -> Self {
        let agent = |persona: Persona| -> Arc<dyn CompletionProvider> {
            Arc::new(
                ChatCompletionsProvider::new(
                    client.clone(),
                    &settings.base_url,
                    &settings.api_key,
                    &settings.model,
                )
                .with_persona(persona),
            )
        };
        let bare: Arc<dyn CompletionProvider> = Arc::new(ChatCompletionsProvider::new(
            client.clone(),
            &settings.base_url,
            &settings.api_key,
            &settings.fallback_model,
        ));
        let chain = |persona: Persona| ProviderChain::new(vec![agent(persona), bare.clone()]);

        Self {
            router: chain(router_persona()),
            domains: DomainAgents {
                hr: chain(domain_persona(Category::Hr)),
                finance: chain(domain_persona(Category::Finance)),
                it: chain(domain_persona(Category::It)),
            },
            explain: chain(explain_persona()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrievalParams;
    use std::path::PathBuf;

    #[test]
    fn every_chain_has_agent_then_bare_client() {
        let settings = Settings {
            api_key: "k".to_string(),
            base_url: "http://localhost:1/v1".to_string(),
            model: "m".to_string(),
            fallback_model: "m".to_string(),
            data_dir: PathBuf::from("data"),
            retrieval: RetrievalParams::default(),
        };
        let agents = AgentSet::from_settings(Client::new(), &settings);

        assert_eq!(agents.router.len(), 2);
        assert_eq!(agents.explain.len(), 2);
        for category in Category::ALL {
            assert_eq!(agents.domains.get(category).len(), 2);
        }
    }

    #[test]
    fn domain_personas_differ() {
        assert_eq!(domain_persona(Category::It).role, "IT Support Specialist");
        assert_ne!(
            domain_persona(Category::Hr).system_prompt(),
            domain_persona(Category::Finance).system_prompt()
        );
    }
}
