pub mod agents;
pub mod classifier;
pub mod completion;
pub mod config;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod retrieval;
pub mod similarity;
pub mod simplifier;
pub mod storage;

pub use agents::{AgentSet, DomainAgents};
pub use classifier::{Classification, ClassificationSource, Classifier};
pub use completion::{ChatCompletionsProvider, CompletionProvider, Persona, ProviderChain};
pub use config::{
    FileConfig, RetrievalParams, Settings, DEFAULT_BASE_URL, DEFAULT_BOOST, DEFAULT_MODEL,
    DEFAULT_THRESHOLD,
};
pub use error::{FaqError, Result};
pub use eval::{evaluate_cases, parse_cases, CaseExpectation, EvalCase, EvalOutcome, EvalSummary};
pub use model::{
    Category, Decision, FaqEntry, Provenance, Resolution, Retrieval, RetrievalMatch, Stage,
    Trace, TraceStep,
};
pub use pipeline::{Pipeline, ESCALATION_APOLOGY};
pub use retrieval::{decide, top_match, Retriever, RETRIEVAL_APOLOGY};
pub use similarity::{keyword_boost, score, sequence_ratio, KeywordGroup, KEYWORD_GROUPS};
pub use simplifier::{Simplified, Simplifier, SimplifyOutcome, SIMPLIFY_APOLOGY};
pub use storage::{parse_entries, FaqStore};
