use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use faqroute_core::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "faqroute",
    version,
    about = "Answer employee questions from HR, Finance and IT FAQ stores"
)]
pub struct Cli {
    /// Config file (default: <config dir>/faqroute/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding hr_faq.txt, finance_faq.txt and it_faq.txt
    #[arg(long, global = true, env = "FAQROUTE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Minimum match score for a stored answer
    #[arg(long, global = true)]
    pub threshold: Option<f32>,

    /// Score added per shared keyword group
    #[arg(long, global = true)]
    pub boost: Option<f32>,

    /// OpenAI-compatible endpoint, overrides OPENROUTER_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify, look up and rewrite an answer
    Ask {
        question: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Print what each stage produced
        #[arg(long)]
        trace: bool,
        /// Give up if no answer arrives in time (e.g. 30s)
        #[arg(long)]
        timeout: Option<humantime::Duration>,
    },
    /// Score a question against one store without calling the model
    Match {
        #[arg(long)]
        category: Category,
        #[arg(long)]
        question: String,
    },
    /// Run retrieval test cases from a JSON file
    Eval {
        #[arg(long)]
        cases: PathBuf,
        #[arg(long, default_value_t = 0.85)]
        min_pass_rate: f32,
    },
    /// Serve the question page over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
}

impl Cli {
    /// Threshold and boost are checked after merging with the config file.
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Ask {
            timeout: Some(timeout),
            ..
        } = &self.command
        {
            if timeout.as_ref().is_zero() {
                return Err("timeout must be > 0".to_string());
            }
        }

        Ok(())
    }
}
