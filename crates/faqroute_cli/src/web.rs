use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use faqroute_core::{Pipeline, Resolution};
use serde::Deserialize;
use tracing::info;

const EMPTY_QUESTION: &str = "Please enter a question to proceed.";

const STYLE: &str = "\
body { background: linear-gradient(135deg, #f4f7fa, #e8eff7); color: #222; \
font-family: sans-serif; max-width: 760px; margin: 0 auto; padding: 24px; }
h1 { color: #003366; text-align: center; margin-bottom: 4px; }
.subtitle { color: #555; text-align: center; margin-bottom: 24px; }
input[type=text] { width: 100%; box-sizing: border-box; border: 2px solid #004aad; \
border-radius: 12px; padding: 10px; font-size: 1rem; }
button { margin-top: 12px; background: #004aad; color: white; border: none; \
border-radius: 10px; padding: 0.6em 1.4em; font-weight: 600; }
.answer-card { background: white; padding: 1.2em 1.5em; border-radius: 15px; margin-top: 20px; \
box-shadow: 0 3px 10px rgba(0,0,0,0.1); border-left: 6px solid #004aad; }
.answer-card p { white-space: pre-wrap; font-size: 1.05rem; }
.warning { background: #fff4e5; border-left: 6px solid #e69500; padding: 0.8em 1.2em; \
border-radius: 10px; margin-top: 20px; }
details pre { white-space: pre-wrap; color: #555; }";

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    question: String,
}

enum Panel<'a> {
    Answer(&'a Resolution),
    Warning(&'a str),
}

pub fn router(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .with_state(pipeline)
}

async fn index() -> Html<String> {
    Html(render_page("", None))
}

async fn ask(State(pipeline): State<Pipeline>, Form(form): Form<AskForm>) -> Html<String> {
    if form.question.trim().is_empty() {
        return Html(render_page("", Some(Panel::Warning(EMPTY_QUESTION))));
    }

    let resolution = pipeline.resolve(&form.question).await;
    info!(category = %resolution.category, provenance = ?resolution.provenance, "answered web question");
    Html(render_page(&form.question, Some(Panel::Answer(&resolution))))
}

fn render_page(question: &str, panel: Option<Panel<'_>>) -> String {
    let panel = match panel {
        Some(Panel::Answer(resolution)) => format!(
            "<div class=\"answer-card\">\n<h4>Category: {}</h4>\n<p>{}</p>\n\
             <details><summary>How this answer was produced</summary><pre>{}</pre></details>\n</div>",
            escape(resolution.category.label()),
            escape(&resolution.answer),
            escape(&resolution.trace.to_string()),
        ),
        Some(Panel::Warning(message)) => {
            format!("<div class=\"warning\">{}</div>", escape(message))
        }
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Company Assistant</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <h1>Company Assistant</h1>\n\
         <div class=\"subtitle\">Get instant help with HR, Finance, and IT-related queries</div>\n\
         <form method=\"post\" action=\"/ask\">\n\
         <input type=\"text\" name=\"question\" value=\"{}\" \
         placeholder=\"Ask your question here (e.g., 'When is salary credited?')\">\n\
         <button type=\"submit\">Get Answer</button>\n</form>\n{panel}\n</body>\n</html>\n",
        escape(question)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
