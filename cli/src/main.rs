//! Pitwall CLI: ask one F1 question or chat in an interactive loop.
//!
//! Reads configuration from the environment (a project `.env` is applied
//! first), wires the two tools and the chat model into an orchestrator, and
//! prints each dispatch outcome. Conversation history lives here, in the
//! caller: the loop itself is stateless across queries.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::Settings;
use pitwall::{
    ChatOpenAI, CircuitMapTool, DispatchOutcome, Message, Orchestrator, OutcomeStatus,
    RegulationsTool, ToolDispatcher, ToolRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(about = "Pitwall: F1 circuits and regulations assistant")]
struct Args {
    /// One-shot question (omit for interactive chat)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Print the full dispatch outcome as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_orchestrator(settings: &Settings) -> Orchestrator {
    let circuit = CircuitMapTool::new(settings.circuit_maps_dir.clone());
    let regulations = RegulationsTool::new(
        settings.regulations_endpoint.clone(),
        settings.regulations_api_key.clone(),
        settings.knowledge_base_id.clone(),
        settings.generation_model_id.clone(),
    );
    let dispatcher = ToolDispatcher::new(
        ToolRegistry::new()
            .register(Arc::new(circuit))
            .register(Arc::new(regulations)),
    );
    let llm = ChatOpenAI::with_api_key(settings.openai_api_key.clone(), settings.model.clone())
        .with_tools(dispatcher.specs())
        .with_temperature(0.2);
    debug!(model = %settings.model, "orchestrator ready");
    Orchestrator::new(Arc::new(llm), dispatcher)
}

fn print_outcome(outcome: &DispatchOutcome, json: bool) {
    if json {
        match serde_json::to_string_pretty(outcome) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("serialize outcome: {}", e),
        }
        return;
    }
    println!("{}", outcome.response);
    if !outcome.tools_used.is_empty() {
        eprintln!(
            "[tools: {} | rounds: {} | model: {}]",
            outcome.tools_used.join(", "),
            outcome.rounds,
            outcome.model
        );
    }
    if outcome.status != OutcomeStatus::Answered {
        eprintln!("[status: {:?}]", outcome.status);
    }
}

async fn run_repl(orchestrator: &Orchestrator, json: bool) {
    println!("pitwall: ask about F1 circuits and regulations. Empty line or Ctrl-D to quit.");
    let mut history: Vec<Message> = Vec::new();
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let query = line.trim();
        if query.is_empty() {
            break;
        }
        let outcome = orchestrator.process_query(query, &history).await;
        print_outcome(&outcome, json);
        history.push(Message::user(query));
        history.push(Message::assistant(outcome.response.clone()));
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = config::load_and_apply(None) {
        eprintln!("warning: could not read .env: {}", e);
    }
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let orchestrator = build_orchestrator(&settings);
    let args = Args::parse();

    match args.message {
        Some(message) => {
            let outcome = orchestrator.process_query(&message, &[]).await;
            print_outcome(&outcome, args.json);
            if outcome.status == OutcomeStatus::Errored {
                std::process::exit(1);
            }
        }
        None => run_repl(&orchestrator, args.json).await,
    }
}
