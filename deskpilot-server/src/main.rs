use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deskpilot_agents::{AgentDeps, AgentRuntime, ConversationState, RunSettings};
use deskpilot_graph::{Checkpointer, FileCheckpointer, InMemoryCheckpointer};
use deskpilot_llm::OpenAiCompatibleOracle;
use deskpilot_memory::{HttpRecallStore, InMemoryRecallStore, RecallStore};
use deskpilot_server::{build_router, AppState, ServerConfig};
use deskpilot_tools::{
    BookingTool, EscalateTool, FaqEntry, FaqTool, InMemoryCalendar, InMemoryFaqIndex,
    InMemoryTicketSink,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deskpilot=info,axum=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let calendar_config = config.calendar()?;

    let oracle = OpenAiCompatibleOracle::builder()
        .base_url(&config.oracle_base_url)
        .api_key(&config.oracle_api_key)
        .model(&config.oracle_model)
        .timeout(config.oracle_timeout)
        .build()?;

    let recall: Arc<dyn RecallStore> = match (&config.recall_url, &config.recall_api_key) {
        (Some(url), Some(key)) => Arc::new(HttpRecallStore::new(url.clone(), key.clone())?),
        _ => {
            tracing::info!("recall service not configured, using in-memory store");
            Arc::new(InMemoryRecallStore::new())
        }
    };

    let checkpointer: Arc<dyn Checkpointer<ConversationState>> = match &config.checkpoint_dir {
        Some(dir) => Arc::new(FileCheckpointer::new(dir)),
        None => {
            tracing::info!("checkpoint directory not configured, threads reset on restart");
            Arc::new(InMemoryCheckpointer::default())
        }
    };

    let calendar = Arc::new(InMemoryCalendar::new(calendar_config.clone()));
    let faq = Arc::new(InMemoryFaqIndex::new(default_faq()));
    let tickets = Arc::new(InMemoryTicketSink::new());

    let deps = AgentDeps {
        oracle: Arc::new(oracle),
        recall: recall.clone(),
        booking_tool: Arc::new(BookingTool::new(calendar, calendar_config)),
        support_tool: Arc::new(FaqTool::new(faq)),
        crisis_tool: Arc::new(EscalateTool::new(tickets)),
        checkpointer,
    };
    let settings = RunSettings {
        max_step_retries: config.max_step_retries,
        max_transitions: config.max_transitions,
    };
    let runtime = Arc::new(AgentRuntime::new(deps, settings)?);

    let app = build_router(AppState {
        runtime,
        recall,
        run_timeout: config.run_timeout,
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(addr = %config.bind, "deskpilot server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn default_faq() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new(
            "What are your business hours?",
            "We are open 9 AM to 5 PM, Monday through Friday.",
        ),
        FaqEntry::new(
            "How do I book a meeting?",
            "Tell me a date and time within business hours plus your name and email, \
             and I will book it for you.",
        ),
        FaqEntry::new(
            "How do I reschedule a meeting?",
            "Ask me to reschedule and mention the original topic; I will cancel the \
             old slot and book the new one.",
        ),
        FaqEntry::new(
            "How can I reach a human?",
            "Ask to speak with a person and I will open a ticket with our support team.",
        ),
        FaqEntry::new(
            "Where can I find pricing information?",
            "Our plans and pricing are listed on the website under Pricing; a \
             specialist can walk you through them in a meeting.",
        ),
    ]
}
