use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use uuid::Uuid;

use flowdeck_rs::channel::{local_channel, WebSocketChannel};
use flowdeck_rs::client::{ApiClient, ExecutionStartRequest};
use flowdeck_rs::graph::{CanvasData, GraphModel};
use flowdeck_rs::run::{ExecutionCoordinator, ExecutionEvent, RunSession};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a workflow snapshot and print its execution order
    Validate {
        /// Path to a canvas snapshot JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Replay a recorded event stream against a workflow snapshot
    Replay {
        /// Path to a canvas snapshot JSON file
        #[arg(short, long)]
        graph: PathBuf,

        /// Path to a JSON-lines file of event frames
        #[arg(short, long)]
        events: PathBuf,

        /// Execution id to attribute the replay to
        #[arg(long, default_value = "replay")]
        execution_id: String,
    },
    /// Trigger a run on the server and stream its output
    Run {
        /// Backend base URL
        #[arg(short, long, default_value = "http://localhost:8000")]
        url: String,

        /// Workflow id to execute
        #[arg(short, long)]
        workflow_id: Uuid,

        /// Trigger input text
        #[arg(short, long)]
        input: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Validate { file } => validate(file)?,
        Commands::Replay {
            graph,
            events,
            execution_id,
        } => replay(graph, events, execution_id).await?,
        Commands::Run {
            url,
            workflow_id,
            input,
        } => run(url, workflow_id, input).await?,
    }

    Ok(())
}

fn load_graph(path: &Path) -> anyhow::Result<GraphModel> {
    let content = std::fs::read_to_string(path)?;
    let canvas: CanvasData = serde_json::from_str(&content)?;
    Ok(GraphModel::from_canvas(canvas))
}

fn validate(file: PathBuf) -> anyhow::Result<()> {
    let model = load_graph(&file)?;

    println!(
        "{} nodes, {} edges",
        model.nodes().len(),
        model.edges().len()
    );
    match model.input_node() {
        Some(node) => println!("Input node: {}", node.id),
        None => println!("Warning: no input node"),
    }

    match model.execution_order() {
        Ok(order) => println!("Execution order: {}", order.join(" -> ")),
        Err(e) => {
            println!("Invalid workflow: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn replay(graph: PathBuf, events: PathBuf, execution_id: String) -> anyhow::Result<()> {
    let model = load_graph(&graph)?;
    let node_ids: Vec<String> = model.nodes().iter().map(|n| n.id.clone()).collect();

    let frames: Vec<String> = std::fs::read_to_string(&events)?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    let (handle, channel) = local_channel(frames.len().max(1));
    for frame in frames {
        handle.send_frame(frame).await?;
    }
    drop(handle);

    let mut coordinator = ExecutionCoordinator::new();
    coordinator
        .start_execution(execution_id, &node_ids, Box::new(channel))
        .await;
    coordinator.pump().await;

    print_summary(coordinator.session());
    Ok(())
}

async fn run(url: String, workflow_id: Uuid, input: String) -> anyhow::Result<()> {
    let client = ApiClient::new(&url)?;

    let execution = client
        .start_execution(workflow_id, &ExecutionStartRequest::with_input(input))
        .await?;
    let execution_id = execution.id.to_string();
    println!("Execution started: {}", execution_id);

    let workflow = client.get_workflow(workflow_id).await?;
    let node_ids: Vec<String> = workflow
        .canvas_data
        .nodes
        .iter()
        .map(|n| n.id.clone())
        .collect();

    let channel = WebSocketChannel::connect(&client.socket_base()?, &execution_id).await?;

    let mut coordinator = ExecutionCoordinator::new();
    coordinator
        .start_execution(execution_id, &node_ids, Box::new(channel))
        .await;

    // Stream chunks as they arrive; everything else lands in the session.
    while coordinator.session().is_running() {
        match coordinator.step().await {
            Some(ExecutionEvent::AgentOutputChunk { chunk, .. }) => {
                print!("{}", chunk);
            }
            Some(ExecutionEvent::AgentStatus { agent_id, status }) => {
                log::info!("Agent {} -> {:?}", agent_id, status);
            }
            Some(_) => {}
            None => {
                log::warn!("Event channel closed before the run finished");
                break;
            }
        }
    }
    println!();

    print_summary(coordinator.session());
    coordinator.reset().await;
    Ok(())
}

fn print_summary(session: &RunSession) {
    println!("Workflow: {:?}", session.workflow_status);
    println!("Total tokens: {}", session.total_tokens);
    if let Some(error) = &session.error {
        println!("Last error: {}", error);
    }

    let mut agents: Vec<_> = session.agents.values().collect();
    agents.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
    for agent in agents {
        println!(
            "  {} {:?} ({} tokens, {} ms, {} output chars)",
            agent.agent_id,
            agent.status,
            agent.tokens_used,
            agent.latency_ms,
            agent.output.len()
        );
    }
}
