use anyhow::Result;
use clap::Parser;
use log::info;
use serde_json::{json, Value};

use palaver::{Chat, Context, FnTool, HttpGateway, ToolRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the agent service
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    /// Service key for authentication
    #[arg(long, default_value = "dummy")]
    service_key: String,

    /// The user message to send
    #[arg(long, default_value = "What's the status of order 1042?")]
    message: String,

    /// A follow-up message sent in the same conversation
    #[arg(long, default_value = "Thanks, and when will it arrive?")]
    follow_up: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Support Bot Demo");
    info!("================");
    info!("Base URL: {}", args.base_url);
    info!("Message: {}", args.message);
    info!("");

    let gateway = HttpGateway::new(&args.base_url, &args.service_key)?;

    // Register the tools the agent is allowed to call back into.
    let registry = ToolRegistry::new();
    registry.register(
        "lookup_order",
        FnTool::new(|call_args: Value| async move {
            let order_id = call_args["order_id"].as_str().unwrap_or("unknown");
            Ok(json!({
                "order_id": order_id,
                "status": "shipped",
                "carrier": "DHL",
            }))
        }),
    );
    registry.register(
        "estimate_delivery",
        FnTool::new(|call_args: Value| async move {
            let carrier = call_args["carrier"].as_str().unwrap_or("unknown");
            Ok(json!({
                "carrier": carrier,
                "eta_days": 2,
            }))
        }),
    );

    let chat = Chat::new(gateway, registry);

    // Context travels alongside the message; the agent sees it, history
    // does not record it.
    let mut context = Context::new();
    context.insert("channel".to_string(), json!("web"));

    info!("Sending first message...");
    chat.send(&args.message, context.clone()).await?;

    info!("Sending follow-up in the same conversation...");
    chat.send(&args.follow_up, context).await?;

    if let Some(id) = chat.conversation_id() {
        info!("Conversation id: {id}");
    }

    println!();
    for message in chat.history() {
        println!("{}: {}", message.role, message.content);
    }

    Ok(())
}
