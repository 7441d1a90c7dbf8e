//! Local harness: drives one call from stdin, one tool call per line.
//!
//!   set_name {"first_name": "Jane", "last_name": "Doe"}
//!   prompt          print the next-turn system prompt
//!   tools           print the tool definitions
//!   /quit

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use intake_assist::config::AgentConfig;
use intake_assist::context::CallContext;
use intake_assist::error::Result;
use intake_assist::intake::{IntakeController, ProviderDirectory, intake_system_prompt};
use intake_assist::notify::{DisabledNotifier, EmailConfig, Notifier, SmtpNotifier};
use intake_assist::session::{CallSession, LocalSession, RoomServiceConfig, RoomServiceSession};
use intake_assist::tools::ToolRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AgentConfig::from_env()?;

    let directory = match config.providers_path {
        Some(ref path) => ProviderDirectory::from_json_file(path)?,
        None => ProviderDirectory::sample(),
    };

    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email) => {
            eprintln!("   Email: {} via {}:{}", email.from_address, email.smtp_host, email.smtp_port);
            Arc::new(SmtpNotifier::new(email))
        }
        None => {
            eprintln!("   Email: disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let session: Arc<dyn CallSession> = match RoomServiceConfig::from_env()? {
        Some(room) => {
            eprintln!("   Room service: {}", room.url);
            Arc::new(RoomServiceSession::new(room))
        }
        None => Arc::new(LocalSession),
    };

    let ctx = match std::env::var("INTAKE_SESSION_ID") {
        Ok(id) => CallContext::new(id),
        Err(_) => CallContext::default(),
    };

    eprintln!("📞 {} v{}", config.name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Call: {} (session {})", ctx.call_id, ctx.session_id);
    eprintln!("   Providers: {}", directory.len());

    let controller = Arc::new(Mutex::new(IntakeController::new(
        &ctx,
        Arc::new(directory),
        notifier,
        session,
    )));
    let registry = ToolRegistry::for_call(Arc::clone(&controller));
    eprintln!("   Tools: {} registered", registry.count());
    eprintln!("   Enter `<tool> <json>`, `prompt`, `tools`, or /quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "/quit" => break,
            "prompt" => {
                let c = controller.lock().await;
                println!("{}", intake_system_prompt(&c, &config));
            }
            "tools" => {
                let defs = registry.tool_definitions();
                println!("{}", serde_json::to_string_pretty(&defs)?);
            }
            _ => {
                let (name, raw) = line.split_once(' ').unwrap_or((line, "{}"));
                let params: serde_json::Value = match serde_json::from_str(raw) {
                    Ok(v) => v,
                    Err(e) => {
                        eprintln!("invalid JSON parameters: {e}");
                        eprint!("> ");
                        continue;
                    }
                };
                match registry.execute(name, params, &ctx).await {
                    Ok(output) => {
                        println!("{}", serde_json::to_string_pretty(&output.result)?);
                        if name == "end_call" && output.result["granted"] == true {
                            break;
                        }
                    }
                    Err(e) => eprintln!("error: {e}"),
                }
            }
        }
        eprint!("> ");
    }

    Ok(())
}
