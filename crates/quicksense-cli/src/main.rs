//! QuickSense — page summaries and page-grounded chat from the terminal.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use quicksense_chat::{LLMProvider, SettingsStore, SettingsUpdate};
use quicksense_router::{RuntimeMessage, Trigger};
use quicksense_session::Outcome;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod host;
mod page;
mod panel;
mod state;

use panel::Panel;
use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("QUICKSENSE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".quicksense"))
                .unwrap_or_else(|_| PathBuf::from("data"))
        })
}

fn print_help() {
    println!("QuickSense — summarize and chat about web pages");
    println!();
    println!("Usage: quicksense <command> [args]");
    println!();
    println!("Commands:");
    println!("  extract <page>                 Print the page's readable text");
    println!("  summarize <page>               Summarize a page");
    println!("  ask <page> <question...>       Ask a question about a page");
    println!("  chat <page>                    Summarize, then answer questions from stdin");
    println!("  options show                   Show provider settings");
    println!("  options set-key <provider> <key>");
    println!("                                 Save an API key (empty key clears it)");
    println!("  options use <provider> [model] Select the provider and optionally its model");
    println!("  options verify [provider]      Check an API key with a minimal request");
    println!("  help                           Show this help message");
    println!();
    println!("<page> is an http(s) URL, a file:// URL or a path to an HTML file.");
    println!("Providers: tongyi, openai.");
}

fn usage(message: &str) -> ! {
    eprintln!("Usage: {}", message);
    std::process::exit(2);
}

fn parse_provider(name: &str) -> LLMProvider {
    LLMProvider::from_name(name).unwrap_or_else(|| {
        eprintln!("Unknown provider: {}. Use tongyi or openai.", name);
        std::process::exit(2);
    })
}

fn exit_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Completed => 0,
        _ => 1,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    if matches!(command, "--help" | "-h" | "help") {
        print_help();
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());
    let config = quicksense_core::QuickSenseConfig::from_env(&data_dir)?;
    let app = AppState::new(config)?;
    app.first_run().await?;

    let code = match command {
        "extract" => {
            let source = args.get(2).unwrap_or_else(|| usage("quicksense extract <page>"));
            run_extract(&app, source).await?
        }
        "summarize" => {
            let source = args
                .get(2)
                .unwrap_or_else(|| usage("quicksense summarize <page>"));
            run_summarize(&app, source).await?
        }
        "ask" => {
            if args.len() < 4 {
                usage("quicksense ask <page> <question...>");
            }
            run_ask(&app, &args[2], &args[3..].join(" ")).await?
        }
        "chat" => {
            let source = args.get(2).unwrap_or_else(|| usage("quicksense chat <page>"));
            run_chat(&app, source).await?
        }
        "options" => run_options(&app, &args[2..]).await?,
        _ => {
            eprintln!("Unknown command: {}. Use 'quicksense help' for usage.", command);
            2
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn run_extract(app: &AppState, source: &str) -> anyhow::Result<i32> {
    let tab = app.open_tab(source).await?;
    match app.router.request_content(&tab).await {
        Ok(snapshot) => {
            println!("{}", snapshot.text);
            Ok(0)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(1)
        }
    }
}

async fn run_summarize(app: &AppState, source: &str) -> anyhow::Result<i32> {
    let tab = app.open_tab(source).await?;
    let mut panel = Panel::open(app, tab.clone(), false).await?;
    let outcome = panel.summarize().await;
    panel.close(app).await;
    app.close_tab(&tab);
    Ok(exit_code(outcome))
}

async fn run_ask(app: &AppState, source: &str, question: &str) -> anyhow::Result<i32> {
    let tab = app.open_tab(source).await?;
    let mut panel = Panel::open(app, tab.clone(), true).await?;
    let outcome = panel.ask(question).await;
    panel.close(app).await;
    app.close_tab(&tab);
    Ok(exit_code(outcome))
}

async fn run_chat(app: &AppState, source: &str) -> anyhow::Result<i32> {
    let tab = app.open_tab(source).await?;
    let mut panel = Panel::open(app, tab.clone(), false).await?;
    panel.summarize().await;

    eprintln!("Ask about the page. Commands: /summarize, /reload, /options, /quit");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("> ");
        std::io::stderr().flush()?;
        let Some(line) = lines.next() else {
            // End of input dismisses the panel.
            panel.dismiss(app);
            app.close_tab(&tab);
            return Ok(0);
        };
        let line = line?;
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/summarize" => {
                panel.summarize().await;
            }
            "/reload" => panel.reload_content(app).await,
            "/options" => {
                app.router
                    .dispatch(Trigger::Message {
                        message: RuntimeMessage::OpenOptions,
                        sender: Some(tab.clone()),
                    })
                    .await;
            }
            question => {
                panel.session.set_pending_question(question);
                panel.submit().await;
            }
        }
    }

    panel.close(app).await;
    app.close_tab(&tab);
    Ok(0)
}

async fn run_options(app: &AppState, args: &[String]) -> anyhow::Result<i32> {
    let store = app.options_store();
    let sub = args.first().map(String::as_str).unwrap_or("show");
    match sub {
        "show" => {
            // Include environment keys so "configured" matches what the panel will use.
            let view = app.settings.load()?.to_view();
            println!("{}", serde_json::to_string_pretty(&view)?);
            println!("Settings file: {}", store.path().display());
        }
        "set-key" => {
            if args.len() < 2 {
                usage("quicksense options set-key <provider> [key]");
            }
            let provider = parse_provider(&args[1]);
            let key = args.get(2).cloned().unwrap_or_default();
            let update = match provider {
                LLMProvider::Tongyi => SettingsUpdate {
                    tongyi_api_key: Some(key),
                    ..Default::default()
                },
                LLMProvider::OpenAI => SettingsUpdate {
                    openai_api_key: Some(key),
                    ..Default::default()
                },
            };
            let mut settings = store.load()?;
            settings.apply_update(&update);
            store.save(&settings)?;
            match settings.api_key(provider) {
                Some(_) => println!("Saved API key for {}", provider),
                None => println!("Cleared API key for {}", provider),
            }
        }
        "use" => {
            if args.len() < 2 {
                usage("quicksense options use <provider> [model]");
            }
            let provider = parse_provider(&args[1]);
            let model = args.get(2).cloned();
            let update = SettingsUpdate {
                selected_provider: Some(provider),
                tongyi_model: model.clone().filter(|_| provider == LLMProvider::Tongyi),
                openai_model: model.filter(|_| provider == LLMProvider::OpenAI),
                ..Default::default()
            };
            let mut settings = store.load()?;
            settings.apply_update(&update);
            store.save(&settings)?;
            println!("Using {} ({})", provider, settings.model(provider));
        }
        "verify" => {
            let mut settings = app.settings.load()?;
            if let Some(name) = args.get(1) {
                settings.selected_provider = parse_provider(name);
            }
            let config = match settings.resolve() {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return Ok(1);
                }
            };
            match app.gateway.verify_key(&config).await {
                Ok(()) => println!("API key for {} works ({})", config.provider, config.model),
                Err(e) => {
                    eprintln!("API key check failed: {}", e);
                    return Ok(1);
                }
            }
        }
        other => {
            eprintln!("Unknown options command: {}. Use 'quicksense help' for usage.", other);
            return Ok(2);
        }
    }
    Ok(0)
}
