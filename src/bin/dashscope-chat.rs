//! Interactive chat application for conversing with DashScope models.
//!
//! This binary provides a streaming REPL interface for chatting with the
//! qwen family (and the other hosted chat models) via the DashScope API.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage; prompts for an API key and model on first run
//! dashscope-chat
//!
//! # Specify a model for this session
//! dashscope-chat --model qwen-max
//!
//! # Print token usage after each turn
//! dashscope-chat --verbose
//!
//! # Disable colors (useful for piping output)
//! dashscope-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use dot-commands (tab completes them):
//! - `.set_model [name]` - Change the model
//! - `.set_api_key [key]` - Replace the stored API key
//! - `.clean_context` - Clear conversation history
//! - `.set_verbose [on|off]` - Toggle token-usage reporting
//! - `.help` - Show available commands
//! - `.exit` - Exit the application

use std::path::PathBuf;

use arrrg::CommandLine;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use dashscope::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatSession, PlainTextRenderer, RcConfig, Renderer,
    completions, help_text, parse_command,
};
use dashscope::{DashScope, KnownModel, Model};

/// Readline helper that tab-completes the dot-command vocabulary.
struct DotCommandHelper;

impl Completer for DotCommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok((0, completions(&line[..pos])))
    }
}

impl Hinter for DotCommandHelper {
    type Hint = String;
}

impl Highlighter for DotCommandHelper {}

impl Validator for DotCommandHelper {}

impl Helper for DotCommandHelper {}

/// Main entry point for the dashscope-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("dashscope-chat [OPTIONS]");

    let rc_path = match args.rc {
        Some(path) => PathBuf::from(path),
        None => RcConfig::default_path()?,
    };
    let mut rc = RcConfig::load(&rc_path)?;

    let mut rl: Editor<DotCommandHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(DotCommandHelper));

    // First-run setup: the rc file needs a credential and a model.
    if rc.api_key.is_none() {
        rc.api_key = Some(prompt_api_key(&mut rl)?);
        rc.save(&rc_path)?;
    }

    let model = if let Some(model) = args.model.as_deref() {
        parse_model(model)
    } else if let Some(model) = rc.model.clone() {
        model
    } else {
        let model = choose_model(&mut rl, None)?;
        rc.model = Some(model.clone());
        rc.save(&rc_path)?;
        model
    };

    let use_color = !args.no_color;
    let mut config = ChatConfig::new(model).with_verbose(args.verbose || rc.verbose);
    if !use_color {
        config = config.without_color();
    }

    let client = DashScope::new(rc.api_key.clone())?;
    let mut session = ChatSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);

    println!(
        "Current model: {}. Type .set_model to change it.",
        session.model()
    );
    println!("Type .help for commands, .exit to quit\n");

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    renderer.print_info("query can not be empty! please re-type it.");
                    continue;
                }

                let _ = rl.add_history_entry(line.as_str());

                // Check for dot-commands
                if let Some(cmd) = parse_command(&line) {
                    match cmd {
                        ChatCommand::Exit => {
                            println!("Quitting dashscope.");
                            break;
                        }
                        ChatCommand::CleanContext => {
                            session.clear();
                            renderer.print_info(&format!(
                                "The context is cleaned now. Current messages length: {}",
                                session.message_count()
                            ));
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {line}");
                            }
                        }
                        ChatCommand::SetModel(name) => {
                            let model = match name {
                                Some(name) => Some(parse_model(&name)),
                                None => choose_model(&mut rl, Some(session.model().clone())).ok(),
                            };
                            let Some(model) = model else {
                                continue;
                            };
                            session.set_model(model.clone());
                            rc.model = Some(model.clone());
                            save_rc(&rc, &rc_path, &mut renderer);
                            renderer
                                .print_info(&format!("The model is switched to {model} now."));
                        }
                        ChatCommand::SetApiKey(key) => {
                            let key = match key {
                                Some(key) => key,
                                None => {
                                    match rl.readline("Please input your new DashScope api key: ")
                                    {
                                        Ok(key) => key.trim().to_string(),
                                        Err(_) => continue,
                                    }
                                }
                            };
                            if key.is_empty() {
                                continue;
                            }
                            match session.set_api_key(key.clone()) {
                                Ok(()) => {
                                    rc.api_key = Some(key);
                                    save_rc(&rc, &rc_path, &mut renderer);
                                    renderer.print_info("API key updated.");
                                }
                                Err(err) => renderer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::SetVerbose(value) => {
                            let verbose = value.unwrap_or(!session.verbose());
                            session.set_verbose(verbose);
                            rc.verbose = verbose;
                            save_rc(&rc, &rc_path, &mut renderer);
                            renderer.print_info(&format!(
                                "The verbose mode is turned {} now.",
                                if verbose { "on" } else { "off" }
                            ));
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to API; a failed turn returns to
                // the prompt rather than exiting.
                if let Err(e) = session.send_streaming(&line, &mut renderer).await {
                    renderer.print_error(&e.to_string());
                    continue;
                }

                if session.verbose() {
                    print_turn_usage(&session, &mut renderer);
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - back to the prompt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nQuitting dashscope.");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}

fn parse_model(name: &str) -> Model {
    name.parse()
        .unwrap_or_else(|_| Model::Custom(name.to_string()))
}

fn save_rc(rc: &RcConfig, rc_path: &PathBuf, renderer: &mut PlainTextRenderer) {
    if let Err(err) = rc.save(rc_path) {
        renderer.print_error(&format!("Failed to save rc file: {err}"));
    }
}

fn prompt_api_key(
    rl: &mut Editor<DotCommandHelper, DefaultHistory>,
) -> Result<String, ReadlineError> {
    println!(
        "You can visit <https://help.aliyun.com/zh/dashscope/developer-reference/activate-dashscope-and-create-an-api-key> to get an api key."
    );
    loop {
        let key = rl.readline("Please input your DashScope api key: ")?;
        let key = key.trim();
        if key.is_empty() {
            println!("The api key can not be empty.");
            continue;
        }
        return Ok(key.to_string());
    }
}

fn choose_model(
    rl: &mut Editor<DotCommandHelper, DefaultHistory>,
    current: Option<Model>,
) -> Result<Model, ReadlineError> {
    println!(
        "The billing information for the model can be found at: <https://dashscope.console.aliyun.com/billing>."
    );
    println!("Known models:");
    for model in KnownModel::all() {
        println!("  {model}");
    }
    let default = current.unwrap_or(Model::Known(KnownModel::QwenTurbo));
    let line = rl.readline(&format!("Please select your model [{default}]: "))?;
    let line = line.trim();
    if line.is_empty() {
        Ok(default)
    } else {
        Ok(parse_model(line))
    }
}

fn print_turn_usage(session: &ChatSession, renderer: &mut PlainTextRenderer) {
    let stats = session.stats();
    if let Some(usage) = stats.last_turn_usage {
        let request_id = stats.last_request_id.unwrap_or_default();
        renderer.print_verbose(&format!(
            "Used tokens: {}, input: {}, output: {}. {}",
            usage.total(),
            usage.input_tokens,
            usage.output_tokens,
            request_id
        ));
    }
    renderer.print_verbose(&format!(
        "current context message count: {}",
        stats.message_count
    ));
}
