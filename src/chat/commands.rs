//! Dot-command parsing for the chat application.
//!
//! This module handles the administrative commands that start with `.`,
//! allowing users to control the session without sending a query to the
//! API.

/// The full command vocabulary, used for tab completion at the prompt.
pub const COMMANDS: &[&str] = &[
    ".set_model",
    ".set_api_key",
    ".clean_context",
    ".exit",
    ".set_verbose",
    ".help",
];

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Change the model. `None` triggers an interactive pick.
    SetModel(Option<String>),

    /// Replace the stored API key. `None` triggers an interactive prompt.
    SetApiKey(Option<String>),

    /// Clear the conversation history.
    CleanContext,

    /// Set verbose mode. `None` toggles the current value.
    SetVerbose(Option<bool>),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Exit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for dot-commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a chat query.
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('.') {
        return None;
    }

    let mut parts = input.splitn(2, ' ');
    let command = parts.next()?;
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let result = match command {
        ".set_model" => ChatCommand::SetModel(argument.map(String::from)),
        ".set_api_key" => ChatCommand::SetApiKey(argument.map(String::from)),
        ".clean_context" => ChatCommand::CleanContext,
        ".set_verbose" => match argument {
            None => ChatCommand::SetVerbose(None),
            Some(arg) => match parse_on_off(arg) {
                Some(value) => ChatCommand::SetVerbose(Some(value)),
                None => ChatCommand::Invalid(".set_verbose expects 'on' or 'off'".to_string()),
            },
        },
        ".help" => ChatCommand::Help,
        ".exit" => ChatCommand::Exit,
        _ => ChatCommand::Invalid(format!("Unknown command: {command}")),
    };

    Some(result)
}

/// Completion candidates for a partially typed line.
///
/// Commands matching the prefix are offered; if nothing matches, the full
/// vocabulary is shown instead of nothing.
pub fn completions(line: &str) -> Vec<String> {
    let hits: Vec<String> = COMMANDS
        .iter()
        .filter(|command| command.starts_with(line))
        .map(|command| command.to_string())
        .collect();
    if hits.is_empty() {
        COMMANDS.iter().map(|command| command.to_string()).collect()
    } else {
        hits
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#".set_model [name]      choose model
.set_api_key [key]     set api key
.clean_context         clean context
.set_verbose [on|off]  turn on/off verbose mode
.help                  show this help
.exit                  exit the program"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exit() {
        assert_eq!(parse_command(".exit"), Some(ChatCommand::Exit));
        assert_eq!(parse_command("  .exit  "), Some(ChatCommand::Exit));
    }

    #[test]
    fn parse_set_model() {
        assert_eq!(
            parse_command(".set_model"),
            Some(ChatCommand::SetModel(None))
        );
        assert_eq!(
            parse_command(".set_model qwen-max"),
            Some(ChatCommand::SetModel(Some("qwen-max".to_string())))
        );
        assert_eq!(
            parse_command(".set_model   qwen-turbo  "),
            Some(ChatCommand::SetModel(Some("qwen-turbo".to_string())))
        );
    }

    #[test]
    fn parse_set_api_key() {
        assert_eq!(
            parse_command(".set_api_key"),
            Some(ChatCommand::SetApiKey(None))
        );
        assert_eq!(
            parse_command(".set_api_key sk-abc"),
            Some(ChatCommand::SetApiKey(Some("sk-abc".to_string())))
        );
    }

    #[test]
    fn parse_clean_context() {
        assert_eq!(
            parse_command(".clean_context"),
            Some(ChatCommand::CleanContext)
        );
    }

    #[test]
    fn parse_set_verbose() {
        assert_eq!(
            parse_command(".set_verbose"),
            Some(ChatCommand::SetVerbose(None))
        );
        assert_eq!(
            parse_command(".set_verbose on"),
            Some(ChatCommand::SetVerbose(Some(true)))
        );
        assert_eq!(
            parse_command(".set_verbose false"),
            Some(ChatCommand::SetVerbose(Some(false)))
        );
        assert!(matches!(
            parse_command(".set_verbose maybe"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("expects")
        ));
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(
            parse_command(".bogus"),
            Some(ChatCommand::Invalid(msg)) if msg.contains(".bogus")
        ));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello!"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn completion_prefix_match() {
        assert_eq!(
            completions(".set_m"),
            vec![".set_model".to_string()]
        );
        assert_eq!(
            completions(".set_"),
            vec![
                ".set_model".to_string(),
                ".set_api_key".to_string(),
                ".set_verbose".to_string(),
            ]
        );
    }

    #[test]
    fn completion_falls_back_to_all() {
        // Show the whole vocabulary when nothing matches.
        assert_eq!(completions(".zzz").len(), COMMANDS.len());
    }

    #[test]
    fn help_text_covers_all_commands() {
        let help = help_text();
        for command in COMMANDS {
            assert!(help.contains(command), "missing {command}");
        }
    }
}
