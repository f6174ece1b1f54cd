use crate::config::MAX_COUNT;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    Quit,
    Help,
    SetLanguages(Vec<String>),
    SetCount(usize),
    Ask(String),
    Invalid(String),
}

/// Maps one line of chat input to an action. Blank lines map to `None`.
pub fn map_line_to_action(line: &str) -> Option<ChatAction> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.to_lowercase().as_str() {
        "exit" | "quit" | ":q" => return Some(ChatAction::Quit),
        ":help" | ":h" | "?" => return Some(ChatAction::Help),
        _ => {}
    }

    let Some(command) = line.strip_prefix(':') else {
        return Some(ChatAction::Ask(line.to_string()));
    };
    let (name, arg) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
    let arg = arg.trim();

    Some(match name.to_lowercase().as_str() {
        "lang" | "languages" => {
            let languages: Vec<String> = arg
                .split(',')
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect();
            if languages.is_empty() {
                ChatAction::Invalid("usage: :lang hindi,malayalam".into())
            } else {
                ChatAction::SetLanguages(languages)
            }
        }
        "count" | "n" => match arg.parse::<usize>() {
            Ok(n) if (1..=MAX_COUNT).contains(&n) => ChatAction::SetCount(n),
            _ => ChatAction::Invalid(format!("usage: :count <1-{MAX_COUNT}>")),
        },
        other => ChatAction::Invalid(format!("unknown command :{other} (try :help)")),
    })
}
