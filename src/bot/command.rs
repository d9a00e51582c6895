#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Link,
    Last,
    Clear,
    Unknown(String),
}

impl Command {
    /// `None` for anything that isn't a slash command.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        // Group chats address commands as /name@botname.
        let name = name.split('@').next().unwrap_or(name);

        Some(match name.to_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "link" => Command::Link,
            "last" => Command::Last,
            "clear" => Command::Clear,
            _ => Command::Unknown(name.to_owned()),
        })
    }
}
