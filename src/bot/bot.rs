use std::fmt::Write;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::command::Command;
use crate::error::Result;
use crate::model::{ParsedRecord, Timestamp, TimestampTrait, UserId};
use crate::parser::{parse_message, ParseError};
use crate::store::{MeasurementStore, TokenRegistry};

pub const USAGE: &str = "Send measurements as text, one per line or separated by commas:
Weight 75.3
Chest - 117,8
\"Body fat\" - 20.5

Start the message with a date to log past values, e.g. DATE: 2023-05-15 or 15.05.2023.

Commands: /link - your dashboard, /last - latest values, /clear - delete everything.";

const FAILURE: &str = "Something went wrong on our side, please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }
}

/// Turns incoming chat messages into stored measurements and reply texts.
pub struct Bot {
    store: Arc<dyn MeasurementStore>,
    tokens: Arc<TokenRegistry>,
    base_url: String,
}

impl Bot {
    pub fn new(
        store: Arc<dyn MeasurementStore>,
        tokens: Arc<TokenRegistry>,
        base_url: &str,
    ) -> Self {
        Self {
            store,
            tokens,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn dashboard_link(&self, user: UserId) -> Result<String> {
        let token = self.tokens.token_for(user)?;
        Ok(format!("{}/u/{}", self.base_url, token))
    }

    pub fn handle(&self, user: UserId, text: &str, now: Timestamp) -> Reply {
        let result = match Command::parse(text) {
            Some(command) => self.command(user, command),
            None => self.measurements(user, text, now),
        };

        result.unwrap_or_else(|e| {
            error!(user, error = %e, "couldn't handle message");
            Reply::new(FAILURE)
        })
    }

    fn command(&self, user: UserId, command: Command) -> Result<Reply> {
        match command {
            Command::Start | Command::Help => Ok(Reply::new(format!(
                "{}\n\nYour dashboard: {}",
                USAGE,
                self.dashboard_link(user)?
            ))),
            Command::Link => Ok(Reply::new(self.dashboard_link(user)?)),
            Command::Last => {
                let latest = self.store.latest_per_key(user)?;
                if latest.is_empty() {
                    return Ok(Reply::new("Nothing recorded yet.\n\n".to_owned() + USAGE));
                }

                let mut text = String::from("Latest values:");
                for (key, value) in latest {
                    let _ = write!(text, "\n{} = {}", key, value);
                }
                Ok(Reply::new(text))
            }
            Command::Clear => {
                self.store.clear(user)?;
                Ok(Reply::new("All your measurements were deleted."))
            }
            Command::Unknown(name) => Ok(Reply::new(format!(
                "Unknown command /{}.\n\n{}",
                name, USAGE
            ))),
        }
    }

    fn measurements(&self, user: UserId, text: &str, now: Timestamp) -> Result<Reply> {
        let records = match parse_message(text) {
            Ok(records) => records,
            Err(e) => {
                warn!(user, error = %e, "couldn't parse message");
                return Ok(Reply::new(parse_failure(&e)));
            }
        };

        if records.is_empty() {
            return Ok(Reply::new(USAGE));
        }

        // Nothing is stored unless the full reply can be built.
        let link = self.dashboard_link(user)?;

        self.store.append(user, &records, now)?;
        info!(user, records = records.len(), "stored measurements");

        Ok(Reply::new(format!("{}\n\nDashboard: {}", saved(&records), link)))
    }
}

fn saved(records: &[ParsedRecord]) -> String {
    let mut text = match records.len() {
        1 => String::from("Saved 1 measurement"),
        n => format!("Saved {} measurements", n),
    };

    if let Some(ts) = records[0].timestamp() {
        let _ = write!(text, " for {}", ts.to_date_string());
    }
    text.push(':');

    for record in records {
        let _ = write!(text, "\n{} = {}", record.key(), record.value());
    }
    text
}

fn parse_failure(err: &ParseError) -> String {
    format!(
        "Couldn't understand \"{}\" (line {}). Nothing was saved.\n\n{}",
        err.fragment(),
        err.line(),
        USAGE
    )
}
