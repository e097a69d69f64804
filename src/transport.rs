//! Transport boundary types
//!
//! The chat transport is an external collaborator: it delivers inbound
//! text events tagged with the user identity and accepts outbound
//! reply text with a markup mode. Only the boundary shapes and the
//! command surface live here.

use serde::{Deserialize, Serialize};

/// One inbound text event from the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub user_id: i64,
    pub user_name: String,
    pub text: String,
}

/// Markup mode for outbound replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    Plain,
    Markdown,
    Html,
}

/// Outbound reply text plus its markup mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Markdown,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Html,
        }
    }
}

/// Command surface consumed by the assistant. Anything that is not a
/// known slash command is treated as free text for the extraction
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Report,
    Clear { confirmation: Option<&'a str> },
    Text(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(text: &'a str) -> Self {
        let trimmed = text.trim();

        if let Some(rest) = trimmed.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            match parts.next() {
                Some("start") => return Command::Start,
                Some("report") => return Command::Report,
                Some("clear") => {
                    return Command::Clear {
                        confirmation: parts.next(),
                    }
                }
                _ => {}
            }
        }

        Command::Text(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("  /report  "), Command::Report);
    }

    #[test]
    fn clear_captures_the_confirmation_argument() {
        assert_eq!(
            Command::parse("/clear"),
            Command::Clear { confirmation: None }
        );
        assert_eq!(
            Command::parse("/clear yes"),
            Command::Clear {
                confirmation: Some("yes")
            }
        );
        assert_eq!(
            Command::parse("/clear maybe"),
            Command::Clear {
                confirmation: Some("maybe")
            }
        );
    }

    #[test]
    fn free_text_and_unknown_commands_fall_through() {
        assert_eq!(
            Command::parse("gastei 55,90 no supermercado"),
            Command::Text("gastei 55,90 no supermercado")
        );
        assert_eq!(Command::parse("/frobnicate"), Command::Text("/frobnicate"));
    }

    #[test]
    fn reply_constructors_set_the_parse_mode() {
        assert_eq!(Reply::plain("hi").parse_mode, ParseMode::Plain);
        assert_eq!(Reply::markdown("hi").parse_mode, ParseMode::Markdown);
        assert_eq!(Reply::html("hi").parse_mode, ParseMode::Html);
    }
}
