use serde::{Deserialize, Serialize};

use crate::game::Mark;

/*
    The message vocabulary exchanged between server and client. The set is
    closed: both sides match exhaustively on the kind, and the channel layer
    rejects any tag outside this list instead of skipping it.
 */

/// Identity announced to a client once onboarding assigns it an id and sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: u8,
    pub name: String,
    pub sign: Mark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    // Server to client. `Board` and `Result` are broadcast to both players.
    Name { prompt: String },
    Player { player: PlayerInfo },
    Board { board: String, size: u32 },
    Choice { prompt: String },
    Info { prompt: String },
    Error { prompt: String, message: String },
    Result { message: String },

    // Client to server.
    NameReply { name: String },
    ChoiceReply { choice: u32 },
}

impl Message {
    /// The wire tag for this message, as written by the serializer.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Name { .. } => "name",
            Message::Player { .. } => "player",
            Message::Board { .. } => "board",
            Message::Choice { .. } => "choice",
            Message::Info { .. } => "info",
            Message::Error { .. } => "error",
            Message::Result { .. } => "result",
            Message::NameReply { .. } => "name_reply",
            Message::ChoiceReply { .. } => "choice_reply",
        }
    }

    pub fn is_known_kind(kind: &str) -> bool {
        matches!(
            kind,
            "name"
                | "player"
                | "board"
                | "choice"
                | "info"
                | "error"
                | "result"
                | "name_reply"
                | "choice_reply"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_serialized_form() {
        let messages = [
            Message::Name { prompt: "Enter player 1 name: ".to_string() },
            Message::Player {
                player: PlayerInfo { id: 1, name: "alice".to_string(), sign: Mark::X },
            },
            Message::Board { board: "\n - \n".to_string(), size: 1 },
            Message::Choice { prompt: "Choose (1-9): ".to_string() },
            Message::Info { prompt: "waiting..".to_string() },
            Message::Error { prompt: "Choose (1-9): ".to_string(), message: "invalid".to_string() },
            Message::Result { message: "alice won the game!!".to_string() },
            Message::NameReply { name: "alice".to_string() },
            Message::ChoiceReply { choice: 5 },
        ];

        for message in messages {
            let value = serde_json::to_value(&message).unwrap();
            assert_eq!(value["kind"], message.kind());
            assert!(Message::is_known_kind(message.kind()));
        }
    }

    #[test]
    fn player_record_nests_id_name_and_sign() {
        let message = Message::Player {
            player: PlayerInfo { id: 2, name: "bob".to_string(), sign: Mark::O },
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["player"]["id"], 2);
        assert_eq!(value["player"]["name"], "bob");
        assert_eq!(value["player"]["sign"], "O");
    }
}
