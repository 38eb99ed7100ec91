use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::coordinates::Coordinates;

const SEPARATOR: char = '|';

/// Failures decoding text coming off the wire. These never reach the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Empty coordinate label")]
    EmptyLabel,
    #[error("Missing column letter in '{0}'")]
    MissingColumn(String),
    #[error("Invalid column '{0}'")]
    InvalidColumn(char),
    #[error("Missing row number in '{0}'")]
    MissingRow(String),
    #[error("Invalid row '{0}'")]
    InvalidRow(String),
    #[error("Missing '|' separator in '{0}'")]
    MissingSeparator(String),
    #[error("Too many '|' separators in '{0}'")]
    TooManyParts(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Move channel closed")]
    Closed,
    #[error("Undecodable move: {0}")]
    Decode(#[from] ProtocolError),
}

/// A move as exchanged between two games, encoded as `D6|D10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Move {
    pub from: Coordinates,
    pub to: Coordinates,
}

impl Move {
    pub fn new(from: Coordinates, to: Coordinates) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.from, SEPARATOR, self.to)
    }
}

impl FromStr for Move {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(SEPARATOR);
        let (Some(from), Some(to)) = (parts.next(), parts.next()) else {
            return Err(ProtocolError::MissingSeparator(s.to_string()));
        };
        if parts.next().is_some() {
            return Err(ProtocolError::TooManyParts(s.to_string()));
        }

        Ok(Move::new(from.parse()?, to.parse()?))
    }
}

impl TryFrom<String> for Move {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Move> for String {
    fn from(mv: Move) -> String {
        mv.to_string()
    }
}

/// Transport seam between two games.
pub trait MoveChannel {
    fn send_move(&mut self, mv: Move) -> impl Future<Output = Result<(), ChannelError>> + Send;

    fn receive_move(&mut self) -> impl Future<Output = Result<Move, ChannelError>> + Send;
}

/// One end of an in-process channel pair. Each direction holds at most one
/// pending move, so a sender waits until the peer has taken the previous one.
#[derive(Debug)]
pub struct LocalChannel {
    outgoing: mpsc::Sender<String>,
    incoming: mpsc::Receiver<String>,
}

impl LocalChannel {
    pub fn pair() -> (LocalChannel, LocalChannel) {
        let (left_tx, left_rx) = mpsc::channel(1);
        let (right_tx, right_rx) = mpsc::channel(1);
        (
            LocalChannel {
                outgoing: left_tx,
                incoming: right_rx,
            },
            LocalChannel {
                outgoing: right_tx,
                incoming: left_rx,
            },
        )
    }
}

impl MoveChannel for LocalChannel {
    async fn send_move(&mut self, mv: Move) -> Result<(), ChannelError> {
        self.outgoing
            .send(mv.to_string())
            .await
            .map_err(|_| ChannelError::Closed)
    }

    async fn receive_move(&mut self) -> Result<Move, ChannelError> {
        let text = self.incoming.recv().await.ok_or(ChannelError::Closed)?;
        Ok(text.parse()?)
    }
}
