//! Socket.IO v4 over a plain WebSocket.
//!
//! Every WebSocket text frame carries one Engine.IO packet: a single digit packet type followed
//! by its payload. Engine.IO `message` packets carry a Socket.IO packet, which again starts with
//! a digit. Events are `2` Socket.IO packets whose payload is a JSON array `["name", data]`.

use crate::{
    base::{Player, PlayerKind, Position, RoundEvent, Symbol},
    error::{Error, Result},
};
use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client request to join the default namespace.
pub const CONNECT: &str = "40";
pub const PONG: &str = "3";

const START_GAME: &str = "start-game";
const NEXT_LEVEL_GAME: &str = "next-level-game";
const NEW_PLAY: &str = "new-play";
const UPDATE_LEVEL: &str = "update-level";

/// Build the WebSocket endpoint for a Socket.IO server base URL.
pub fn endpoint(base: &str) -> Result<url::Url> {
    let mut url = url::Url::parse(base)?;
    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => return Err(Error::UnsupportedScheme(other.to_string())),
    };
    // Switching between special schemes always succeeds.
    let _ = url.set_scheme(scheme);
    if !url.path().ends_with("/socket.io/") {
        let path = format!("{}/socket.io/", url.path().trim_end_matches('/'));
        url.set_path(&path);
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket");
    Ok(url)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPayload {
    pub name: String,
    pub symbol: Symbol,
    pub color: String,
    #[serde(rename = "type")]
    pub kind: PlayerKind,
}

impl From<&Player> for PlayerPayload {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            symbol: player.symbol,
            color: player.color_hex(),
            kind: player.kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayPayload {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutgoingEvent {
    StartGame(PlayerPayload),
    NextLevelGame(PlayerPayload),
    NewPlay(PlayPayload),
}

impl From<RoundEvent> for OutgoingEvent {
    fn from(event: RoundEvent) -> Self {
        match event {
            RoundEvent::StartGame(player) => OutgoingEvent::StartGame((&player).into()),
            RoundEvent::NextLevelGame(player) => OutgoingEvent::NextLevelGame((&player).into()),
            RoundEvent::NewPlay { position, symbol } => OutgoingEvent::NewPlay(PlayPayload {
                row: position.row,
                col: position.col,
                symbol: Some(symbol),
            }),
        }
    }
}

impl OutgoingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutgoingEvent::StartGame(_) => START_GAME,
            OutgoingEvent::NextLevelGame(_) => NEXT_LEVEL_GAME,
            OutgoingEvent::NewPlay(_) => NEW_PLAY,
        }
    }

    /// Encode as an Engine.IO message carrying a Socket.IO event.
    pub fn encode(&self) -> Result<String> {
        // Tuples serialize as JSON arrays and keep the payload's field order.
        let array = match self {
            OutgoingEvent::StartGame(player) | OutgoingEvent::NextLevelGame(player) => {
                serde_json::to_string(&(self.name(), player))?
            },
            OutgoingEvent::NewPlay(play) => serde_json::to_string(&(self.name(), play))?,
        };
        Ok(format!("42{array}"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IncomingEvent {
    NewPlay(Position),
    UpdateLevel(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SocketPacket {
    Connect,
    Disconnect,
    /// `None` for events this client does not handle.
    Event(Option<IncomingEvent>),
    ConnectError(String),
    Unsupported(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    Open(String),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

pub fn decode(frame: &str) -> Result<Packet> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| Error::Protocol("empty frame".to_string()))?;
    let payload = chars.as_str();
    match kind {
        '0' => Ok(Packet::Open(payload.to_string())),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket_packet(payload).map(Packet::Message),
        '5' => Ok(Packet::Upgrade),
        '6' => Ok(Packet::Noop),
        other => Err(Error::Protocol(format!("unknown packet type '{other}'"))),
    }
}

fn decode_socket_packet(payload: &str) -> Result<SocketPacket> {
    let mut chars = payload.chars();
    let kind = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| Error::Protocol(format!("invalid Socket.IO packet: {payload:?}")))?;
    let rest = skip_namespace(chars.as_str());
    match kind {
        0 => Ok(SocketPacket::Connect),
        1 => Ok(SocketPacket::Disconnect),
        2 => decode_event(skip_ack_id(rest)).map(SocketPacket::Event),
        4 => Ok(SocketPacket::ConnectError(rest.to_string())),
        n => Ok(SocketPacket::Unsupported(n as u8)),
    }
}

/// Namespaces other than the default one are prefixed as `/name,`.
fn skip_namespace(rest: &str) -> &str {
    if rest.starts_with('/') {
        rest.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        rest
    }
}

fn skip_ack_id(rest: &str) -> &str {
    rest.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn decode_event(payload: &str) -> Result<Option<IncomingEvent>> {
    let value: Value = serde_json::from_str(payload)?;
    let Value::Array(mut items) = value else {
        return Err(Error::Protocol(format!("event payload is not an array: {payload}")));
    };
    if items.is_empty() {
        return Err(Error::Protocol("event without a name".to_string()));
    }
    let name = match items.remove(0) {
        Value::String(name) => name,
        other => return Err(Error::Protocol(format!("invalid event name: {other}"))),
    };
    let data = items.into_iter().next().unwrap_or(Value::Null);
    match name.as_str() {
        NEW_PLAY => {
            let play: PlayPayload = serde_json::from_value(data)?;
            Ok(Some(IncomingEvent::NewPlay(Position::new(play.row, play.col))))
        },
        UPDATE_LEVEL => Ok(Some(IncomingEvent::UpdateLevel(serde_json::from_value(data)?))),
        _ => {
            trace!("Unhandled event '{}'", name);
            Ok(None)
        },
    }
}
