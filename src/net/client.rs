use super::protocol::{self, IncomingEvent, OutgoingEvent, Packet, SocketPacket};
use crate::error::{Error, Result};
use iced::futures::{SinkExt, StreamExt, channel::mpsc};
use log::{debug, error, info, trace, warn};
use std::collections::VecDeque;
use tokio_tungstenite::tungstenite::Message;

/// Handle for emitting events on an established connection.
#[derive(Debug, Clone)]
pub struct Connection(tokio::sync::mpsc::UnboundedSender<OutgoingEvent>);

impl Connection {
    /// Queue `event` for sending. Gives the event back if the connection is gone.
    pub fn send(&self, event: OutgoingEvent) -> std::result::Result<(), OutgoingEvent> {
        trace!("Queueing outgoing event '{}'", event.name());
        self.0.send(event).map_err(|e| {
            warn!("Connection closed, cannot send '{}'", e.0.name());
            e.0
        })
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Connected(Connection),
    Received(IncomingEvent),
    /// `unsent` holds events handed to the connection that never reached the socket, oldest first.
    Disconnected {
        reason: String,
        unsent: Vec<OutgoingEvent>,
    },
}

/// Outgoing events waiting for a connection, sent in the order they were emitted.
#[derive(Debug, Default)]
pub struct Outbox(VecDeque<OutgoingEvent>);

impl Outbox {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Queue `event` behind anything still pending and send what can be sent on `connection`.
    pub fn emit(&mut self, connection: Option<&Connection>, event: OutgoingEvent) {
        self.0.push_back(event);
        match connection {
            Some(connection) => {
                self.flush(connection);
            },
            None => debug!("Not connected, {} event(s) buffered", self.0.len()),
        }
    }

    /// Send pending events in order. Stops at the first event the connection refuses and keeps it
    /// and everything behind it. Returns the number of events sent.
    pub fn flush(&mut self, connection: &Connection) -> usize {
        let mut sent = 0;
        while let Some(event) = self.0.pop_front() {
            if let Err(event) = connection.send(event) {
                self.0.push_front(event);
                break;
            }
            sent += 1;
        }
        sent
    }

    /// Put events a lost connection never delivered back in front of the queue.
    pub fn requeue(&mut self, unsent: Vec<OutgoingEvent>) {
        if !unsent.is_empty() {
            debug!("Requeueing {} undelivered event(s)", unsent.len());
        }
        for event in unsent.into_iter().rev() {
            self.0.push_front(event);
        }
    }
}

/// Install the process-wide crypto provider used for `wss` connections.
pub fn install_tls_provider() {
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        debug!("TLS crypto provider already installed");
    }
}

/// Connect to the Socket.IO server at `url`.
///
/// The subscription reports a single `Disconnected` and then stays idle. Bump `generation` to
/// connect again.
pub fn connect(url: String, generation: u64) -> iced::Subscription<Event> {
    iced::Subscription::run_with((url, generation), |(url, _)| {
        let url = url.clone();
        iced::stream::channel(100, move |output| run(url, output))
    })
}

async fn run(url: String, mut output: mpsc::Sender<Event>) {
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let mut unsent = Vec::new();
    let reason = match session(&url, &mut output, sender, &mut receiver, &mut unsent).await {
        Ok(()) => {
            info!("Connection to {} closed", url);
            "connection closed by the server".to_string()
        },
        Err(e) => {
            error!("Connection to {} failed: {}", url, e);
            e.to_string()
        },
    };
    receiver.close();
    while let Ok(event) = receiver.try_recv() {
        unsent.push(event);
    }
    if !unsent.is_empty() {
        warn!("{} event(s) were not delivered to {}", unsent.len(), url);
    }
    _ = output.send(Event::Disconnected { reason, unsent }).await;
}

async fn session(
    url: &str,
    output: &mut mpsc::Sender<Event>,
    sender: tokio::sync::mpsc::UnboundedSender<OutgoingEvent>,
    receiver: &mut tokio::sync::mpsc::UnboundedReceiver<OutgoingEvent>,
    unsent: &mut Vec<OutgoingEvent>,
) -> Result<()> {
    let endpoint = protocol::endpoint(url)?;
    info!("Connecting to {}", endpoint);
    let (websocket, _) = tokio_tungstenite::connect_async(endpoint.as_str()).await?;
    debug!("WebSocket established, waiting for handshake");
    let (mut write, mut read) = websocket.split();
    let mut sender = Some(sender);

    loop {
        tokio::select! {
            frame = read.next() => {
                let Some(frame) = frame else {
                    return Ok(());
                };
                let text = match frame? {
                    Message::Text(text) => text,
                    Message::Close(frame) => {
                        debug!("Close frame received: {:?}", frame);
                        return Ok(());
                    },
                    other => {
                        trace!("Ignoring non-text frame: {:?}", other);
                        continue;
                    },
                };
                trace!("<- {}", text.as_str());
                let packet = match protocol::decode(text.as_str()) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Failed to decode frame {:?}: {}", text.as_str(), e);
                        continue;
                    },
                };
                match packet {
                    Packet::Open(handshake) => {
                        debug!("Handshake: {}", handshake);
                        write.send(Message::text(protocol::CONNECT)).await?;
                    },
                    Packet::Ping => write.send(Message::text(protocol::PONG)).await?,
                    Packet::Close | Packet::Message(SocketPacket::Disconnect) => return Ok(()),
                    Packet::Message(SocketPacket::Connect) => {
                        if let Some(sender) = sender.take() {
                            info!("Connected to {}", url);
                            _ = output.send(Event::Connected(Connection(sender))).await;
                        }
                    },
                    Packet::Message(SocketPacket::ConnectError(reason)) => {
                        return Err(Error::Protocol(format!("connection refused: {reason}")));
                    },
                    Packet::Message(SocketPacket::Event(Some(event))) => {
                        debug!("Received {:?}", event);
                        _ = output.send(Event::Received(event)).await;
                    },
                    packet => trace!("Ignoring packet {:?}", packet),
                }
            },
            Some(event) = receiver.recv() => {
                let text = event.encode()?;
                trace!("-> {}", text);
                if let Err(e) = write.send(Message::text(text)).await {
                    unsent.push(event);
                    return Err(e.into());
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{base::Symbol, net::protocol::PlayPayload};
    use tokio_tungstenite::{WebSocketStream, tungstenite};

    fn play(row: usize, col: usize) -> OutgoingEvent {
        OutgoingEvent::NewPlay(PlayPayload {
            row,
            col,
            symbol: Some(Symbol::X),
        })
    }

    fn channel() -> (Connection, tokio::sync::mpsc::UnboundedReceiver<OutgoingEvent>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (Connection(sender), receiver)
    }

    fn drain(receiver: &mut tokio::sync::mpsc::UnboundedReceiver<OutgoingEvent>) -> Vec<OutgoingEvent> {
        std::iter::from_fn(|| receiver.try_recv().ok()).collect()
    }

    async fn next_text(server: &mut WebSocketStream<tokio::net::TcpStream>) -> String {
        loop {
            match server.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("Expected a text frame, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_outbox_buffers_until_connected() {
        let mut outbox = Outbox::default();
        outbox.emit(None, play(0, 0));
        outbox.emit(None, play(1, 1));
        outbox.emit(None, play(2, 2));
        assert_eq!(outbox.len(), 3);

        let (connection, mut receiver) = channel();
        assert_eq!(outbox.flush(&connection), 3);
        assert!(outbox.is_empty());
        assert_eq!(drain(&mut receiver), vec![play(0, 0), play(1, 1), play(2, 2)]);
    }

    #[test]
    fn test_outbox_sends_immediately_when_connected() {
        let mut outbox = Outbox::default();
        let (connection, mut receiver) = channel();
        outbox.emit(Some(&connection), play(0, 1));
        assert!(outbox.is_empty());
        assert_eq!(drain(&mut receiver), vec![play(0, 1)]);
    }

    #[test]
    fn test_outbox_keeps_events_refused_by_a_closed_connection() {
        let mut outbox = Outbox::default();
        outbox.emit(None, play(0, 0));
        outbox.emit(None, play(0, 1));

        let (closed, receiver) = channel();
        drop(receiver);
        assert_eq!(outbox.flush(&closed), 0);
        outbox.emit(Some(&closed), play(0, 2));
        assert_eq!(outbox.len(), 3);

        let (connection, mut receiver) = channel();
        assert_eq!(outbox.flush(&connection), 3);
        assert_eq!(drain(&mut receiver), vec![play(0, 0), play(0, 1), play(0, 2)]);
    }

    #[test]
    fn test_outbox_requeues_undelivered_events_first() {
        let mut outbox = Outbox::default();
        outbox.emit(None, play(2, 2));
        outbox.requeue(vec![play(0, 0), play(1, 1)]);

        let (connection, mut receiver) = channel();
        outbox.flush(&connection);
        assert_eq!(drain(&mut receiver), vec![play(0, 0), play(1, 1), play(2, 2)]);
    }

    #[tokio::test]
    async fn test_session_handshake() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (output, mut events) = mpsc::channel(16);
        tokio::spawn(run(url, output));

        let (stream, _) = listener.accept().await.unwrap();
        let mut server = tokio_tungstenite::accept_async(stream).await.unwrap();
        server
            .send(Message::text(r#"0{"sid":"abc","pingInterval":25000,"pingTimeout":20000}"#))
            .await
            .unwrap();
        assert_eq!(next_text(&mut server).await, "40");

        server.send(Message::text("2")).await.unwrap();
        assert_eq!(next_text(&mut server).await, "3");

        // The first event reported is the namespace acknowledgement.
        server.send(Message::text(r#"40{"sid":"xyz"}"#)).await.unwrap();
        let Some(Event::Connected(connection)) = events.next().await else {
            panic!("Expected Connected");
        };
        connection.send(play(0, 1)).unwrap();
        assert_eq!(
            next_text(&mut server).await,
            r#"42["new-play",{"row":0,"col":1,"symbol":"X"}]"#
        );

        server.send(Message::text(r#"42["update-level",2]"#)).await.unwrap();
        assert!(matches!(
            events.next().await,
            Some(Event::Received(IncomingEvent::UpdateLevel(2)))
        ));

        server.send(Message::text(r#"44{"message":"denied"}"#)).await.unwrap();
        match events.next().await {
            Some(Event::Disconnected { reason, unsent }) => {
                assert!(reason.contains("denied"), "{reason}");
                assert!(unsent.is_empty());
            },
            other => panic!("Expected Disconnected, got {:?}", other),
        }
        assert!(connection.send(play(1, 1)).is_err());
    }

    #[tokio::test]
    async fn test_session_reports_refused_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        drop(listener);
        let (output, mut events) = mpsc::channel(16);
        run(url, output).await;
        assert!(matches!(events.next().await, Some(Event::Disconnected { .. })));
    }

    #[tokio::test]
    async fn test_secure_scheme_is_supported() {
        install_tls_provider();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("wss://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Hang up before the TLS handshake.
            let _ = listener.accept().await;
        });
        let result = tokio_tungstenite::connect_async(url.as_str()).await;
        assert!(
            !matches!(
                result,
                Err(tungstenite::Error::Url(tungstenite::error::UrlError::TlsFeatureNotEnabled))
            ),
            "{:?}",
            result.err()
        );
    }
}
