use iced::Task;
use log::{debug, error, info, trace, warn};

use crate::{
    config::*,
    net::{client, protocol},
    ui::{
        game::{Game, GameMessage},
        *,
    },
};

#[derive(Debug, Clone)]
pub enum ConnectionState {
    Connecting,
    Connected(client::Connection),
    Disconnected,
}

#[derive(Debug, Clone)]
pub enum AppMessage {
    GetWindowId(Option<iced::window::Id>),
    Game(GameMessage),
    Socket(client::Event),
    Reconnect,
    Modal(modal::ModalMessage),
    CloseWindow(iced::window::Id),
}

impl From<GameMessage> for AppMessage {
    fn from(message: GameMessage) -> Self {
        AppMessage::Game(message)
    }
}

pub struct App {
    config: GlobalConfig,
    /// Cleared when an existing config file could not be read, so it is not overwritten on exit.
    save_config: bool,
    id: Option<iced::window::Id>,
    game: Game,
    connection: ConnectionState,
    outbox: client::Outbox,
    generation: u64,
    current_modal: modal::Modal,
    error: modal::error::ErrorModal,
}

impl App {
    pub fn new() -> (Self, Task<AppMessage>) {
        let (config, save_config) = GlobalConfig::load_or_default();
        let mut app = Self {
            game: Game::new(&config),
            config,
            save_config,
            id: None,
            connection: ConnectionState::Connecting,
            outbox: client::Outbox::default(),
            generation: 0,
            current_modal: modal::Modal::default(),
            error: modal::error::ErrorModal::new(),
        };
        app.update_game(GameMessage::NewGame);
        (app, iced::window::latest().map(AppMessage::GetWindowId))
    }

    fn modal<'a, Message>(
        base: impl Into<iced::Element<'a, Message>>,
        content: impl Into<iced::Element<'a, Message>>,
        on_blur: Message,
    ) -> iced::Element<'a, Message>
    where
        Message: Clone + 'a,
    {
        iced::widget::stack![
            base.into(),
            iced::widget::opaque(
                iced::widget::mouse_area(iced::widget::center(iced::widget::opaque(content)).style(|_theme| {
                    iced::widget::container::Style {
                        background: Some(
                            iced::Color {
                                a: 0.8,
                                ..iced::Color::BLACK
                            }
                            .into(),
                        ),
                        ..iced::widget::container::Style::default()
                    }
                }))
                .on_press(on_blur)
            )
        ]
        .into()
    }

    fn update_game(&mut self, msg: GameMessage) {
        if let Some(event) = self.game.update(msg) {
            self.emit(event.into());
        }
    }

    fn emit(&mut self, event: protocol::OutgoingEvent) {
        let connection = match &self.connection {
            ConnectionState::Connected(connection) => Some(connection),
            _ => None,
        };
        self.outbox.emit(connection, event);
    }

    pub fn update(&mut self, msg: AppMessage) -> Task<AppMessage> {
        trace!("AppMessage received: {:?}", msg);
        match msg {
            AppMessage::GetWindowId(id) => {
                debug!("Window ID obtained: {:?}", id);
                self.id = id;
            },
            AppMessage::Game(msg) => self.update_game(msg),
            AppMessage::Socket(client::Event::Connected(connection)) => {
                let sent = self.outbox.flush(&connection);
                info!("Connected, flushed {} buffered event(s)", sent);
                self.connection = ConnectionState::Connected(connection);
            },
            AppMessage::Socket(client::Event::Received(protocol::IncomingEvent::NewPlay(position))) => {
                self.update_game(GameMessage::RemotePlay(position));
            },
            AppMessage::Socket(client::Event::Received(protocol::IncomingEvent::UpdateLevel(level))) => {
                self.update_game(GameMessage::LevelUpdated(level));
            },
            AppMessage::Socket(client::Event::Disconnected { reason, unsent }) => {
                warn!("Disconnected from {}: {}", self.config.server_url, reason);
                self.outbox.requeue(unsent);
                self.connection = ConnectionState::Disconnected;
                self.error.show(
                    "Connection Error",
                    format!("Disconnected from {}: {}", self.config.server_url, reason),
                );
                self.current_modal = modal::Modal::Error;
            },
            AppMessage::Reconnect => {
                if matches!(self.connection, ConnectionState::Disconnected) {
                    self.generation += 1;
                    info!("Reconnecting to {} (attempt {})", self.config.server_url, self.generation);
                    self.connection = ConnectionState::Connecting;
                }
            },
            AppMessage::Modal(modal::ModalMessage::Error(modal::error::ErrorMessage::Acknowledge)) => {
                debug!("Closing modal: {:?}", self.current_modal);
                self.current_modal = modal::Modal::None;
            },
            AppMessage::CloseWindow(id) => match self.id {
                Some(main_id) if main_id != id => {
                    debug!("Ignoring close request for non-main window: {:?}", id);
                },
                _ => {
                    if !self.outbox.is_empty() {
                        warn!("Exiting with {} event(s) never sent", self.outbox.len());
                    }
                    if self.save_config {
                        debug!("Saving config on exit: {:?}", self.config);
                        if let Err(e) = self.config.save() {
                            error!("Failed to save config: {}", e);
                        }
                    } else {
                        info!("Config file could not be read at start-up, leaving it untouched");
                    }
                    return iced::exit();
                },
            },
        }
        Task::none()
    }

    pub fn view(&self) -> iced::Element<'_, AppMessage> {
        let round = self.game.round();
        let (connection_label, connection_color) = match self.connection {
            ConnectionState::Connecting => ("Connecting...", iced::Color::from_rgb8(0xd6, 0x9e, 0x2e)),
            ConnectionState::Connected(_) => ("Connected", iced::Color::from_rgb8(0x2e, 0xa0, 0x43)),
            ConnectionState::Disconnected => ("Disconnected", iced::Color::from_rgb8(0xd0, 0x32, 0x32)),
        };
        let status = if round.is_running() {
            format!("{}'s turn ({})", round.current_player().name, round.current_player().symbol)
        } else {
            String::new()
        };

        let controls = iced::widget::row![
            iced::widget::button(iced::widget::text("New Game").align_x(iced::alignment::Horizontal::Center))
                .width(120.0)
                .on_press(AppMessage::Game(GameMessage::NewGame)),
            iced::widget::button(iced::widget::text("Next Level").align_x(iced::alignment::Horizontal::Center))
                .width(120.0)
                .on_press_maybe(
                    (!round.is_running() && round.is_winner()).then_some(AppMessage::Game(GameMessage::NextLevel))
                ),
            iced::widget::button(iced::widget::text("Reconnect").align_x(iced::alignment::Horizontal::Center))
                .width(120.0)
                .on_press_maybe(
                    matches!(self.connection, ConnectionState::Disconnected).then_some(AppMessage::Reconnect)
                ),
        ]
        .spacing(8);

        let base = iced::widget::scrollable(iced::widget::center_x(
            iced::widget::column![
                iced::widget::text("Tic-Tac-Toe").size(28),
                iced::widget::row![
                    iced::widget::text(format!("Level {}", round.level())).size(16),
                    iced::widget::space().width(iced::Fill),
                    iced::widget::text(connection_label).size(16).color(connection_color),
                ]
                .width(self.config.canvas_size as f32),
                iced::widget::text(round.message()).size(16),
                self.game.view().map(AppMessage::Game),
                iced::widget::text(status).size(16),
                iced::widget::text(round.result()).size(24),
                controls,
            ]
            .spacing(8)
            .padding(16)
            .align_x(iced::alignment::Horizontal::Center),
        ))
        .width(iced::Length::Fill)
        .height(iced::Length::Fill);

        trace!("Rendering view with current modal: {:?}", self.current_modal);
        match self.current_modal {
            modal::Modal::Error => App::modal(
                base,
                self.error.view().map(modal::ModalMessage::Error).map(AppMessage::Modal),
                AppMessage::Modal(modal::ModalMessage::Error(modal::error::ErrorMessage::Acknowledge)),
            ),
            modal::Modal::None => base.into(),
        }
    }

    pub fn theme(&self) -> Option<iced::Theme> {
        Some(iced::Theme::Light)
    }

    pub fn subscriptions(&self) -> iced::Subscription<AppMessage> {
        iced::Subscription::batch([
            iced::window::close_requests().map(AppMessage::CloseWindow),
            client::connect(self.config.server_url.clone(), self.generation).map(AppMessage::Socket),
        ])
    }
}
