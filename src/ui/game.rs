use crate::{
    base::{Outcome, Player, PlayerKind, Position, Round, RoundEvent},
    config::GlobalConfig,
    ui::board_area::BoardArea,
    utils,
};
use iced::widget::canvas;
use log::{debug, trace};

#[derive(Debug, Clone)]
pub enum GameMessage {
    Clicked(Position),
    PressedPositionChanged,
    RemotePlay(Position),
    LevelUpdated(u32),
    NewGame,
    NextLevel,
}

#[derive(Debug, Clone, Copy, Default)]
pub enum MouseState {
    #[default]
    Idle,
    LeftDown(Option<Position>),
}

pub struct Game {
    round: Round,
    board_area: BoardArea,
    grid_color: iced::Color,
    grid_line_width: f32,
    cache: canvas::Cache,
}

impl Game {
    pub fn new(config: &GlobalConfig) -> Self {
        Self {
            round: Round::new(config.personal_player(), config.computer_player()),
            board_area: BoardArea::calculate(config.canvas_size),
            grid_color: utils::color(config.grid_color),
            grid_line_width: config.grid_line_width,
            cache: canvas::Cache::new(),
        }
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Apply `message`, returning the event to relay to the remote peer, if any.
    pub fn update(&mut self, message: GameMessage) -> Option<RoundEvent> {
        trace!("GameMessage received: {:?}", message);
        let event = match message {
            GameMessage::Clicked(position) => self.round.play(position),
            GameMessage::RemotePlay(position) => {
                self.round.play_remote(position);
                None
            },
            GameMessage::LevelUpdated(level) => {
                self.round.set_level(level);
                return None;
            },
            GameMessage::NewGame => {
                debug!("New game requested");
                Some(self.round.start(false))
            },
            GameMessage::NextLevel => {
                debug!("Next level requested");
                Some(self.round.start(true))
            },
            GameMessage::PressedPositionChanged => None,
        };
        self.cache.clear();
        event
    }

    pub fn view(&self) -> iced::Element<'_, GameMessage> {
        canvas::Canvas::new(self)
            .width(self.board_area.canvas_area.width)
            .height(self.board_area.canvas_area.height)
            .into()
    }

    fn player_color(&self, player: &Player) -> iced::Color {
        utils::color(player.color)
    }
}

impl canvas::Program<GameMessage> for Game {
    type State = MouseState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: iced::Rectangle,
        cursor: iced::mouse::Cursor,
    ) -> Option<canvas::Action<GameMessage>> {
        let iced::Event::Mouse(mouse_event) = event else {
            return None;
        };
        let position = cursor.position_in(bounds).and_then(|pos| self.board_area.cell_at(pos));
        match mouse_event {
            iced::mouse::Event::ButtonPressed(iced::mouse::Button::Left) => {
                trace!("Left button pressed at {:?}", position);
                *state = MouseState::LeftDown(position);
                Some(canvas::Action::publish(GameMessage::PressedPositionChanged).and_capture())
            },
            iced::mouse::Event::ButtonReleased(iced::mouse::Button::Left) => match *state {
                MouseState::LeftDown(pressed) => {
                    *state = MouseState::Idle;
                    trace!("Left button released at {:?}, pressed at {:?}", position, pressed);
                    match position {
                        Some(position) if pressed == Some(position) => {
                            Some(canvas::Action::publish(GameMessage::Clicked(position)).and_capture())
                        },
                        _ => Some(canvas::Action::publish(GameMessage::PressedPositionChanged).and_capture()),
                    }
                },
                MouseState::Idle => {
                    trace!("Left button released but not pressed before, maybe lost focus?");
                    None
                },
            },
            iced::mouse::Event::CursorMoved { .. } => match state {
                MouseState::LeftDown(pos) if *pos != position => {
                    *state = MouseState::LeftDown(position);
                    Some(canvas::Action::publish(GameMessage::PressedPositionChanged).and_capture())
                },
                _ => None,
            },
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: iced::Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let geom = self.cache.draw(renderer, bounds.size(), |frame| {
            if let MouseState::LeftDown(Some(pressed)) = state
                && self.round.can_play()
                && self.round.board().is_empty(*pressed)
            {
                let rect = self.board_area.cell_rect(*pressed);
                let color = self.player_color(self.round.player(PlayerKind::Personal));
                frame.fill_rectangle(rect.position(), rect.size(), iced::Color { a: 0.15, ..color });
            }

            for (from, to) in self.board_area.grid_lines() {
                frame.stroke(
                    &canvas::Path::line(from, to),
                    canvas::Stroke::default()
                        .with_color(self.grid_color)
                        .with_width(self.grid_line_width),
                );
            }

            for (position, cell) in self.round.board().iter() {
                let Some(symbol) = cell.symbol() else {
                    continue;
                };
                let owner = [PlayerKind::Personal, PlayerKind::Computer]
                    .into_iter()
                    .map(|kind| self.round.player(kind))
                    .find(|player| player.symbol == symbol);
                let color = owner.map_or(self.grid_color, |player| self.player_color(player));
                frame.fill_text(canvas::Text {
                    content: symbol.to_string(),
                    position: self.board_area.cell_center(position),
                    color,
                    size: self.board_area.symbol_size().into(),
                    align_x: iced::alignment::Horizontal::Center.into(),
                    align_y: iced::alignment::Vertical::Center,
                    ..Default::default()
                });
            }

            if let Outcome::Won { winner, line } = self.round.outcome() {
                let color = self.player_color(self.round.player(winner));
                let from = self.board_area.cell_center(line[0]);
                let to = self.board_area.cell_center(line[2]);
                frame.stroke(
                    &canvas::Path::line(from, to),
                    canvas::Stroke::default()
                        .with_color(iced::Color { a: 0.6, ..color })
                        .with_width(self.grid_line_width * 2.0),
                );
            }
        });

        vec![geom]
    }
}
