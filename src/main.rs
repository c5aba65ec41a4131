mod base;
mod config;
mod error;
mod net;
mod ui;
mod utils;

use ui::App;

fn main() -> crate::error::Result<()> {
    env_logger::init();
    net::client::install_tls_provider();
    iced::application(App::new, App::update, App::view)
        .title("Tic-Tac-Toe")
        .window(iced::window::Settings {
            exit_on_close_request: false,
            ..Default::default()
        })
        .theme(App::theme)
        .subscription(App::subscriptions)
        .run()?;

    Ok(())
}
