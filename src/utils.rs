use log::debug;
use std::path::PathBuf;

pub fn config_path() -> crate::error::Result<PathBuf> {
    let dir = dirs::config_dir().ok_or(crate::error::Error::ConfigDirNotFound)?;
    let p = dir.join(env!("CARGO_PKG_NAME")).join("config.toml");
    debug!("Config path: {}", p.to_string_lossy());
    Ok(p)
}

/// `0xRRGGBB` to an opaque colour.
pub fn color(rgb: u32) -> iced::Color {
    iced::Color::from_rgb8(((rgb >> 16) & 0xFF) as u8, ((rgb >> 8) & 0xFF) as u8, (rgb & 0xFF) as u8)
}
