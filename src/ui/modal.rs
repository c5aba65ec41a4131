pub mod error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    Error,
}

#[derive(Debug, Clone)]
pub enum ModalMessage {
    Error(error::ErrorMessage),
}
