pub mod app_state;
pub mod error;
pub mod player;
pub mod question;
pub mod quiz_game;
