pub mod bot;

pub use bot::BotController;
