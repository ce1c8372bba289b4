use crate::infrastructure::botdata;

pub mod entities;
pub mod teams;

pub mod commands {
    pub mod builtins;
    pub mod team;
}

pub mod infrastructure {
    pub mod botdata;
    pub mod colors;
    pub mod environment;
    pub mod event_handler;
    pub mod ids;
    pub mod util;
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, botdata::Data, Error>;
