pub mod prelude;

pub mod team;
pub mod team_player;
