pub use super::team::Entity as Team;
pub use super::team_player::Entity as TeamPlayer;
