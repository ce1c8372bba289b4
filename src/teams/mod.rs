/*!

Team membership and ownership.

A [`TeamManager`] owns every [`Team`] and an index from player to team name. The bot keeps a
single manager behind [`SharedTeams`], periodically writing it to the database through
[`store`].

*/

use std::sync::Arc;

use tokio::sync::RwLock;

pub mod error;
pub mod manager;
pub mod snapshot;
pub mod store;
pub mod team;

pub use error::TeamError;
pub use manager::{LeaveOutcome, OwnershipTransfer, TeamManager};
pub use snapshot::{RegistrySnapshot, TeamSnapshot};
pub use team::{BotPolicy, Candidate, Team};

/// The registry as shared between commands and the snapshot task.
///
/// Mutations hold the write lock for the whole registry call so both of the manager's maps
/// change together.
pub type SharedTeams = Arc<RwLock<TeamManager>>;

pub fn shared(manager: TeamManager) -> SharedTeams {
    Arc::new(RwLock::new(manager))
}
