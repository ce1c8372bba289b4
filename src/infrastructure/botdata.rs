use std::{
    collections::HashMap,
    sync::RwLock,
    time::Instant,
};

use sea_orm::DatabaseConnection;

use crate::teams::SharedTeams;

/// State shared by every command invocation.
pub struct Data {
    pub db_pool: DatabaseConnection,
    pub teams: SharedTeams,
    pub invoc_time: RwLock<HashMap<u64, Instant>>,
}

impl Data {
    pub fn new(db_pool: DatabaseConnection, teams: SharedTeams) -> Self {
        Self {
            db_pool,
            teams,
            invoc_time: Default::default(),
        }
    }
}
