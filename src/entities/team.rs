use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub guild_id: String,
    pub owner_id: String,
    pub points: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::team_player::Entity")]
    TeamPlayer,
}

impl Related<super::team_player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamPlayer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
