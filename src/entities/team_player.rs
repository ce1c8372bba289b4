use sea_orm::entity::prelude::*;

/// Membership row. `position` keeps the order players joined in.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "team_player")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub team_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamName",
        to = "super::team::Column::Name",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
