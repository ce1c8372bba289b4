use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .col(string(Team::Name).primary_key())
                    .col(string(Team::GuildId))
                    .col(string(Team::OwnerId))
                    .col(big_integer(Team::Points).default(0))
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                Table::create()
                    .table(TeamPlayer::Table)
                    .col(string(TeamPlayer::TeamName))
                    .col(string(TeamPlayer::PlayerId))
                    .col(integer(TeamPlayer::Position))
                    .primary_key(
                        IndexCreateStatement::new()
                            .col(TeamPlayer::TeamName)
                            .col(TeamPlayer::PlayerId)
                            .unique(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_player_team")
                            .from(TeamPlayer::Table, TeamPlayer::TeamName)
                            .to(Team::Table, Team::Name)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        // A player can only ever be on one team.
        manager
            .create_index(
                Index::create()
                    .name("idx_team_player_player_id")
                    .table(TeamPlayer::Table)
                    .col(TeamPlayer::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamPlayer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Team {
    Table,
    Name,
    GuildId,
    OwnerId,
    Points,
}

#[derive(DeriveIden)]
enum TeamPlayer {
    Table,
    TeamName,
    PlayerId,
    Position,
}
