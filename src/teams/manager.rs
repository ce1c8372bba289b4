use std::collections::{BTreeMap, HashMap};

use poise::serenity_prelude::{GuildId, UserId};
use rand::{Rng, seq::IndexedRandom};
use tracing::{debug, trace};

use super::{
    error::TeamError,
    snapshot::{RegistrySnapshot, TeamSnapshot},
    team::{BotPolicy, Candidate, Team},
};

/// Result of a successful ownership transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTransfer {
    pub team: Team,
    pub previous_owner: UserId,
    pub new_owner: UserId,
}

/// What happened to a team when one of its players left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// A regular member left; the team is otherwise unchanged.
    Left { team: Team },
    /// The owner left and a randomly chosen member now owns the team.
    OwnerReplaced {
        team: Team,
        previous_owner: UserId,
        new_owner: UserId,
    },
    /// The owner was the last member, so the team no longer exists.
    Disbanded { team: Team },
}

impl LeaveOutcome {
    pub fn team(&self) -> &Team {
        match self {
            Self::Left { team } | Self::OwnerReplaced { team, .. } | Self::Disbanded { team } => {
                team
            }
        }
    }
}

/// Registry of every team and of which team each player is on.
///
/// `player_teams` is derived from the member lists in `teams` and every method
/// either updates both or returns an error before touching either.
#[derive(Debug, Default)]
pub struct TeamManager {
    teams: BTreeMap<String, Team>,
    player_teams: HashMap<UserId, String>,
    bot_policy: BotPolicy,
}

impl TeamManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bot_policy(bot_policy: BotPolicy) -> Self {
        Self {
            bot_policy,
            ..Self::default()
        }
    }

    pub fn bot_policy(&self) -> BotPolicy {
        self.bot_policy
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// All teams, sorted by name.
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    pub fn teams_in_guild(&self, guild_id: GuildId) -> impl Iterator<Item = &Team> {
        self.teams
            .values()
            .filter(move |team| team.guild_id() == guild_id)
    }

    pub fn get_team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn get_player_team(&self, player: UserId) -> Option<&Team> {
        self.player_teams
            .get(&player)
            .and_then(|name| self.teams.get(name))
    }

    pub fn create_team(
        &mut self,
        name: impl Into<String>,
        owner: UserId,
        guild_id: GuildId,
    ) -> Result<&Team, TeamError> {
        let name = name.into();
        if let Some(existing) = self.player_teams.get(&owner) {
            return Err(TeamError::PlayerAlreadyOnATeam {
                player: owner,
                team: existing.clone(),
            });
        }
        if self.teams.contains_key(&name) {
            return Err(TeamError::TeamAlreadyExists(name));
        }

        debug!(team = %name, owner = %owner, guild = %guild_id, "Creating team");
        self.player_teams.insert(owner, name.clone());
        let team = self
            .teams
            .entry(name.clone())
            .or_insert_with(|| Team::new(name, owner, guild_id));
        Ok(&*team)
    }

    /// Deletes the acting owner's team and returns it so former members can be told.
    pub fn disband_team(&mut self, acting: UserId) -> Result<Team, TeamError> {
        let name = self.owned_team_name(acting)?;
        debug!(team = %name, owner = %acting, "Disbanding team");
        self.drop_team(&name)
            .ok_or(TeamError::PlayerNotOnATeam(acting))
    }

    pub fn transfer_ownership(
        &mut self,
        current_owner: UserId,
        new_owner: UserId,
    ) -> Result<OwnershipTransfer, TeamError> {
        let name = self.owned_team_name(current_owner)?;
        let team = self
            .teams
            .get_mut(&name)
            .ok_or(TeamError::PlayerNotOnATeam(current_owner))?;
        team.transfer_ownership(new_owner)?;

        debug!(team = %name, from = %current_owner, to = %new_owner, "Transferred ownership");
        Ok(OwnershipTransfer {
            team: team.clone(),
            previous_owner: current_owner,
            new_owner,
        })
    }

    /// Adds `candidate` straight to the acting owner's team.
    pub fn invite_player(
        &mut self,
        candidate: Candidate,
        acting: UserId,
    ) -> Result<&Team, TeamError> {
        let name = self.owned_team_name(acting)?;
        if let Some(existing) = self.player_teams.get(&candidate.id)
            && *existing != name
        {
            return Err(TeamError::PlayerAlreadyOnATeam {
                player: candidate.id,
                team: existing.clone(),
            });
        }

        let team = self
            .teams
            .get_mut(&name)
            .ok_or(TeamError::PlayerNotOnATeam(acting))?;
        team.add_player(candidate, self.bot_policy)?;

        debug!(team = %name, player = %candidate.id, "Player joined team");
        self.player_teams.insert(candidate.id, name);
        Ok(&*team)
    }

    pub fn remove_player_from_team(
        &mut self,
        target: UserId,
        acting: UserId,
    ) -> Result<&Team, TeamError> {
        let name = self.owned_team_name(acting)?;
        let team = self
            .teams
            .get_mut(&name)
            .ok_or(TeamError::PlayerNotOnATeam(acting))?;
        team.remove_player(target)?;

        debug!(team = %name, player = %target, "Player removed from team");
        self.player_teams.remove(&target);
        Ok(&*team)
    }

    /// Takes `player` off their team.
    ///
    /// An owner with teammates hands the team to one of them, picked uniformly with `rng`.
    /// An owner without teammates takes the team down with them.
    pub fn leave_team<R>(&mut self, player: UserId, rng: &mut R) -> Result<LeaveOutcome, TeamError>
    where
        R: Rng + ?Sized,
    {
        let name = self
            .player_teams
            .get(&player)
            .cloned()
            .ok_or(TeamError::PlayerNotOnATeam(player))?;
        let team = self
            .teams
            .get_mut(&name)
            .ok_or(TeamError::PlayerNotOnATeam(player))?;

        if !team.is_owned_by(player) {
            team.remove_player(player)?;
            let team = team.clone();
            self.player_teams.remove(&player);
            debug!(team = %name, player = %player, "Player left team");
            return Ok(LeaveOutcome::Left { team });
        }

        let teammates: Vec<UserId> = team.non_owners().collect();
        match teammates.choose(rng).copied() {
            Some(successor) => {
                team.transfer_ownership(successor)?;
                team.remove_player(player)?;
                let team = team.clone();
                self.player_teams.remove(&player);
                debug!(team = %name, from = %player, to = %successor, "Owner left team");
                Ok(LeaveOutcome::OwnerReplaced {
                    team,
                    previous_owner: player,
                    new_owner: successor,
                })
            }
            None => {
                debug!(team = %name, owner = %player, "Last member left team");
                let team = self
                    .drop_team(&name)
                    .ok_or(TeamError::PlayerNotOnATeam(player))?;
                Ok(LeaveOutcome::Disbanded { team })
            }
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            teams: self.teams.values().map(TeamSnapshot::from).collect(),
        }
    }

    /// Rebuilds a registry, rejecting snapshots that break any membership invariant.
    pub fn from_snapshot(
        snapshot: RegistrySnapshot,
        bot_policy: BotPolicy,
    ) -> Result<Self, TeamError> {
        let mut manager = Self::with_bot_policy(bot_policy);
        for entry in snapshot.teams {
            if manager.teams.contains_key(&entry.name) {
                return Err(TeamError::corrupt(format!(
                    "team \"{}\" appears more than once",
                    entry.name
                )));
            }

            let team = Team::restore(
                entry.name,
                entry.owner_id,
                entry.guild_id,
                entry.players,
                entry.points,
            )?;
            for player in team.players() {
                if let Some(other) = manager
                    .player_teams
                    .insert(*player, team.name().to_string())
                {
                    return Err(TeamError::corrupt(format!(
                        "player {} is on both \"{}\" and \"{}\"",
                        player,
                        other,
                        team.name()
                    )));
                }
            }
            trace!(team = team.name(), "Restored team");
            manager.teams.insert(team.name().to_string(), team);
        }
        Ok(manager)
    }

    fn owned_team_name(&self, acting: UserId) -> Result<String, TeamError> {
        let team = self
            .get_player_team(acting)
            .ok_or(TeamError::PlayerNotOnATeam(acting))?;
        if !team.is_owned_by(acting) {
            return Err(TeamError::PlayerNotTeamOwner {
                player: acting,
                team: team.name().to_string(),
            });
        }
        Ok(team.name().to_string())
    }

    fn drop_team(&mut self, name: &str) -> Option<Team> {
        let team = self.teams.remove(name)?;
        for player in team.players() {
            self.player_teams.remove(player);
        }
        Some(team)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use test_case::test_case;

    use super::*;

    const GUILD: GuildId = GuildId::new(42);
    const OWNER: UserId = UserId::new(1);
    const ALICE: UserId = UserId::new(2);
    const BOB: UserId = UserId::new(3);
    const CAROL: UserId = UserId::new(4);

    fn assert_consistent(manager: &TeamManager) {
        let mut seen = HashSet::new();
        for (name, team) in &manager.teams {
            assert_eq!(name, team.name());
            assert!(team.contains(team.owner_id()), "owner missing from {name}");
            for player in team.players() {
                assert!(seen.insert(*player), "{player} is on more than one team");
                assert_eq!(manager.player_teams.get(player), Some(name));
            }
        }
        assert_eq!(seen.len(), manager.player_teams.len());
    }

    fn manager_with_team(members: &[UserId]) -> TeamManager {
        let mut manager = TeamManager::new();
        manager.create_team("Red", OWNER, GUILD).unwrap();
        for member in members {
            manager
                .invite_player(Candidate::human(*member), OWNER)
                .unwrap();
        }
        manager
    }

    #[test]
    fn create_team_registers_owner() {
        let mut manager = TeamManager::new();
        manager.create_team("Red", OWNER, GUILD).unwrap();

        let team = manager.get_player_team(OWNER).unwrap();
        assert_eq!(team.name(), "Red");
        assert_eq!(team.owner_id(), OWNER);
        assert_eq!(team.guild_id(), GUILD);
        assert_eq!(team.players(), &[OWNER]);
        assert_consistent(&manager);
    }

    #[test]
    fn duplicate_team_name_leaves_registry_unchanged() {
        let mut manager = TeamManager::new();
        manager.create_team("Red", OWNER, GUILD).unwrap();

        let err = manager.create_team("Red", ALICE, GUILD).unwrap_err();
        assert_eq!(err, TeamError::TeamAlreadyExists("Red".into()));
        assert!(manager.get_player_team(ALICE).is_none());
        assert_eq!(manager.len(), 1);
        assert_consistent(&manager);
    }

    #[test]
    fn team_names_are_case_sensitive() {
        let mut manager = TeamManager::new();
        manager.create_team("Red", OWNER, GUILD).unwrap();
        manager.create_team("red", ALICE, GUILD).unwrap();
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn owner_cannot_create_second_team() {
        let mut manager = manager_with_team(&[]);
        let err = manager.create_team("Blue", OWNER, GUILD).unwrap_err();
        assert_eq!(
            err,
            TeamError::PlayerAlreadyOnATeam {
                player: OWNER,
                team: "Red".into()
            }
        );
        assert!(manager.get_team("Blue").is_none());
    }

    #[test]
    fn invite_then_remove_round_trips() {
        let mut manager = manager_with_team(&[ALICE]);
        let before = manager.snapshot();

        manager
            .invite_player(Candidate::human(BOB), OWNER)
            .unwrap();
        assert_eq!(manager.get_player_team(BOB).unwrap().name(), "Red");
        assert_consistent(&manager);

        manager.remove_player_from_team(BOB, OWNER).unwrap();
        assert!(manager.get_player_team(BOB).is_none());
        assert_eq!(manager.snapshot(), before);
        assert_consistent(&manager);
    }

    #[test]
    fn invite_rejects_member_of_another_team() {
        let mut manager = manager_with_team(&[]);
        manager.create_team("Blue", ALICE, GUILD).unwrap();

        let err = manager
            .invite_player(Candidate::human(ALICE), OWNER)
            .unwrap_err();
        assert_eq!(
            err,
            TeamError::PlayerAlreadyOnATeam {
                player: ALICE,
                team: "Blue".into()
            }
        );
        assert_consistent(&manager);
    }

    #[test]
    fn invite_existing_member_reports_already_on_team() {
        let mut manager = manager_with_team(&[ALICE]);
        assert!(matches!(
            manager.invite_player(Candidate::human(ALICE), OWNER),
            Err(TeamError::AlreadyOnTeam { .. })
        ));
    }

    #[test]
    fn bot_policy_is_applied_on_invite() {
        let mut manager = manager_with_team(&[]);
        assert!(matches!(
            manager.invite_player(Candidate::bot(BOB), OWNER),
            Err(TeamError::CannotAddBot { .. })
        ));
        assert!(manager.get_player_team(BOB).is_none());

        let mut permissive = TeamManager::with_bot_policy(BotPolicy::Allow);
        permissive.create_team("Bots", OWNER, GUILD).unwrap();
        permissive
            .invite_player(Candidate::bot(BOB), OWNER)
            .unwrap();
        assert_consistent(&permissive);
    }

    #[test]
    fn owner_cannot_remove_themselves() {
        let mut manager = manager_with_team(&[ALICE]);
        assert!(matches!(
            manager.remove_player_from_team(OWNER, OWNER),
            Err(TeamError::CannotRemoveOwner { .. })
        ));
        assert_consistent(&manager);
    }

    #[test]
    fn transfer_ownership_moves_authority() {
        let mut manager = manager_with_team(&[ALICE]);
        let transfer = manager.transfer_ownership(OWNER, ALICE).unwrap();
        assert_eq!(transfer.previous_owner, OWNER);
        assert_eq!(transfer.new_owner, ALICE);
        assert!(transfer.team.is_owned_by(ALICE));
        assert_eq!(transfer.team.players(), &[OWNER, ALICE]);

        assert!(matches!(
            manager.disband_team(OWNER),
            Err(TeamError::PlayerNotTeamOwner { .. })
        ));
    }

    #[test]
    fn transfer_to_self_fails_without_mutation() {
        let mut manager = manager_with_team(&[ALICE]);
        let before = manager.snapshot();
        assert!(matches!(
            manager.transfer_ownership(OWNER, OWNER),
            Err(TeamError::AlreadyOwner { .. })
        ));
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn transfer_to_outsider_fails() {
        let mut manager = manager_with_team(&[]);
        assert!(matches!(
            manager.transfer_ownership(OWNER, BOB),
            Err(TeamError::NotOnTeam { .. })
        ));
    }

    #[derive(Debug, Clone, Copy)]
    enum OwnerAction {
        Disband,
        Transfer,
        Invite,
        Remove,
    }

    fn run(manager: &mut TeamManager, action: OwnerAction, acting: UserId) -> Result<(), TeamError> {
        match action {
            OwnerAction::Disband => manager.disband_team(acting).map(|_| ()),
            OwnerAction::Transfer => manager.transfer_ownership(acting, BOB).map(|_| ()),
            OwnerAction::Invite => manager
                .invite_player(Candidate::human(CAROL), acting)
                .map(|_| ()),
            OwnerAction::Remove => manager.remove_player_from_team(BOB, acting).map(|_| ()),
        }
    }

    #[test_case(OwnerAction::Disband ; "disband")]
    #[test_case(OwnerAction::Transfer ; "transfer")]
    #[test_case(OwnerAction::Invite ; "invite")]
    #[test_case(OwnerAction::Remove ; "remove")]
    fn non_owner_actions_are_rejected_without_mutation(action: OwnerAction) {
        let mut manager = manager_with_team(&[ALICE, BOB]);
        let before = manager.snapshot();

        let err = run(&mut manager, action, ALICE).unwrap_err();
        assert_eq!(
            err,
            TeamError::PlayerNotTeamOwner {
                player: ALICE,
                team: "Red".into()
            }
        );
        assert_eq!(manager.snapshot(), before);
        assert_consistent(&manager);
    }

    #[test_case(OwnerAction::Disband ; "disband")]
    #[test_case(OwnerAction::Transfer ; "transfer")]
    #[test_case(OwnerAction::Invite ; "invite")]
    #[test_case(OwnerAction::Remove ; "remove")]
    fn teamless_actions_are_rejected(action: OwnerAction) {
        let mut manager = manager_with_team(&[BOB]);
        let err = run(&mut manager, action, CAROL).unwrap_err();
        assert_eq!(err, TeamError::PlayerNotOnATeam(CAROL));
    }

    #[test]
    fn disband_clears_every_member() {
        let mut manager = manager_with_team(&[ALICE, BOB]);
        let team = manager.disband_team(OWNER).unwrap();
        assert_eq!(team.players(), &[OWNER, ALICE, BOB]);
        assert!(manager.is_empty());
        for player in [OWNER, ALICE, BOB] {
            assert!(manager.get_player_team(player).is_none());
        }
        assert_consistent(&manager);
    }

    #[test]
    fn member_leaving_keeps_team() {
        let mut manager = manager_with_team(&[ALICE, BOB]);
        let outcome = manager
            .leave_team(ALICE, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert!(matches!(outcome, LeaveOutcome::Left { .. }));
        assert_eq!(outcome.team().players(), &[OWNER, BOB]);
        assert!(manager.get_player_team(ALICE).is_none());
        assert_consistent(&manager);
    }

    #[test]
    fn owner_leaving_two_member_team_hands_it_over() {
        let mut manager = manager_with_team(&[ALICE]);
        let outcome = manager
            .leave_team(OWNER, &mut StdRng::seed_from_u64(7))
            .unwrap();

        assert_eq!(
            outcome,
            LeaveOutcome::OwnerReplaced {
                team: manager.get_team("Red").unwrap().clone(),
                previous_owner: OWNER,
                new_owner: ALICE,
            }
        );
        let team = manager.get_player_team(ALICE).unwrap();
        assert!(team.is_owned_by(ALICE));
        assert_eq!(team.players(), &[ALICE]);
        assert!(manager.get_player_team(OWNER).is_none());
        assert_consistent(&manager);
    }

    #[test]
    fn owner_leaving_alone_deletes_team() {
        let mut manager = manager_with_team(&[]);
        let outcome = manager
            .leave_team(OWNER, &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert!(matches!(outcome, LeaveOutcome::Disbanded { .. }));
        assert!(manager.get_player_team(OWNER).is_none());
        assert!(manager.is_empty());
        assert_consistent(&manager);
    }

    #[test]
    fn leave_without_team_fails() {
        let mut manager = TeamManager::new();
        assert_eq!(
            manager.leave_team(ALICE, &mut StdRng::seed_from_u64(0)),
            Err(TeamError::PlayerNotOnATeam(ALICE))
        );
    }

    fn successor_for_seed(seed: u64) -> UserId {
        let mut manager = manager_with_team(&[ALICE, BOB, CAROL]);
        match manager
            .leave_team(OWNER, &mut StdRng::seed_from_u64(seed))
            .unwrap()
        {
            LeaveOutcome::OwnerReplaced { new_owner, .. } => new_owner,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn successor_is_deterministic_for_a_seed() {
        for seed in 0..16 {
            assert_eq!(successor_for_seed(seed), successor_for_seed(seed));
        }
    }

    #[test]
    fn successor_is_drawn_from_every_teammate() {
        let picked: HashSet<UserId> = (0..64).map(successor_for_seed).collect();
        assert_eq!(picked, HashSet::from([ALICE, BOB, CAROL]));
    }

    #[test]
    fn snapshot_round_trip_reproduces_registry() {
        let mut manager = manager_with_team(&[ALICE, BOB]);
        manager.create_team("Blue", CAROL, GuildId::new(7)).unwrap();
        manager.transfer_ownership(OWNER, BOB).unwrap();

        let snapshot = manager.snapshot();
        let restored = TeamManager::from_snapshot(snapshot.clone(), BotPolicy::Reject).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_consistent(&restored);
        assert_eq!(
            restored.get_player_team(OWNER).map(Team::name),
            Some("Red")
        );
    }

    #[test]
    fn snapshot_lists_teams_by_name() {
        let mut manager = TeamManager::new();
        manager.create_team("Zeta", OWNER, GUILD).unwrap();
        manager.create_team("Alpha", ALICE, GUILD).unwrap();
        let names: Vec<_> = manager.snapshot().teams.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Alpha".to_string(), "Zeta".to_string()]);
    }

    fn entry(name: &str, owner: UserId, players: &[UserId]) -> TeamSnapshot {
        TeamSnapshot {
            name: name.into(),
            owner_id: owner,
            guild_id: GUILD,
            players: players.to_vec(),
            points: 0,
        }
    }

    #[test]
    fn import_rejects_player_on_two_teams() {
        let snapshot = RegistrySnapshot {
            teams: vec![
                entry("Red", OWNER, &[OWNER, ALICE]),
                entry("Blue", BOB, &[BOB, ALICE]),
            ],
        };
        assert!(matches!(
            TeamManager::from_snapshot(snapshot, BotPolicy::Reject),
            Err(TeamError::CorruptSnapshot { .. })
        ));
    }

    #[test]
    fn import_rejects_owner_outside_team() {
        let snapshot = RegistrySnapshot {
            teams: vec![entry("Red", OWNER, &[ALICE])],
        };
        assert!(matches!(
            TeamManager::from_snapshot(snapshot, BotPolicy::Reject),
            Err(TeamError::CorruptSnapshot { .. })
        ));
    }

    #[test]
    fn import_rejects_repeated_team_name() {
        let snapshot = RegistrySnapshot {
            teams: vec![entry("Red", OWNER, &[OWNER]), entry("Red", BOB, &[BOB])],
        };
        assert!(matches!(
            TeamManager::from_snapshot(snapshot, BotPolicy::Reject),
            Err(TeamError::CorruptSnapshot { .. })
        ));
    }

    #[test]
    fn teams_in_guild_filters_other_guilds() {
        let mut manager = manager_with_team(&[]);
        manager.create_team("Blue", ALICE, GuildId::new(9)).unwrap();
        let names: Vec<_> = manager.teams_in_guild(GUILD).map(Team::name).collect();
        assert_eq!(names, vec!["Red"]);
    }
}
