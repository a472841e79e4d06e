//! Root state and the single dispatch point that serializes mutations.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::mem;

use crate::adventure::{self, AdventureAction, AdventureState, AdventureStatus};
use crate::crafting::{self, CraftOutcome, CraftingAction, CraftingSession};
use crate::error::AdventureError;
use crate::inventory::{self, GameAction, GameState, Inventory};
use crate::npc::{self, NpcAction, NpcState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RootState {
    pub adventure: AdventureState,
    pub game: GameState,
    pub npc: NpcState,
    pub crafting: CraftingSession,
}

impl RootState {
    #[must_use]
    pub fn with_inventory(inventory: Inventory) -> Self {
        Self {
            game: GameState {
                inventory,
                ..GameState::default()
            },
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RootAction {
    Adventure(AdventureAction),
    Game(GameAction),
    Npc(NpcAction),
    Crafting(CraftingAction),
    /// Apply a confirmed craft across every slice it touches.
    ApplyCraft(CraftOutcome),
    /// Drop the current adventure and start over. Inventory is kept.
    NewAdventure,
}

impl RootAction {
    /// Whether in-flight responses issued before this action are now stale.
    #[must_use]
    pub const fn invalidates_requests(&self) -> bool {
        matches!(
            self,
            Self::NewAdventure | Self::Adventure(AdventureAction::Reset)
        )
    }
}

impl From<AdventureAction> for RootAction {
    fn from(action: AdventureAction) -> Self {
        Self::Adventure(action)
    }
}

impl From<GameAction> for RootAction {
    fn from(action: GameAction) -> Self {
        Self::Game(action)
    }
}

impl From<NpcAction> for RootAction {
    fn from(action: NpcAction) -> Self {
        Self::Npc(action)
    }
}

impl From<CraftingAction> for RootAction {
    fn from(action: CraftingAction) -> Self {
        Self::Crafting(action)
    }
}

/// Route an action to the slices it concerns.
#[must_use]
pub fn update(mut state: RootState, action: RootAction) -> RootState {
    match action {
        RootAction::Adventure(action) => {
            state.adventure = adventure::reduce(state.adventure, action);
        }
        RootAction::Game(action) => state.game = inventory::reduce(state.game, action),
        RootAction::Npc(action) => state.npc = npc::reduce(state.npc, action),
        RootAction::Crafting(action) => {
            state.crafting = crafting::reduce(state.crafting, action);
        }
        RootAction::ApplyCraft(outcome) => {
            for name in outcome.consumed {
                state.game = inventory::reduce(state.game, GameAction::RemoveIngredient(name));
            }
            if let Some(completion) = outcome.completion {
                let recorded = state.adventure.completed_npcs.len();
                state.adventure =
                    adventure::reduce(state.adventure, AdventureAction::CompleteNpc(completion));
                if state.adventure.completed_npcs.len() > recorded {
                    state.npc = npc::reduce(state.npc, NpcAction::ClearCurrentNpc);
                }
                if state.adventure.status == AdventureStatus::Completed {
                    state.game = inventory::reduce(state.game, GameAction::FinishGame);
                }
            }
            state.crafting = crafting::reduce(state.crafting, CraftingAction::CompleteCrafting);
        }
        RootAction::NewAdventure => {
            state.adventure = adventure::reduce(state.adventure, AdventureAction::Reset);
            state.crafting = crafting::reduce(state.crafting, CraftingAction::ResetCrafting);
            state.npc = npc::reduce(state.npc, NpcAction::ClearCurrentNpc);
            state.game = inventory::reduce(state.game, GameAction::StartGame);
        }
    }
    state
}

/// Token captured before awaiting a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    epoch: u64,
}

/// Owns the root state; every mutation goes through [`Store::dispatch`].
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: RootState,
    epoch: u64,
    dispatched: u64,
}

impl Store {
    #[must_use]
    pub const fn new(state: RootState) -> Self {
        Self {
            state,
            epoch: 0,
            dispatched: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &RootState {
        &self.state
    }

    /// Actions applied so far.
    #[must_use]
    pub const fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn dispatch(&mut self, action: impl Into<RootAction>) {
        let action = action.into();
        if action.invalidates_requests() {
            self.epoch = self.epoch.wrapping_add(1);
            info!("Adventure reset; epoch now {}", self.epoch);
        }
        debug!("dispatch #{}: {action:?}", self.dispatched);
        self.state = update(mem::take(&mut self.state), action);
        self.dispatched = self.dispatched.saturating_add(1);
    }

    #[must_use]
    pub const fn ticket(&self) -> RequestTicket {
        RequestTicket { epoch: self.epoch }
    }

    #[must_use]
    pub const fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.epoch == self.epoch
    }

    /// Apply an action only if no reset happened since `ticket` was taken.
    ///
    /// # Errors
    ///
    /// Returns [`AdventureError::Stale`] and drops the action otherwise.
    pub fn dispatch_if_current(
        &mut self,
        ticket: RequestTicket,
        action: impl Into<RootAction>,
    ) -> Result<(), AdventureError> {
        if !self.is_current(ticket) {
            debug!("Dropping stale response from epoch {}", ticket.epoch);
            return Err(AdventureError::Stale);
        }
        self.dispatch(action);
        Ok(())
    }
}
