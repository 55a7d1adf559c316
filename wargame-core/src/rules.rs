//! Rules engine: move legality, action resolution, move generation and
//! termination

use crate::board::{Coord, CoordPair};
use crate::error::MoveError;
use crate::game::{ActionType, GameState, Player};
use crate::units::{can_move, UnitType};

/// Health removed from every neighbour by a self-destruct
pub const SELF_DESTRUCT_DAMAGE: i32 = 2;

impl GameState {
    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Classify a (src, dst) request for the player to move
    pub fn validate_move(&self, mv: CoordPair) -> Result<ActionType, MoveError> {
        for coord in [mv.src, mv.dst] {
            if !self.is_valid_coord(coord) {
                return Err(MoveError::OutOfBounds(coord));
            }
        }

        let player = self.next_player();
        let src_unit = match self.get(mv.src) {
            Some(unit) if unit.player == player => *unit,
            _ => return Err(MoveError::NotOwnUnit(mv.src)),
        };

        if mv.is_self_target() {
            return Ok(ActionType::SelfDestruct);
        }

        if !mv.is_adjacent() {
            return Err(MoveError::NotAdjacent(mv));
        }

        let Some(dst_unit) = self.get(mv.dst) else {
            if !src_unit.unit_type.moves_while_engaged() && self.is_engaged(mv.src) {
                return Err(MoveError::Engaged(mv.src));
            }
            let legal_direction = mv
                .direction()
                .is_some_and(|d| can_move(player, src_unit.unit_type, d));
            if !legal_direction {
                return Err(MoveError::WrongDirection(mv));
            }
            return Ok(ActionType::Move);
        };

        if dst_unit.player == player {
            let repairs = src_unit.unit_type.can_repair()
                && src_unit.repair_amount(dst_unit) > 0
                && !dst_unit.has_full_health();
            return if repairs {
                Ok(ActionType::Repair)
            } else {
                Err(MoveError::IllegalRepair(mv))
            };
        }

        Ok(ActionType::Attack)
    }

    /// A unit is engaged when an enemy sits in its 4-neighbourhood
    pub fn is_engaged(&self, coord: Coord) -> bool {
        let Some(unit) = self.get(coord) else {
            return false;
        };
        let enemy = unit.player.opponent();
        coord
            .iter_adjacent()
            .any(|adj| self.get(adj).is_some_and(|u| u.player == enemy))
    }

    // ========================================================================
    // APPLY
    // ========================================================================

    /// Validate, then apply. The turn is not advanced.
    pub fn perform_move(&mut self, mv: CoordPair) -> Result<ActionType, MoveError> {
        let action = self.validate_move(mv)?;
        self.perform_action(mv, action);
        Ok(action)
    }

    /// Apply an action that has already been validated
    pub fn perform_action(&mut self, mv: CoordPair, action: ActionType) {
        match action {
            ActionType::SelfDestruct => self.perform_self_destruct(mv.src),
            ActionType::Move => {
                let unit = self.get(mv.src).copied();
                self.set(mv.dst, unit);
                self.set(mv.src, None);
            }
            ActionType::Attack => self.perform_fight(mv),
            ActionType::Repair => self.perform_repair(mv),
        }
    }

    /// Both units hit each other with damage computed from pre-fight health
    fn perform_fight(&mut self, mv: CoordPair) {
        let (Some(&src_unit), Some(&dst_unit)) = (self.get(mv.src), self.get(mv.dst)) else {
            return;
        };
        let damage_to_dst = src_unit.damage_amount(&dst_unit);
        let damage_to_src = dst_unit.damage_amount(&src_unit);

        self.mod_health(mv.src, -i32::from(damage_to_src));
        self.mod_health(mv.dst, -i32::from(damage_to_dst));
    }

    fn perform_repair(&mut self, mv: CoordPair) {
        let (Some(&src_unit), Some(&dst_unit)) = (self.get(mv.src), self.get(mv.dst)) else {
            return;
        };
        self.mod_health(mv.dst, i32::from(src_unit.repair_amount(&dst_unit)));
    }

    /// Damage the 3x3 neighbourhood, then remove the acting unit
    fn perform_self_destruct(&mut self, src: Coord) {
        for target in src.iter_range(1).filter(|&c| c != src) {
            self.mod_health(target, -SELF_DESTRUCT_DAMAGE);
        }
        if let Some(health) = self.get(src).map(|u| i32::from(u.health)) {
            self.mod_health(src, -health);
        }
    }

    fn mod_health(&mut self, coord: Coord, delta: i32) {
        if let Some(unit) = self.get_mut(coord) {
            unit.mod_health(delta);
            self.remove_dead(coord);
        }
    }

    /// Clear a dead unit's cell and, for an AI, drop its side's flag
    fn remove_dead(&mut self, coord: Coord) {
        let Some(&unit) = self.get(coord) else {
            return;
        };
        if unit.is_alive() {
            return;
        }
        self.set(coord, None);
        if self.is_traced() {
            tracing::debug!("{} {:?} destroyed at {}", unit.player, unit.unit_type, coord);
        }
        if unit.unit_type == UnitType::AI {
            match unit.player {
                Player::Attacker => self.attacker_has_ai = false,
                Player::Defender => self.defender_has_ai = false,
            }
            if self.is_traced() {
                tracing::debug!("{} lost its AI", unit.player);
            }
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Legal actions for the player to move: per unit, the legal steps
    /// towards its neighbours (up, left, down, right) then its self-destruct
    pub fn move_candidates(&self) -> Vec<(CoordPair, ActionType)> {
        let mut candidates = Vec::new();
        for (src, _) in self.player_units(self.next_player()) {
            for dst in src.iter_adjacent() {
                let mv = CoordPair::new(src, dst);
                if let Ok(action) = self.validate_move(mv) {
                    candidates.push((mv, action));
                }
            }
            candidates.push((CoordPair::new(src, src), ActionType::SelfDestruct));
        }
        candidates
    }

    // ========================================================================
    // TERMINATION
    // ========================================================================

    /// Winner, if the game is over
    ///
    /// Checked in order: turn limit (defender), attacker's AI alone
    /// (attacker), defender's AI alone (defender), neither (defender).
    pub fn winner(&self) -> Option<Player> {
        if let Some(max_turns) = self.options().max_turns {
            if self.turns_played >= max_turns {
                return Some(Player::Defender);
            }
        }
        match (self.attacker_has_ai, self.defender_has_ai) {
            (true, true) => None,
            (true, false) => Some(Player::Attacker),
            (false, true) => Some(Player::Defender),
            (false, false) => Some(Player::Defender),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================
