use rand::seq::SliceRandom;
use rand::Rng;
use twenty48_core::engine::Move;

use crate::config::PolicyKind;

const CORNER_ORDER: [Move; 4] = [Move::Down, Move::Left, Move::Right, Move::Up];

/// Pick a move among the legal ones (`legal` is in `Move::ALL` order).
/// Returns `None` when nothing is legal.
pub fn select_move<R: Rng + ?Sized>(kind: PolicyKind, legal: &[bool; 4], rng: &mut R) -> Option<Move> {
    match kind {
        PolicyKind::Random => select_move_random(legal, rng),
        PolicyKind::Corner => select_move_corner(legal),
    }
}

fn select_move_random<R: Rng + ?Sized>(legal: &[bool; 4], rng: &mut R) -> Option<Move> {
    let candidates: Vec<Move> = Move::ALL
        .iter()
        .copied()
        .filter(|m| legal[m.index()])
        .collect();
    candidates.choose(rng).copied()
}

fn select_move_corner(legal: &[bool; 4]) -> Option<Move> {
    CORNER_ORDER.iter().copied().find(|m| legal[m.index()])
}
