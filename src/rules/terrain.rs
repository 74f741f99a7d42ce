//! Rules contributed by terrain pieces
//!
//! Each factory captures its own copy of the piece, so the rule keeps working
//! without a reference back into the board.

use crate::battle::board::TerrainPiece;
use crate::rules::context::{Axis, RuleContext};
use crate::rules::engine::Rule;
use crate::rules::trigger::{RuleSource, Trigger};

fn defender_inside(piece: &TerrainPiece, ctx: &RuleContext<'_>) -> bool {
    ctx.defender.is_some_and(|d| piece.contains(&d.position))
}

/// -1 to hit for shooting attacks against a unit inside the piece
pub fn obscuring(piece: &TerrainPiece) -> Rule {
    let name = format!("obscuring:{}", piece.name);
    let area = piece.clone();
    Rule::modifier(&name, Trigger::BeforeHitRoll, RuleSource::Terrain, Axis::Hit, -1)
        .when(move |ctx| ctx.is_shooting && defender_inside(&area, ctx))
}

/// +1 save for a unit inside the piece
pub fn cover(piece: &TerrainPiece) -> Rule {
    let name = format!("cover:{}", piece.name);
    let area = piece.clone();
    Rule::modifier(&name, Trigger::BeforeSaveRoll, RuleSource::Terrain, Axis::Save, 1)
        .when(move |ctx| defender_inside(&area, ctx))
}

/// Blocks any move or charge that would end inside the piece
///
/// Charges carry the target's position as destination, so a charge at a
/// unit standing in impassable ground is refused as well.
pub fn impassable(piece: &TerrainPiece, trigger: Trigger) -> Rule {
    let name = format!("impassable:{}", piece.name);
    let message = format!("{} is impassable", piece.name);
    let area = piece.clone();
    Rule::new(&name, trigger, RuleSource::Terrain, move |ctx| ctx.block(message.clone()))
        .when(move |ctx| ctx.destination.is_some_and(|d| area.contains(&d)))
}

/// Every rule the piece contributes, per its kind
pub fn rules_for_piece(piece: &TerrainPiece) -> Vec<Rule> {
    let mut rules = Vec::new();
    if piece.obscures() {
        rules.push(obscuring(piece));
    }
    if piece.grants_cover() {
        rules.push(cover(piece));
    }
    if piece.is_impassable() {
        rules.push(impassable(piece, Trigger::BeforeMove));
        rules.push(impassable(piece, Trigger::BeforeCharge));
        rules.push(impassable(piece, Trigger::BeforePileIn));
    }
    rules
}
