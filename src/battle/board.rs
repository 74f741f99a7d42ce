//! Battlefield with terrain pieces, line of sight, and objectives
//!
//! Terrain pieces are circles. A piece that blocks line of sight hides
//! units on opposite sides of it, but never a unit standing inside it.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Position};

/// Category of a terrain piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Woods and ruins: block sight, grant cover
    Forest,
    /// Low walls and rubble: grant cover only
    Obstacle,
    /// Cliffs and deep water: units cannot end a move inside
    Impassable,
}

/// A terrain piece on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainPiece {
    pub name: String,
    pub kind: TerrainKind,
    pub center: Position,
    pub radius: f64,
}

impl TerrainPiece {
    pub fn new(name: &str, kind: TerrainKind, center: Position, radius: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            center,
            radius,
        }
    }

    /// Is the point inside (or on the edge of) this piece?
    pub fn contains(&self, point: &Position) -> bool {
        self.center.distance(point) <= self.radius
    }

    pub fn blocks_los(&self) -> bool {
        matches!(self.kind, TerrainKind::Forest)
    }

    pub fn grants_cover(&self) -> bool {
        matches!(self.kind, TerrainKind::Forest | TerrainKind::Obstacle)
    }

    /// Shooting at a unit inside this piece is harder
    pub fn obscures(&self) -> bool {
        matches!(self.kind, TerrainKind::Forest)
    }

    pub fn is_impassable(&self) -> bool {
        matches!(self.kind, TerrainKind::Impassable)
    }

    /// Does the segment from `a` to `b` pass through this piece?
    pub fn intersects_segment(&self, a: &Position, b: &Position) -> bool {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let length_sq = dx * dx + dy * dy;
        let t = if length_sq <= f64::EPSILON {
            0.0
        } else {
            (((self.center.x - a.x) * dx + (self.center.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
        };
        let closest = Position::new(a.x + t * dx, a.y + t * dy);
        closest.distance(&self.center) < self.radius
    }
}

/// Objective marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub name: String,
    pub position: Position,
    pub controller: Option<PlayerId>,
}

impl Objective {
    pub fn new(name: &str, position: Position) -> Self {
        Self {
            name: name.to_string(),
            position,
            controller: None,
        }
    }
}

/// The full battlefield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: f64,
    pub height: f64,
    pub terrain: Vec<TerrainPiece>,
    pub objectives: Vec<Objective>,
}

impl Board {
    /// Create an empty board
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            terrain: Vec::new(),
            objectives: Vec::new(),
        }
    }

    /// Check if a position is on the board (edges included)
    pub fn in_bounds(&self, position: &Position) -> bool {
        position.x >= 0.0 && position.y >= 0.0 && position.x <= self.width && position.y <= self.height
    }

    /// Check line of sight between two points
    ///
    /// Blocked by any sight-blocking piece the line passes through, unless
    /// either end lies inside that piece.
    pub fn has_line_of_sight(&self, from: &Position, to: &Position) -> bool {
        !self.terrain.iter().any(|piece| {
            piece.blocks_los()
                && !piece.contains(from)
                && !piece.contains(to)
                && piece.intersects_segment(from, to)
        })
    }

    /// Terrain pieces containing a point
    pub fn terrain_at<'a>(&'a self, position: &'a Position) -> impl Iterator<Item = &'a TerrainPiece> + 'a {
        self.terrain.iter().filter(move |piece| piece.contains(position))
    }

    pub fn add_terrain(&mut self, piece: TerrainPiece) {
        self.terrain.push(piece);
    }

    pub fn add_objective(&mut self, objective: Objective) {
        self.objectives.push(objective);
    }
}
