//! In-memory map model, the result of a conversion
//!
//! Coordinates are in world units. `y` points up, `x` and `z` span the floor plan, with `z`
//! growing down the drawing.

use avara_utils::{Color, EntityId, Fixed};
use bitflags::bitflags;
use itertools::Itertools;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point3 {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
}

impl Point3 {
    pub const fn new(x: Fixed, y: Fixed, z: Fixed) -> Self {
        Self { x, y, z }
    }

    /// The same point, moved up by `dy`.
    pub fn raised(self, dy: Fixed) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }
}

/// Written as `x,y,z`, with no whitespace.
impl Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", [self.x, self.y, self.z].iter().join(","))
    }
}

bitflags! {
    /// What an object collides with.
    pub struct CollisionMask: u32 {
        const PLAYERS = 1 << 0;
        const PROJECTILES = 1 << 1;
        const SCOUTS = 1 << 2;
        const GROUND = 1 << 3;
    }
}

/// Capabilities layered onto blocks, ramps and goodies by script keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effects {
    pub collision: CollisionMask,
    pub mass: Option<Fixed>,
    pub transparent: bool,
    pub hostile: bool,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            collision: CollisionMask::all(),
            mass: None,
            transparent: false,
            hostile: false,
        }
    }
}

impl Effects {
    pub fn is_default(&self) -> bool {
        *self == Effects::default()
    }

    /// Returns `entity` with these effects applied.
    pub fn apply<T: HasEffects>(self, mut entity: T) -> T {
        self.apply_to(&mut entity);
        entity
    }

    /// Applies these effects to an entity that's already in place.
    pub fn apply_to<T: HasEffects>(self, entity: &mut T) {
        *entity.effects_mut() = self;
    }
}

/// Entities that can carry [`Effects`].
pub trait HasEffects {
    fn effects(&self) -> &Effects;
    fn effects_mut(&mut self) -> &mut Effects;
}

macro_rules! impl_has_effects {
    ($($ty:ty),*) => {
        $(
            impl HasEffects for $ty {
                fn effects(&self) -> &Effects {
                    &self.effects
                }

                fn effects_mut(&mut self) -> &mut Effects {
                    &mut self.effects
                }
            }
        )*
    };
}

impl_has_effects!(Block, Ramp, Goody);

/// Axis aligned box, a wall or a floor slab.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub size: Point3,
    pub center: Point3,
    pub color: Color,
    /// Corner rounding of round rectangles, zero for plain ones.
    pub rounding: Fixed,
    pub effects: Effects,
}

impl Block {
    pub fn bottom(&self) -> Fixed {
        self.center.y - self.size.y.half()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    /// Midpoint of the low edge
    pub base: Point3,
    /// Midpoint of the high edge
    pub top: Point3,
    pub width: Fixed,
    pub thickness: Fixed,
    pub color: Color,
    pub effects: Effects,
}

/// Spawn point.
#[derive(Debug, Clone, PartialEq)]
pub struct Incarnator {
    pub id: EntityId,
    pub location: Point3,
    /// Degrees, clockwise from plan "up"
    pub heading: Fixed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GoodyKind {
    #[default]
    Standard,
    Grenade,
    Missile,
}

impl GoodyKind {
    /// Maps an editor shape name to the pickup model. Only the two weapon models are special.
    pub fn from_shape(shape: &str) -> Self {
        match shape {
            "bspGrenade" => GoodyKind::Grenade,
            "bspMissile" => GoodyKind::Missile,
            _ => GoodyKind::Standard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GoodyKind::Standard => "goody",
            GoodyKind::Grenade => "grenade",
            GoodyKind::Missile => "missile",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ItemCounts {
    pub grenades: u32,
    pub missiles: u32,
    pub boosters: u32,
}

/// Pickup.
#[derive(Debug, Clone, PartialEq)]
pub struct Goody {
    pub id: EntityId,
    pub location: Point3,
    pub kind: GoodyKind,
    pub items: ItemCounts,
    /// Spin speed, zero for a still goody
    pub spin: Fixed,
    pub color: Color,
    pub effects: Effects,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    pub color: Color,
    pub horizon: Color,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            color: Color::new(0.4, 0.6, 1.0),
            horizon: Color::new(0.8, 0.9, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub color: Color,
}

impl Default for Ground {
    fn default() -> Self {
        Self {
            color: Color::new(0.5, 0.5, 0.5),
        }
    }
}

/// A converted level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    pub name: String,
    pub author: String,
    pub tagline: String,
    pub description: String,
    pub incarnators: Vec<Incarnator>,
    pub blocks: Vec<Block>,
    pub ramps: Vec<Ramp>,
    pub goodies: Vec<Goody>,
    /// Only set if the level adjusts it, players fall back to their defaults otherwise
    pub sky: Option<Sky>,
    pub ground: Option<Ground>,
}

impl Map {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Total amount of entities, sky and ground excluded.
    pub fn entity_count(&self) -> usize {
        self.incarnators.len() + self.blocks.len() + self.ramps.len() + self.goodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_display_has_no_spaces() {
        let p = Point3::new(
            Fixed::from_hundredths(150),
            Fixed::ZERO,
            Fixed::from_hundredths(-225),
        );
        assert_eq!(p.to_string(), "1.5,0,-2.25");
    }

    #[test]
    fn effects_are_applied_explicitly() {
        let block = Block {
            size: Point3::default(),
            center: Point3::default(),
            color: Color::BLACK,
            rounding: Fixed::ZERO,
            effects: Effects::default(),
        };
        assert!(block.effects().is_default());

        let effects = Effects {
            hostile: true,
            mass: Some(Fixed::from_int(10)),
            ..Default::default()
        };
        let block = effects.apply(block);
        assert!(block.effects().hostile);
        assert_eq!(block.effects().mass, Some(Fixed::from_int(10)));
        assert!(!block.effects().is_default());
    }

    #[test]
    fn goody_shapes() {
        assert_eq!(GoodyKind::from_shape("bspGrenade"), GoodyKind::Grenade);
        assert_eq!(GoodyKind::from_shape("bspMissile"), GoodyKind::Missile);
        assert_eq!(GoodyKind::from_shape("bspWhatever"), GoodyKind::Standard);
    }
}
