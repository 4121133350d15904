use crate::{
    geometry::{Extrusion, Offset},
    map::{Block, Map, Point3},
    pict::{Point, Rect},
    script::ScriptError,
};
use avara_utils::{Color, EntityId, IdAllocator};
use log::*;

/// The QuickDraw side of the interpreter: everything the drawing operations set up for the
/// ones that follow them.
#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    /// Cumulative origin shift, added to every coordinate
    pub origin: Offset,
    pub pen: Offset,
    pub color: Color,
    /// Corner size of round rectangles
    pub oval: Point,
    pub clip: Option<Rect>,
    /// The origin moved since the last rectangle was drawn
    pub block_origin_changed: bool,
    /// The origin moved since the last arc was drawn
    pub arc_origin_changed: bool,
}

/// A drawn arc, waiting for a script to turn it into something.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcShape {
    pub id: EntityId,
    pub rect: Rect,
    pub center: Point3,
    /// Degrees in `[0, 360)`
    pub heading: f64,
    pub stroke: Color,
    pub fill: Option<Color>,
}

impl ArcShape {
    /// Color of the arc's interior, falling back to its outline if it was never painted.
    pub fn fill_color(&self) -> Color {
        self.fill.unwrap_or(self.stroke)
    }
}

/// The most recent shapes, which the "same" operations and scripts refer to.
#[derive(Debug, Clone, Default)]
pub struct ShapeBuffer {
    /// Index of the most recent block in [`Map::blocks`]
    pub current_block: Option<usize>,
    pub current_arc: Option<ArcShape>,
    pub last_rect: Option<Rect>,
    pub last_arc: Option<Rect>,
    /// Color of the last paint call, applied by the next frame-same call. Framing another
    /// rectangle forgets it.
    pub paint_color: Option<Color>,
}

impl ShapeBuffer {
    /// Forgets the current shapes. The remembered rectangles stay, they're only geometry.
    pub fn clear(&mut self) {
        self.current_block = None;
        self.current_arc = None;
    }
}

/// Everything a conversion run builds up, shared by the drawing and the script interpreter.
#[derive(Debug)]
pub struct Scene {
    pub map: Map,
    pub shapes: ShapeBuffer,
    pub extrusion: Extrusion,
    pub ids: IdAllocator,
    pub diagnostics: Vec<ScriptError>,
}

impl Scene {
    pub fn new(map: Map, extrusion: Extrusion) -> Self {
        Self {
            map,
            shapes: ShapeBuffer::default(),
            extrusion,
            ids: IdAllocator::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Records a non-fatal problem.
    pub fn report(&mut self, error: ScriptError) {
        warn!("{error}");
        self.diagnostics.push(error);
    }

    /// Appends a block and makes it the current one.
    pub fn push_block(&mut self, block: Block) {
        self.map.blocks.push(block);
        self.shapes.current_block = Some(self.map.blocks.len() - 1);
    }

    pub fn current_block_mut(&mut self) -> Option<&mut Block> {
        let index = self.shapes.current_block?;
        self.map.blocks.get_mut(index)
    }

    /// Removes the current block from the map and hands it over.
    pub fn take_block(&mut self) -> Option<Block> {
        let index = self.shapes.current_block.take()?;
        (index < self.map.blocks.len()).then(|| self.map.blocks.remove(index))
    }

    pub fn take_arc(&mut self) -> Option<ArcShape> {
        self.shapes.current_arc.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Effects;
    use avara_utils::Fixed;

    fn block(x: i64) -> Block {
        Block {
            size: Point3::default(),
            center: Point3::new(Fixed::from_int(x), Fixed::ZERO, Fixed::ZERO),
            color: Color::BLACK,
            rounding: Fixed::ZERO,
            effects: Effects::default(),
        }
    }

    #[test]
    fn blocks_are_taken_once() {
        let mut scene = Scene::new(Map::new("test"), Extrusion::default());
        scene.push_block(block(1));
        scene.push_block(block(2));

        let taken = scene.take_block().unwrap();
        assert_eq!(taken.center.x, Fixed::from_int(2));
        assert_eq!(scene.map.blocks.len(), 1);
        assert!(scene.take_block().is_none());
        assert!(scene.current_block_mut().is_none());
    }
}
