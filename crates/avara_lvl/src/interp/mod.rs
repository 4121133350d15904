//! Interpretation of drawing operations
//!
//! Levels were drawn, not modeled. Walls are framed rectangles, spawn points and pickups are
//! arcs pointing somewhere, and the details are text scripts placed right after the shape they
//! describe. The [`DrawingInterpreter`] replays the drawing, turning rectangles into blocks
//! immediately and keeping arcs around until a script claims them.

use crate::{
    geometry::{self, Extrusion, Offset},
    map::{Block, Effects, Map},
    pict::{ArcParams, Operation, Rect},
    script::ScriptInterpreter,
};
use avara_utils::{Color, Fixed};
use log::*;

mod state;
pub use state::*;

/// Which half of a frame/paint pair an operation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stroke {
    Frame,
    Paint,
}

#[derive(Debug)]
pub struct DrawingInterpreter {
    state: DrawingState,
    scene: Scene,
    script: ScriptInterpreter,
    /// Text of the consecutive text operations seen so far
    text: Vec<String>,
}

impl DrawingInterpreter {
    pub fn new(map: Map, extrusion: Extrusion) -> Self {
        Self {
            state: DrawingState::default(),
            scene: Scene::new(map, extrusion),
            script: ScriptInterpreter::new(),
            text: Vec::new(),
        }
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Runs every operation in order and finishes the run.
    pub fn run<'a>(mut self, operations: impl IntoIterator<Item = &'a Operation>) -> Scene {
        for operation in operations {
            self.execute(operation);
        }
        self.finish()
    }

    pub fn execute(&mut self, operation: &Operation) {
        if let Some(text) = operation.text() {
            self.text.push(text.to_string());
            return;
        }
        self.flush_text();

        use Operation::*;
        match operation {
            ClipRegion { bounds, .. } => self.state.clip = Some(*bounds),
            Origin { dh, dv } => {
                self.state.origin.x -= *dh as i64;
                self.state.origin.y -= *dv as i64;
                self.state.block_origin_changed = true;
                self.state.arc_origin_changed = true;
                debug!("Origin moved to {:?}", self.state.origin);
            }
            PenSize(size) => {
                self.state.pen = Offset {
                    x: size.h as i64,
                    y: size.v as i64,
                }
            }
            RgbForeground(color) => self.state.color = (*color).into(),
            OvalSize(size) => self.state.oval = *size,

            FrameRect(rect) => self.frame_rect(*rect, Fixed::ZERO),
            FrameRoundRect(rect) => self.frame_rect(*rect, self.corner_rounding()),
            PaintRect(rect) | PaintRoundRect(rect) => {
                self.scene.shapes.last_rect = Some(*rect);
                self.scene.shapes.paint_color = Some(self.state.color);
                self.state.block_origin_changed = false;
            }
            FrameSameRect => self.frame_same_rect(Fixed::ZERO),
            FrameSameRoundRect => self.frame_same_rect(self.corner_rounding()),
            PaintSameRect | PaintSameRoundRect => {
                self.scene.shapes.paint_color = Some(self.state.color)
            }

            FrameArc(arc) => self.arc(*arc, Stroke::Frame),
            PaintArc(arc) => self.arc(*arc, Stroke::Paint),
            FrameSameArc { start, sweep } => self.same_arc(*start, *sweep, Stroke::Frame),
            PaintSameArc { start, sweep } => self.same_arc(*start, *sweep, Stroke::Paint),

            other => trace!("Ignoring {:?}", other.opcode()),
        }
    }

    /// Hands over any pending text and returns what the run produced.
    pub fn finish(mut self) -> Scene {
        self.flush_text();
        self.script.finish(&mut self.scene);
        self.scene
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }

        let text = self.text.join(" ");
        self.text.clear();
        trace!("Running script {text:?}");
        self.script.run(&text, &mut self.scene);
    }

    fn corner_rounding(&self) -> Fixed {
        geometry::scale_and_snap(self.state.oval.h as i64)
    }

    fn frame_rect(&mut self, rect: Rect, rounding: Fixed) {
        // A paint only carries over to the rectangle it was made for
        self.scene.shapes.last_rect = Some(rect);
        self.scene.shapes.paint_color = None;
        self.push_block(rect, self.state.color, rounding);
    }

    fn frame_same_rect(&mut self, rounding: Fixed) {
        let Some(rect) = self.scene.shapes.last_rect else {
            debug!("Frame-same without a previous rectangle");
            return;
        };
        let color = self.scene.shapes.paint_color.unwrap_or(self.state.color);

        if self.state.block_origin_changed {
            self.push_block(rect, color, rounding);
        } else if let Some(block) = self.scene.current_block_mut() {
            block.color = color;
        }
    }

    fn push_block(&mut self, rect: Rect, color: Color, rounding: Fixed) {
        let (size, center) =
            geometry::block_bounds(rect, self.state.origin, self.state.pen, self.scene.extrusion);

        self.scene.push_block(Block {
            size,
            center,
            color,
            rounding,
            effects: Effects::default(),
        });
        self.scene.extrusion.wall_altitude = Fixed::ZERO;
        self.state.block_origin_changed = false;
        debug!("Block of size {size} at {center}");
    }

    fn arc(&mut self, arc: ArcParams, stroke: Stroke) {
        let heading = geometry::heading_from_arc(arc.start, arc.sweep);
        self.new_arc(arc.rect, heading, stroke);
    }

    fn same_arc(&mut self, start: i16, sweep: i16, stroke: Stroke) {
        let Some(rect) = self.scene.shapes.last_arc else {
            debug!("Same-arc without a previous arc");
            return;
        };
        let heading = geometry::heading_from_arc(start, sweep);

        let unchanged = !self.state.arc_origin_changed
            && matches!(&self.scene.shapes.current_arc, Some(current) if current.heading == heading);

        match self.scene.shapes.current_arc.as_mut() {
            Some(current) if unchanged => apply_stroke(current, self.state.color, stroke),
            _ => self.new_arc(rect, heading, stroke),
        }
    }

    fn new_arc(&mut self, rect: Rect, heading: f64, stroke: Stroke) {
        let color = self.state.color;
        let mut arc = ArcShape {
            id: self.scene.ids.allocate(),
            rect,
            center: geometry::arc_center(rect, self.state.origin),
            heading,
            stroke: color,
            fill: None,
        };
        apply_stroke(&mut arc, color, stroke);
        debug!("Arc {} at {} heading {heading}", arc.id, arc.center);

        self.scene.shapes.current_arc = Some(arc);
        self.scene.shapes.last_arc = Some(rect);
        self.state.arc_origin_changed = false;
    }
}

fn apply_stroke(arc: &mut ArcShape, color: Color, stroke: Stroke) {
    match stroke {
        Stroke::Frame => arc.stroke = color,
        Stroke::Paint => arc.fill = Some(color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{map::Point3, pict::Point};
    use avara_utils::color::Rgb16;

    const RED: Rgb16 = Rgb16::new(65535, 0, 0);
    const BLUE: Rgb16 = Rgb16::new(0, 0, 65535);

    fn interpreter() -> DrawingInterpreter {
        let extrusion = Extrusion {
            wall_height: Fixed::from_int(3),
            ..Default::default()
        };
        DrawingInterpreter::new(Map::new("test"), extrusion)
    }

    fn arc(start: i16, sweep: i16) -> Operation {
        Operation::FrameArc(ArcParams {
            rect: Rect::new(0, 0, 36, 36),
            start,
            sweep,
        })
    }

    #[test]
    fn frame_rect_makes_a_block() {
        let mut interp = interpreter();
        interp.execute(&Operation::RgbForeground(RED));
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 36, 72)));

        let scene = interp.finish();
        assert_eq!(scene.map.blocks.len(), 1);
        let block = &scene.map.blocks[0];
        assert_eq!(block.color, Color::new(1.0, 0.0, 0.0));
        assert_eq!(block.size, Point3::new(Fixed::from_int(4), Fixed::from_int(3), Fixed::from_int(2)));
        assert_eq!(block.center.y, Fixed::from_hundredths(150));
    }

    #[test]
    fn origin_shift_moves_later_shapes() {
        let mut interp = interpreter();
        interp.execute(&Operation::Origin { dh: -18, dv: 36 });
        assert_eq!(interp.state().origin, Offset { x: 18, y: -36 });
        assert!(interp.state().block_origin_changed);

        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 36, 36)));
        assert!(!interp.state().block_origin_changed);

        let block = &interp.scene().map.blocks[0];
        assert_eq!(block.center.x, Fixed::from_int(2));
        assert_eq!(block.center.z, Fixed::from_int(-1));
    }

    #[test]
    fn frame_same_after_origin_shift_makes_a_new_block() {
        let mut interp = interpreter();
        interp.execute(&Operation::RgbForeground(RED));
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));
        interp.execute(&Operation::RgbForeground(BLUE));
        interp.execute(&Operation::PaintRect(Rect::new(0, 0, 18, 18)));
        interp.execute(&Operation::Origin { dh: -36, dv: 0 });
        interp.execute(&Operation::FrameSameRect);

        let blocks = &interp.scene().map.blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].center.x, blocks[0].center.x + Fixed::from_int(2));
        assert_eq!(blocks[1].color, Color::new(0.0, 0.0, 1.0));
        assert_eq!(interp.scene().shapes.current_block, Some(1));
    }

    #[test]
    fn paint_color_stays_with_its_rectangle() {
        let green = Rgb16::new(0, 65535, 0);
        let mut interp = interpreter();
        interp.execute(&Operation::RgbForeground(RED));
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));
        interp.execute(&Operation::RgbForeground(green));
        interp.execute(&Operation::PaintRect(Rect::new(0, 0, 18, 18)));
        interp.execute(&Operation::FrameSameRect);

        interp.execute(&Operation::RgbForeground(BLUE));
        interp.execute(&Operation::FrameRect(Rect::new(36, 36, 54, 54)));
        interp.execute(&Operation::FrameSameRect);

        let blocks = &interp.scene().map.blocks;
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].color, Color::new(0.0, 1.0, 0.0));
        assert_eq!(blocks[1].color, Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn wall_altitude_is_used_once() {
        let mut interp = interpreter();
        interp.execute(&Operation::LongText {
            location: Point::default(),
            text: "wa 2".into(),
        });
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));

        let blocks = &interp.scene().map.blocks;
        assert_eq!(blocks[0].center.y, Fixed::from_hundredths(350));
        assert_eq!(blocks[1].center.y, Fixed::from_hundredths(150));
    }

    #[test]
    fn oversized_heights_are_reported_not_summed() {
        let mut interp = interpreter();
        interp.execute(&Operation::LongText {
            location: Point::default(),
            text: "wa 90000000000000000\rbaseHeight 90000000000000000".into(),
        });
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));

        let scene = interp.finish();
        assert_eq!(scene.diagnostics.len(), 2);
        assert_eq!(scene.map.blocks[0].center.y, Fixed::from_hundredths(150));
    }

    #[test]
    fn round_rects_carry_their_rounding() {
        let mut interp = interpreter();
        interp.execute(&Operation::OvalSize(Point::new(9, 9)));
        interp.execute(&Operation::FrameRoundRect(Rect::new(0, 0, 18, 18)));
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));

        let blocks = &interp.scene().map.blocks;
        assert_eq!(blocks[0].rounding, Fixed::from_hundredths(50));
        assert_eq!(blocks[1].rounding, Fixed::ZERO);
    }

    #[test]
    fn same_arc_keeps_identity_while_heading_matches() {
        let mut interp = interpreter();
        interp.execute(&arc(90, 180));
        let first = interp.scene().shapes.current_arc.clone().unwrap();
        assert_eq!(first.heading, 0.0);

        // Same heading, different split of the angles
        interp.execute(&Operation::RgbForeground(BLUE));
        interp.execute(&Operation::PaintSameArc { start: 135, sweep: 90 });
        let second = interp.scene().shapes.current_arc.clone().unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.fill, Some(Color::new(0.0, 0.0, 1.0)));

        interp.execute(&Operation::FrameSameArc { start: 0, sweep: 180 });
        let third = interp.scene().shapes.current_arc.clone().unwrap();
        assert_ne!(third.id, first.id);
        assert_eq!(third.heading, 270.0);
    }

    #[test]
    fn same_arc_after_origin_shift_is_a_new_arc() {
        let mut interp = interpreter();
        interp.execute(&arc(90, 180));
        let first = interp.scene().shapes.current_arc.clone().unwrap();

        interp.execute(&Operation::Origin { dh: -18, dv: 0 });
        interp.execute(&Operation::FrameSameArc { start: 90, sweep: 180 });
        let second = interp.scene().shapes.current_arc.clone().unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.center.x, first.center.x + Fixed::from_int(1));
    }

    #[test]
    fn text_is_joined_and_flushed_before_the_next_shape() {
        let mut interp = interpreter();
        let text = |text: &str| Operation::DvText {
            dv: 12,
            text: text.into(),
        };

        interp.execute(&text("designer"));
        interp.execute(&text("Jane"));
        // Nothing happens until something else gets drawn
        assert_eq!(interp.scene().map.author, "");

        interp.execute(&text("information Hello"));
        interp.execute(&Operation::FrameRect(Rect::new(0, 0, 18, 18)));
        assert_eq!(interp.scene().map.author, "Jane");
        assert_eq!(interp.scene().map.tagline, "Hello");

        interp.execute(&text("wallHeight 5"));
        let scene = interp.finish();
        assert_eq!(scene.extrusion.wall_height, Fixed::from_int(5));
    }
}
