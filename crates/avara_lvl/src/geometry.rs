//! Derivation of 3D geometry from 2D drawing coordinates
//!
//! Drawing coordinates are pixels. World units are 18 pixels each, and every coordinate that
//! comes out of the drawing is snapped to hundredths (half away from zero), so all map geometry
//! has the same precision.

use crate::{
    map::{Block, Point3},
    pict::Rect,
};
use avara_utils::Fixed;

/// Pixels per world unit.
pub const SCALE: i64 = 18;

/// Converts a drawing coordinate into world units.
///
/// ## Example
/// ```
/// # use avara_lvl::geometry::scale_and_snap;
/// # use avara_utils::Fixed;
/// assert_eq!(scale_and_snap(36), Fixed::from_int(2));
/// assert_eq!(scale_and_snap(10), Fixed::from_hundredths(56));
/// ```
pub fn scale_and_snap(raw: i64) -> Fixed {
    Fixed::from_ratio(raw, SCALE)
}

/// Like [`scale_and_snap`], for a coordinate given doubled, such as a sum of two edges whose
/// midpoint is wanted.
pub fn scale_and_snap_doubled(doubled: i64) -> Fixed {
    Fixed::from_ratio(doubled, 2 * SCALE)
}

/// Cumulative origin shift, in drawing coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub x: i64,
    pub y: i64,
}

/// Heights used when extruding a rectangle into a block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extrusion {
    /// Height of the block
    pub wall_height: Fixed,
    /// Floor level everything is placed on
    pub base_height: Fixed,
    /// Additional lift for this one block
    pub wall_altitude: Fixed,
}

/// Size and center of the block a framed rectangle describes.
///
/// The pen draws inside the rectangle, so the wall's outline runs through the middle of the
/// pen stroke: the span is reduced by the pen size, the center stays put.
pub fn block_bounds(rect: Rect, origin: Offset, pen: Offset, extrusion: Extrusion) -> (Point3, Point3) {
    let left = rect.left as i64 + origin.x;
    let right = rect.right as i64 + origin.x;
    let top = rect.top as i64 + origin.y;
    let bottom = rect.bottom as i64 + origin.y;

    let span_x = ((right - left).abs() - pen.x).max(0);
    let span_z = ((bottom - top).abs() - pen.y).max(0);

    let size = Point3::new(
        scale_and_snap(span_x),
        extrusion.wall_height,
        scale_and_snap(span_z),
    );
    let center = Point3::new(
        scale_and_snap_doubled(left + right),
        extrusion.base_height + extrusion.wall_altitude + extrusion.wall_height.half(),
        scale_and_snap_doubled(top + bottom),
    );

    (size, center)
}

/// World space center of an arc's bounding rectangle, on the floor plane.
pub fn arc_center(rect: Rect, origin: Offset) -> Point3 {
    Point3::new(
        scale_and_snap_doubled(rect.left as i64 + rect.right as i64 + 2 * origin.x),
        Fixed::ZERO,
        scale_and_snap_doubled(rect.top as i64 + rect.bottom as i64 + 2 * origin.y),
    )
}

/// Direction an arc points at: the opposite of its bisector, in `[0, 360)` degrees.
///
/// ## Example
/// ```
/// # use avara_lvl::geometry::heading_from_arc;
/// assert_eq!(heading_from_arc(0, 180), 270.0);
/// assert_eq!(heading_from_arc(270, 180), 180.0);
/// ```
pub fn heading_from_arc(start: i16, sweep: i16) -> f64 {
    (start as f64 + sweep as f64 / 2.0 + 180.0).rem_euclid(360.0)
}

/// One of the four directions a ramp can rise towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingBucket {
    /// Rises towards -z, headings in `[315, 45)`
    North,
    /// Rises towards +x, headings in `[45, 135)`
    East,
    /// Rises towards +z, headings in `[135, 225)`
    South,
    /// Rises towards -x, headings in `[225, 315)`
    West,
}

impl HeadingBucket {
    /// Buckets are 90 degrees wide and centered on the axes. Every lower bound is inclusive.
    pub fn classify(heading: f64) -> Self {
        let heading = heading.rem_euclid(360.0);
        if heading >= 315.0 || heading < 45.0 {
            HeadingBucket::North
        } else if heading < 135.0 {
            HeadingBucket::East
        } else if heading < 225.0 {
            HeadingBucket::South
        } else {
            HeadingBucket::West
        }
    }
}

/// Geometry of a ramp laid over a block's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampBounds {
    pub base: Point3,
    pub top: Point3,
    pub width: Fixed,
}

/// Picks the footprint edges the ramp starts and ends on. The base sits on the edge facing
/// away from the heading, the top on the edge the heading points at, and the width is the
/// footprint's extent along the edges.
pub fn ramp_bounds(footprint: &Block, bucket: HeadingBucket, y: Fixed, delta_y: Fixed) -> RampBounds {
    let Point3 { x: cx, z: cz, .. } = footprint.center;
    let half_x = footprint.size.x.half();
    let half_z = footprint.size.z.half();

    let at = |x: Fixed, y: Fixed, z: Fixed| Point3::new(x, y, z);
    let (base, top, width) = match bucket {
        HeadingBucket::North => (at(cx, y, cz + half_z), at(cx, y + delta_y, cz - half_z), footprint.size.x),
        HeadingBucket::East => (at(cx - half_x, y, cz), at(cx + half_x, y + delta_y, cz), footprint.size.z),
        HeadingBucket::South => (at(cx, y, cz - half_z), at(cx, y + delta_y, cz + half_z), footprint.size.x),
        HeadingBucket::West => (at(cx + half_x, y, cz), at(cx - half_x, y + delta_y, cz), footprint.size.z),
    };

    RampBounds { base, top, width }
}
