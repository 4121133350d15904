//! Reading and converting classic Avara levels
//!
//! A level is a QuickDraw picture stored in a resource fork. Converting it goes through these
//! modules, in order:
//!  - [`rsrc`] finds the picture in the resource fork
//!  - [`pict`] decodes it into [`pict::Operation`]s
//!  - [`interp`] replays the drawing, running the embedded [`script`]s as it goes, with
//!    [`geometry`] doing the math
//!  - [`emit`] writes the resulting [`map::Map`] out as XML

use avara_utils::Fixed;
use log::*;

pub mod emit;
pub mod geometry;
pub mod interp;
pub mod map;
pub mod pict;
pub mod rsrc;
pub mod script;

use geometry::Extrusion;
use interp::DrawingInterpreter;
use map::Map;
use pict::{DecodeError, Operation};
use script::ScriptError;

/// Settings a conversion starts out with. Scripts inside the level can override the heights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub name: String,
    /// Author to use if the level doesn't name a designer
    pub author: Option<String>,
    pub wall_height: Fixed,
    pub base_height: Fixed,
}

impl ConvertOptions {
    pub const DEFAULT_WALL_HEIGHT: Fixed = Fixed::from_int(3);

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: None,
            wall_height: Self::DEFAULT_WALL_HEIGHT,
            base_height: Fixed::ZERO,
        }
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub map: Map,
    /// Script problems which were skipped over
    pub diagnostics: Vec<ScriptError>,
}

/// Decodes a picture and converts it.
pub fn convert_picture(data: &[u8], options: &ConvertOptions) -> Result<Conversion, DecodeError> {
    let picture = pict::decode(data)?;
    debug!(
        "Decoded {} operations, frame {:?}",
        picture.operations.len(),
        picture.frame
    );
    Ok(convert_operations(&picture.operations, options))
}

/// Converts already decoded drawing operations. This can't fail, script problems end up in
/// [`Conversion::diagnostics`].
pub fn convert_operations(operations: &[Operation], options: &ConvertOptions) -> Conversion {
    let mut map = Map::new(options.name.clone());
    if let Some(author) = &options.author {
        map.author = author.clone();
    }

    let extrusion = Extrusion {
        wall_height: options.wall_height,
        base_height: options.base_height,
        wall_altitude: Fixed::ZERO,
    };

    let scene = DrawingInterpreter::new(map, extrusion).run(operations);
    info!(
        "Converted `{}`: {} entities, {} script warnings",
        scene.map.name,
        scene.map.entity_count(),
        scene.diagnostics.len()
    );

    Conversion {
        map: scene.map,
        diagnostics: scene.diagnostics,
    }
}
