//! The level script language
//!
//! Text drawn into a level is a script. Scripts are line based, each line is split into
//! shell-like tokens, and literal `=` tokens are ignored, so `wa = 2` and `wa 2` are the same.
//!
//! ```text
//! designer "Jane Doe"        // global assignments
//! information = "Two towers"
//! wa 1.5
//!
//! object Ramp                // turns the shapes drawn before it into an entity
//!     deltaY = 4
//! end
//!
//! adjust                     // sky and ground colors
//!     skyColor #6080ff
//! end
//!
//! unique ... end             // ignored
//! ```
//!
//! A line with less than two tokens which isn't a keyword continues on the next line, which
//! lets a value be written below its key.

use crate::{
    geometry::{self, HeadingBucket},
    interp::{ArcShape, Scene},
    map::{
        Block, CollisionMask, Effects, Goody, GoodyKind, Ground, Incarnator, ItemCounts, Ramp, Sky,
    },
};
use avara_utils::{Color, Fixed};
use itertools::Itertools;
use log::*;
use std::{fmt, str::FromStr};

mod tokenize;
pub use tokenize::{split_line, UnclosedQuote};

/// The two kinds of shapes scripts consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Block,
    Arc,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShapeKind::Block => "rectangle",
            ShapeKind::Arc => "arc",
        })
    }
}

/// Problems found while running scripts. None of these stop a conversion, the offending
/// statement or entity is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script syntax error: {0}")]
    Syntax(String),
    #[error("`{object}` object has no {missing} drawn before it, skipping")]
    MissingShapeData { object: String, missing: ShapeKind },
}

fn syntax(message: impl Into<String>) -> ScriptError {
    ScriptError::Syntax(message.into())
}

const KEYWORDS: &[&str] = &["object", "unique", "adjust", "end"];

#[derive(Debug, Clone, Default, PartialEq)]
enum Mode {
    #[default]
    Global,
    Unique,
    Object(ObjectBlock),
    Adjust,
}

/// An `object` block being read.
#[derive(Debug, Clone, Default, PartialEq)]
struct ObjectBlock {
    kind: Option<String>,
    params: Params,
}

/// Executes scripts against a [`Scene`]. The mode carries over between scripts, so a block may
/// be split over several pieces of text.
#[derive(Debug, Default)]
pub struct ScriptInterpreter {
    mode: Mode,
}

impl ScriptInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&mut self, text: &str, scene: &mut Scene) {
        let lines = text.split(['\r', '\n']).collect_vec();

        let mut index = 0;
        while index < lines.len() {
            let mut tokens = match tokenize(lines[index]) {
                Ok(tokens) => tokens,
                Err(error) => {
                    scene.report(syntax(error.to_string()));
                    index += 1;
                    continue;
                }
            };
            index += 1;

            if self.mode != Mode::Unique {
                while tokens.len() < 2 && !is_keyword_line(&tokens) && index < lines.len() {
                    match tokenize(lines[index]) {
                        Ok(next) => tokens.extend(next),
                        Err(error) => scene.report(syntax(error.to_string())),
                    }
                    index += 1;
                }
            }

            self.line(tokens, scene);
        }
    }

    /// Reports a block left open at the end of the drawing.
    pub fn finish(&mut self, scene: &mut Scene) {
        match std::mem::take(&mut self.mode) {
            Mode::Global | Mode::Unique => {}
            Mode::Object(block) => scene.report(syntax(format!(
                "`object {}` is never closed with `end`",
                block.kind.unwrap_or_default()
            ))),
            Mode::Adjust => scene.report(syntax("`adjust` is never closed with `end`")),
        }
    }

    fn line(&mut self, tokens: Vec<String>, scene: &mut Scene) {
        let mut pending: Option<String> = None;

        for token in tokens {
            let global = matches!(self.mode, Mode::Global);

            if global && pending.is_none() && KEYWORDS.contains(&token.as_str()) {
                self.begin(&token, scene);
                continue;
            }
            if !global && token == "end" {
                if let Some(key) = pending.take() {
                    scene.report(missing_value(&key));
                }
                self.end(scene);
                continue;
            }
            if matches!(self.mode, Mode::Unique) {
                continue;
            }
            if let Mode::Object(ObjectBlock {
                kind: kind @ None, ..
            }) = &mut self.mode
            {
                *kind = Some(token);
                continue;
            }

            let Some(key) = pending.take() else {
                pending = Some(token);
                continue;
            };
            match &mut self.mode {
                Mode::Global => global_setting(scene, &key, &token),
                Mode::Adjust => adjust(scene, &key, &token),
                Mode::Object(block) => block.params.push(key, token),
                Mode::Unique => {}
            }
        }

        if let Some(key) = pending {
            scene.report(missing_value(&key));
        }
    }

    fn begin(&mut self, keyword: &str, scene: &mut Scene) {
        self.mode = match keyword {
            "object" => Mode::Object(ObjectBlock::default()),
            "unique" => Mode::Unique,
            "adjust" => Mode::Adjust,
            _ => {
                scene.report(syntax(format!("`{keyword}` outside of a block")));
                Mode::Global
            }
        };
    }

    fn end(&mut self, scene: &mut Scene) {
        if let Mode::Object(block) = std::mem::take(&mut self.mode) {
            match block.kind {
                Some(kind) => create_object(scene, &kind, block.params),
                None => scene.report(syntax("`object` without a type")),
            }
        }
    }
}

fn tokenize(line: &str) -> Result<Vec<String>, UnclosedQuote> {
    let mut tokens = split_line(line)?;
    tokens.retain(|token| token != "=");
    Ok(tokens)
}

fn is_keyword_line(tokens: &[String]) -> bool {
    matches!(tokens, [token] if KEYWORDS.contains(&token.as_str()))
}

fn missing_value(key: &str) -> ScriptError {
    syntax(format!("`{key}` has no value"))
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ScriptError> {
    value
        .parse()
        .map_err(|_| syntax(format!("`{value}` is not a valid value for `{key}`")))
}

fn global_setting(scene: &mut Scene, key: &str, value: &str) {
    if let Err(error) = set_global(scene, key, value) {
        scene.report(error);
    }
}

fn set_global(scene: &mut Scene, key: &str, value: &str) -> Result<(), ScriptError> {
    match key {
        "wa" => scene.extrusion.wall_altitude = parse(key, value)?,
        "wallHeight" => scene.extrusion.wall_height = parse(key, value)?,
        "baseHeight" => scene.extrusion.base_height = parse(key, value)?,
        "designer" => scene.map.author = value.to_string(),
        "information" => append(&mut scene.map.tagline, value),
        "description" => append(&mut scene.map.description, value),
        _ => return Err(syntax(format!("unknown setting `{key}`"))),
    }
    Ok(())
}

fn append(target: &mut String, value: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(value);
}

fn adjust(scene: &mut Scene, key: &str, value: &str) {
    let color = match Color::parse(value) {
        Ok(color) => color,
        Err(error) => return scene.report(syntax(format!("`{key}`: {error}"))),
    };

    match key {
        "skyColor" => scene.map.sky.get_or_insert_with(Sky::default).color = color,
        "horizonColor" => scene.map.sky.get_or_insert_with(Sky::default).horizon = color,
        "groundColor" => scene.map.ground.get_or_insert_with(Ground::default).color = color,
        _ => scene.report(syntax(format!("unknown adjustment `{key}`"))),
    }
}

/// Key/value pairs of an object block, taken out one by one as the object reads them.
#[derive(Debug, Clone, Default, PartialEq)]
struct Params {
    pairs: Vec<(String, String)>,
    errors: Vec<ScriptError>,
}

impl Params {
    fn push(&mut self, key: String, value: String) {
        self.pairs.push((key, value));
    }

    /// Removes every pair with this key, returning the last value.
    fn take(&mut self, key: &str) -> Option<String> {
        let mut value = None;
        self.pairs.retain(|(k, v)| {
            if k == key {
                value = Some(v.clone());
                false
            } else {
                true
            }
        });
        value
    }

    /// Parses a value, remembering the error if it doesn't parse.
    fn parsed<T: FromStr>(&mut self, key: &str) -> Option<T> {
        let value = self.take(key)?;
        match parse(key, &value) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    fn fixed(&mut self, key: &str) -> Option<Fixed> {
        self.parsed(key)
    }

    fn flag(&mut self, key: &str) -> Option<bool> {
        let value = self.take(key)?;
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => {
                self.errors.push(syntax(format!("`{value}` is not a flag, for `{key}`")));
                None
            }
        }
    }

    fn effects(&mut self) -> Effects {
        let mut effects = Effects::default();
        if let Some(bits) = self.parsed::<u32>("mask") {
            effects.collision = CollisionMask::from_bits_truncate(bits);
        }
        effects.mass = self.fixed("mass");
        effects.transparent = self.flag("transparent").unwrap_or(false);
        effects.hostile = self.flag("hostile").unwrap_or(false);
        effects
    }

    /// Reports the accumulated errors, and every key nobody asked for.
    fn finish(self, scene: &mut Scene, kind: &str) {
        for error in self.errors {
            scene.report(error);
        }
        for (key, _) in self.pairs {
            scene.report(syntax(format!("`{kind}` objects have no `{key}`")));
        }
    }
}

fn missing(kind: &str, missing: ShapeKind) -> ScriptError {
    ScriptError::MissingShapeData {
        object: kind.to_string(),
        missing,
    }
}

fn create_object(scene: &mut Scene, kind: &str, mut params: Params) {
    match kind {
        "Incarnator" => incarnator(scene, &mut params),
        "Goody" => goody(scene, &mut params),
        "Ramp" => ramp(scene, &mut params),
        "Wall" => wall(scene, &mut params),
        _ => {
            scene.report(syntax(format!("unknown object type `{kind}`")));
            return;
        }
    }

    params.finish(scene, kind);
}

/// Takes the current arc, or reports it missing and clears the shape buffer.
fn require_arc(scene: &mut Scene, kind: &str) -> Option<ArcShape> {
    let arc = scene.take_arc();
    if arc.is_none() {
        scene.report(missing(kind, ShapeKind::Arc));
        scene.shapes.clear();
    }
    arc
}

fn incarnator(scene: &mut Scene, params: &mut Params) {
    let y = params.fixed("y").unwrap_or_default();
    let Some(arc) = require_arc(scene, "Incarnator") else {
        return;
    };

    let incarnator = Incarnator {
        id: arc.id,
        location: arc.center.raised(y),
        heading: Fixed::snap(arc.heading),
    };
    debug!("Incarnator {} at {}", incarnator.id, incarnator.location);
    scene.map.incarnators.push(incarnator);
}

fn goody(scene: &mut Scene, params: &mut Params) {
    let effects = params.effects();
    let y = params.fixed("y").unwrap_or_default();
    let kind = params
        .take("shape")
        .map(|shape| GoodyKind::from_shape(&shape))
        .unwrap_or_default();
    let items = ItemCounts {
        grenades: params.parsed("grenades").unwrap_or(0),
        missiles: params.parsed("missiles").unwrap_or(0),
        boosters: params.parsed("boosters").unwrap_or(0),
    };
    let spin = params.fixed("speed").unwrap_or_default();

    let Some(arc) = require_arc(scene, "Goody") else {
        return;
    };

    let goody = Goody {
        id: arc.id,
        location: arc.center.raised(y),
        kind,
        items,
        spin,
        color: arc.fill_color(),
        effects: Effects::default(),
    };
    debug!("Goody {} at {}", goody.id, goody.location);
    scene.map.goodies.push(effects.apply(goody));
}

fn ramp(scene: &mut Scene, params: &mut Params) {
    let effects = params.effects();
    let delta_y = params.fixed("deltaY").unwrap_or_default();
    let y = params.fixed("y").unwrap_or_default();
    let thickness = params.fixed("thickness");

    if scene.shapes.current_block.is_none() {
        scene.report(missing("Ramp", ShapeKind::Block));
        scene.shapes.clear();
        return;
    }

    if delta_y.is_zero() {
        let Some(block) = scene.take_block() else {
            return;
        };
        let thickness = thickness.unwrap_or(block.rounding);
        let height = if thickness.is_zero() {
            block.size.y
        } else {
            thickness
        };

        let mut slab = block;
        slab.size.y = height;
        slab.center.y = y + height.half();
        debug!("Flat ramp, kept as a block at {}", slab.center);

        scene.map.blocks.push(effects.apply(slab));
        return;
    }

    // The footprint stays a wall if there's nothing telling which way the ramp goes
    let Some(arc) = require_arc(scene, "Ramp") else {
        return;
    };
    let Some(block) = scene.take_block() else {
        return;
    };

    let bucket = HeadingBucket::classify(arc.heading);
    let bounds = geometry::ramp_bounds(&block, bucket, y, delta_y);
    let ramp = Ramp {
        base: bounds.base,
        top: bounds.top,
        width: bounds.width,
        thickness: thickness.unwrap_or(block.rounding),
        color: block.color,
        effects: Effects::default(),
    };
    debug!("Ramp facing {bucket:?} from {} to {}", ramp.base, ramp.top);

    scene.map.ramps.push(effects.apply(ramp));
}

fn wall(scene: &mut Scene, params: &mut Params) {
    let effects = params.effects();
    let y = params.fixed("y");
    let height = params.fixed("height");

    let Some(block) = scene.current_block_mut() else {
        scene.report(missing("Wall", ShapeKind::Block));
        scene.shapes.clear();
        return;
    };

    adjust_wall(block, y, height);
    effects.apply_to(block);
    scene.shapes.current_block = None;
}

/// Moves a wall to rest at `y`, and/or changes its height keeping the bottom in place.
fn adjust_wall(block: &mut Block, y: Option<Fixed>, height: Option<Fixed>) {
    let bottom = y.unwrap_or_else(|| block.bottom());
    if let Some(height) = height {
        block.size.y = height;
    }
    block.center.y = bottom + block.size.y.half();
}
