//! XML map output
//!
//! ```xml
//! <map name="Two Towers" author="Jane" tagline="..." description="...">
//!   <sky color="0.4,0.6,1" horizon="0.8,0.9,1" />
//!   <incarnator location="1,0,2.5" angle="90" />
//!   <block size="4,3,2" center="1,1.5,0" color="1,0,0" />
//!   <ramp base="..." top="..." width="2" color="..." thickness="0.5" />
//!   <goody location="..." shape="missile" grenades="0" missiles="4" boosters="0" color="..." />
//! </map>
//! ```

use crate::map::{Effects, HasEffects, Map};
use std::{
    fmt::Display,
    io::{self, Write},
};

const INDENT: &str = "  ";

/// A single element with no children, written on one line.
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }

    fn attr(mut self, name: &'static str, value: impl Display) -> Self {
        self.attributes.push((name, value.to_string()));
        self
    }

    fn effects(mut self, effects: &Effects) -> Self {
        if effects.is_default() {
            return self;
        }
        if effects.collision != Effects::default().collision {
            self = self.attr("mask", effects.collision.bits());
        }
        if let Some(mass) = effects.mass {
            self = self.attr("mass", mass);
        }
        if effects.transparent {
            self = self.attr("transparent", true);
        }
        if effects.hostile {
            self = self.attr("hostile", true);
        }
        self
    }

    fn write_open<W: Write>(&self, w: &mut W, indent: usize, empty: bool) -> io::Result<()> {
        write!(w, "{}<{}", INDENT.repeat(indent), self.name)?;
        for (name, value) in &self.attributes {
            write!(w, " {name}=\"{}\"", escape(value))?;
        }
        writeln!(w, "{}>", if empty { " /" } else { "" })
    }

    fn write<W: Write>(&self, w: &mut W, indent: usize) -> io::Result<()> {
        self.write_open(w, indent, true)
    }
}

/// Escapes text for use inside a double quoted attribute.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Writes the map as an XML document.
pub fn write_map<W: Write>(w: &mut W, map: &Map) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;

    let root = Element::new("map")
        .attr("name", &map.name)
        .attr("author", &map.author)
        .attr("tagline", &map.tagline)
        .attr("description", &map.description);
    root.write_open(w, 0, false)?;

    if let Some(sky) = &map.sky {
        Element::new("sky")
            .attr("color", sky.color)
            .attr("horizon", sky.horizon)
            .write(w, 1)?;
    }
    if let Some(ground) = &map.ground {
        Element::new("ground")
            .attr("color", ground.color)
            .write(w, 1)?;
    }

    for incarnator in &map.incarnators {
        Element::new("incarnator")
            .attr("location", incarnator.location)
            .attr("angle", incarnator.heading)
            .write(w, 1)?;
    }

    for block in &map.blocks {
        Element::new("block")
            .attr("size", block.size)
            .attr("center", block.center)
            .attr("color", block.color)
            .effects(block.effects())
            .write(w, 1)?;
    }

    for ramp in &map.ramps {
        let mut element = Element::new("ramp")
            .attr("base", ramp.base)
            .attr("top", ramp.top)
            .attr("width", ramp.width)
            .attr("color", ramp.color);
        if ramp.thickness > avara_utils::Fixed::ZERO {
            element = element.attr("thickness", ramp.thickness);
        }
        element.effects(ramp.effects()).write(w, 1)?;
    }

    for goody in &map.goodies {
        let mut element = Element::new("goody")
            .attr("location", goody.location)
            .attr("shape", goody.kind.as_str())
            .attr("grenades", goody.items.grenades)
            .attr("missiles", goody.items.missiles)
            .attr("boosters", goody.items.boosters);
        if !goody.spin.is_zero() {
            element = element.attr("speed", goody.spin);
        }
        element
            .attr("color", goody.color)
            .effects(goody.effects())
            .write(w, 1)?;
    }

    writeln!(w, "</map>")
}

/// Convenience wrapper around [`write_map`].
pub fn map_to_string(map: &Map) -> String {
    let mut buffer = Vec::new();
    write_map(&mut buffer, map).expect("writing into a Vec never fails");
    // All the text is already UTF-8
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Block, Goody, GoodyKind, Incarnator, ItemCounts, Point3, Ramp, Sky};
    use avara_utils::{Color, Fixed, IdAllocator};

    fn fx(hundredths: i64) -> Fixed {
        Fixed::from_hundredths(hundredths)
    }

    #[test]
    fn empty_map() {
        let mut map = Map::new("Tiny & \"quoted\"");
        map.author = "Jane".into();
        assert_eq!(
            map_to_string(&map),
            concat!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
                "<map name=\"Tiny &amp; &quot;quoted&quot;\" author=\"Jane\" tagline=\"\" description=\"\">\n",
                "</map>\n",
            )
        );
    }

    #[test]
    fn entities() {
        let mut ids = IdAllocator::new();
        let mut map = Map::new("x");
        map.sky = Some(Sky::default());
        map.incarnators.push(Incarnator {
            id: ids.allocate(),
            location: Point3::new(fx(100), Fixed::ZERO, fx(250)),
            heading: Fixed::from_int(90),
        });
        map.blocks.push(Block {
            size: Point3::new(fx(400), fx(300), fx(200)),
            center: Point3::new(fx(100), fx(150), fx(-50)),
            color: Color::new(1.0, 0.0, 0.0),
            rounding: Fixed::ZERO,
            effects: Effects {
                hostile: true,
                ..Default::default()
            },
        });
        map.ramps.push(Ramp {
            base: Point3::default(),
            top: Point3::new(Fixed::ZERO, fx(400), fx(-200)),
            width: fx(200),
            thickness: Fixed::ZERO,
            color: Color::WHITE,
            effects: Effects::default(),
        });
        map.goodies.push(Goody {
            id: ids.allocate(),
            location: Point3::default(),
            kind: GoodyKind::Missile,
            items: ItemCounts {
                missiles: 4,
                ..Default::default()
            },
            spin: fx(50),
            color: Color::BLACK,
            effects: Effects::default(),
        });

        let xml = map_to_string(&map);
        let lines = xml.lines().collect::<Vec<_>>();
        assert_eq!(lines[2], r#"  <sky color="0.4,0.6,1" horizon="0.8,0.9,1" />"#);
        assert_eq!(lines[3], r#"  <incarnator location="1,0,2.5" angle="90" />"#);
        assert_eq!(
            lines[4],
            r#"  <block size="4,3,2" center="1,1.5,-0.5" color="1,0,0" hostile="true" />"#
        );
        assert_eq!(
            lines[5],
            r#"  <ramp base="0,0,0" top="0,4,-2" width="2" color="1,1,1" />"#
        );
        assert_eq!(
            lines[6],
            r#"  <goody location="0,0,0" shape="missile" grenades="0" missiles="4" boosters="0" speed="0.5" color="0,0,0" />"#
        );
        assert_eq!(lines[7], "</map>");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape("a<b>&\"c\"\n"), "a&lt;b&gt;&amp;&quot;c&quot;&#10;");
        assert_eq!(escape("Café"), "Café");
    }
}
