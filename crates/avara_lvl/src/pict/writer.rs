use super::{ArcParams, Opcode, Operation, Point, Rect, VERSION_MAGIC};
use avara_utils::{color::Rgb16, mac_roman};
use byteorder::{WriteBytesExt, BE};
use std::io::{self, Write};

/// Builds version 2 pictures out of [`Operation`]s.
///
/// Mostly useful for producing test fixtures, the converter itself only ever reads pictures.
///
/// ## Example
/// ```
/// # use avara_lvl::pict::{self, Operation, PictWriter, Rect};
/// let mut writer = PictWriter::new(Rect::new(0, 0, 100, 100));
/// writer.push(&Operation::FrameRect(Rect::new(10, 10, 20, 20)));
///
/// let picture = pict::decode(&writer.finish()).unwrap();
/// assert_eq!(picture.operations.len(), 2); // the rect, and the end-of-picture marker
/// ```
#[derive(Debug, Clone)]
pub struct PictWriter {
    buffer: Vec<u8>,
}

impl PictWriter {
    pub fn new(frame: Rect) -> Self {
        let mut buffer = Vec::with_capacity(512);
        write_header(&mut buffer, frame).expect("writing into a Vec never fails");
        Self { buffer }
    }

    /// Appends an operation, along with any padding needed to keep records word aligned.
    pub fn push(&mut self, operation: &Operation) -> &mut Self {
        if self.buffer.len() % 2 == 1 {
            self.buffer.push(0);
        }
        write_operation(&mut self.buffer, operation).expect("writing into a Vec never fails");
        self
    }

    /// Terminates the picture with an end-of-picture opcode and returns the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.push(&Operation::EndOfPicture);
        self.into_bytes()
    }

    /// Returns the bytes written so far, without terminating the picture.
    pub fn into_bytes(mut self) -> Vec<u8> {
        // The size field only holds the low 16 bits, which is why nothing relies on it
        let size = (self.buffer.len() & 0xFFFF) as u16;
        self.buffer[0..2].copy_from_slice(&size.to_be_bytes());
        self.buffer
    }
}

fn write_header<W: Write>(w: &mut W, frame: Rect) -> io::Result<()> {
    w.write_u16::<BE>(0)?;
    write_rect(w, frame)?;
    w.write_u32::<BE>(VERSION_MAGIC)?;

    // HeaderOp: version -2 header, 72 dpi, source rect
    w.write_u16::<BE>(0x0C00)?;
    w.write_i16::<BE>(-2)?;
    w.write_u16::<BE>(0)?;
    w.write_u32::<BE>(0x0048_0000)?;
    w.write_u32::<BE>(0x0048_0000)?;
    write_rect(w, frame)?;
    w.write_u32::<BE>(0)?;
    Ok(())
}

fn write_operation<W: Write>(w: &mut W, operation: &Operation) -> io::Result<()> {
    w.write_u16::<BE>(operation.opcode() as u16)?;

    use Operation::*;
    match operation {
        Nop | DefaultHilite | EndOfPicture => {}
        FrameSameRect | PaintSameRect | FrameSameRoundRect | PaintSameRoundRect => {}
        ClipRegion { bounds, region } => {
            w.write_u16::<BE>((10 + region.len()) as u16)?;
            write_rect(w, *bounds)?;
            w.write_all(region)?;
        }
        BackgroundPattern(pattern) | PenPattern(pattern) | FillPattern(pattern) => {
            w.write_all(pattern)?
        }
        TextFont(value) | TextMode(value) | PenMode(value) | TextSize(value) | Version(value)
        | ShortComment(value) => w.write_u16::<BE>(*value)?,
        TextFace(face) => w.write_u8(*face)?,
        SpaceExtra(extra) => w.write_i32::<BE>(*extra)?,
        PenSize(point) | OvalSize(point) | LineFrom(point) => write_point(w, *point)?,
        Origin { dh, dv } => {
            w.write_i16::<BE>(*dh)?;
            w.write_i16::<BE>(*dv)?;
        }
        ForegroundColor(color) | BackgroundColor(color) => w.write_u32::<BE>(*color)?,
        TextRatio {
            numerator,
            denominator,
        } => {
            write_point(w, *numerator)?;
            write_point(w, *denominator)?;
        }
        RgbForeground(color) | RgbBackground(color) => write_rgb(w, *color)?,
        Line { from, to } => {
            write_point(w, *from)?;
            write_point(w, *to)?;
        }
        ShortLine { from, dh, dv } => {
            write_point(w, *from)?;
            w.write_i8(*dh)?;
            w.write_i8(*dv)?;
        }
        ShortLineFrom { dh, dv } => {
            w.write_i8(*dh)?;
            w.write_i8(*dv)?;
        }
        LongText { location, text } => {
            write_point(w, *location)?;
            write_text(w, text)?;
        }
        DhText { dh: delta, text } | DvText { dv: delta, text } => {
            w.write_u8(*delta)?;
            write_text(w, text)?;
        }
        DhDvText { dh, dv, text } => {
            w.write_u8(*dh)?;
            w.write_u8(*dv)?;
            write_text(w, text)?;
        }
        FontName { font_id, name } => {
            let name = mac_roman::encode(name);
            let name = &name[..name.len().min(255)];
            w.write_u16::<BE>((3 + name.len()) as u16)?;
            w.write_u16::<BE>(*font_id)?;
            w.write_u8(name.len() as u8)?;
            w.write_all(name)?;
        }
        FrameRect(rect) | PaintRect(rect) | FrameRoundRect(rect) | PaintRoundRect(rect) => {
            write_rect(w, *rect)?
        }
        FrameArc(arc) | PaintArc(arc) => write_arc(w, *arc)?,
        FrameSameArc { start, sweep } | PaintSameArc { start, sweep } => {
            w.write_i16::<BE>(*start)?;
            w.write_i16::<BE>(*sweep)?;
        }
        LongComment { kind, data } => {
            w.write_u16::<BE>(*kind)?;
            w.write_u16::<BE>(data.len() as u16)?;
            w.write_all(data)?;
        }
    }

    debug_assert!(Opcode::from_u16(operation.opcode() as u16).is_some());
    Ok(())
}

fn write_point<W: Write>(w: &mut W, point: Point) -> io::Result<()> {
    w.write_i16::<BE>(point.v)?;
    w.write_i16::<BE>(point.h)
}

fn write_rect<W: Write>(w: &mut W, rect: Rect) -> io::Result<()> {
    w.write_i16::<BE>(rect.top)?;
    w.write_i16::<BE>(rect.left)?;
    w.write_i16::<BE>(rect.bottom)?;
    w.write_i16::<BE>(rect.right)
}

fn write_arc<W: Write>(w: &mut W, arc: ArcParams) -> io::Result<()> {
    write_rect(w, arc.rect)?;
    w.write_i16::<BE>(arc.start)?;
    w.write_i16::<BE>(arc.sweep)
}

fn write_rgb<W: Write>(w: &mut W, color: Rgb16) -> io::Result<()> {
    w.write_u16::<BE>(color.r)?;
    w.write_u16::<BE>(color.g)?;
    w.write_u16::<BE>(color.b)
}

/// Count byte, then up to 255 bytes of Mac Roman text.
fn write_text<W: Write>(w: &mut W, text: &str) -> io::Result<()> {
    let bytes = mac_roman::encode(text);
    let bytes = &bytes[..bytes.len().min(255)];
    w.write_u8(bytes.len() as u8)?;
    w.write_all(bytes)
}
