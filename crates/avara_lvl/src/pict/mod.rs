//! QuickDraw version 2 pictures
//!
//! The level editor saved levels as plain drawings, so a level is a `PICT` stream: a fixed
//! 40-byte header followed by opcode records:
//!
//! ```c
//! struct Picture {
//!     u16  size;               // low 16 bits of the picture size, useless
//!     Rect frame;
//!     u32  version;            // 0x001102FF: VersionOp with version 2
//!     u16  header_opcode;      // 0x0C00
//!     u8   header[24];
//!     Record records[];        // until the end of the buffer, or OpEndPic
//! }
//!
//! struct Record {
//!     u16 opcode;
//!     u8  fixed[...];          // opcode specific size
//!     u8  variable[...];       // size read from `fixed`, only for some opcodes
//! }
//! ```
//!
//! Records are aligned to 2 bytes, text records with odd lengths are followed by a pad byte.

use avara_utils::color::Rgb16;

mod decode;
pub use decode::*;

mod reader;
pub use reader::PrimitiveReader;

mod writer;
pub use writer::PictWriter;

/// Total size of the picture header, up to and including the header opcode's payload.
pub const HEADER_SIZE: usize = 40;
/// Offset of [`VERSION_MAGIC`] within the header.
pub const VERSION_OFFSET: usize = 10;
/// `VersionOp` (0x0011) followed by version 2 (0x02FF).
pub const VERSION_MAGIC: u32 = 0x001102FF;

/// QuickDraw point. Vertical coordinate first, since that's how they're stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub v: i16,
    pub h: i16,
}

impl Point {
    pub const fn new(v: i16, h: i16) -> Self {
        Self { v, h }
    }
}

/// QuickDraw rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl Rect {
    pub const fn new(top: i16, left: i16, bottom: i16, right: i16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// Bounding rectangle and angles of an arc. Angles are in degrees, clockwise, with 0 pointing
/// up the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ArcParams {
    pub rect: Rect,
    pub start: i16,
    pub sweep: i16,
}

/// Every opcode the decoder understands. Anything else is a hard error: record lengths are
/// opcode specific, so there's no way to skip over an unknown one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Opcode {
    Nop = 0x0000,
    Clip = 0x0001,
    BkPat = 0x0002,
    TxFont = 0x0003,
    TxFace = 0x0004,
    TxMode = 0x0005,
    SpExtra = 0x0006,
    PnSize = 0x0007,
    PnMode = 0x0008,
    PnPat = 0x0009,
    FillPat = 0x000A,
    OvSize = 0x000B,
    Origin = 0x000C,
    TxSize = 0x000D,
    FgColor = 0x000E,
    BkColor = 0x000F,
    TxRatio = 0x0010,
    Version = 0x0011,
    RgbFgCol = 0x001A,
    RgbBkCol = 0x001B,
    DefHilite = 0x001E,
    Line = 0x0020,
    LineFrom = 0x0021,
    ShortLine = 0x0022,
    ShortLineFrom = 0x0023,
    LongText = 0x0028,
    DhText = 0x0029,
    DvText = 0x002A,
    DhDvText = 0x002B,
    FontName = 0x002C,
    FrameRect = 0x0030,
    PaintRect = 0x0031,
    FrameSameRect = 0x0038,
    PaintSameRect = 0x0039,
    FrameRRect = 0x0040,
    PaintRRect = 0x0041,
    FrameSameRRect = 0x0048,
    PaintSameRRect = 0x0049,
    FrameArc = 0x0060,
    PaintArc = 0x0061,
    FrameSameArc = 0x0068,
    PaintSameArc = 0x0069,
    ShortComment = 0x00A0,
    LongComment = 0x00A1,
    OpEndPic = 0x00FF,
}

/// How the length of an opcode's variable part is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableLength {
    /// No variable part.
    None,
    /// A `u16` at the start of the fixed part gives the size of the whole record payload,
    /// itself included. Used by regions.
    TotalSize,
    /// A `u8` count at the given offset within the fixed part.
    CountByte(usize),
    /// A `u16` length at the given offset within the fixed part.
    LengthWord(usize),
}

/// Payload layout of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub fixed: usize,
    pub variable: VariableLength,
}

impl Opcode {
    pub fn from_u16(value: u16) -> Option<Self> {
        use Opcode::*;
        Some(match value {
            0x0000 => Nop,
            0x0001 => Clip,
            0x0002 => BkPat,
            0x0003 => TxFont,
            0x0004 => TxFace,
            0x0005 => TxMode,
            0x0006 => SpExtra,
            0x0007 => PnSize,
            0x0008 => PnMode,
            0x0009 => PnPat,
            0x000A => FillPat,
            0x000B => OvSize,
            0x000C => Origin,
            0x000D => TxSize,
            0x000E => FgColor,
            0x000F => BkColor,
            0x0010 => TxRatio,
            0x0011 => Version,
            0x001A => RgbFgCol,
            0x001B => RgbBkCol,
            0x001E => DefHilite,
            0x0020 => Line,
            0x0021 => LineFrom,
            0x0022 => ShortLine,
            0x0023 => ShortLineFrom,
            0x0028 => LongText,
            0x0029 => DhText,
            0x002A => DvText,
            0x002B => DhDvText,
            0x002C => FontName,
            0x0030 => FrameRect,
            0x0031 => PaintRect,
            0x0038 => FrameSameRect,
            0x0039 => PaintSameRect,
            0x0040 => FrameRRect,
            0x0041 => PaintRRect,
            0x0048 => FrameSameRRect,
            0x0049 => PaintSameRRect,
            0x0060 => FrameArc,
            0x0061 => PaintArc,
            0x0068 => FrameSameArc,
            0x0069 => PaintSameArc,
            0x00A0 => ShortComment,
            0x00A1 => LongComment,
            0x00FF => OpEndPic,
            _ => return None,
        })
    }

    pub const fn layout(self) -> Layout {
        use Opcode::*;
        use VariableLength as V;

        let (fixed, variable) = match self {
            Nop | DefHilite | OpEndPic => (0, V::None),
            FrameSameRect | PaintSameRect | FrameSameRRect | PaintSameRRect => (0, V::None),
            Clip => (10, V::TotalSize),
            TxFace => (1, V::None),
            TxFont | TxMode | PnMode | TxSize | Version | ShortComment | ShortLineFrom => {
                (2, V::None)
            }
            SpExtra | PnSize | OvSize | Origin | FgColor | BkColor | LineFrom => (4, V::None),
            FrameSameArc | PaintSameArc => (4, V::None),
            RgbFgCol | RgbBkCol | ShortLine => (6, V::None),
            BkPat | PnPat | FillPat | TxRatio | Line => (8, V::None),
            FrameRect | PaintRect | FrameRRect | PaintRRect => (8, V::None),
            FrameArc | PaintArc => (12, V::None),
            LongText => (5, V::CountByte(4)),
            DhText | DvText => (2, V::CountByte(1)),
            DhDvText => (3, V::CountByte(2)),
            FontName => (2, V::LengthWord(0)),
            LongComment => (4, V::LengthWord(2)),
        };

        Layout { fixed, variable }
    }
}

/// A single decoded drawing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Nop,
    ClipRegion { bounds: Rect, region: Vec<u8> },
    BackgroundPattern([u8; 8]),
    TextFont(u16),
    TextFace(u8),
    TextMode(u16),
    SpaceExtra(i32),
    PenSize(Point),
    PenMode(u16),
    PenPattern([u8; 8]),
    FillPattern([u8; 8]),
    OvalSize(Point),
    /// Origin shift. Coordinates of later operations are relative to the shifted origin.
    Origin { dh: i16, dv: i16 },
    TextSize(u16),
    /// Old style 8-color foreground
    ForegroundColor(u32),
    BackgroundColor(u32),
    TextRatio { numerator: Point, denominator: Point },
    Version(u16),
    RgbForeground(Rgb16),
    RgbBackground(Rgb16),
    DefaultHilite,
    Line { from: Point, to: Point },
    LineFrom(Point),
    ShortLine { from: Point, dh: i8, dv: i8 },
    ShortLineFrom { dh: i8, dv: i8 },
    LongText { location: Point, text: String },
    DhText { dh: u8, text: String },
    DvText { dv: u8, text: String },
    DhDvText { dh: u8, dv: u8, text: String },
    FontName { font_id: u16, name: String },
    FrameRect(Rect),
    PaintRect(Rect),
    FrameSameRect,
    PaintSameRect,
    FrameRoundRect(Rect),
    PaintRoundRect(Rect),
    FrameSameRoundRect,
    PaintSameRoundRect,
    FrameArc(ArcParams),
    PaintArc(ArcParams),
    FrameSameArc { start: i16, sweep: i16 },
    PaintSameArc { start: i16, sweep: i16 },
    ShortComment(u16),
    LongComment { kind: u16, data: Vec<u8> },
    EndOfPicture,
}

impl Operation {
    pub fn opcode(&self) -> Opcode {
        use Operation::*;
        match self {
            Nop => Opcode::Nop,
            ClipRegion { .. } => Opcode::Clip,
            BackgroundPattern(_) => Opcode::BkPat,
            TextFont(_) => Opcode::TxFont,
            TextFace(_) => Opcode::TxFace,
            TextMode(_) => Opcode::TxMode,
            SpaceExtra(_) => Opcode::SpExtra,
            PenSize(_) => Opcode::PnSize,
            PenMode(_) => Opcode::PnMode,
            PenPattern(_) => Opcode::PnPat,
            FillPattern(_) => Opcode::FillPat,
            OvalSize(_) => Opcode::OvSize,
            Origin { .. } => Opcode::Origin,
            TextSize(_) => Opcode::TxSize,
            ForegroundColor(_) => Opcode::FgColor,
            BackgroundColor(_) => Opcode::BkColor,
            TextRatio { .. } => Opcode::TxRatio,
            Version(_) => Opcode::Version,
            RgbForeground(_) => Opcode::RgbFgCol,
            RgbBackground(_) => Opcode::RgbBkCol,
            DefaultHilite => Opcode::DefHilite,
            Line { .. } => Opcode::Line,
            LineFrom(_) => Opcode::LineFrom,
            ShortLine { .. } => Opcode::ShortLine,
            ShortLineFrom { .. } => Opcode::ShortLineFrom,
            LongText { .. } => Opcode::LongText,
            DhText { .. } => Opcode::DhText,
            DvText { .. } => Opcode::DvText,
            DhDvText { .. } => Opcode::DhDvText,
            FontName { .. } => Opcode::FontName,
            FrameRect(_) => Opcode::FrameRect,
            PaintRect(_) => Opcode::PaintRect,
            FrameSameRect => Opcode::FrameSameRect,
            PaintSameRect => Opcode::PaintSameRect,
            FrameRoundRect(_) => Opcode::FrameRRect,
            PaintRoundRect(_) => Opcode::PaintRRect,
            FrameSameRoundRect => Opcode::FrameSameRRect,
            PaintSameRoundRect => Opcode::PaintSameRRect,
            FrameArc(_) => Opcode::FrameArc,
            PaintArc(_) => Opcode::PaintArc,
            FrameSameArc { .. } => Opcode::FrameSameArc,
            PaintSameArc { .. } => Opcode::PaintSameArc,
            ShortComment(_) => Opcode::ShortComment,
            LongComment { .. } => Opcode::LongComment,
            EndOfPicture => Opcode::OpEndPic,
        }
    }

    /// Text drawn by any of the four text opcodes.
    pub fn text(&self) -> Option<&str> {
        match self {
            Operation::LongText { text, .. }
            | Operation::DhText { text, .. }
            | Operation::DvText { text, .. }
            | Operation::DhDvText { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A decoded picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// Bounds of the whole drawing, from the header.
    pub frame: Rect,
    pub operations: Vec<Operation>,
}
