use super::{
    ArcParams, Layout, Opcode, Operation, Picture, PrimitiveReader, VariableLength, HEADER_SIZE,
    VERSION_MAGIC, VERSION_OFFSET,
};
use avara_utils::{color::Rgb16, mac_roman};
use byteorder::{ByteOrder, BE};
use log::trace;

/// Size of the preamble in front of pictures saved as standalone files.
pub const FILE_PREAMBLE_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("picture header is truncated ({len} bytes, at least 40 expected)")]
    TruncatedHeader { len: usize },
    #[error("unsupported picture version {found:#010X}, only version 2 pictures (0x001102FF) are supported")]
    UnsupportedFormatVersion { found: u32 },
    #[error("unknown opcode {opcode:#06X} at offset {offset:#x}")]
    UnknownOpcode { opcode: u16, offset: usize },
    #[error("{opcode:?} record at offset {offset:#x} runs past the end of the picture")]
    Truncated { opcode: Opcode, offset: usize },
    #[error("{opcode:?} record at offset {offset:#x} declares an invalid length of {length}")]
    BadRecordLength {
        opcode: Opcode,
        offset: usize,
        length: usize,
    },
}

/// Decodes a whole picture.
///
/// Decoding stops at the end of the buffer, or at the end-of-picture opcode, which is kept as
/// the last operation.
pub fn decode(data: &[u8]) -> Result<Picture, DecodeError> {
    if data.len() >= VERSION_OFFSET + 4 {
        let found = BE::read_u32(&data[VERSION_OFFSET..VERSION_OFFSET + 4]);
        if found != VERSION_MAGIC {
            return Err(DecodeError::UnsupportedFormatVersion { found });
        }
    }
    if data.len() < HEADER_SIZE {
        return Err(DecodeError::TruncatedHeader { len: data.len() });
    }

    let mut r = PrimitiveReader::<BE>::new(data);
    let frame = {
        // picture size, then frame
        r.skip_bytes(2);
        r.read_rect()
            .ok_or(DecodeError::TruncatedHeader { len: data.len() })?
    };
    r.skip_bytes(HEADER_SIZE - r.offset());

    let mut operations = Vec::new();
    loop {
        r.align_to_word();
        if r.remaining_bytes() < 2 {
            // Nothing left but padding
            break;
        }

        let offset = r.offset();
        let raw_opcode = r.read_u16().unwrap_or_default();
        let opcode = Opcode::from_u16(raw_opcode).ok_or(DecodeError::UnknownOpcode {
            opcode: raw_opcode,
            offset,
        })?;

        let operation = decode_record(&mut r, opcode, offset)?;
        trace!("{offset:#06x}: {operation:?}");

        let finished = operation == Operation::EndOfPicture;
        operations.push(operation);
        if finished {
            break;
        }
    }

    Ok(Picture { frame, operations })
}

/// Drops the 512-byte preamble of standalone picture files, if there is one. Resource data
/// never has it, files saved by most editors do.
pub fn strip_file_preamble(data: &[u8]) -> &[u8] {
    let has_magic = |data: &[u8]| {
        data.len() >= HEADER_SIZE
            && BE::read_u32(&data[VERSION_OFFSET..VERSION_OFFSET + 4]) == VERSION_MAGIC
    };

    if !has_magic(data) && data.len() > FILE_PREAMBLE_SIZE && has_magic(&data[FILE_PREAMBLE_SIZE..])
    {
        &data[FILE_PREAMBLE_SIZE..]
    } else {
        data
    }
}

/// Reads one record, whose opcode has already been read.
fn decode_record(
    r: &mut PrimitiveReader<'_, BE>,
    opcode: Opcode,
    offset: usize,
) -> Result<Operation, DecodeError> {
    let truncated = DecodeError::Truncated { opcode, offset };
    let Layout { fixed, variable } = opcode.layout();

    let fixed_part = r.read_slice(fixed).ok_or(truncated.clone())?;
    let variable_length = match variable {
        VariableLength::None => 0,
        VariableLength::TotalSize => {
            let total = BE::read_u16(&fixed_part[0..2]) as usize;
            total
                .checked_sub(fixed)
                .ok_or(DecodeError::BadRecordLength {
                    opcode,
                    offset,
                    length: total,
                })?
        }
        VariableLength::CountByte(at) => fixed_part[at] as usize,
        VariableLength::LengthWord(at) => BE::read_u16(&fixed_part[at..at + 2]) as usize,
    };
    let variable_part = r.read_slice(variable_length).ok_or(truncated.clone())?;

    parse_payload(opcode, fixed_part, variable_part).ok_or(truncated)
}

/// Turns the raw parts of a record into an [`Operation`]. Both slices are already of the exact
/// length the layout demands.
fn parse_payload(opcode: Opcode, fixed: &[u8], variable: &[u8]) -> Option<Operation> {
    let mut f = PrimitiveReader::<BE>::new(fixed);
    let text = || mac_roman::decode(variable);

    use Opcode as O;
    use Operation::*;
    Some(match opcode {
        O::Nop => Nop,
        O::Clip => {
            f.skip_bytes(2)?;
            ClipRegion {
                bounds: f.read_rect()?,
                region: variable.to_vec(),
            }
        }
        O::BkPat => BackgroundPattern(f.read_array()?),
        O::TxFont => TextFont(f.read_u16()?),
        O::TxFace => TextFace(f.read_u8()?),
        O::TxMode => TextMode(f.read_u16()?),
        O::SpExtra => SpaceExtra(f.read_i32()?),
        O::PnSize => PenSize(f.read_point()?),
        O::PnMode => PenMode(f.read_u16()?),
        O::PnPat => PenPattern(f.read_array()?),
        O::FillPat => FillPattern(f.read_array()?),
        O::OvSize => OvalSize(f.read_point()?),
        O::Origin => Origin {
            dh: f.read_i16()?,
            dv: f.read_i16()?,
        },
        O::TxSize => TextSize(f.read_u16()?),
        O::FgColor => ForegroundColor(f.read_u32()?),
        O::BkColor => BackgroundColor(f.read_u32()?),
        O::TxRatio => TextRatio {
            numerator: f.read_point()?,
            denominator: f.read_point()?,
        },
        O::Version => Version(f.read_u16()?),
        O::RgbFgCol => RgbForeground(read_rgb(&mut f)?),
        O::RgbBkCol => RgbBackground(read_rgb(&mut f)?),
        O::DefHilite => DefaultHilite,
        O::Line => Line {
            from: f.read_point()?,
            to: f.read_point()?,
        },
        O::LineFrom => LineFrom(f.read_point()?),
        O::ShortLine => ShortLine {
            from: f.read_point()?,
            dh: f.read_i8()?,
            dv: f.read_i8()?,
        },
        O::ShortLineFrom => ShortLineFrom {
            dh: f.read_i8()?,
            dv: f.read_i8()?,
        },
        O::LongText => LongText {
            location: f.read_point()?,
            text: text(),
        },
        O::DhText => DhText {
            dh: f.read_u8()?,
            text: text(),
        },
        O::DvText => DvText {
            dv: f.read_u8()?,
            text: text(),
        },
        O::DhDvText => DhDvText {
            dh: f.read_u8()?,
            dv: f.read_u8()?,
            text: text(),
        },
        O::FontName => {
            // Old font number, then the name as a Pascal string
            let mut v = PrimitiveReader::<BE>::new(variable);
            let font_id = v.read_u16()?;
            let length = v.read_u8()? as usize;
            let name = mac_roman::decode(v.read_slice(length.min(v.remaining_bytes()))?);
            FontName { font_id, name }
        }
        O::FrameRect => FrameRect(f.read_rect()?),
        O::PaintRect => PaintRect(f.read_rect()?),
        O::FrameSameRect => FrameSameRect,
        O::PaintSameRect => PaintSameRect,
        O::FrameRRect => FrameRoundRect(f.read_rect()?),
        O::PaintRRect => PaintRoundRect(f.read_rect()?),
        O::FrameSameRRect => FrameSameRoundRect,
        O::PaintSameRRect => PaintSameRoundRect,
        O::FrameArc => FrameArc(read_arc(&mut f)?),
        O::PaintArc => PaintArc(read_arc(&mut f)?),
        O::FrameSameArc => FrameSameArc {
            start: f.read_i16()?,
            sweep: f.read_i16()?,
        },
        O::PaintSameArc => PaintSameArc {
            start: f.read_i16()?,
            sweep: f.read_i16()?,
        },
        O::ShortComment => ShortComment(f.read_u16()?),
        O::LongComment => LongComment {
            kind: f.read_u16()?,
            data: variable.to_vec(),
        },
        O::OpEndPic => EndOfPicture,
    })
}

fn read_rgb<E: ByteOrder>(r: &mut PrimitiveReader<'_, E>) -> Option<Rgb16> {
    Some(Rgb16::new(r.read_u16()?, r.read_u16()?, r.read_u16()?))
}

fn read_arc<E: ByteOrder>(r: &mut PrimitiveReader<'_, E>) -> Option<ArcParams> {
    Some(ArcParams {
        rect: r.read_rect()?,
        start: r.read_i16()?,
        sweep: r.read_i16()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pict::{PictWriter, Point, Rect};
    use avara_utils::discriminant_matches;

    fn frame() -> Rect {
        Rect::new(0, 0, 480, 640)
    }

    #[test]
    fn decodes_shapes_in_order() {
        let mut w = PictWriter::new(frame());
        w.push(&Operation::PenSize(Point::new(2, 2)));
        w.push(&Operation::RgbForeground(Rgb16::new(65535, 0, 0)));
        w.push(&Operation::FrameRect(Rect::new(10, 20, 30, 40)));
        w.push(&Operation::FrameSameRect);
        w.push(&Operation::FrameArc(ArcParams {
            rect: Rect::new(0, 0, 18, 18),
            start: 90,
            sweep: 180,
        }));
        let picture = decode(&w.finish()).unwrap();

        assert_eq!(picture.frame, frame());
        assert_eq!(
            picture.operations,
            vec![
                Operation::PenSize(Point::new(2, 2)),
                Operation::RgbForeground(Rgb16::new(65535, 0, 0)),
                Operation::FrameRect(Rect::new(10, 20, 30, 40)),
                Operation::FrameSameRect,
                Operation::FrameArc(ArcParams {
                    rect: Rect::new(0, 0, 18, 18),
                    start: 90,
                    sweep: 180,
                }),
                Operation::EndOfPicture,
            ]
        );
    }

    #[test]
    fn odd_length_text_is_padded() {
        let mut w = PictWriter::new(frame());
        w.push(&Operation::LongText {
            location: Point::new(5, 5),
            text: "wa 2".to_string(),
        });
        w.push(&Operation::DhText {
            dh: 4,
            text: "end".to_string(),
        });
        w.push(&Operation::PaintSameRect);
        let picture = decode(&w.finish()).unwrap();

        assert_eq!(picture.operations[0].text(), Some("wa 2"));
        assert_eq!(picture.operations[1].text(), Some("end"));
        assert_eq!(picture.operations[2], Operation::PaintSameRect);
    }

    #[test]
    fn clip_region_carries_its_variable_part() {
        let mut w = PictWriter::new(frame());
        w.push(&Operation::ClipRegion {
            bounds: frame(),
            region: vec![1, 2, 3, 4],
        });
        let picture = decode(&w.finish()).unwrap();
        assert_eq!(
            picture.operations[0],
            Operation::ClipRegion {
                bounds: frame(),
                region: vec![1, 2, 3, 4]
            }
        );
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut data = PictWriter::new(frame()).finish();
        // Version 1 pictures use a one byte version opcode
        data[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&[0x11, 0x01, 0xA0, 0x00]);
        assert_eq!(
            decode(&data).unwrap_err(),
            DecodeError::UnsupportedFormatVersion { found: 0x1101A000 }
        );
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let mut data = PictWriter::new(frame()).into_bytes();
        data.extend_from_slice(&[0x00, 0x90]); // BitsRect, unsupported
        data.extend_from_slice(&[0; 32]);
        assert_eq!(
            decode(&data).unwrap_err(),
            DecodeError::UnknownOpcode {
                opcode: 0x0090,
                offset: HEADER_SIZE
            }
        );
    }

    #[test]
    fn truncated_record_is_fatal() {
        let mut data = PictWriter::new(frame()).into_bytes();
        data.extend_from_slice(&[0x00, 0x30, 0x00, 0x10]); // FrameRect with 2 of 8 bytes
        let err = decode(&data).unwrap_err();
        assert!(discriminant_matches!(
            err,
            DecodeError::Truncated {
                opcode: Opcode::FrameRect,
                ..
            }
        ));
    }

    #[test]
    fn short_header_is_rejected() {
        assert_eq!(
            decode(&[0; 8]).unwrap_err(),
            DecodeError::TruncatedHeader { len: 8 }
        );
    }

    #[test]
    fn stream_may_end_without_end_opcode() {
        let mut w = PictWriter::new(frame());
        w.push(&Operation::OvalSize(Point::new(8, 8)));
        let picture = decode(&w.into_bytes()).unwrap();
        assert_eq!(picture.operations, vec![Operation::OvalSize(Point::new(8, 8))]);
    }

    #[test]
    fn file_preamble_is_detected() {
        let picture = PictWriter::new(frame()).finish();
        let mut file = vec![0; FILE_PREAMBLE_SIZE];
        file.extend_from_slice(&picture);

        assert_eq!(strip_file_preamble(&file), &picture[..]);
        assert_eq!(strip_file_preamble(&picture), &picture[..]);
    }
}
