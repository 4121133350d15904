use super::{Point, Rect};
use byteorder::ByteOrder;
use std::{marker::PhantomData, mem::size_of};

/// Data parser allowing reading multibyte primitives in a stream-like fashion. Every read
/// returns `None` instead of reading past the end, without moving the cursor.
#[derive(Debug, Clone)]
pub struct PrimitiveReader<'s, Endian: ByteOrder> {
    data: &'s [u8],
    offset: usize,
    _phantom: PhantomData<Endian>,
}

macro_rules! reader_template {
    ($fn_name:ident, $ty_name:ty) => {
        pub fn $fn_name(&mut self) -> Option<$ty_name> {
            if self.remaining_bytes() >= size_of::<$ty_name>() {
                let result =
                    Endian::$fn_name(&self.data[self.offset..self.offset + size_of::<$ty_name>()]);
                self.offset += size_of::<$ty_name>();
                Some(result)
            } else {
                None
            }
        }
    };
}

impl<'s, Endian: ByteOrder> PrimitiveReader<'s, Endian> {
    pub fn new(data: &'s [u8]) -> Self {
        Self {
            data,
            offset: 0,
            _phantom: Default::default(),
        }
    }

    pub fn remaining_bytes(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_bytes() == 0
    }

    /// Skips `count` bytes, if there are enough of them.
    pub fn skip_bytes(&mut self, count: usize) -> Option<()> {
        self.read_slice(count).map(|_| ())
    }

    /// Borrows the next `count` bytes and moves past them.
    pub fn read_slice(&mut self, count: usize) -> Option<&'s [u8]> {
        if self.remaining_bytes() >= count {
            let result = &self.data[self.offset..self.offset + count];
            self.offset += count;
            Some(result)
        } else {
            None
        }
    }

    pub fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.read_slice(N)?.try_into().ok()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_slice(1).map(|bytes| bytes[0])
    }

    pub fn read_i8(&mut self) -> Option<i8> {
        self.read_u8().map(|byte| byte as i8)
    }

    reader_template!(read_u16, u16);
    reader_template!(read_i16, i16);
    reader_template!(read_u32, u32);
    reader_template!(read_i32, i32);

    /// QuickDraw point, stored vertical coordinate first.
    pub fn read_point(&mut self) -> Option<Point> {
        let v = self.read_i16()?;
        let h = self.read_i16()?;
        Some(Point { v, h })
    }

    /// QuickDraw rectangle, stored as top, left, bottom, right.
    pub fn read_rect(&mut self) -> Option<Rect> {
        let top = self.read_i16()?;
        let left = self.read_i16()?;
        let bottom = self.read_i16()?;
        let right = self.read_i16()?;
        Some(Rect {
            top,
            left,
            bottom,
            right,
        })
    }

    /// Moves the cursor to the next even offset, if it isn't on one already.
    pub fn align_to_word(&mut self) {
        if self.offset % 2 == 1 {
            self.offset = (self.offset + 1).min(self.data.len());
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::PrimitiveReader;
    use byteorder::BE;

    #[test]
    fn reads_do_not_run_past_the_end() {
        let mut r = PrimitiveReader::<BE>::new(&[0x12, 0x34, 0x56]);
        assert_eq!(r.read_u16(), Some(0x1234));
        assert_eq!(r.read_u16(), None);
        assert_eq!(r.offset(), 2);
        assert_eq!(r.read_u8(), Some(0x56));
        assert!(r.is_empty());
    }

    #[test]
    fn alignment_skips_one_byte_at_most() {
        let mut r = PrimitiveReader::<BE>::new(&[1, 2, 3, 4]);
        r.align_to_word();
        assert_eq!(r.offset(), 0);
        r.read_u8();
        r.align_to_word();
        assert_eq!(r.offset(), 2);
    }
}
