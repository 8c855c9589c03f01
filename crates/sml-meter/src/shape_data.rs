//! Binary shape-path resources
//!
//! A shape resource is big-endian and laid out as:
//!
//! ```text
//! f32            aspect ratio (width / height)
//! i32 + bytes    battery outline commands
//! i32 + bytes    alert glyph commands
//! i32 + bytes    charging glyph commands
//! i32 + bytes    unknown glyph commands
//! ```
//!
//! Each command is a `u16` opcode (`'M'`, `'L'`, `'C'` or `'Z'`) followed by
//! 2, 2, 6 or 0 `f32` ratio coordinates. Every block is validated when the
//! resource is loaded; afterwards only the raw bytes and the block ranges are
//! kept, and a block is replayed from its first byte each time a path is built.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use sml_core::prelude::*;
use sml_core::{Path, Rect};

/// One of the four command blocks in a shape resource, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeBlock {
    Battery,
    Alert,
    Charging,
    Unknown,
}

impl ShapeBlock {
    pub const ALL: [ShapeBlock; 4] = [
        ShapeBlock::Battery,
        ShapeBlock::Alert,
        ShapeBlock::Charging,
        ShapeBlock::Unknown,
    ];

    const fn index(self) -> usize {
        match self {
            ShapeBlock::Battery => 0,
            ShapeBlock::Alert => 1,
            ShapeBlock::Charging => 2,
            ShapeBlock::Unknown => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeBlock::Battery => "battery",
            ShapeBlock::Alert => "alert",
            ShapeBlock::Charging => "charging",
            ShapeBlock::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ShapeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const OP_MOVE: u16 = b'M' as u16;
const OP_LINE: u16 = b'L' as u16;
const OP_CUBIC: u16 = b'C' as u16;
const OP_CLOSE: u16 = b'Z' as u16;

/// A path command with coordinates as ratios of the shape bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeCommand {
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    CubicTo {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
    },
    Close,
}

impl ShapeCommand {
    pub const fn opcode(&self) -> u16 {
        match self {
            ShapeCommand::MoveTo { .. } => OP_MOVE,
            ShapeCommand::LineTo { .. } => OP_LINE,
            ShapeCommand::CubicTo { .. } => OP_CUBIC,
            ShapeCommand::Close => OP_CLOSE,
        }
    }

    /// Number of `f32` arguments that follow `opcode`, `None` if unknown
    const fn arg_count(opcode: u16) -> Option<usize> {
        match opcode {
            OP_MOVE | OP_LINE => Some(2),
            OP_CUBIC => Some(6),
            OP_CLOSE => Some(0),
            _ => None,
        }
    }

    /// Append this command to `path`, mapping ratios into `bounds`
    pub fn apply(&self, path: &mut Path, bounds: Rect) {
        let left = bounds.left as f32;
        let top = bounds.top as f32;
        let width = bounds.width() as f32;
        let height = bounds.height() as f32;
        let x = |ratio: f32| left + ratio * width;
        let y = |ratio: f32| top + ratio * height;

        match *self {
            ShapeCommand::MoveTo { x: px, y: py } => path.move_to(x(px), y(py)),
            ShapeCommand::LineTo { x: px, y: py } => path.line_to(x(px), y(py)),
            ShapeCommand::CubicTo {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            } => path.cubic_to(x(x1), y(y1), x(x2), y(y2), x(x3), y(y3)),
            ShapeCommand::Close => path.close(),
        }
    }
}

/// Anything that can supply the four battery glyphs
pub trait ShapeSource {
    /// Intrinsic width / height of the battery outline
    fn aspect_ratio(&self) -> f32;

    fn commands(&self, block: ShapeBlock) -> ShapeCommands<'_>;

    /// Rebuild `path` from scratch for `block` inside `bounds`
    fn build_path(&self, block: ShapeBlock, bounds: Rect, path: &mut Path) {
        path.reset();
        for command in self.commands(block) {
            command.apply(path, bounds);
        }
    }
}

/// Iterator over the commands of one block
#[derive(Debug, Clone)]
pub enum ShapeCommands<'a> {
    Binary(BinaryCommands<'a>),
    Literal(std::slice::Iter<'a, ShapeCommand>),
}

impl Iterator for ShapeCommands<'_> {
    type Item = ShapeCommand;

    fn next(&mut self) -> Option<ShapeCommand> {
        match self {
            ShapeCommands::Binary(commands) => commands.next(),
            ShapeCommands::Literal(commands) => commands.next().copied(),
        }
    }
}

/// Big-endian reader bounded to a byte slice
#[derive(Debug, Clone)]
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let chunk: [u8; N] = self.bytes.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(chunk)
    }

    fn u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_be_bytes)
    }

    fn i32(&mut self) -> Option<i32> {
        self.take().map(i32::from_be_bytes)
    }

    fn f32(&mut self) -> Option<f32> {
        self.take().map(f32::from_be_bytes)
    }
}

/// Replays one validated binary block
#[derive(Debug, Clone)]
pub struct BinaryCommands<'a> {
    reader: Reader<'a>,
}

impl Iterator for BinaryCommands<'_> {
    type Item = ShapeCommand;

    fn next(&mut self) -> Option<ShapeCommand> {
        let r = &mut self.reader;
        let command = match r.u16()? {
            OP_MOVE => ShapeCommand::MoveTo {
                x: r.f32()?,
                y: r.f32()?,
            },
            OP_LINE => ShapeCommand::LineTo {
                x: r.f32()?,
                y: r.f32()?,
            },
            OP_CUBIC => ShapeCommand::CubicTo {
                x1: r.f32()?,
                y1: r.f32()?,
                x2: r.f32()?,
                y2: r.f32()?,
                x3: r.f32()?,
                y3: r.f32()?,
            },
            OP_CLOSE => ShapeCommand::Close,
            _ => return None,
        };
        Some(command)
    }
}

/// A decoded shape resource: raw bytes plus validated block ranges
#[derive(Debug, Clone)]
pub struct ShapeData {
    aspect_ratio: f32,
    bytes: Arc<[u8]>,
    blocks: [Range<usize>; 4],
}

impl ShapeData {
    /// Validate a shape resource.
    ///
    /// Fails if the header or any block is truncated, a block length is
    /// negative or runs past the end of the data, or a block contains an
    /// unknown opcode. Bytes after the fourth block are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let aspect_ratio = reader
            .f32()
            .ok_or_else(|| Error::shape_truncated("header", 0))?;
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(Error::ShapeAspectRatio(aspect_ratio));
        }

        let mut blocks: [Range<usize>; 4] = Default::default();
        for block in ShapeBlock::ALL {
            let length_at = reader.pos;
            let length = reader
                .i32()
                .ok_or_else(|| Error::shape_truncated(block.name(), length_at))?;

            let invalid_length = || Error::ShapeInvalidLength {
                block: block.name().to_string(),
                length: i64::from(length),
            };
            let len = usize::try_from(length).map_err(|_| invalid_length())?;
            if len > reader.remaining() {
                return Err(invalid_length());
            }

            let range = reader.pos..reader.pos + len;
            validate_block(block, &bytes[range.clone()], range.start)?;
            reader.pos = range.end;
            blocks[block.index()] = range;
        }

        trace!(
            "Decoded shape data: aspect ratio {}, {} bytes",
            aspect_ratio,
            bytes.len()
        );

        Ok(Self {
            aspect_ratio,
            bytes: Arc::from(bytes),
            blocks,
        })
    }

    pub fn block_bytes(&self, block: ShapeBlock) -> &[u8] {
        &self.bytes[self.blocks[block.index()].clone()]
    }
}

impl ShapeSource for ShapeData {
    fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    fn commands(&self, block: ShapeBlock) -> ShapeCommands<'_> {
        ShapeCommands::Binary(BinaryCommands {
            reader: Reader::new(self.block_bytes(block)),
        })
    }
}

fn validate_block(block: ShapeBlock, bytes: &[u8], base: usize) -> Result<()> {
    let mut reader = Reader::new(bytes);
    while reader.remaining() > 0 {
        let at = base + reader.pos;
        let opcode = reader
            .u16()
            .ok_or_else(|| Error::shape_truncated(block.name(), at))?;
        let args = ShapeCommand::arg_count(opcode).ok_or_else(|| Error::ShapeInvalidOpcode {
            block: block.name().to_string(),
            opcode,
            offset: at,
        })?;
        if args * 4 > reader.remaining() {
            return Err(Error::shape_truncated(block.name(), base + bytes.len()));
        }
        reader.pos += args * 4;
    }
    Ok(())
}

/// Encode a shape resource from command tables
pub fn encode(aspect_ratio: f32, blocks: [&[ShapeCommand]; 4]) -> Vec<u8> {
    let mut out = aspect_ratio.to_be_bytes().to_vec();
    for commands in blocks {
        let mut body = Vec::new();
        for command in commands {
            body.extend_from_slice(&command.opcode().to_be_bytes());
            let (args, count) = match *command {
                ShapeCommand::MoveTo { x, y } | ShapeCommand::LineTo { x, y } => {
                    ([x, y, 0.0, 0.0, 0.0, 0.0], 2)
                }
                ShapeCommand::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x3,
                    y3,
                } => ([x1, y1, x2, y2, x3, y3], 6),
                ShapeCommand::Close => ([0.0; 6], 0),
            };
            for arg in &args[..count] {
                body.extend_from_slice(&arg.to_be_bytes());
            }
        }
        out.extend_from_slice(&(body.len() as i32).to_be_bytes());
        out.extend_from_slice(&body);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sml_core::PathSegment;
    use ShapeCommand::{Close, LineTo, MoveTo};

    const SQUARE: &[ShapeCommand] = &[
        MoveTo { x: 0.0, y: 0.0 },
        LineTo { x: 1.0, y: 0.0 },
        LineTo { x: 1.0, y: 1.0 },
        Close,
    ];

    fn sample() -> Vec<u8> {
        encode(0.5, [SQUARE, &[], SQUARE, &[Close]])
    }

    #[test]
    fn test_decode_and_replay() {
        let data = ShapeData::decode(&sample()).unwrap();
        assert_eq!(data.aspect_ratio(), 0.5);

        let commands: Vec<_> = data.commands(ShapeBlock::Battery).collect();
        assert_eq!(commands, SQUARE);
        assert_eq!(data.commands(ShapeBlock::Alert).count(), 0);
        assert_eq!(data.commands(ShapeBlock::Unknown).collect::<Vec<_>>(), vec![Close]);
    }

    #[test]
    fn test_replay_maps_ratios_into_bounds() {
        let data = ShapeData::decode(&sample()).unwrap();
        let mut path = Path::new();
        data.build_path(ShapeBlock::Battery, Rect::new(10, 20, 30, 60), &mut path);

        assert_eq!(
            path.segments()[2],
            PathSegment::LineTo {
                to: sml_core::PointF::new(30.0, 60.0)
            }
        );

        // replaying again starts from a clean path
        data.build_path(ShapeBlock::Battery, Rect::new(10, 20, 30, 60), &mut path);
        assert_eq!(path.segments().len(), 4);
    }

    #[test]
    fn test_truncated_header() {
        let err = ShapeData::decode(&[0x3f, 0x00]).unwrap_err();
        assert!(matches!(err, Error::ShapeTruncated { .. }));
    }

    #[test]
    fn test_truncated_inside_block() {
        let mut bytes = 0.5f32.to_be_bytes().to_vec();
        // 'M' with only one coordinate, declared length 6
        bytes.extend_from_slice(&6i32.to_be_bytes());
        bytes.extend_from_slice(&(b'M' as u16).to_be_bytes());
        bytes.extend_from_slice(&0.25f32.to_be_bytes());
        bytes.extend_from_slice(&encode(1.0, [&[], &[], &[], &[]])[4..]);

        let err = ShapeData::decode(&bytes).unwrap_err();
        match err {
            Error::ShapeTruncated { block, offset } => {
                assert_eq!(block, "battery");
                assert_eq!(offset, 14);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_length_past_end_of_data() {
        let mut bytes = 0.5f32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&100i32.to_be_bytes());
        bytes.extend_from_slice(&(b'Z' as u16).to_be_bytes());

        let err = ShapeData::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::ShapeInvalidLength { length: 100, .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_negative_length() {
        let mut bytes = 0.5f32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(-4i32).to_be_bytes());
        let err = ShapeData::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::ShapeInvalidLength { length: -4, .. }));
    }

    #[test]
    fn test_unknown_opcode() {
        let mut bytes = 0.5f32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&2i32.to_be_bytes());
        bytes.extend_from_slice(&(b'Q' as u16).to_be_bytes());

        let err = ShapeData::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeInvalidOpcode {
                opcode: 0x51,
                offset: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_block_does_not_read_into_next_block() {
        // battery block holds a single close; the alert block follows directly
        let bytes = encode(1.0, [&[Close], SQUARE, &[], &[]]);
        let data = ShapeData::decode(&bytes).unwrap();
        assert_eq!(data.block_bytes(ShapeBlock::Battery), &[0x00, b'Z']);
        assert_eq!(data.commands(ShapeBlock::Battery).count(), 1);
    }

    #[test]
    fn test_rejects_bad_aspect_ratio() {
        let bytes = encode(0.0, [&[], &[], &[], &[]]);
        assert!(matches!(
            ShapeData::decode(&bytes),
            Err(Error::ShapeAspectRatio(_))
        ));
    }
}
