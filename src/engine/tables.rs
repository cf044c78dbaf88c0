use std::sync::OnceLock;

use arrayvec::ArrayVec;

pub(crate) const LINE_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit lines

/// Highest rank a nibble can hold (2^15 = 32768).
pub(crate) const MAX_RANK: u8 = 15;

/// One row (or transposed column): 4 nibbles, cell 0 in the high nibble.
pub(crate) type Line = u16;

/// Positions (0..4) of the empty cells of a line, in order.
pub(crate) type LineGaps = ArrayVec<u8, 4>;

/// Per-line move results for every 16-bit pattern, built once per process.
pub(crate) struct MoveTables {
    pub(crate) left: Box<[Line]>,
    pub(crate) right: Box<[Line]>,
    pub(crate) left_score: Box<[u32]>,
    pub(crate) right_score: Box<[u32]>,
    pub(crate) gaps: Box<[LineGaps]>,
}

static MOVE_TABLES: OnceLock<MoveTables> = OnceLock::new();

#[inline(always)]
pub(crate) fn move_tables() -> &'static MoveTables {
    MOVE_TABLES.get_or_init(create_tables)
}

fn create_tables() -> MoveTables {
    log::trace!("building move tables for {LINE_TABLE_SIZE} line patterns");
    // Heap-allocated: five 64K tables are too large for the stack
    let mut left = vec![0 as Line; LINE_TABLE_SIZE];
    let mut right = vec![0 as Line; LINE_TABLE_SIZE];
    let mut left_score = vec![0u32; LINE_TABLE_SIZE];
    let mut right_score = vec![0u32; LINE_TABLE_SIZE];
    let mut gaps = Vec::with_capacity(LINE_TABLE_SIZE);

    for pattern in 0..LINE_TABLE_SIZE {
        let line = pattern as Line;
        let ranks = decode_line(line);

        let (moved, score) = slide_left(ranks);
        left[pattern] = encode_line(moved);
        left_score[pattern] = score;

        let (moved, score) = slide_left(decode_line(reverse_line(line)));
        right[pattern] = reverse_line(encode_line(moved));
        right_score[pattern] = score;

        gaps.push(
            ranks
                .iter()
                .enumerate()
                .filter(|&(_, &rank)| rank == 0)
                .map(|(pos, _)| pos as u8)
                .collect(),
        );
    }

    MoveTables {
        left: left.into_boxed_slice(),
        right: right.into_boxed_slice(),
        left_score: left_score.into_boxed_slice(),
        right_score: right_score.into_boxed_slice(),
        gaps: gaps.into_boxed_slice(),
    }
}

#[inline]
pub(crate) fn decode_line(line: Line) -> [u8; 4] {
    [
        (line >> 12) as u8 & 0xf,
        (line >> 8) as u8 & 0xf,
        (line >> 4) as u8 & 0xf,
        line as u8 & 0xf,
    ]
}

#[inline]
pub(crate) fn encode_line(ranks: [u8; 4]) -> Line {
    ranks
        .iter()
        .fold(0, |line, &rank| (line << 4) | Line::from(rank & 0xf))
}

#[inline]
pub(crate) fn reverse_line(line: Line) -> Line {
    let [a, b, c, d] = decode_line(line);
    encode_line([d, c, b, a])
}

/// Compact toward cell 0, then merge equal neighbours in a single pass.
///
/// A tile produced by a merge is not merged again during the same pass, so
/// `[1, 1, 2, 0]` becomes `[2, 2, 0, 0]` and not `[3, 0, 0, 0]`. Two rank-15
/// tiles stay apart since rank 16 does not fit in a nibble.
fn slide_left(ranks: [u8; 4]) -> ([u8; 4], u32) {
    let tiles: ArrayVec<u8, 4> = ranks.into_iter().filter(|&rank| rank != 0).collect();
    let mut out = [0u8; 4];
    let mut score = 0u32;
    let mut write = 0;
    let mut read = 0;
    while read < tiles.len() {
        let rank = tiles[read];
        if read + 1 < tiles.len() && tiles[read + 1] == rank && rank < MAX_RANK {
            out[write] = rank + 1;
            score += 1 << (rank + 1);
            read += 2;
        } else {
            out[write] = rank;
            read += 1;
        }
        write += 1;
    }
    (out, score)
}
