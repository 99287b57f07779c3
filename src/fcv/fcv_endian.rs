//! Byte-order guessing for FCV files, which carry no byte-order marker.

use std::io::{Read, Seek, SeekFrom};

use log::debug;
use serde::Serialize;

use crate::binary::Endian;
use crate::error::Result;

/// Node-type bytes inspected at most.
pub const MAX_INSPECTED_NODES: usize = 30;

/// Bytes the detector needs in the worst case.
pub const PREFIX_LEN: usize = 3 + 2 * MAX_INSPECTED_NODES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EndianGuess {
    pub endian: Endian,
    pub little_score: i32,
    pub big_score: i32,
}

/// Plausibility of reading `prefix` under `endian`; -1 when the prefix is too short.
pub fn score(prefix: &[u8], endian: Endian) -> i32 {
    if prefix.len() < 3 {
        return -1;
    }
    let max_time = endian.read_u16(&prefix[0..2]);
    let node_count = prefix[2];
    let inspected = (node_count as usize).min(MAX_INSPECTED_NODES);
    let pairs = match prefix.get(3..3 + 2 * inspected) {
        Some(pairs) => pairs,
        None => return -1,
    };

    let mut score = 0;
    if (1..=32767).contains(&max_time) {
        score += 1;
    }
    if (1..=100).contains(&node_count) {
        score += 1;
    }
    // Node type is the first byte of each pair in little-endian files, the second in big-endian ones.
    let type_index = match endian {
        Endian::Little => 0,
        Endian::Big => 1,
    };
    if pairs.chunks_exact(2).all(|pair| pair[type_index] != 0) {
        score += 1;
    }
    score
}

/// Scores both byte orders; ties go to little-endian.
pub fn detect(prefix: &[u8]) -> EndianGuess {
    let little_score = score(prefix, Endian::Little);
    let big_score = score(prefix, Endian::Big);
    let endian = if big_score > little_score {
        Endian::Big
    } else {
        Endian::Little
    };
    debug!(
        "Endian scores: little={} big={} -> {:?}",
        little_score, big_score, endian
    );
    EndianGuess {
        endian,
        little_score,
        big_score,
    }
}

/// Reads the detection prefix from the start of `reader`, then rewinds it.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> Result<EndianGuess> {
    reader.seek(SeekFrom::Start(0))?;
    let mut prefix = Vec::with_capacity(PREFIX_LEN);
    (&mut *reader)
        .take(PREFIX_LEN as u64)
        .read_to_end(&mut prefix)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(detect(&prefix))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::binary::BinaryWriter;

    fn header(endian: Endian, max_time: u16, node_types: &[u8], data_types: &[u8]) -> Vec<u8> {
        let mut bw = BinaryWriter::new(endian);
        bw.write_u16(max_time).write_u8(node_types.len() as u8);
        for (&node_type, &data_type) in node_types.iter().zip(data_types) {
            match endian {
                Endian::Little => bw.write_u8(node_type).write_u8(data_type),
                Endian::Big => bw.write_u8(data_type).write_u8(node_type),
            };
        }
        bw.into_inner()
    }

    #[test]
    fn test_correct_order_scores_three() {
        let types = [0x01, 0x02, 0x02, 0x04, 0x08];
        let data = [0x00; 5];
        let bytes = header(Endian::Little, 120, &types, &data);
        let guess = detect(&bytes);
        assert_eq!(guess.endian, Endian::Little);
        assert_eq!(guess.little_score, 3);
        // 0x7800 is still a plausible length, but the zero data bytes look like node types
        assert_eq!(guess.big_score, 2);
    }

    #[test]
    fn test_implausible_max_time_loses() {
        let types = [0x01, 0x02, 0x02, 0x04, 0x08];
        let data = [0x00; 5];
        let bytes = header(Endian::Little, 200, &types, &data);
        let guess = detect(&bytes);
        assert_eq!(guess.little_score, 3);
        assert!(guess.big_score <= 1);
    }

    #[test]
    fn test_big_endian_file_detected() {
        let types = [0x01, 0x02, 0x02, 0x04, 0x08];
        let data = [0x00; 5];
        let bytes = header(Endian::Big, 200, &types, &data);
        let guess = detect(&bytes);
        assert_eq!(guess.endian, Endian::Big);
        assert_eq!(guess.big_score, 3);
        assert!(guess.little_score <= 1);
    }

    #[test]
    fn test_short_prefix_scores_negative() {
        assert_eq!(score(&[0x10], Endian::Little), -1);
        // claims 4 nodes but carries only one pair
        assert_eq!(score(&[0x10, 0x00, 0x04, 0x01, 0x00], Endian::Big), -1);
        let guess = detect(&[]);
        assert_eq!(guess.endian, Endian::Little);
    }

    #[test]
    fn test_detect_from_reader_rewinds() {
        let bytes = header(Endian::Big, 200, &[0x02], &[0x00]);
        let mut cursor = Cursor::new(bytes);
        let guess = detect_from_reader(&mut cursor).unwrap();
        assert_eq!(guess.endian, Endian::Big);
        assert_eq!(cursor.position(), 0);
    }
}
