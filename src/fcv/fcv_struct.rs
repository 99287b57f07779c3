use serde::Serialize;

use crate::binary::Endian;
use crate::fcv::fcv_endian::EndianGuess;
use crate::fcv::fcv_enum::{CameraRole, DataRole, Encoding, NodeTypeFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FcvHeader {
    /// Animation length in frames
    pub max_time: u16,
    pub node_count: u8,
}

/// Type, data type and id of one joint, plus what the tables make of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcvNode {
    pub node_type: u8,
    pub data_type: u8,
    pub node_id: u8,
    pub node_type_flags: Vec<NodeTypeFlag>,
    pub data_role: DataRole,
    pub encoding: Encoding,
    /// Only set on camera nodes
    pub camera_role: Option<CameraRole>,
}

impl FcvNode {
    pub fn new(node_type: u8, data_type: u8) -> Self {
        Self {
            node_type,
            data_type,
            node_id: 0,
            node_type_flags: NodeTypeFlag::flags(node_type),
            data_role: DataRole::from_data_type(data_type),
            encoding: Encoding::from_data_type(data_type),
            camera_role: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// One decoded keyframe with its Hermite tangents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keyframe {
    pub frame: u16,
    pub value: f64,
    #[serde(rename = "in")]
    pub tangent_in: f64,
    #[serde(rename = "out")]
    pub tangent_out: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisStream {
    pub frame_ids: Vec<u16>,
    /// May be shorter than `frame_ids` when the sample region was truncated
    pub samples: Vec<Keyframe>,
}

impl AxisStream {
    pub fn frame_count(&self) -> usize {
        self.frame_ids.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyframeBlock {
    pub pointer: u32,
    pub encoding: Encoding,
    /// Largest frame count among the three axes
    pub key_count: usize,
    pub x: AxisStream,
    pub y: AxisStream,
    pub z: AxisStream,
}

impl KeyframeBlock {
    pub fn axis(&self, axis: Axis) -> &AxisStream {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

/// Everything one parse produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FcvFile {
    pub endian: Endian,
    /// `None` when the byte order was forced by the caller
    pub endian_guess: Option<EndianGuess>,
    pub header: FcvHeader,
    pub nodes: Vec<FcvNode>,
    pub padding: u64,
    /// Advisory only, never checked against the real size
    pub file_size_field: u32,
    pub actual_file_size: u64,
    pub pointer_table: Vec<u32>,
    pub keyframe_blocks: Vec<KeyframeBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FcvSummary {
    pub max_time: u16,
    pub node_count: u8,
    pub declared_file_size: u32,
    pub actual_file_size: u64,
    pub padding_bytes: u64,
}

/// Bytes one node's keyframe block occupies, recomputed from its frame counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeFootprint {
    pub node_index: usize,
    pub node_id: u8,
    pub total_bytes: u64,
}

/// A node whose recomputed footprint differs from the room its pointer leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FootprintMismatch {
    pub node_index: usize,
    pub footprint: u64,
    /// Bytes up to the next higher pointer, or to end of file for the last block.
    pub pointer_gap: u64,
}

impl FcvFile {
    pub fn summary(&self) -> FcvSummary {
        FcvSummary {
            max_time: self.header.max_time,
            node_count: self.header.node_count,
            declared_file_size: self.file_size_field,
            actual_file_size: self.actual_file_size,
            padding_bytes: self.padding,
        }
    }

    /// Reporting aid only; it ignores the pointer table and may disagree with it.
    pub fn per_node_byte_footprint(&self) -> Vec<NodeFootprint> {
        self.nodes
            .iter()
            .zip(&self.keyframe_blocks)
            .enumerate()
            .map(|(node_index, (node, block))| {
                let per_sample = node.encoding.widths().map_or(0, |w| w.total_bytes()) as u64;
                let total_bytes = Axis::ALL
                    .iter()
                    .map(|&axis| {
                        let frames = block.axis(axis).frame_count() as u64;
                        2 + frames * 2 + frames * per_sample
                    })
                    .sum();
                NodeFootprint {
                    node_index,
                    node_id: node.node_id,
                    total_bytes,
                }
            })
            .collect()
    }

    /// Nodes whose footprint disagrees with the pointer table layout.
    pub fn footprint_mismatches(&self) -> Vec<FootprintMismatch> {
        let mut sorted: Vec<u64> = self.pointer_table.iter().map(|&p| p as u64).collect();
        sorted.sort_unstable();
        sorted.dedup();

        self.per_node_byte_footprint()
            .into_iter()
            .filter_map(|footprint| {
                let start = *self.pointer_table.get(footprint.node_index)? as u64;
                let end = sorted
                    .iter()
                    .copied()
                    .find(|&p| p > start)
                    .unwrap_or(self.actual_file_size);
                let pointer_gap = end.saturating_sub(start);
                (pointer_gap != footprint.total_bytes).then_some(FootprintMismatch {
                    node_index: footprint.node_index,
                    footprint: footprint.total_bytes,
                    pointer_gap,
                })
            })
            .collect()
    }

    pub fn camera_nodes(&self) -> impl Iterator<Item = (usize, &FcvNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.camera_role.is_some())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
