//! Static lookup tables that give meaning to the raw FCV header bytes.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// Lower nibble of a data-type byte that marks a camera node.
pub const CAMERA_MARKER: u8 = 0x06;

/// One label of the node-type bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeTypeFlag {
    /// Root handler for position
    RootPosition,
    /// Relative rotation
    FkRotation,
    /// Relative translation
    IkHandle,
    /// Relative scale
    Scale,
    IkParent,
    /// IK parent for feet
    IkToeParent,
    /// Root handler for rotation
    RootRotation,
    /// Mirrored bone
    BoneFlip,
    /// IK parent for arms, a compound of the toe-parent and flip bits
    IkArmParent,
}

impl NodeTypeFlag {
    /// Table order is the order labels are reported in.
    pub const TABLE: [(u8, NodeTypeFlag); 9] = [
        (0x01, NodeTypeFlag::RootPosition),
        (0x02, NodeTypeFlag::FkRotation),
        (0x04, NodeTypeFlag::IkHandle),
        (0x08, NodeTypeFlag::Scale),
        (0x10, NodeTypeFlag::IkParent),
        (0x20, NodeTypeFlag::IkToeParent),
        (0x40, NodeTypeFlag::RootRotation),
        (0x80, NodeTypeFlag::BoneFlip),
        (0xA0, NodeTypeFlag::IkArmParent),
    ];

    /// Every label whose mask shares a bit with `byte`.
    pub fn flags(byte: u8) -> Vec<NodeTypeFlag> {
        Self::TABLE
            .iter()
            .filter(|(mask, _)| byte & mask != 0)
            .map(|&(_, flag)| flag)
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeTypeFlag::RootPosition => "Root Position",
            NodeTypeFlag::FkRotation => "FK Rotation",
            NodeTypeFlag::IkHandle => "IK Handle",
            NodeTypeFlag::Scale => "Scale",
            NodeTypeFlag::IkParent => "IK Parent(?)",
            NodeTypeFlag::IkToeParent => "IK Toe Parent",
            NodeTypeFlag::RootRotation => "Root Rotation",
            NodeTypeFlag::BoneFlip => "Bone Flip",
            NodeTypeFlag::IkArmParent => "IK Arm Parent",
        }
    }
}

/// Semantic role carried by the lower nibble of a data-type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataRole {
    /// y = 1.0
    Up,
    /// y = -1.0
    Down,
    /// x = 1.0
    Forward,
    /// x = -1.0
    Backward,
    /// z = 1.0
    Left,
    /// z = -1.0
    Right,
    Camera,
    /// Camera oriented joint seen in PS2 builds
    CameraV2,
    /// 0x8..=0xF, reserved
    Invalid(u8),
}

impl DataRole {
    pub fn from_data_type(data_type: u8) -> Self {
        match data_type & 0x0F {
            0x00 => DataRole::Up,
            0x01 => DataRole::Down,
            0x02 => DataRole::Forward,
            0x03 => DataRole::Backward,
            0x04 => DataRole::Left,
            0x05 => DataRole::Right,
            0x06 => DataRole::Camera,
            0x07 => DataRole::CameraV2,
            nibble => DataRole::Invalid(nibble),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataRole::Up => "UP",
            DataRole::Down => "DOWN",
            DataRole::Forward => "FORWARD",
            DataRole::Backward => "BACKWARD",
            DataRole::Left => "LEFT",
            DataRole::Right => "RIGHT",
            DataRole::Camera => "CAMERA",
            DataRole::CameraV2 => "CAMERA v2",
            DataRole::Invalid(_) => "INVALID",
        }
    }
}

/// Whether a data-type byte marks its node as camera related.
pub fn is_camera_node(data_type: u8) -> bool {
    data_type & 0x0F == CAMERA_MARKER
}

/// Role of a camera node, keyed by its node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CameraRole {
    Position,
    Target,
    Roll,
    FieldOfView,
    Speed,
    Unknown,
}

impl CameraRole {
    /// `None` for ids outside 0x00..=0x05.
    pub fn from_node_id(node_id: u8) -> Option<Self> {
        match node_id {
            0x00 => Some(CameraRole::Position),
            0x01 => Some(CameraRole::Target),
            0x02 => Some(CameraRole::Roll),
            0x03 => Some(CameraRole::FieldOfView),
            0x04 => Some(CameraRole::Speed),
            0x05 => Some(CameraRole::Unknown),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CameraRole::Position => "Camera Position",
            CameraRole::Target => "Camera Target",
            CameraRole::Roll => "Camera Roll",
            CameraRole::FieldOfView => "Camera Field of View",
            CameraRole::Speed => "Camera Speed (?)",
            CameraRole::Unknown => "Unknown Camera",
        }
    }
}

/// Byte widths of the value and tangent fields of one keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodingWidths {
    pub value_bytes: usize,
    pub tangent_in_bytes: usize,
    /// Zero means the out tangent shares the in tangent's bytes.
    pub tangent_out_bytes: usize,
}

impl EncodingWidths {
    pub fn total_bytes(&self) -> usize {
        self.value_bytes + self.tangent_in_bytes + self.tangent_out_bytes
    }

    pub fn shares_tangent(&self) -> bool {
        self.tangent_out_bytes == 0
    }
}

/// Keyframe encoding selected by the upper nibble of a data-type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Fmt444,
    Fmt422,
    Fmt411,
    Fmt244,
    Fmt222,
    Fmt211,
    Fmt144,
    Fmt122,
    Fmt111,
    /// One stored tangent used for both in and out
    SharedTangent,
    /// Upper nibble (already masked with 0xF0) with no table entry
    Unknown(u8),
}

impl Encoding {
    pub fn from_data_type(data_type: u8) -> Self {
        match data_type & 0xF0 {
            0x00 => Encoding::Fmt444,
            0x10 => Encoding::Fmt422,
            0x20 => Encoding::Fmt411,
            0x40 => Encoding::Fmt244,
            0x50 => Encoding::Fmt222,
            0x60 => Encoding::Fmt211,
            0x80 => Encoding::Fmt144,
            0x90 => Encoding::Fmt122,
            0xA0 => Encoding::Fmt111,
            0xF0 => Encoding::SharedTangent,
            nibble => Encoding::Unknown(nibble),
        }
    }

    pub fn widths(&self) -> Option<EncodingWidths> {
        let (value_bytes, tangent_in_bytes, tangent_out_bytes) = match self {
            Encoding::Fmt444 => (4, 4, 4),
            Encoding::Fmt422 => (4, 2, 2),
            Encoding::Fmt411 => (4, 1, 1),
            Encoding::Fmt244 => (2, 4, 4),
            Encoding::Fmt222 => (2, 2, 2),
            Encoding::Fmt211 => (2, 1, 1),
            Encoding::Fmt144 => (1, 4, 4),
            Encoding::Fmt122 => (1, 2, 2),
            Encoding::Fmt111 => (1, 1, 1),
            Encoding::SharedTangent => (4, 4, 0),
            Encoding::Unknown(_) => return None,
        };
        Some(EncodingWidths {
            value_bytes,
            tangent_in_bytes,
            tangent_out_bytes,
        })
    }

    pub fn format(&self) -> &'static str {
        match self {
            Encoding::Fmt444 => "4:4:4",
            Encoding::Fmt422 => "4:2:2",
            Encoding::Fmt411 => "4:1:1",
            Encoding::Fmt244 => "2:4:4",
            Encoding::Fmt222 => "2:2:2",
            Encoding::Fmt211 => "2:1:1",
            Encoding::Fmt144 => "1:4:4",
            Encoding::Fmt122 => "1:2:2",
            Encoding::Fmt111 => "1:1:1",
            Encoding::SharedTangent => "4:4:0",
            Encoding::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Encoding::Fmt444 => "Full float for value, in tangent, and out tangent (no compression)",
            Encoding::Fmt422 => "Float value, 16-bit int tangents",
            Encoding::Fmt411 => "Float value, 8-bit int tangents",
            Encoding::Fmt244 => "16-bit value, float tangents",
            Encoding::Fmt222 => "All components 16-bit",
            Encoding::Fmt211 => "16-bit value, 8-bit tangents",
            Encoding::Fmt144 => "8-bit value, float tangents",
            Encoding::Fmt122 => "8-bit value, 16-bit tangents",
            Encoding::Fmt111 => "1 byte per component",
            Encoding::SharedTangent => "Float value, one float tangent shared by in and out",
            Encoding::Unknown(_) => "Unrecognised encoding",
        }
    }
}

/// Exported as the format string, field widths and description; widths are null when unknown.
impl Serialize for Encoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let widths = self.widths();
        let mut state = serializer.serialize_struct("Encoding", 6)?;
        state.serialize_field("format", self.format())?;
        state.serialize_field("value_bytes", &widths.map(|w| w.value_bytes))?;
        state.serialize_field("tangent_in_bytes", &widths.map(|w| w.tangent_in_bytes))?;
        state.serialize_field("tangent_out_bytes", &widths.map(|w| w.tangent_out_bytes))?;
        state.serialize_field("total_bytes", &widths.map(|w| w.total_bytes()))?;
        state.serialize_field("description", self.description())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_flags_in_table_order() {
        assert_eq!(
            NodeTypeFlag::flags(0x03),
            vec![NodeTypeFlag::RootPosition, NodeTypeFlag::FkRotation]
        );
        assert!(NodeTypeFlag::flags(0x00).is_empty());
        assert_eq!(
            NodeTypeFlag::flags(0x80),
            vec![NodeTypeFlag::BoneFlip, NodeTypeFlag::IkArmParent]
        );
    }

    #[test]
    fn test_data_role_covers_every_nibble() {
        assert_eq!(DataRole::from_data_type(0x16), DataRole::Camera);
        assert_eq!(DataRole::from_data_type(0xF2), DataRole::Forward);
        assert_eq!(DataRole::from_data_type(0x0B), DataRole::Invalid(0x0B));
        for byte in 0..=0x0Fu8 {
            assert!(!DataRole::from_data_type(byte).label().is_empty());
        }
    }

    #[test]
    fn test_camera_roles() {
        assert!(is_camera_node(0x16));
        assert!(!is_camera_node(0x17));
        assert_eq!(CameraRole::from_node_id(2).unwrap().label(), "Camera Roll");
        assert_eq!(CameraRole::from_node_id(1), Some(CameraRole::Target));
        assert_eq!(CameraRole::from_node_id(7), None);
    }

    #[test]
    fn test_encoding_table() {
        let widths = Encoding::from_data_type(0x50).widths().unwrap();
        assert_eq!(widths.total_bytes(), 6);

        let shared = Encoding::from_data_type(0xF6).widths().unwrap();
        assert!(shared.shares_tangent());
        assert_eq!(shared.total_bytes(), 8);

        assert_eq!(Encoding::from_data_type(0x8F), Encoding::Fmt144);
        for unknown in [0x30u8, 0x70, 0xB0, 0xC0, 0xD0, 0xE0] {
            assert_eq!(Encoding::from_data_type(unknown | 0x06), Encoding::Unknown(unknown));
            assert!(Encoding::from_data_type(unknown).widths().is_none());
        }
    }

    #[test]
    fn test_encoding_exports_widths() {
        let known = serde_json::to_value(Encoding::from_data_type(0x16)).unwrap();
        assert_eq!(known["format"], "4:2:2");
        assert_eq!(known["value_bytes"], 4);
        assert_eq!(known["tangent_out_bytes"], 2);
        assert_eq!(known["total_bytes"], 8);
        assert_eq!(known["description"], "Float value, 16-bit int tangents");

        let unknown = serde_json::to_value(Encoding::Unknown(0x30)).unwrap();
        assert_eq!(unknown["format"], "UNKNOWN");
        assert!(unknown["total_bytes"].is_null());
    }
}
