//! Error types for FCV decoding.

use thiserror::Error;

/// Every failure the FCV reader can report.
#[derive(Debug, Error)]
pub enum FcvError {
    /// A fixed-size header or table field ran past the end of the input.
    #[error("Truncated input at 0x{offset:08X}: needed {needed} byte(s) for {context}")]
    TruncatedInput {
        offset: u64,
        needed: usize,
        context: &'static str,
    },

    /// The upper nibble of a data-type byte does not name a known encoding.
    #[error("Unknown encoding for data type 0x{data_type:02X}")]
    UnknownEncoding { data_type: u8 },

    /// A camera-marked node carries a node id outside the camera role table.
    #[error(
        "Invalid camera joint: node {node_index} has ID {node_id} with data type 0x{data_type:02X} (offset 0x{offset:08X})"
    )]
    InvalidCameraJoint {
        node_index: usize,
        node_id: u8,
        data_type: u8,
        offset: u64,
    },

    /// A field width reached the numeric decoder that the encoding table never produces.
    #[error("Unsupported field width {width} reached the numeric decoder")]
    NumericDecode { width: usize },

    /// Any other I/O failure, including diagnostic sink writes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, FcvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_offsets() {
        let err = FcvError::TruncatedInput {
            offset: 0x10,
            needed: 4,
            context: "pointer table",
        };
        assert_eq!(
            err.to_string(),
            "Truncated input at 0x00000010: needed 4 byte(s) for pointer table"
        );

        let err = FcvError::InvalidCameraJoint {
            node_index: 3,
            node_id: 7,
            data_type: 0x16,
            offset: 0x40,
        };
        assert!(err.to_string().contains("node 3 has ID 7 with data type 0x16"));
    }
}
