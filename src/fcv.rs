//! FCV (keyframed motion curve) file reader.
//!
//! An FCV file holds a small header, a per-joint type/data-type/id table, a
//! pointer table and, for every joint, three axis streams of keyframes with
//! Hermite in/out tangents. Byte order is not marked in the file and is
//! guessed from the header unless the caller forces it.

use std::{
    fs::File,
    io::{Cursor, Read, Seek},
    path::Path,
};

pub mod fcv_decoder;
pub mod fcv_endian;
pub mod fcv_enum;
pub mod fcv_parser;
pub mod fcv_report;
pub mod fcv_struct;
mod fcv_util;

pub use fcv_parser::{EndianMode, FcvParser, ParseOptions};
pub use fcv_report::{DiagnosticSink, LogSink, NullSink, WriterSink};
pub use fcv_struct::{
    Axis, AxisStream, FcvFile, FcvHeader, FcvNode, FcvSummary, FootprintMismatch, Keyframe,
    KeyframeBlock, NodeFootprint,
};

use crate::error::Result;

impl FcvFile {
    /// Parse an FCV file from disk, reporting through the `log` facade.
    pub fn load_from_file<P: AsRef<Path>>(file_path: P, options: ParseOptions) -> Result<Self> {
        let file = File::open(file_path)?;
        Self::load_from_reader(file, options, &mut LogSink)
    }

    /// Parse an FCV file already held in memory.
    pub fn load_from_bytes(bytes: Vec<u8>, options: ParseOptions) -> Result<Self> {
        Self::load_from_reader(Cursor::new(bytes), options, &mut LogSink)
    }

    pub fn load_from_reader<R: Read + Seek>(
        reader: R,
        options: ParseOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self> {
        FcvParser::new(reader, options).parse(sink)
    }
}
