use std::io::{Read, Seek, SeekFrom};

use log::{debug, info, warn};

use crate::binary::{BinaryReader, Endian};
use crate::error::{FcvError, Result};
use crate::fcv::fcv_decoder::decode_axis_with;
use crate::fcv::fcv_endian::{detect_from_reader, EndianGuess};
use crate::fcv::fcv_enum::{is_camera_node, CameraRole};
use crate::fcv::fcv_report::{write_report, DiagnosticSink};
use crate::fcv::fcv_struct::{Axis, AxisStream, FcvFile, FcvHeader, FcvNode, KeyframeBlock};
use crate::fcv::fcv_util::padding_to_align4;

/// How the byte order of a file is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EndianMode {
    /// Guess from the header.
    #[default]
    Auto,
    Forced(Endian),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub endian: EndianMode,
}

/// Single-use parser over one input stream.
pub struct FcvParser<R: Read + Seek> {
    reader: R,
    options: ParseOptions,
}

impl<R: Read + Seek> FcvParser<R> {
    pub fn new(reader: R, options: ParseOptions) -> Self {
        Self { reader, options }
    }

    /// Parses the whole stream and writes the report to `sink`.
    ///
    /// The input stream is dropped and `sink` flushed before returning, on success and on error.
    pub fn parse(self, sink: &mut dyn DiagnosticSink) -> Result<FcvFile> {
        let parsed = self.parse_stream(sink);
        let flushed = sink.flush();
        let fcv = parsed?;
        flushed?;
        Ok(fcv)
    }

    fn parse_stream(self, sink: &mut dyn DiagnosticSink) -> Result<FcvFile> {
        let Self {
            mut reader,
            options,
        } = self;

        let (endian, endian_guess): (Endian, Option<EndianGuess>) = match options.endian {
            EndianMode::Auto => {
                let guess = detect_from_reader(&mut reader)?;
                (guess.endian, Some(guess))
            }
            EndianMode::Forced(endian) => (endian, None),
        };

        let mut br = BinaryReader::new(reader, endian);
        br.seek(SeekFrom::Start(0))?;
        let actual_file_size = br.stream_len()?;

        let header = read_header(&mut br)?;
        let mut nodes = read_node_table(&mut br, header.node_count)?;
        read_node_ids(&mut br, &mut nodes)?;
        let padding = skip_alignment(&mut br)?;
        let file_size_field = br.read_u32("file size field")?;
        let pointer_table = read_pointer_table(&mut br, header.node_count)?;

        let mut keyframe_blocks = Vec::with_capacity(nodes.len());
        for (i, (node, &pointer)) in nodes.iter().zip(&pointer_table).enumerate() {
            keyframe_blocks.push(read_keyframe_block(&mut br, i, node, pointer)?);
        }

        validate_cameras(&mut br, &mut nodes, sink)?;

        let fcv = FcvFile {
            endian,
            endian_guess,
            header,
            nodes,
            padding,
            file_size_field,
            actual_file_size,
            pointer_table,
            keyframe_blocks,
        };
        for mismatch in fcv.footprint_mismatches() {
            warn!(
                "Joint {:02}: footprint {} byte(s) but pointer table leaves {}",
                mismatch.node_index, mismatch.footprint, mismatch.pointer_gap
            );
        }
        write_report(&fcv, sink)?;
        info!(
            "Parsed FCV: {} node(s), {} frame(s), {:?} byte order",
            fcv.header.node_count, fcv.header.max_time, fcv.endian
        );
        Ok(fcv)
    }
}

fn read_header<R: Read + Seek>(br: &mut BinaryReader<R>) -> Result<FcvHeader> {
    let header = FcvHeader {
        max_time: br.read_u16("max time")?,
        node_count: br.read_u8("node count")?,
    };
    debug!(
        "Header: max_time={} node_count={}",
        header.max_time, header.node_count
    );
    Ok(header)
}

fn read_node_table<R: Read + Seek>(br: &mut BinaryReader<R>, node_count: u8) -> Result<Vec<FcvNode>> {
    let mut nodes = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        let [a, b] = br.read_exact::<2>("node table")?;
        // Big-endian files store the pair as (data type, node type).
        let (node_type, data_type) = match br.endian() {
            Endian::Little => (a, b),
            Endian::Big => (b, a),
        };
        nodes.push(FcvNode::new(node_type, data_type));
    }
    Ok(nodes)
}

fn read_node_ids<R: Read + Seek>(br: &mut BinaryReader<R>, nodes: &mut [FcvNode]) -> Result<()> {
    for node in nodes.iter_mut() {
        node.node_id = br.read_u8("node id")?;
    }
    Ok(())
}

fn skip_alignment<R: Read + Seek>(br: &mut BinaryReader<R>) -> Result<u64> {
    let padding = padding_to_align4(br.position()?);
    if padding > 0 {
        br.read_vec(padding as usize, "alignment padding")?;
    }
    Ok(padding)
}

fn read_pointer_table<R: Read + Seek>(br: &mut BinaryReader<R>, node_count: u8) -> Result<Vec<u32>> {
    let mut pointers = Vec::with_capacity(node_count as usize);
    for _ in 0..node_count {
        pointers.push(br.read_u32("pointer table")?);
    }
    Ok(pointers)
}

fn read_frame_ids<R: Read + Seek>(br: &mut BinaryReader<R>) -> Result<Vec<u16>> {
    let frame_count = br.read_u16("frame count")?;
    let mut frame_ids = Vec::with_capacity(frame_count as usize);
    for _ in 0..frame_count {
        frame_ids.push(br.read_u16("frame id")?);
    }
    Ok(frame_ids)
}

fn read_keyframe_block<R: Read + Seek>(
    br: &mut BinaryReader<R>,
    index: usize,
    node: &FcvNode,
    pointer: u32,
) -> Result<KeyframeBlock> {
    br.seek(SeekFrom::Start(pointer as u64))?;
    let widths = node.encoding.widths();
    if widths.is_none() {
        warn!(
            "Joint {:02}: {}, axes left undecoded",
            index,
            FcvError::UnknownEncoding {
                data_type: node.data_type
            }
        );
    }

    let mut axes: [AxisStream; 3] = Default::default();
    for (axis, stream) in Axis::ALL.into_iter().zip(axes.iter_mut()) {
        let frame_ids = match (read_frame_ids(br), widths) {
            (Ok(frame_ids), _) => frame_ids,
            // Without a sample width the later axis headers cannot be located reliably.
            (Err(FcvError::TruncatedInput { offset, .. }), None) => {
                warn!(
                    "Joint {:02}: frame list for axis {} runs past end of input at 0x{:08X}",
                    index,
                    axis.name(),
                    offset
                );
                break;
            }
            (Err(err), _) => return Err(err),
        };

        let samples = match widths {
            Some(widths) => {
                let wanted = widths.total_bytes() * frame_ids.len();
                let data = br.read_up_to(wanted)?;
                if data.len() < wanted {
                    warn!(
                        "Joint {:02} axis {}: sample data truncated ({} of {} bytes)",
                        index,
                        axis.name(),
                        data.len(),
                        wanted
                    );
                }
                decode_axis_with(&data, widths, &frame_ids, br.endian())?
            }
            None => Vec::new(),
        };
        *stream = AxisStream { frame_ids, samples };
    }

    let [x, y, z] = axes;
    let key_count = [&x, &y, &z]
        .iter()
        .map(|stream| stream.frame_count())
        .max()
        .unwrap_or(0);
    debug!(
        "Joint {:02} @ 0x{:08X}: {} key(s), encoding {}",
        index,
        pointer,
        key_count,
        node.encoding.format()
    );
    Ok(KeyframeBlock {
        pointer,
        encoding: node.encoding,
        key_count,
        x,
        y,
        z,
    })
}

fn validate_cameras<R: Read + Seek>(
    br: &mut BinaryReader<R>,
    nodes: &mut [FcvNode],
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    for (node_index, node) in nodes.iter_mut().enumerate() {
        if !is_camera_node(node.data_type) {
            continue;
        }
        match CameraRole::from_node_id(node.node_id) {
            Some(role) => node.camera_role = Some(role),
            None => {
                let err = FcvError::InvalidCameraJoint {
                    node_index,
                    node_id: node.node_id,
                    data_type: node.data_type,
                    offset: br.position()?,
                };
                if let Err(emit_err) = sink.emit(&format!("[ERROR] {}", err)) {
                    warn!("Could not report camera joint error: {}", emit_err);
                }
                return Err(err);
            }
        }
    }
    Ok(())
}
