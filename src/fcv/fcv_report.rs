//! Human-readable parse report and the sinks it can be written to.

use std::io::{self, BufWriter, Write};

use log::info;

use crate::fcv::fcv_struct::{Axis, FcvFile};

/// Receives report lines. Flushed once at the end of every parse, failed or not.
pub trait DiagnosticSink {
    fn emit(&mut self, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DiagnosticSink for Vec<String> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Discards everything.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Forwards each line to the `log` facade at info level.
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        info!("{}", line);
        Ok(())
    }
}

/// Buffered text sink, typically a debug log file.
pub struct WriterSink<W: Write> {
    inner: BufWriter<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BufWriter::new(writer),
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.inner.into_inner().map_err(|err| err.into_error())
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn emit(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.inner, "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Writes the full report for a parsed file.
pub fn write_report(fcv: &FcvFile, sink: &mut dyn DiagnosticSink) -> io::Result<()> {
    sink.emit("")?;
    sink.emit("=== FCV HEADER ===")?;
    sink.emit(&format!("Byte Order    : {:?}", fcv.endian))?;
    sink.emit(&format!("Max Time      : {}", fcv.header.max_time))?;
    sink.emit(&format!("Node Count    : {}", fcv.header.node_count))?;
    sink.emit(&format!("File Size     : {} bytes", fcv.file_size_field))?;
    if fcv.padding > 0 {
        sink.emit(&format!(
            "Padding       : {} byte(s) (to align to 4-byte boundary)",
            fcv.padding
        ))?;
    }

    sink.emit("")?;
    sink.emit("--- Joint Table ---")?;
    for (i, node) in fcv.nodes.iter().enumerate() {
        let mut line = format!(
            "  [{:02}] Type: 0x{:02X} | Data: 0x{:02X} | ID: {}",
            i, node.node_type, node.data_type, node.node_id
        );
        if let Some(role) = node.camera_role {
            line.push_str(&format!(" -> Camera Role: {}", role.label()));
        }
        sink.emit(&line)?;
    }

    sink.emit("")?;
    sink.emit("--- Pointer Table ---")?;
    for (i, pointer) in fcv.pointer_table.iter().enumerate() {
        sink.emit(&format!("  Joint {:02} -> 0x{:08X}", i, pointer))?;
    }

    sink.emit("")?;
    sink.emit("--- Keyframe Blocks ---")?;
    for (i, block) in fcv.keyframe_blocks.iter().enumerate() {
        sink.emit(&format!(
            "  Joint {:02} | Keys: {} | Encoding: {}",
            i,
            block.key_count,
            block.encoding.format()
        ))?;
        for axis in Axis::ALL {
            sink.emit(&format!(
                "    {} Frames: {:?}",
                axis.name(),
                block.axis(axis).frame_ids
            ))?;
        }
    }

    sink.emit("")?;
    sink.emit("--- Keyframe/Tangent Values ---")?;
    for (i, (block, node)) in fcv.keyframe_blocks.iter().zip(&fcv.nodes).enumerate() {
        sink.emit(&format!(
            "Joint: {:02} | ID: {} | Keys: {}",
            i, node.node_id, block.key_count
        ))?;
        for axis in Axis::ALL {
            sink.emit(&format!("  {} Axis:", axis.name()))?;
            for key in &block.axis(axis).samples {
                sink.emit(&format!(
                    "    Frame {:>3}: Value={}, In={}, Out={}",
                    key.frame, key.value, key.tangent_in, key.tangent_out
                ))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_buffers_until_flush() {
        let mut sink = WriterSink::new(Vec::new());
        sink.emit("first").unwrap();
        sink.emit("second").unwrap();
        DiagnosticSink::flush(&mut sink).unwrap();
        let written = sink.into_inner().unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_vec_sink_collects_lines() {
        let mut lines: Vec<String> = Vec::new();
        lines.emit("hello").unwrap();
        assert_eq!(lines, vec!["hello".to_string()]);
    }
}
