//! Per-frame track record sink in MOT Challenge layout.

use std::io::{self, Write};

use crate::ports::Track;

/// Writes one CSV-like line per visible track per processed frame:
/// `frame,track_id,tl_x,tl_y,width,height,-1,-1,-1`, with coordinates
/// rescaled from processing resolution back to the native capture
/// resolution.
pub struct TrackLog<W> {
    writer: W,
    scale_x: f32,
    scale_y: f32,
}

impl<W: Write> TrackLog<W> {
    /// `processing` is the resolution tracking ran at, `native` the
    /// capture resolution the log is expressed in.
    pub fn new(writer: W, processing: (u32, u32), native: (u32, u32)) -> Self {
        Self {
            writer,
            scale_x: native.0 as f32 / processing.0 as f32,
            scale_y: native.1 as f32 / processing.1 as f32,
        }
    }

    /// Append a record for every track visible at `frame_index`.
    pub fn write_frame<'t, I>(&mut self, frame_index: u64, tracks: I) -> io::Result<()>
    where
        I: IntoIterator<Item = &'t Track>,
    {
        for track in tracks {
            let scaled = track.tlbr.scaled(self.scale_x, self.scale_y);
            let width = scaled.x2 - scaled.x1 + 1.0;
            let height = scaled.y2 - scaled.y1 + 1.0;
            writeln!(
                self.writer,
                "{},{},{:.6},{:.6},{:.6},{:.6},-1,-1,-1",
                frame_index, track.track_id, scaled.x1, scaled.y1, width, height
            )?;
        }
        Ok(())
    }

    /// Flush pending records to the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
