use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::UNOWNED_PROCESS;
use crate::error::{Error, Result};
use crate::memory::{Frame, FrameTable, Placement, ProcessId, Tier};

/// Persisted form of a frame table: `{"frames": [...]}`
#[derive(Debug, Serialize, Deserialize)]
struct TableRecord {
    frames: Vec<FrameRecord>,
}

/// Persisted form of one frame.
///
/// The free state is stored twice, as `is_free` and `libre`. Files written
/// here always carry both; older files may carry only one of them. When the
/// two disagree, `libre` wins: it is the flag allocation scans.
#[derive(Debug, Serialize, Deserialize)]
struct FrameRecord {
    content: String,
    frame_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    libre: Option<bool>,
    page_number: u32,
    process_id: u32,
    segment_id: u32,
}

impl FrameRecord {
    fn from_frame(frame: &Frame) -> Self {
        FrameRecord {
            content: frame.content().to_string(),
            frame_number: frame.number(),
            is_free: Some(frame.is_free()),
            libre: Some(frame.is_free()),
            page_number: frame.page_number(),
            process_id: frame.process_id().map_or(UNOWNED_PROCESS, ProcessId::get),
            segment_id: frame.segment_id(),
        }
    }

    fn into_frame(self) -> std::result::Result<Frame, String> {
        let is_free = match (self.libre, self.is_free) {
            (Some(flag), _) | (None, Some(flag)) => flag,
            (None, None) => return Err("missing free flag".to_string()),
        };

        if is_free {
            if !self.content.is_empty() {
                return Err("free frame holds content".to_string());
            }
            if self.process_id != UNOWNED_PROCESS || self.segment_id != 0 || self.page_number != 0 {
                return Err(format!(
                    "free frame has process_id={}, segment_id={}, page_number={}",
                    self.process_id, self.segment_id, self.page_number
                ));
            }
            return Ok(Frame::free(self.frame_number));
        }

        let process_id = ProcessId::new(self.process_id)
            .map_err(|_| "occupied frame has no owning process".to_string())?;
        if self.segment_id == 0 || self.page_number == 0 {
            return Err(format!(
                "occupied frame has segment_id={}, page_number={}",
                self.segment_id, self.page_number
            ));
        }
        Ok(Frame::occupied(
            self.frame_number,
            Placement {
                process_id,
                segment_id: self.segment_id,
                page_number: self.page_number,
                content: self.content,
            },
        ))
    }
}

/// Read a frame table from `path`
pub fn load_table<P: AsRef<Path>>(path: P, tier: Tier) -> Result<FrameTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::TableUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_table(&content, tier, path)
}

/// Decode a frame table; `origin` only names the source in errors
pub fn parse_table(content: &str, tier: Tier, origin: &Path) -> Result<FrameTable> {
    let record: TableRecord = serde_json::from_str(content).map_err(|source| Error::TableMalformed {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut seen = HashSet::new();
    let mut frames = Vec::with_capacity(record.frames.len());
    for frame in record.frames {
        let frame_number = frame.frame_number;
        let inconsistent = |reason: String| Error::TableInconsistent {
            path: origin.to_path_buf(),
            frame_number,
            reason,
        };
        if !seen.insert(frame_number) {
            return Err(inconsistent("duplicate frame number".to_string()));
        }
        frames.push(frame.into_frame().map_err(inconsistent)?);
    }

    Ok(FrameTable::from_frames(tier, frames))
}

/// Encode a frame table as four-space indented JSON
pub fn render_table(table: &FrameTable) -> Result<String> {
    let record = TableRecord {
        frames: table.frames().iter().map(FrameRecord::from_frame).collect(),
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut serializer).map_err(Error::Encode)?;
    String::from_utf8(buf).map_err(|e| Error::Encode(serde::ser::Error::custom(e)))
}

/// Overwrite the persisted table at `path`
pub fn save_table<P: AsRef<Path>>(path: P, table: &FrameTable) -> Result<()> {
    let path = path.as_ref();
    let content = render_table(table)?;
    fs::write(path, content).map_err(|source| Error::TableUnwritable {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the source text as lines split on `\n`.
///
/// The `\n` is dropped but a preceding `\r` is kept, so CRLF sources are
/// paginated with their carriage returns. A final terminator does not start
/// an extra empty line.
pub fn read_source_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.split_terminator('\n').map(str::to_owned).collect())
}

pub fn count_lines<P: AsRef<Path>>(path: P) -> Result<usize> {
    read_source_lines(path).map(|lines| lines.len())
}
