//! Replay of recorded frames
//!
//! The rehearsal path when no hardware is attached: a newline-delimited JSON
//! recording is loaded up front and fed to a pipeline once, or on a loop.
//!
//! Loading is strict. Blank lines are skipped, but a line that is not a JSON
//! object fails the whole load with its 1-based line number, and a
//! recording without frames is an error.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use roomlens_core::{Frame, FrameError};
use thiserror::Error;

/// Why a recording could not be loaded
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error reading recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {source}")]
    Frame {
        /// 1-based line number in the recording
        line: usize,
        #[source]
        source: FrameError,
    },

    #[error("Recording did not contain any frames")]
    Empty,
}

/// Frames loaded from one recording, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    frames: Vec<Frame>,
    lines_read: usize,
}

impl Recording {
    /// Number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false` for a loaded recording
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Lines read, blank ones included
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Loaded frames
    pub fn as_slice(&self) -> &[Frame] {
        &self.frames
    }

    /// Frames once through, or forever when `looped`
    pub fn frames(&self, looped: bool) -> ReplayFrames<'_> {
        ReplayFrames {
            frames: &self.frames,
            next: 0,
            looped,
        }
    }
}

/// Iterator over a recording's frames
#[derive(Debug, Clone)]
pub struct ReplayFrames<'a> {
    frames: &'a [Frame],
    next: usize,
    looped: bool,
}

impl Iterator for ReplayFrames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next >= self.frames.len() {
            if !self.looped || self.frames.is_empty() {
                return None;
            }
            self.next = 0;
        }
        let frame = self.frames[self.next].clone();
        self.next += 1;
        Some(frame)
    }
}

/// Read a newline-delimited JSON recording
pub fn load_recording<R: BufRead>(reader: R) -> Result<Recording, ReplayError> {
    let mut frames = Vec::new();
    let mut lines_read = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        lines_read += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let frame = Frame::from_json_str(line).map_err(|source| ReplayError::Frame {
            line: index + 1,
            source,
        })?;
        frames.push(frame);
    }

    if frames.is_empty() {
        return Err(ReplayError::Empty);
    }
    log_debug!("loaded {} frames from {} lines", frames.len(), lines_read);
    Ok(Recording { frames, lines_read })
}

/// Read a recording from disk
pub fn load_recording_file(path: impl AsRef<Path>) -> Result<Recording, ReplayError> {
    let file = File::open(path.as_ref())?;
    load_recording(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = "{\"t\": 0, \"mic_rms\": 0.1}\n\n   \n{\"t\": 100, \"mic_rms\": 0.2}\n";

    #[test]
    fn skips_blank_lines() {
        let recording = load_recording(TWO_FRAMES.as_bytes()).unwrap();
        assert_eq!(recording.len(), 2);
        assert_eq!(recording.lines_read(), 4);
        assert_eq!(recording.as_slice()[1].get("mic_rms"), Some(0.2));
    }

    #[test]
    fn single_pass_ends() {
        let recording = load_recording(TWO_FRAMES.as_bytes()).unwrap();
        let values: Vec<_> = recording
            .frames(false)
            .map(|f| f.get("mic_rms").unwrap())
            .collect();
        assert_eq!(values, vec![0.1, 0.2]);
    }

    #[test]
    fn looped_replay_wraps_around() {
        let recording = load_recording(TWO_FRAMES.as_bytes()).unwrap();
        let values: Vec<_> = recording
            .frames(true)
            .take(5)
            .map(|f| f.get("mic_rms").unwrap())
            .collect();
        assert_eq!(values, vec![0.1, 0.2, 0.1, 0.2, 0.1]);
    }

    #[test]
    fn invalid_json_names_line() {
        let err = load_recording("{\"a\": 1}\n\n{nope\n".as_bytes()).unwrap_err();
        match err {
            ReplayError::Frame { line, source: FrameError::Json(_) } => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_object_names_line() {
        let err = load_recording("[1, 2]\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Frame { line: 1, source: FrameError::NotAnObject }
        ));
        assert!(err.to_string().starts_with("Line 1:"));
    }

    #[test]
    fn empty_recording_is_an_error() {
        assert!(matches!(load_recording("".as_bytes()), Err(ReplayError::Empty)));
        assert!(matches!(load_recording("\n  \n".as_bytes()), Err(ReplayError::Empty)));
    }
}
