use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::runtime::IntervalTimer;
use crate::session::{Session, SessionPhase};
use crate::tracking::{Hand, HandFrame, Landmark};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read recording {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("line {line}: timestamp {t_ms}ms goes backwards")]
    OutOfOrder { line: usize, t_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub t_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hands: Vec<Hand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<Landmark>,
}

impl RecordedFrame {
    pub fn hand_frame(&self) -> HandFrame {
        if self.hands.is_empty() {
            HandFrame::from_fingertips(&self.tips)
        } else {
            HandFrame::new(self.hands.clone())
        }
    }
}

/// A recorded session in JSON lines, one frame per line:
///
/// ```text
/// {"t_ms": 0, "tips": [{"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.5}]}
/// {"t_ms": 33, "hands": [{"landmarks": [...]}, {"landmarks": [...]}]}
/// ```
///
/// `tips` is shorthand for hands that only carry a fingertip. Blank lines
/// and lines starting with `#` are skipped.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    pub fn parse(text: &str) -> Result<Self, ReplayError> {
        let mut frames: Vec<RecordedFrame> = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }
            let frame: RecordedFrame =
                serde_json::from_str(raw).map_err(|source| ReplayError::Parse { line, source })?;
            if frames.last().is_some_and(|prev| prev.t_ms > frame.t_ms) {
                return Err(ReplayError::OutOfOrder {
                    line,
                    t_ms: frame.t_ms,
                });
            }
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn to_json_lines(&self) -> String {
        self.frames
            .iter()
            .filter_map(|f| serde_json::to_string(f).ok())
            .map(|l| l + "\n")
            .collect()
    }
}

/// A phase change observed while replaying.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseChange {
    pub t_ms: u64,
    pub phase: SessionPhase,
    pub level: usize,
    pub area: u32,
    pub perimeter: u32,
    pub shape: Option<(u32, u32)>,
}

impl fmt::Display for PhaseChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>7}ms {:<15} level={} target={}/{}",
            self.t_ms, self.phase, self.level, self.area, self.perimeter
        )?;
        if let Some((w, h)) = self.shape {
            write!(f, " shape={w}x{h}")?;
        }
        Ok(())
    }
}

/// Drive `session` through `recording`, delivering countdown ticks as frame
/// time passes. Returns every phase change in order.
pub fn play(session: &mut Session, recording: &Recording, t0: Instant) -> Vec<PhaseChange> {
    let mut timer = IntervalTimer::new(session.config().countdown_interval());
    let mut changes = Vec::new();
    let mut last_phase = session.phase(t0);

    let mut observe = |session: &Session, t_ms: u64, changes: &mut Vec<PhaseChange>| {
        let now = t0 + Duration::from_millis(t_ms);
        let report = session.report(now);
        if report.phase != last_phase {
            last_phase = report.phase;
            changes.push(PhaseChange {
                t_ms,
                phase: report.phase,
                level: report.level,
                area: report.target.area,
                perimeter: report.target.perimeter,
                shape: report.shape.map(|s| s.dims()),
            });
        }
    };

    for frame in &recording.frames {
        let now = t0 + Duration::from_millis(frame.t_ms);

        for _ in 0..timer.due(now) {
            session.tick_countdown(now);
            if !session.is_success() {
                timer.disarm();
            }
        }
        observe(session, frame.t_ms, &mut changes);

        session.process_frame(&frame.hand_frame(), now);
        if session.is_success() && !timer.is_armed() {
            debug!(t_ms = frame.t_ms, "countdown armed");
            timer.arm(now);
        }
        observe(session, frame.t_ms, &mut changes);
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_tips_and_skips_comments() {
        let text = r#"
# two fingertips
{"t_ms": 0, "tips": [{"x": 0.1, "y": 0.1}, {"x": 0.2, "y": 0.3}]}

{"t_ms": 40}
"#;
        let rec = Recording::parse(text).unwrap();
        assert_eq!(rec.frames.len(), 2);
        assert!(rec.frames[0].hand_frame().fingertip_pair().is_some());
        assert!(rec.frames[1].hand_frame().hands.is_empty());
    }

    #[test]
    fn reports_bad_line_number() {
        let text = "{\"t_ms\": 0}\n{not json}\n";
        assert_matches!(Recording::parse(text), Err(ReplayError::Parse { line: 2, .. }));
    }

    #[test]
    fn rejects_time_going_backwards() {
        let text = "{\"t_ms\": 50}\n{\"t_ms\": 10}\n";
        assert_matches!(
            Recording::parse(text),
            Err(ReplayError::OutOfOrder { line: 2, t_ms: 10 })
        );
    }

    #[test]
    fn json_lines_roundtrip_keeps_frames() {
        let rec = Recording {
            frames: vec![RecordedFrame {
                t_ms: 5,
                hands: vec![],
                tips: vec![Landmark::new(0.5, 0.5)],
            }],
        };
        let back = Recording::parse(&rec.to_json_lines()).unwrap();
        assert_eq!(back.frames, rec.frames);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert_matches!(
            Recording::load("/definitely/not/here.jsonl"),
            Err(ReplayError::Io { .. })
        );
    }
}
