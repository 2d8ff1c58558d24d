use crate::detection::domain::blob::Point;

/// Observable phase of the tracker after the latest update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackPhase {
    /// A candidate was accepted on the latest frame.
    Acquired(Point),
    /// Consecutive frames without an accepted candidate.
    Lost(usize),
}

/// Trail-extension event: a segment from the previous accepted center to
/// the new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailSegment {
    pub from: Point,
    pub to: Point,
}

/// Continuity state machine turning per-frame detections into a trajectory.
///
/// A hit resets the miss counter and links to the previous center, if any.
/// A miss increments the counter; once it exceeds `max_gap` the previous
/// center is forgotten, so the next hit starts a disconnected segment.
pub struct TrackState {
    max_gap: usize,
    last_center: Option<Point>,
    frames_without: usize,
}

impl TrackState {
    pub fn new(max_gap: usize) -> Self {
        Self {
            max_gap,
            last_center: None,
            frames_without: 0,
        }
    }

    /// Advances one frame. Returns the segment to draw, if this frame
    /// extends the trail.
    pub fn update(&mut self, candidate: Option<Point>) -> Option<TrailSegment> {
        match candidate {
            Some(center) => {
                self.frames_without = 0;
                let segment = self.last_center.map(|from| TrailSegment { from, to: center });
                self.last_center = Some(center);
                segment
            }
            None => {
                self.frames_without += 1;
                if self.frames_without > self.max_gap {
                    self.last_center = None;
                }
                None
            }
        }
    }

    pub fn last_center(&self) -> Option<Point> {
        self.last_center
    }

    pub fn frames_without(&self) -> usize {
        self.frames_without
    }

    pub fn phase(&self) -> TrackPhase {
        match self.last_center {
            Some(center) if self.frames_without == 0 => TrackPhase::Acquired(center),
            _ => TrackPhase::Lost(self.frames_without),
        }
    }
}
