//! Scan-by-scan refinement of one decoded image.
//!
//! ```text
//! Empty --begin--> Active(1) --advance--> Active(2) ... --advance--> Exhausted(max_scans)
//!   ^                                                                     |
//!   +------------------------------- reset / begin ----------------------+
//! ```

use crate::approximation;
use crate::constants::{DEFAULT_BASE_RADIUS, DEFAULT_MAX_SCANS, DEFAULT_RADIUS_STEP};
use crate::error::ScanError;
use crate::pixel_buffer::PixelBuffer;

/// Maps a scan index to the blur radius shown at that scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSchedule {
    base_radius: u32,
    radius_step: u32,
    max_scans: u32,
}

impl Default for ScanSchedule {
    fn default() -> Self {
        Self {
            base_radius: DEFAULT_BASE_RADIUS,
            radius_step: DEFAULT_RADIUS_STEP,
            max_scans: DEFAULT_MAX_SCANS,
        }
    }
}

impl ScanSchedule {
    /// `max_scans` is raised to 1 if zero is given; a session always has a first scan.
    pub fn new(base_radius: u32, radius_step: u32, max_scans: u32) -> Self {
        Self {
            base_radius,
            radius_step,
            max_scans: max_scans.max(1),
        }
    }

    pub fn base_radius(&self) -> u32 {
        self.base_radius
    }

    pub fn radius_step(&self) -> u32 {
        self.radius_step
    }

    pub fn max_scans(&self) -> u32 {
        self.max_scans
    }

    /// `max(0, base_radius - (scan_index - 1) * radius_step)`
    pub fn coarseness_of(&self, scan_index: u32) -> u32 {
        let reduction = scan_index.saturating_sub(1).saturating_mul(self.radius_step);
        self.base_radius.saturating_sub(reduction)
    }

    /// Radii for scans `1..=max_scans`, in order.
    pub fn radii(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.max_scans).map(move |index| self.coarseness_of(index))
    }

    /// Whether the last scan shows the unmodified source.
    pub fn reaches_full_detail(&self) -> bool {
        self.coarseness_of(self.max_scans) == 0
    }
}

/// State of one image being refined.
#[derive(Debug, Clone)]
pub struct RefinementSession {
    source: PixelBuffer,
    scan_index: u32,
    eligible: bool,
}

impl RefinementSession {
    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Empty,
    Active { scan_index: u32, eligible: bool },
    Exhausted,
}

#[derive(Debug, Default)]
pub struct ScanSequencer {
    schedule: ScanSchedule,
    session: Option<RefinementSession>,
}

impl ScanSequencer {
    pub fn new(schedule: ScanSchedule) -> Self {
        Self {
            schedule,
            session: None,
        }
    }

    pub fn schedule(&self) -> &ScanSchedule {
        &self.schedule
    }

    pub fn session(&self) -> Option<&RefinementSession> {
        self.session.as_ref()
    }

    /// Current scan index, 0 when no session is active.
    pub fn scan_index(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.scan_index)
    }

    /// Radius of the most recently produced scan.
    pub fn current_radius(&self) -> Option<u32> {
        self.session
            .as_ref()
            .map(|s| self.schedule.coarseness_of(s.scan_index))
    }

    pub fn state(&self) -> ScanState {
        match &self.session {
            None => ScanState::Empty,
            Some(s) if s.scan_index >= self.schedule.max_scans => ScanState::Exhausted,
            Some(s) => ScanState::Active {
                scan_index: s.scan_index,
                eligible: s.eligible,
            },
        }
    }

    /// Starts a new session on `source` and returns its first, coarsest scan.
    ///
    /// Any previous session is dropped first, so on `EmptySource` the
    /// sequencer is left empty.
    pub fn begin(&mut self, source: PixelBuffer, eligible: bool) -> Result<PixelBuffer, ScanError> {
        self.session = None;
        if source.is_empty() {
            return Err(ScanError::EmptySource);
        }

        let radius = self.schedule.coarseness_of(1);
        log::debug!(
            "scan 1/{}: radius={} eligible={} {}x{}",
            self.schedule.max_scans,
            radius,
            eligible,
            source.width(),
            source.height()
        );
        let first = approximation::apply(&source, radius);
        self.session = Some(RefinementSession {
            source,
            scan_index: 1,
            eligible,
        });
        Ok(first)
    }

    /// Produces the next, sharper scan.
    ///
    /// Returns `None` without changing state when no session is active, the
    /// session is not eligible, or the last scan has been reached. A scan
    /// whose radius is 0 is the session's source buffer itself.
    pub fn advance(&mut self) -> Option<PixelBuffer> {
        if !self.has_more() {
            log::debug!("advance: no more scans ({:?})", self.state());
            return None;
        }
        let session = self.session.as_mut()?;
        session.scan_index += 1;

        let radius = self.schedule.coarseness_of(session.scan_index);
        log::debug!(
            "scan {}/{}: radius={}",
            session.scan_index,
            self.schedule.max_scans,
            radius
        );
        Some(approximation::apply(&session.source, radius))
    }

    pub fn has_more(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.eligible && s.scan_index < self.schedule.max_scans)
    }

    /// Drops the session and its source buffer.
    pub fn reset(&mut self) {
        self.session = None;
    }
}
