//! Non-graphical state of an interactive viewer: the image currently shown,
//! the refinement session behind it, and the codec used to load and save.

use std::path::Path;

use crate::codec::{EncodeOptions, ImageCodec, JpegCodec};
use crate::error::ScanError;
use crate::loader::{self, LoadOutcome, LoadRequest, LoadStrategy, SaveOutcome, SaveRequest};
use crate::pixel_buffer::PixelBuffer;
use crate::scan_sequencer::{ScanSchedule, ScanSequencer, ScanState};

pub struct Viewer<C: ImageCodec = JpegCodec> {
    codec: C,
    strategy: LoadStrategy,
    sequencer: ScanSequencer,
    current: Option<PixelBuffer>,
}

impl Default for Viewer<JpegCodec> {
    fn default() -> Self {
        Self::new(JpegCodec, ScanSchedule::default())
    }
}

impl<C: ImageCodec> Viewer<C> {
    pub fn new(codec: C, schedule: ScanSchedule) -> Self {
        Self {
            codec,
            strategy: LoadStrategy::default(),
            sequencer: ScanSequencer::new(schedule),
            current: None,
        }
    }

    pub fn with_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> LoadStrategy {
        self.strategy
    }

    pub fn current_image(&self) -> Option<&PixelBuffer> {
        self.current.as_ref()
    }

    pub fn scan_state(&self) -> ScanState {
        self.sequencer.state()
    }

    pub fn scan_index(&self) -> u32 {
        self.sequencer.scan_index()
    }

    /// Replaces whatever was shown with the file at `path`.
    ///
    /// On failure nothing remains loaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadOutcome, ScanError> {
        self.current = None;
        let request = LoadRequest {
            path: path.as_ref().to_path_buf(),
            strategy: self.strategy,
        };
        match loader::execute_load(&request, &self.codec, &mut self.sequencer) {
            Ok(outcome) => {
                self.current = Some(outcome.image.clone());
                Ok(outcome)
            }
            Err(e) => {
                log::error!("load of {:?} failed: {}", request.path, e);
                self.sequencer.reset();
                Err(e)
            }
        }
    }

    pub fn can_load_next_scan(&self) -> bool {
        self.sequencer.has_more()
    }

    /// Shows the next scan, if any, and returns it.
    pub fn next_scan(&mut self) -> Option<&PixelBuffer> {
        let scan = self.sequencer.advance()?;
        self.current = Some(scan);
        self.current.as_ref()
    }

    /// Encodes the image currently shown, which may be a blurred scan.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        options: EncodeOptions,
    ) -> Result<SaveOutcome, ScanError> {
        let image = self.current.as_ref().ok_or(ScanError::NoImage)?;
        let request = SaveRequest {
            path: path.as_ref().to_path_buf(),
            image,
            options,
        };
        loader::execute_save(&request, &self.codec)
    }

    pub fn close(&mut self) {
        self.current = None;
        self.sequencer.reset();
    }
}
