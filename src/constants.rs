pub const JPEG_MARKER_START_BYTE: u8 = 0xFF;

// Radius schedule of the simulated scans: 8, 6, 4, 2, 0.
pub const DEFAULT_BASE_RADIUS: u32 = 8;
pub const DEFAULT_RADIUS_STEP: u32 = 2;
pub const DEFAULT_MAX_SCANS: u32 = 5;

// How far into an encoded file the SOF2 marker is searched for.
pub const ELIGIBILITY_PROBE_BYTES: usize = 2048;

pub const MINIMUM_QUALITY: u8 = 0;
pub const MAXIMUM_QUALITY: u8 = 100;
pub const DEFAULT_QUALITY: u8 = 75;

pub const RGB_CHANNEL_COUNT: usize = 3;
pub const RGBA_CHANNEL_COUNT: usize = 4;

// Color channels averaged by the approximation filter; alpha is carried through.
pub const COLOR_CHANNEL_COUNT: usize = 3;
