/// Default face crop width fed to the estimation models.
pub const DEFAULT_CROP_WIDTH: u32 = 150;

/// Default face crop height fed to the estimation models.
pub const DEFAULT_CROP_HEIGHT: u32 = 150;

/// Default color depth (RGB).
pub const DEFAULT_COLOR_DEPTH: u32 = 3;

/// Classification boundary for the gender head: raw sigmoid scores at or
/// above this value read as female.
pub const GENDER_THRESHOLD: f32 = 0.5;

/// Sentinel age reported when a pipeline variant does not estimate age.
pub const AGE_UNKNOWN: f32 = -1.0;

/// Calibrated expansion ratio for the SeetaFace cascade locator.
pub const SEETA_EXPAND_RATIO: f32 = 1.0;

/// Calibrated expansion ratio for the Ultraface locator.
pub const ULTRAFACE_EXPAND_RATIO: f32 = 1.2;
