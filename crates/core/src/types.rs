/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Bytes per pixel of packed RGB24 frame data.
pub const RGB_CHANNELS: usize = 3;

/// One rendered video frame as packed RGB24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Frame {
    /// Size in bytes of one RGB24 frame with the given geometry.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * RGB_CHANNELS
    }

    /// A frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            rgb: rgb.repeat(pixels),
        }
    }
}

/// Frames of one clip, in display order.
pub type FrameSequence = Vec<Frame>;
