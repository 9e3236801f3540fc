mod directory_source;
mod video_source;

pub use directory_source::DirectoryFrameSource;
pub use video_source::{FrameAcquisition, VideoSource};
