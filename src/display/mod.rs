mod display_sink;
mod frame_dump_sink;

pub use display_sink::DisplaySink;
pub use frame_dump_sink::FrameDumpSink;
