mod native;
mod recording;
mod shared;

pub use native::GpuDevice;
pub use recording::{DrawRecord, RecordingDevice, UploadRecord};
