pub mod recorder;

pub use recorder::RecorderHandle;
