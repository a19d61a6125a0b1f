//! Infrastructure services: image I/O, progress observation, folder reveal
//!
//! These modules separate presentation and filesystem concerns from the
//! batch engine, keeping the controller testable against plain traits.

pub mod io;
pub mod progress;
pub mod reveal;

// Re-export the main service types
pub use io::ImageIoService;
pub use progress::{
    BatchEvent, ChannelProgressSink, CollectingErrorSink, ConsoleErrorCollector,
    ConsoleProgressSink, ErrorCollector, JsonProgressSink, NoOpErrorCollector, NoOpProgressSink,
    ProgressSink,
};
pub use reveal::{NoOpOpener, OutputFolderOpener, PlatformOpener};

#[cfg(feature = "cli")]
pub use progress::ItemProgressBarSink;
