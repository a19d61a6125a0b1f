//! bgbatch CLI tool
//!
//! Command-line interface for batch background removal: enumerate a folder
//! of images, strip their backgrounds, and write transparent PNGs.

#[cfg(feature = "cli")]
use bgbatch::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
