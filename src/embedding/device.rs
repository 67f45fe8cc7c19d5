use candle_core::Device;
use tracing::debug;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

/// Picks the first usable accelerator compiled in, then CPU.
///
/// Never fails: an accelerator that cannot be opened is logged and skipped.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!("Text encoder using Metal GPU");
            return device;
        }
        Err(e) => warn!(error = %e, "Metal device unavailable for text encoder"),
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!("Text encoder using CUDA GPU");
            return device;
        }
        Err(e) => warn!(error = %e, "CUDA device unavailable for text encoder"),
    }

    debug!("Text encoder running on CPU");
    Device::Cpu
}
