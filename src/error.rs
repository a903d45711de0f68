//! Error types for cursor-trail.
//!
//! Slot exhaustion and out-of-range configuration are not errors: the pool
//! drops emissions silently and config setters clamp. What remains are
//! graphics allocation failures, GPU bootstrap failures, config file
//! problems and windowing failures.

use thiserror::Error;

/// Errors that can occur while allocating an off-screen render surface.
///
/// Allocation failure is fatal to the component that owns the surface;
/// nothing retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Width or height was zero.
    #[error("render surface must have a non-zero size, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    /// Requested size exceeds what the device supports.
    #[error("render surface {width}x{height} exceeds the device limit of {limit} pixels per side")]
    TooLarge { width: u32, height: u32, limit: u32 },
    /// The graphics backend refused the allocation.
    #[error("failed to allocate render surface: {0}")]
    Allocation(String),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; a Vulkan/Metal/DX12/WebGPU capable device is required")]
    NoAdapter,
    /// The window surface reports no usable texture format.
    #[error("window surface reports no supported texture formats")]
    UnsupportedSurface,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// An off-screen target could not be allocated.
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Errors that can occur while loading options from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for the options schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur when running the windowed application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// Options could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Trail surfaces could not be (re)allocated.
    #[error("trail surface error: {0}")]
    Surface(#[from] SurfaceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_error_messages() {
        let err = SurfaceError::ZeroSize { width: 0, height: 600 };
        assert_eq!(err.to_string(), "render surface must have a non-zero size, got 0x600");

        let err = SurfaceError::TooLarge { width: 9000, height: 10, limit: 8192 };
        assert!(err.to_string().contains("8192"));
    }

    #[test]
    fn test_surface_error_converts_into_app_error() {
        let err: AppError = SurfaceError::Allocation("out of memory".into()).into();
        assert!(matches!(err, AppError::Surface(SurfaceError::Allocation(_))));
        assert!(err.to_string().contains("out of memory"));
    }
}
