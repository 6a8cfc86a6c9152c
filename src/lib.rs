//! # Framekit
//!
//! Coordinate-frame math and a retained instance hierarchy for 3D scenes.
//!
//! - [`math`] - `Vector2`, `Vector3`, `Matrix`, `CFrame` and GPU buffer layouts
//! - [`signal`] - typed events with connections and async waits
//! - [`scene`] - the instance tree, positioned nodes, parts and cameras
//!
//! ```
//! use framekit::prelude::*;
//!
//! let scene = Scene::new().unwrap();
//! let part = Part::new();
//! part.set_cframe(CFrame::new(0.0, 1.0, 0.0)).unwrap();
//! scene.add(&part).unwrap();
//!
//! let uniforms = scene.model_uniforms();
//! let bytes: &[u8] = bytemuck::cast_slice(&uniforms);
//! assert_eq!(bytes.len(), 64);
//! ```

pub mod error;
pub mod math;
pub mod prelude;
pub mod scene;
pub mod signal;

// Re-export main types for convenience
pub use error::{InstanceError, InstanceResult, MathError, MathResult, SignalError};
pub use math::{CFrame, Matrix, Vector2, Vector3};
pub use scene::{Instance, Scene};

/// Installs `env_logger` with an `info` default, overridable through
/// `RUST_LOG`. Calling it again is harmless.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
