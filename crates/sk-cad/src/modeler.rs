//! The modeling facade
//!
//! A [`Modeler`] owns one kernel backend and the configuration it was built
//! with. The construction, primitive, boolean, tessellation and inspection
//! layers are `impl Modeler` blocks in their own modules.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::config::ModelerConfig;
use crate::kernel::{CadError, CadKernel, CadResult, Shape, kernel_from_config};

/// Facade over a B-Rep kernel
pub struct Modeler {
    kernel: Box<dyn CadKernel>,
    config: ModelerConfig,
}

impl Modeler {
    /// Create a modeler on the compiled-in kernel with default settings
    pub fn new() -> Self {
        Self::with_config(ModelerConfig::default())
    }

    /// Create a modeler on the compiled-in kernel
    pub fn with_config(config: ModelerConfig) -> Self {
        let kernel = kernel_from_config(&config.kernel);
        Self::with_kernel(kernel, config)
    }

    /// Create a modeler on an explicit backend
    pub fn with_kernel(kernel: Box<dyn CadKernel>, config: ModelerConfig) -> Self {
        tracing::debug!("Modeler using {} ({})", kernel.name(), kernel.version());
        Self { kernel, config }
    }

    pub fn kernel(&self) -> &dyn CadKernel {
        self.kernel.as_ref()
    }

    pub fn config(&self) -> &ModelerConfig {
        &self.config
    }

    /// Release a shape handle
    ///
    /// Returns `false` when the handle was already gone from the kernel.
    pub fn release(&self, shape: Shape) -> bool {
        let id = shape.id();
        let released = self.kernel.release(shape);
        if !released {
            tracing::warn!("Released unknown shape {}", id);
        }
        released
    }

    /// Number of shapes currently alive in the kernel
    pub fn live_shapes(&self) -> usize {
        self.kernel.live_shapes()
    }

    /// Run a kernel call, turning a panic inside the kernel into
    /// [`CadError::KernelFault`]
    ///
    /// This is the only place kernel panics are caught.
    pub(crate) fn delegate<T>(
        &self,
        op: &str,
        f: impl FnOnce(&dyn CadKernel) -> CadResult<T>,
    ) -> CadResult<T> {
        let kernel = self.kernel.as_ref();
        match panic::catch_unwind(AssertUnwindSafe(|| f(kernel))) {
            Ok(Ok(value)) => {
                tracing::debug!("{} succeeded", op);
                Ok(value)
            }
            Ok(Err(e)) => {
                tracing::warn!("{} failed: {}", op, e);
                Err(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("{} faulted in kernel: {}", op, message);
                Err(CadError::KernelFault(format!("{}: {}", op, message)))
            }
        }
    }
}

impl Default for Modeler {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{ErrorCategory, NullKernel};

    #[test]
    fn test_delegate_catches_panic() {
        let modeler = Modeler::with_kernel(Box::new(NullKernel), ModelerConfig::default());

        let result: CadResult<()> = modeler.delegate("explode", |_| panic!("boom"));
        let err = result.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Fault);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_delegate_passes_errors_through() {
        let modeler = Modeler::with_kernel(Box::new(NullKernel), ModelerConfig::default());

        let result = modeler.delegate("box", |k| k.make_box(glam::DVec3::ZERO, glam::DVec3::ONE));
        assert!(matches!(result, Err(CadError::KernelNotAvailable(_))));
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[cfg(feature = "truck")]
    #[test]
    fn test_release_tracks_live_shapes() {
        let modeler = Modeler::new();
        assert_eq!(modeler.kernel().name(), "truck");

        let shape = modeler
            .delegate("box", |k| k.make_box(glam::DVec3::ZERO, glam::DVec3::ONE))
            .unwrap();
        assert_eq!(modeler.live_shapes(), 1);
        assert!(modeler.release(shape));
        assert_eq!(modeler.live_shapes(), 0);
    }
}
