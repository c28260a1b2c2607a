/// Lumen3D Engine - Singleton manager for engine-wide services
///
/// This module provides global access to the logger and to the active render
/// backend. The backend is the collaborator every Frustum asks to convert its
/// projection matrix into the GPU's depth-range convention. It uses
/// thread-safe static storage with RwLock for safe concurrent access.

use std::sync::{OnceLock, RwLock, Arc};
use std::time::SystemTime;
use crate::renderer::RenderBackend;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Shared handle to the active render backend
pub type SharedRenderBackend = Arc<dyn RenderBackend + Send + Sync>;

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Active render backend (None = standard GL-style matrices are used as-is)
    render_backend: RwLock<Option<SharedRenderBackend>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            render_backend: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use lumen_3d_engine::lumen3d::{Engine, Direct3dConvention};
///
/// Engine::initialize()?;
/// Engine::set_render_backend(Direct3dConvention)?;
///
/// // Every Frustum now caches a D3D-style projection matrix alongside
/// // the standard one.
///
/// Engine::shutdown();
/// # Ok::<(), lumen_3d_engine::lumen3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("lumen3d::Engine", "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine
    ///
    /// Idempotent. Must be called before registering a render backend.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        crate::engine_debug!("lumen3d::Engine", "Engine initialized");
        Ok(())
    }

    /// Returns true once `initialize()` has been called
    pub fn is_initialized() -> bool {
        ENGINE_STATE.get().is_some()
    }

    /// Shutdown the engine and drop all singletons
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut backend) = state.render_backend.write() {
                *backend = None;
            }
        }
    }

    // ===== RENDER BACKEND API =====

    /// Register the render backend singleton
    ///
    /// Frustums created afterwards (and existing ones, on their next projection
    /// update) convert their projection matrix through this backend.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A render backend is already registered
    pub fn set_render_backend<B: RenderBackend + Send + Sync + 'static>(backend: B) -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.render_backend.write()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Render backend lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("Render backend already exists. Call Engine::destroy_render_backend() first.".to_string())
            ));
        }

        let name = backend.name().to_string();
        *lock = Some(Arc::new(backend));

        crate::engine_info!("lumen3d::Engine", "Render backend '{}' registered", name);

        Ok(())
    }

    /// Get the active render backend, if any
    ///
    /// Never fails: a missing engine or backend simply means the standard
    /// projection matrix is used unmodified.
    pub fn render_backend() -> Option<SharedRenderBackend> {
        let state = ENGINE_STATE.get()?;
        let lock = state.render_backend.read().ok()?;
        lock.clone()
    }

    /// Remove the render backend singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn destroy_render_backend() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.render_backend.write()
            .map_err(|_| Self::log_and_return_error(
                Error::InitializationFailed("Render backend lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("lumen3d::Engine", "Render backend destroyed");

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut backend) = state.render_backend.write() {
                *backend = None;
            }
        }
    }

    // ===== LOGGING API =====

    fn logger() -> &'static RwLock<Box<dyn Logger>> {
        LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
    }

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// capture logger in tests, etc.)
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = Self::logger().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger at INFO)
    pub fn reset_logger() {
        if let Ok(mut lock) = Self::logger().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = Self::logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = Self::logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
