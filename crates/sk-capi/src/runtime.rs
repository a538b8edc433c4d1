//! Process-wide modeler, logging and library lifecycle

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::sync::OnceLock;

use sk_cad::{Modeler, ModelerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a RON configuration file
pub const CONFIG_ENV: &str = "SK_CONFIG";

static MODELER: OnceLock<Modeler> = OnceLock::new();
static VERSION: OnceLock<CString> = OnceLock::new();

/// The shared modeler, created with default settings on first use
pub(crate) fn modeler() -> &'static Modeler {
    MODELER.get_or_init(Modeler::new)
}

/// Install the stderr subscriber unless the host already has one
fn init_logging(default_filter: &str) {
    let installed = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if installed.is_err() {
        tracing::debug!("Global subscriber already set, leaving it in place");
    }
}

/// Build the modeler from `config` unless one already exists
fn install(config: ModelerConfig) -> bool {
    init_logging(&config.logging.filter);
    let installed = MODELER.set(Modeler::with_config(config)).is_ok();
    if installed {
        tracing::info!("solidkit {} initialized", env!("CARGO_PKG_VERSION"));
    } else {
        tracing::warn!("solidkit already initialized, configuration ignored");
    }
    installed
}

fn load_config(path: &Path) -> Option<ModelerConfig> {
    match ModelerConfig::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", path.display(), e);
            None
        }
    }
}

/// Version string of the library and its kernel
///
/// The returned string is static and must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn sk_version() -> *const c_char {
    VERSION
        .get_or_init(|| {
            let version = format!(
                "solidkit {} ({})",
                env!("CARGO_PKG_VERSION"),
                modeler().kernel().version()
            );
            CString::new(version).unwrap_or_default()
        })
        .as_ptr()
}

/// Initialize logging and the modeler
///
/// Reads the configuration file named by `SK_CONFIG` when set; an unreadable
/// file falls back to defaults. Calling it again has no effect.
#[unsafe(no_mangle)]
pub extern "C" fn sk_initialize() {
    let config = std::env::var_os(CONFIG_ENV)
        .and_then(|path| load_config(Path::new(&path)))
        .unwrap_or_default();
    install(config);
}

/// Initialize with an explicit configuration file
///
/// Returns `false` when the file cannot be loaded or the library was already
/// initialized.
///
/// # Safety
/// `path` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_initialize_with_config(path: *const c_char) -> bool {
    if path.is_null() {
        return false;
    }
    let path = unsafe { CStr::from_ptr(path) };
    let Ok(path) = path.to_str() else {
        tracing::warn!("Configuration path is not valid UTF-8");
        return false;
    };

    match load_config(Path::new(path)) {
        Some(config) => install(config),
        None => false,
    }
}

/// Report leaked shapes
///
/// The kernel itself needs no teardown; shapes still alive are logged.
#[unsafe(no_mangle)]
pub extern "C" fn sk_cleanup() {
    let Some(modeler) = MODELER.get() else {
        return;
    };
    let live = modeler.live_shapes();
    if live > 0 {
        tracing::warn!("{} shape(s) still alive at cleanup", live);
    }
}

/// Number of shapes currently alive
#[unsafe(no_mangle)]
pub extern "C" fn sk_live_shape_count() -> i32 {
    i32::try_from(modeler().live_shapes()).unwrap_or(i32::MAX)
}
