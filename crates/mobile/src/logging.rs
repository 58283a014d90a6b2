use std::panic::PanicHookInfo;
use std::sync::Once;

use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt::format::Format;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[cfg(target_os = "android")]
const LOG_TAG: &str = "SpotMap-Rust";

/// Routes `tracing` output to logcat on Android and stderr elsewhere.
/// Call once at startup from Kotlin/Swift; repeated calls are ignored.
#[uniffi::export]
pub fn init_logging() {
    static LOGGING_SETUP: Once = Once::new();

    LOGGING_SETUP.call_once(|| {
        #[cfg(target_os = "android")]
        let writer = {
            use tracing_logcat::{LogcatMakeWriter, LogcatTag};

            match LogcatMakeWriter::new(LogcatTag::Fixed(LOG_TAG.to_owned())) {
                Ok(writer) => writer,
                Err(error) => {
                    eprintln!("failed to initialize logcat writer: {error}");
                    return;
                }
            }
        };
        #[cfg(not(target_os = "android"))]
        let writer = std::io::stderr;

        let filter = FilterFn::new(|metadata| {
            metadata
                .module_path()
                .unwrap_or_default()
                .starts_with("spot_map")
        });
        let layer = tracing_subscriber::fmt::layer()
            .event_format(Format::default().with_level(true).without_time())
            .with_writer(writer)
            .with_ansi(false);

        let installed = tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
            .is_ok();

        // test binaries keep the default hook
        if installed && cfg!(not(test)) {
            std::panic::set_hook(Box::new(panic_hook));
        }
    })
}

fn panic_hook(info: &PanicHookInfo) {
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("{info}\n{backtrace}");
}

/// Panic reporting without a tracing subscriber. Not needed after
/// [`init_logging`].
#[uniffi::export]
pub fn init_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        eprintln!("=== RUST PANIC ===");
        eprintln!("{panic_info}");
        eprintln!("Backtrace:\n{backtrace}");
        eprintln!("=== END PANIC ===");
    }));
}
