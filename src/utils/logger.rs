use colored::Colorize;
use env_logger::Builder;
use log::Level;
use std::io::Write;

/// Init the global logger once. Crate logs at Info (Debug when `verbose`), dependencies at Warn.
/// `RUST_LOG` still applies on top.
pub fn setup_logging(verbose: bool) {
    use log::LevelFilter;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = match record.level() {
                        Level::Warn => "WARN".yellow(),
                        _ => "ERROR".red(),
                    };
                    let target = record.target().to_string().white();
                    format!("[{} {} {}] {}", name.cyan(), level_str, target, record.args())
                }
                _ => {
                    let thread = std::thread::current();
                    let thread_name = thread.name().unwrap_or("?");
                    format!("[{} {}] {}", name.cyan(), thread_name.dimmed(), record.args())
                }
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
