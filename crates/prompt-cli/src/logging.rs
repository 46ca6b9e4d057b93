use std::io::Write;

/// Initialise env_logger on stderr so stdout stays clean for results.
///
/// An explicit `filter` (from `--log-level` or `RUST_LOG`) wins; otherwise
/// `debug` selects the default level.
pub fn init_logging(debug: bool, filter: Option<&str>) {
    let default_filter = if debug { "debug" } else { "warn" };
    let filter = filter.unwrap_or(default_filter);

    env_logger::Builder::new()
        .parse_filters(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
