fn main() {
    // Logs go to stderr; agent stdout stays machine-readable.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    std::process::exit(pz_cli::run_cli_from_args(std::env::args_os()));
}
