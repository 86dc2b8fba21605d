//! Lamp Configurator - headless demo
//!
//! Loads a lamp manifest, replays a timed action script against it with
//! simulated asset latency and logs the resulting configurator state.

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Lamp Configurator - headless demo");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = lamp_configurator::app::run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }

    log::info!("Done");
}
