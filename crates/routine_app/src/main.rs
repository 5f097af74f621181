use chrono::Local;
use routine_app::app::{cli, run, Action, AppConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = AppConfig::from_env().unwrap_or_default();
    let result = Action::from_matches(&matches)
        .and_then(|action| run(&config, action, Local::now().naive_local()));
    match result {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("routine: {err:#}");
            std::process::exit(1);
        }
    }
}
