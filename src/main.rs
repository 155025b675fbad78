use tracing_subscriber::EnvFilter;

fn main() -> Result<(), lmdemo::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = lmdemo::Config::from_env()?;
    let stdout = std::io::stdout();
    lmdemo::demo::run(&config, &mut stdout.lock())
}
