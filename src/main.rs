use read::JsonLedgers;
use shell::Shell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

mod compute;
mod data;
mod format;
mod read;
mod shell;
mod write;

fn main() -> Result<(), anyhow::Error> {
    // Diagnostics go to stderr so they never interleave with the menu.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                ),
        )
        .init();

    let ledgers = JsonLedgers::new(std::env::current_dir()?);
    let stdin = std::io::stdin();
    let mut shell = Shell::new(ledgers, stdin.lock(), std::io::stdout(), || {
        chrono::Local::now().date_naive()
    });
    shell.run()?;
    Ok(())
}
