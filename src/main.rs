use anyhow::Context;
use std::path::PathBuf;
use tinyg_control::shell::{self, Reply, ShellCommand};
use tinyg_control::{init_logging, Config, TinyGController, BUILD_DATE, VERSION};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("tinyg-control {} (built {})", VERSION, BUILD_DATE);

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load_or_default(path.as_deref()).context("Failed to load configuration")?;
    if config.spindle.is_some() {
        tracing::warn!("Spindle settings present but no drive is built in; running without spindle");
    }

    let controller = TinyGController::serial(config);
    controller
        .open()
        .await
        .with_context(|| format!("Failed to open {}", controller.config().serial.port))?;
    println!("Connected. Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
            line = lines.next_line() => line.context("Failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };

        match shell::execute(&controller, ShellCommand::parse(&line)).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Continue(Some(output))) => println!("{}", output),
            Ok(Reply::Continue(None)) => {}
            Err(e) => eprintln!("error: {}", e),
        }
    }

    controller.close().await?;
    Ok(())
}
