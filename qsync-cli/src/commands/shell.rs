//! Shell command - interactive session with one controller.
//!
//! No logging is initialized here; stdout belongs to the conversation.

use tokio::io::{AsyncBufReadExt, BufReader};

use qsync::config::ConfigFile;
use qsync::session::{SessionClient, SessionEvent};

use crate::error::CliError;

/// Open an interactive session with the named controller.
///
/// Lines typed on stdin are sent as commands; controller responses are
/// printed as they arrive. `quit` or end-of-input closes the session.
pub fn run(config_path: &str, target_name: &str) -> Result<(), CliError> {
    let config = ConfigFile::load(config_path)?;
    let target = config
        .targets
        .iter()
        .find(|t| t.name == target_name)
        .cloned()
        .ok_or_else(|| CliError::UnknownTarget(target_name.to_string()))?;

    println!("Connecting to {} ({})...", target.name, target.addr());
    println!("Type commands to send; 'quit' to exit.");

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(async {
        let (handle, mut events) = SessionClient::spawn(target, config.session_config());

        let stdin = BufReader::new(tokio::io::stdin());
        let mut input = stdin.lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::Connected) => println!("-- connected"),
                    Some(SessionEvent::LoginFailed) => println!("-- login rejected"),
                    Some(SessionEvent::Disconnected) => println!("-- disconnected"),
                    Some(SessionEvent::Response(line)) => println!("{line}"),
                    // Session task is gone; nothing more will arrive.
                    None => break,
                },
                line = input.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line == "quit" {
                            handle.close().await;
                            stdin_open = false;
                        } else if !line.is_empty() {
                            handle.send_raw(line).await;
                        }
                    }
                    Ok(None) | Err(_) => {
                        handle.close().await;
                        stdin_open = false;
                    }
                },
            }
        }
    });

    // Stdin's blocking read may still be parked waiting for input; a plain
    // drop of the runtime would wait on it.
    runtime.shutdown_background();

    Ok(())
}
