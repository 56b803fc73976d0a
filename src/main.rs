mod tui;

use std::fs::File;
use std::path::Path;

use clap::Parser;
use dialoguer::{theme::ColorfulTheme, Select};
use env_logger::{Builder, Env, Target};

use tui::app::{self, ExitCode, HeadlessLimits};
use tui::audio;
use tui::cli::{Args, Commands, Config};
use tui::error::AppResult;

/// Set up logging; the live view owns the terminal, so its logs go to a file or nowhere
fn init_logging(log_file: Option<&Path>, to_stderr: bool) -> AppResult<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    match log_file {
        Some(path) => {
            builder.target(Target::Pipe(Box::new(File::create(path)?)));
        }
        None if !to_stderr => {
            builder.target(Target::Pipe(Box::new(std::io::sink())));
        }
        None => {}
    }
    builder.init();
    Ok(())
}

fn list_devices() -> AppResult<()> {
    let device_list = audio::list_input_devices()?;

    if device_list.is_empty() {
        println!("No audio input devices found.");
        return Ok(());
    }

    // Interactive selection
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select an audio input device")
        .items(&device_list)
        .default(0)
        .interact()?;

    println!("{}", device_list[selection]);

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match args.command {
        Commands::View(view_args) => {
            if let Err(e) = init_logging(view_args.log_file.as_deref(), false) {
                eprintln!("Failed to open log file: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }

            let config = match Config::from_view_args(&view_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };

            // Handle exit codes appropriately
            match app::App::new_with_config(config) {
                Ok(app) => {
                    let run_result = app.run().await;
                    match run_result.result {
                        Ok(_) => {
                            std::process::exit(run_result.exit_code as i32);
                        }
                        Err(e) => {
                            eprintln!("Application error: {}", e);
                            std::process::exit(ExitCode::Error as i32);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Setup error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            }
        }
        Commands::Path(path_args) => {
            if let Err(e) = init_logging(None, true) {
                eprintln!("Failed to set up logging: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }

            let config = match Config::from_path_args(&path_args) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            };

            let limits = HeadlessLimits {
                seconds: path_args.seconds,
                frames: path_args.frames,
            };
            match app::run_headless(config, limits, path_args.colors).await {
                Ok(count) => {
                    log::info!("Wrote {} paths", count);
                    std::process::exit(ExitCode::Success as i32);
                }
                Err(e) => {
                    eprintln!("Error during capture: {}", e);
                    std::process::exit(ExitCode::Error as i32);
                }
            }
        }
        Commands::List(_) => {
            if let Err(e) = init_logging(None, true).and_then(|_| list_devices()) {
                eprintln!("Error listing devices: {}", e);
                std::process::exit(ExitCode::Error as i32);
            }
        }
    }
}
