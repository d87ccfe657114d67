use std::path::Path;
use std::sync::Arc;

use stylereplicator::{
    capture::{camera::NoCamera, capture_file, CameraConstraints, CameraSession},
    error::CaptureError,
    logger::{self, LoggerConfig},
    view::{render, Body, Exporter, Slot, View},
    Config, EncodedImage, GeminiClient, Session, Step, StyleError,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = Config::from_env();
    logger::init_with_config(LoggerConfig::new().with_level(config.log_level))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }
    logger::log_config_info(&config);

    let client = match GeminiClient::new(config.gemini.clone()) {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ Failed to initialize Gemini client: {}", e);
            return Err(e.into());
        }
    };

    let mut session = Session::new(Arc::new(client));
    let exporter = Exporter::new(&config.output_dir);
    let mut camera: Option<CameraSession<NoCamera>> = None;

    println!("StyleReplicator: analyze any style, pose, or outfit instantly");
    show(&render(session.state()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        // Input stays live while a call runs so `reset` and `quit` can abort it.
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            Some(_) = session.settle(), if session.is_busy() => {
                show(&render(session.state()));
                continue;
            }
        };

        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        match command {
            "" => {}
            "quit" | "exit" => break,
            "reset" => session.reset(),
            "help" => print_help(session.state().step()),
            "file" => {
                let selection = (!argument.is_empty()).then(|| Path::new(argument));
                match capture_file(selection) {
                    Ok(image) => submit(&mut session, image),
                    Err(e) => println!("⚠️  {}", e),
                }
            }
            "paste" => match EncodedImage::from_data_url(argument) {
                Ok(image) => submit(&mut session, image),
                Err(e) => println!("⚠️  {}", e),
            },
            "camera" => {
                if let Err(e) = session.enter_capture_mode() {
                    println!("⚠️  {}", e);
                } else {
                    match CameraSession::start(NoCamera, &CameraConstraints::default()) {
                        Ok(live) => camera = Some(live),
                        Err(e) => {
                            println!("⚠️  {} Falling back to file upload.", e);
                            report(session.cancel_capture_mode());
                        }
                    }
                }
            }
            "snap" => {
                if !session.state().is_capture_mode_active() {
                    println!("⚠️  Camera is not active. Type 'camera' first.");
                } else {
                    let captured = camera
                        .take()
                        .ok_or(CaptureError::StreamClosed)
                        .and_then(CameraSession::capture);
                    match captured {
                        Ok(image) => submit(&mut session, image),
                        Err(e) => println!("⚠️  {}", StyleError::from(e)),
                    }
                }
            }
            "cancel" => {
                if let Some(live) = camera.take() {
                    live.cancel();
                }
                report(session.cancel_capture_mode());
            }
            "continue" => report(session.continue_to_source()),
            "back" => report(session.back()),
            "copy" => match exporter.save_prompt(session.state()) {
                Ok(path) => println!("📋 Prompt copied to {}", path.display()),
                Err(e) => println!("⚠️  {}", e),
            },
            "save" => {
                let saved = match argument {
                    "reference" => exporter.save_reference(session.state()),
                    "base" => exporter.save_source(session.state()),
                    _ => exporter.save_result(session.state()),
                };
                match saved {
                    Ok(path) => println!("💾 Saved {}", path.display()),
                    Err(e) => println!("⚠️  {}", e),
                }
            }
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }

        if !session.state().is_capture_mode_active() {
            camera = None;
        }
        show(&render(session.state()));
    }

    log::info!("👋 Session closed");
    Ok(())
}

/// Hands a captured image to whichever slot the current step fills. The
/// backend call it starts is settled by the input loop.
fn submit(session: &mut Session, image: EncodedImage) {
    let dispatched = match session.state().step() {
        Step::UploadSource => session.capture_source(image),
        _ => session.capture_reference(image),
    };
    if let Err(e) = dispatched {
        println!("⚠️  {}", e);
    }
}

fn report(result: Result<(), stylereplicator::WorkflowError>) {
    if let Err(e) = result {
        println!("⚠️  {}", e);
    }
}

fn show(view: &View) {
    println!();
    println!("[{}]", stepper(view.progress));
    if let Some(error) = &view.error {
        println!("❌ {}", error);
    }

    match &view.body {
        Body::Capture {
            slot,
            title,
            subtitle,
            camera,
            can_go_back,
        } => {
            println!("{}", title);
            println!("{}", subtitle);
            if *camera {
                println!("  snap    take the photo");
                println!("  cancel  back to file upload");
            } else {
                let noun = match slot {
                    Slot::Reference => "reference image",
                    Slot::Source => "your image",
                };
                println!("  file <path>       select {}", noun);
                println!("  paste <data-url>  use an image data URL");
                println!("  camera            take a photo with the camera");
                if *can_go_back {
                    println!("  back              go back to prompt");
                }
            }
        }
        Body::Loading { message } => {
            println!("⏳ {}", message);
            println!("  reset  abandon and start over");
        }
        Body::PromptReady { components, prompt } => {
            println!("Style Components");
            for (label, value) in components {
                println!("  {}: {}", label, value);
            }
            println!("Generated Style Prompt");
            println!("  \"{}\"", prompt);
            println!("  copy      copy the prompt");
            println!("  continue  restyle your own photo");
        }
        Body::Result {
            image,
            reference,
            source,
        } => {
            println!("✨ Restyled photo ready ({})", image.media_type());
            println!("  save            save the final result");
            if reference.is_some() {
                println!("  save reference  save the reference image");
            }
            if source.is_some() {
                println!("  save base       save the base photo");
            }
            println!("  reset           start over");
        }
    }
}

fn stepper(progress: usize) -> String {
    (1..=4)
        .map(|n| {
            if n == progress {
                format!("({})", n)
            } else {
                n.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" - ")
}

fn print_help(step: Step) {
    println!("Current step: {}", step);
    println!("Commands: file <path>, paste <data-url>, camera, snap, cancel, continue,");
    println!("          back, copy, save [reference|base], reset, quit");
}
