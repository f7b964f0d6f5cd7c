//! Command handlers

use std::path::Path;
use std::time::Duration;

use crate::cli::{Cli, Commands};
use crate::output::{output_result, output_task_ids};
use fixbrain_app::config::Config;
use fixbrain_app::repository::open_task_store;
use fixbrain_app::{AgentError, DiagnosisAgent, DiagnosisRequest};
use fixbrain_types::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Content type for a local image, from its extension
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            fixbrain_api::serve(&config).await
        }

        Commands::Analyze {
            image,
            task_id,
            appliance,
            problem,
        } => {
            let content_type = guess_content_type(&image).ok_or_else(|| {
                Error::InvalidImage(format!("{} does not look like an image file", image.display()))
            })?;
            let bytes = std::fs::read(&image)?;
            debug!(content_type, bytes = bytes.len(), "read image");

            let agent = DiagnosisAgent::from_config(&config)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Diagnosing {}...", image.display()));
            spinner.enable_steady_tick(Duration::from_millis(100));

            let outcome = agent
                .run(DiagnosisRequest {
                    task_id: &task_id,
                    appliance_type: &appliance,
                    problem_description: &problem,
                    image_bytes: &bytes,
                })
                .await;
            spinner.finish_and_clear();

            let result = outcome.map_err(AgentError::into_inner)?;
            output_result(cli.format, &result)
        }

        Commands::Show { task_id } => {
            let tasks = open_task_store(&config)?;
            let result = tasks
                .load(&task_id)?
                .ok_or(Error::TaskNotFound(task_id))?;
            output_result(cli.format, &result)
        }

        Commands::List => {
            let tasks = open_task_store(&config)?;
            output_task_ids(cli.format, &tasks.task_ids()?)
        }

        Commands::Config => {
            println!("{}", config);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a/photo.JPG")), Some("image/jpeg"));
        assert_eq!(guess_content_type(Path::new("scan.png")), Some("image/png"));
        assert_eq!(guess_content_type(Path::new("notes.txt")), None);
        assert_eq!(guess_content_type(Path::new("no_extension")), None);
    }
}
