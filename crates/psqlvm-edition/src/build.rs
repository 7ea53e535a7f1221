//! Extraction and the native configure/make sequence.

use async_trait::async_trait;
use flate2::read::GzDecoder;
use psqlvm_config::BuildConfig;
use psqlvm_core::{CommandRunner, Error, Fix, OutputLine, Result};
use psqlvm_ui::Output;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;
use tar::Archive;
use tracing::{debug, info};

/// Runs the external build steps for an edition.
#[async_trait]
pub trait BuildDriver: Send + Sync {
    /// Unpack `archive` into `dest_dir`.
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()>;

    /// Run `./configure` in `source_dir`.
    async fn configure(&self, source_dir: &Path) -> Result<()>;

    /// Build each target in order, stopping at the first failure.
    async fn build_targets(&self, source_dir: &Path, targets: &[String]) -> Result<()>;
}

/// Receives child output lines as they are produced.
pub type LineHandler = Arc<dyn Fn(&OutputLine) + Send + Sync>;

/// Build driver backed by `tar`/`flate2` and the system `make`.
#[derive(Clone)]
pub struct NativeBuildDriver {
    make: String,
    configure_args: Vec<String>,
    on_line: LineHandler,
}

impl fmt::Debug for NativeBuildDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBuildDriver")
            .field("make", &self.make)
            .field("configure_args", &self.configure_args)
            .finish_non_exhaustive()
    }
}

impl NativeBuildDriver {
    /// Create a driver from the `[build]` settings, streaming to `output`.
    pub fn new(build: &BuildConfig, output: Output) -> Self {
        Self {
            make: build.make.clone(),
            configure_args: build.configure_args.clone(),
            on_line: Arc::new(move |line: &OutputLine| output.child_line(line)),
        }
    }

    /// Send child output somewhere other than the terminal.
    pub fn with_line_handler(mut self, handler: LineHandler) -> Self {
        self.on_line = handler;
        self
    }

    async fn run_step(
        &self,
        source_dir: &Path,
        target: &str,
        program: &str,
        args: Vec<String>,
    ) -> Result<()> {
        debug!(target, dir = %source_dir.display(), "running build step");
        let handler = Arc::clone(&self.on_line);
        let output = CommandRunner::new()
            .with_working_dir(source_dir)
            .run_streaming(program.to_string(), args, move |line| handler(&line))
            .await
            .map_err(|e| match e {
                Error::ToolMissing { tool, fixes, .. } => Error::Build {
                    target: target.to_string(),
                    exit_code: None,
                    source_dir: source_dir.to_path_buf(),
                    fixes: if fixes.is_empty() {
                        vec![Fix::new(format!("Install `{}`", tool))]
                    } else {
                        fixes
                    },
                },
                other => other,
            })?;

        if !output.success() {
            return Err(Error::Build {
                target: target.to_string(),
                exit_code: Some(output.exit_code),
                source_dir: source_dir.to_path_buf(),
                fixes: vec![Fix::new(format!(
                    "Fix the problem and re-run `{}` in {}",
                    if target == "configure" {
                        "./configure".to_string()
                    } else {
                        format!("{} -C {}", self.make, target)
                    },
                    source_dir.display()
                ))],
            });
        }

        info!(
            target,
            duration_ms = output.duration.as_millis() as u64,
            "build step finished"
        );
        Ok(())
    }
}

#[async_trait]
impl BuildDriver for NativeBuildDriver {
    async fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let archive = archive.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();
        debug!("Extracting {} to {}", archive.display(), dest_dir.display());

        let task_archive = archive.clone();
        tokio::task::spawn_blocking(move || unpack_tar_gz(&task_archive, &dest_dir))
            .await
            .map_err(|e| Error::Extraction {
                archive: archive.clone(),
                source: io::Error::other(e),
            })?
            .map_err(|source| Error::Extraction { archive, source })
    }

    async fn configure(&self, source_dir: &Path) -> Result<()> {
        let script = source_dir.join("configure");
        if !script.is_file() {
            return Err(Error::Build {
                target: "configure".into(),
                exit_code: None,
                source_dir: source_dir.to_path_buf(),
                fixes: vec![Fix::new(
                    "The source tree has no configure script; the archive may be incomplete",
                )],
            });
        }

        self.run_step(
            source_dir,
            "configure",
            &script.to_string_lossy(),
            self.configure_args.clone(),
        )
        .await
    }

    async fn build_targets(&self, source_dir: &Path, targets: &[String]) -> Result<()> {
        for target in targets {
            self.run_step(
                source_dir,
                target,
                &self.make,
                vec!["-C".to_string(), target.clone()],
            )
            .await?;
        }
        Ok(())
    }
}

/// Unpack a `.tar.gz` archive.
pub fn unpack_tar_gz(archive: &Path, dest_dir: &Path) -> io::Result<()> {
    let file = File::open(archive)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let mut tar = Archive::new(decoder);
    tar.set_preserve_permissions(true);
    tar.unpack(dest_dir)
}
