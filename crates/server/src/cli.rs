// crates/server/src/cli.rs
//! Command-line and environment configuration for the server binary.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;
use sharp_web_core::config::{DEFAULT_MAX_GENERATIONS, DEFAULT_OUTPUT_DIR};
use sharp_web_core::{GeneratorConfig, JobDirPolicy};

/// Default port for the server.
pub const DEFAULT_PORT: u16 = 7880;

/// Local web front-end for the SHARP image-to-splat generator.
#[derive(Debug, Clone, Parser)]
#[command(name = "sharp-web", version, about)]
pub struct Cli {
    /// Address to bind.
    #[arg(long, env = "SHARP_WEB_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(long, env = "SHARP_WEB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Output root holding one folder per job [default: ./generated_splats]
    #[arg(long, env = "SHARP_WEB_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory with viewer.html and its scripts [default: ./assets]
    #[arg(long, env = "SHARP_WEB_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Front-end bundle served for every non-API path [default: ./dist if present]
    #[arg(long, env = "SHARP_WEB_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Generator executable.
    #[arg(long, env = "SHARP_BIN", default_value = "sharp")]
    pub sharp_bin: String,

    /// Extra argument placed before `predict`; repeatable.
    #[arg(long = "sharp-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub sharp_args: Vec<String>,

    /// Job folders kept before the oldest are deleted.
    #[arg(long, env = "SHARP_WEB_MAX_GENERATIONS", default_value_t = DEFAULT_MAX_GENERATIONS)]
    pub max_generations: usize,

    /// Give every job its own folder instead of reusing `<image name>/`.
    #[arg(long, env = "SHARP_WEB_UNIQUE_JOB_DIRS")]
    pub unique_job_dirs: bool,

    /// Request body limit for uploads, in MiB.
    #[arg(long, default_value_t = 256)]
    pub max_upload_mb: usize,

    /// Open the browser once the server is listening.
    #[arg(long)]
    pub open: bool,
}

impl Cli {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn generator_config(&self, cwd: &Path) -> GeneratorConfig {
        let output_root = resolve(cwd, self.output_dir.as_deref(), DEFAULT_OUTPUT_DIR);
        let policy = if self.unique_job_dirs {
            JobDirPolicy::Unique
        } else {
            JobDirPolicy::BaseName
        };
        GeneratorConfig::new(output_root)
            .with_max_generations(self.max_generations)
            .with_job_dir_policy(policy)
    }

    pub fn assets_dir(&self, cwd: &Path) -> PathBuf {
        resolve(cwd, self.assets_dir.as_deref(), "assets")
    }

    /// Priority:
    /// 1. `--static-dir` / SHARP_WEB_STATIC_DIR
    /// 2. ./dist directory (if it exists)
    /// 3. None (API-only mode)
    pub fn static_dir(&self, cwd: &Path) -> Option<PathBuf> {
        match &self.static_dir {
            Some(dir) => Some(cwd.join(dir)),
            None => {
                let dist = cwd.join("dist");
                dist.is_dir().then_some(dist)
            }
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Relative paths resolve against `cwd`; absolute ones pass through.
fn resolve(cwd: &Path, configured: Option<&Path>, default: &str) -> PathBuf {
    cwd.join(configured.unwrap_or_else(|| Path::new(default)))
}
