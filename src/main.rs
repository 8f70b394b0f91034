//! artefact-mirror CLI entrypoint.
//!
//! Loads the YAML configuration, prepares the staging directory and mirrors
//! every configured artefact. Per-file failures are logged and summarised;
//! only configuration and staging problems end the process with an error.

use artefact_mirror::cli::Cli;
use artefact_mirror::config::Config;
use artefact_mirror::error::Result;
use artefact_mirror::pipeline::MirrorPipeline;
use artefact_mirror::report::RunReport;
use artefact_mirror::staging::StagingArea;
use artefact_mirror::transport::http::HttpClient;
use clap::Parser;
use log::{debug, info, warn};
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    init_logging(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run(&cli), &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli, stderr: &mut dyn Write) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().as_str()));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if let Err(err) = installed {
        write_stderr_line(stderr, format_args!("logging unavailable: {err}"));
    }
}

fn run(cli: &Cli) -> Result<RunReport> {
    let mut config = Config::load(&cli.config)?;
    cli.apply_to(&mut config.settings);
    config.validate()?;
    debug!("Configuration: {config:?}");

    let staging = StagingArea::prepare(&config.settings)?;
    info!(
        "Staging files in {}{}",
        staging.root(),
        if staging.is_transient() { " (temporary)" } else { "" }
    );

    let client = HttpClient::new();
    let report = MirrorPipeline::new(&config, &client, staging.root())?.run(&config.artifacts);
    info!("{report}");

    if let Err(err) = staging.close() {
        warn!("{err}");
    }
    Ok(report)
}

fn exit_code_for_run_result(result: Result<RunReport>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artefact_mirror::error::MirrorError;
    use camino::Utf8PathBuf;
    use std::fs;

    #[test]
    fn completed_run_exits_zero() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(RunReport::default()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn configuration_error_prints_and_exits_one() {
        let err = MirrorError::MissingUrl { endpoint: "download" };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("download endpoint has no url"));
    }

    #[test]
    fn missing_configuration_file_is_fatal() {
        let cli = Cli::parse_from(["artefact-mirror", "/nonexistent/mirror.yaml"]);
        let err = run(&cli).expect_err("missing file should fail");
        assert!(matches!(err, MirrorError::ConfigRead { .. }));
    }

    #[test]
    fn dry_run_with_no_artefacts_completes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 path");
        let path = root.join("mirror.yaml");
        fs::write(
            &path,
            concat!(
                "download: { url: 'http://127.0.0.1:9/maven' }\n",
                "upload: { url: 'http://127.0.0.1:9/maven' }\n",
            ),
        )
        .expect("write config");
        let cli = Cli::parse_from(["artefact-mirror", "--dry-run", path.as_str()]);

        let report = run(&cli).expect("run should complete");

        assert!(report.artefacts.is_empty());
    }
}
