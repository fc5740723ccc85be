//! Build command implementation

use crate::BuildArgs;
use crate::project::{self, report};
use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use wristkit_build::{BuildOptions, CommandCompiler, ProjectBuilder};
use wristkit_stream::{PipelineRuntime, RuntimeConfig, format_size};

/// Run the build command.
///
/// An invalid project is reported through its diagnostics and exits with
/// 1. A toolchain failure is reported on its own and exits with 2.
pub fn run(args: BuildArgs, colors: bool) -> Result<ExitCode> {
    let project = project::load(args.path.as_deref(), args.targets_file.as_deref())?;
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| project.root.join("build"));

    println!(
        "Building {} in: {}",
        project.config.name,
        project.root.display()
    );

    let mut runtime_config = RuntimeConfig::new();
    if let Some(jobs) = args.jobs {
        runtime_config = runtime_config.with_worker_threads(jobs);
    }
    let runtime = PipelineRuntime::new(runtime_config).context("Failed to start runtime")?;

    let compiler = CommandCompiler::new(&args.compiler).with_args(args.compiler_args);
    let options = BuildOptions {
        merge_capacity: runtime.config().merge_capacity,
        ..BuildOptions::default()
    };
    let builder = ProjectBuilder::new(
        &project.root,
        project.config,
        project.targets,
        Arc::new(compiler),
    )
    .with_options(options);

    tracing::debug!(
        output = %output_dir.display(),
        compiler = %args.compiler.display(),
        "starting build"
    );
    let result = runtime.block_on_interruptible(builder.build_to(&output_dir));
    report(builder.diagnostics(), colors)?;
    let (output, path) = match result {
        Ok(done) => done,
        Err(err) => {
            let line = if err.is_project_error() {
                "Build failed".to_string()
            } else {
                format!("Build aborted: {err}")
            };
            if colors {
                eprintln!("{}", line.red().bold());
            } else {
                eprintln!("{line}");
            }
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    println!("\n✓ Build successful!");
    println!("Build id: {}", output.build_id);
    println!(
        "Output: {} ({})",
        path.display(),
        format_size(output.package.len() as u64)
    );
    Ok(ExitCode::SUCCESS)
}
