//! `stencil render`: render template trees into a target directory.

use stencil_adapters::{LocalFilesystem, MiniJinjaRenderer};
use stencil_core::{
    application::ScaffoldService,
    domain::{ScaffoldJob, TemplateSuffix},
    error::StencilError,
};
use tracing::{debug, info, instrument};

use crate::{
    cli::{GlobalArgs, RenderArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    prompt,
};

/// Build the job from flags and config, then run it.
#[instrument(skip_all, fields(target = %args.target.display()))]
pub fn execute(
    args: RenderArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let job = build_job(args, &config)?;
    debug!(
        sources = job.source_roots().len(),
        policy = %job.existing_policy(),
        "Job built"
    );

    let service = ScaffoldService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(MiniJinjaRenderer::new()?),
        prompt::for_policy(job.existing_policy()),
        Box::new(output.reporter()),
    );

    let summary = service.render_structure(&job)?;
    info!(
        run_id = %summary.run_id(),
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        rejected = summary.rejected,
        "Render finished"
    );

    output.summary(&summary)?;
    Ok(())
}

/// Merge flags over config. Flags win; ignore patterns are combined.
fn build_job(args: RenderArgs, config: &AppConfig) -> CliResult<ScaffoldJob> {
    let policy = args
        .existing
        .map(Into::into)
        .unwrap_or(config.render.existing);

    let suffix = if args.all_templates {
        TemplateSuffix::All
    } else {
        TemplateSuffix::new(
            args.suffix
                .as_deref()
                .unwrap_or(&config.render.template_suffix),
        )
    };

    let mut builder = ScaffoldJob::builder()
        .source_roots(args.sources)
        .target_root(args.target)
        .variables(args.defines)
        .existing_policy(policy)
        .overwrite_target_root(args.overwrite_root)
        .template_suffix(suffix);

    if !args.no_default_ignores {
        builder = builder
            .ignore_files(config.render.ignored_files.iter().cloned())
            .ignore_dirs(config.render.ignored_dirs.iter().cloned());
    }

    builder
        .ignore_files(args.ignore_files)
        .ignore_dirs(args.ignore_dirs)
        .build()
        .map_err(|e| StencilError::from(e).into())
}
