use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Instrument, info, info_span, trace, warn};

use repclub_core::{
    CompletionAssistant, ImportExecutor, ImportProgress, ImportingStep, MappingStep,
    MemoryDestination, NoopAssistant, ResultsStep, UploadStep, WizardState,
};
use repclub_model::{Assistant, Destination, ModuleConfig, TenantContext};
use repclub_report::{
    ImportSummary, error_report_csv, summarize, template_csv, validation_report_csv, write_report,
};
use repclub_standards::ModuleRegistry;

use crate::cli::{ImportArgs, TemplateArgs};
use crate::config::{CliConfig, DEFAULT_STORE_FILE, DEFAULT_TENANT};
use crate::logging::redact_value;
use crate::summary::{modules_table, print_preview, print_summary};

/// How an import command ended.
#[derive(Debug)]
pub enum ImportOutcome {
    /// `--dry-run`: validated, nothing written.
    Previewed,
    Completed(ImportSummary),
}

/// Built-in modules plus `[import].modules_file` when configured.
pub fn load_registry(config: &CliConfig) -> Result<ModuleRegistry> {
    match &config.import.modules_file {
        Some(path) => ModuleRegistry::builtin_with_file(path)
            .with_context(|| format!("load modules from {}", path.display())),
        None => Ok(ModuleRegistry::builtin()),
    }
}

pub fn run_modules(registry: &ModuleRegistry) {
    println!("{}", modules_table(registry.modules()));
    println!("* required field");
}

pub fn run_template(registry: &ModuleRegistry, args: &TemplateArgs) -> Result<PathBuf> {
    let config = registry.require(&args.module)?;
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.template_file_name));
    let csv = template_csv(&config).context("build template")?;
    write_report(&path, &csv)?;
    println!("Template written to {}", path.display());
    Ok(path)
}

pub async fn run_import(
    args: &ImportArgs,
    config: &CliConfig,
    registry: &ModuleRegistry,
) -> Result<ImportOutcome> {
    let module = args
        .module
        .clone()
        .or_else(|| config.import.module.clone())
        .ok_or_else(|| anyhow!("no module given; pass --module or set [import].module"))?;
    let module_config = registry.require(&module)?;
    let span = info_span!("import", module = %module_config.module, file = %args.file.display());
    import_file(args, config, module_config).instrument(span).await
}

async fn import_file(
    args: &ImportArgs,
    config: &CliConfig,
    module_config: Arc<ModuleConfig>,
) -> Result<ImportOutcome> {
    let tenant = args
        .tenant
        .clone()
        .or_else(|| config.import.tenant.clone())
        .unwrap_or_else(|| DEFAULT_TENANT.to_string());
    let ctx = TenantContext::new(tenant);
    let store_path = args
        .store
        .clone()
        .or_else(|| config.import.store.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));
    let mut store = MemoryDestination::load(&store_path)?;
    // A single duplicate key identifies a record, so the store enforces it.
    if let [key] = module_config.duplicate_keys.as_slice() {
        store = store.with_unique_key(&module_config.table_name, key);
    }
    let store = Arc::new(store);
    let assistant = build_assistant(args.ai, config)?;

    let bytes =
        std::fs::read(&args.file).with_context(|| format!("read {}", args.file.display()))?;
    let mut mapping = UploadStep::new(Arc::clone(&module_config))
        .load(&bytes)
        .map_err(|rejected| rejected.into_error())
        .with_context(|| format!("load {}", args.file.display()))?;
    for warning in &mapping.data().errors {
        warn!("{warning}");
    }
    log_samples(&mapping);

    if assistant.is_enabled() {
        match mapping.refine_with_assistant(assistant.as_ref()).await {
            Ok(applied) => info!(applied = applied.len(), "assistant mapping applied"),
            Err(error) => {
                eprintln!("warning: assistant unavailable ({error}); using automatic mapping");
            }
        }
    }
    for entry in &args.map {
        mapping
            .mapping_mut()
            .set_manual(&entry.column, entry.field.as_deref())
            .with_context(|| format!("--map {}", entry.column))?;
    }

    let preview = mapping
        .validate(store.as_ref(), &ctx)
        .await
        .map_err(|rejected| rejected.into_error())
        .context("validate rows")?;
    print_preview(&preview);
    if let Some(path) = &args.validation_report {
        let csv = validation_report_csv(preview.validation())?;
        write_report(path, &csv)?;
    }
    if args.dry_run {
        info!("dry run; nothing written");
        return Ok(ImportOutcome::Previewed);
    }

    let importing = match preview.proceed() {
        WizardState::Duplicates(mut review) => {
            if let Some(resolution) = args.resolve.or(config.import.resolution) {
                review.resolver_mut().resolve_all(resolution);
            }
            for decision in &args.resolve_row {
                review
                    .resolver_mut()
                    .resolve(decision.row_index, decision.resolution)
                    .context("--resolve-row")?;
            }
            review.confirm()
        }
        WizardState::Importing(step) => {
            if !args.resolve_row.is_empty() {
                warn!("no duplicates were flagged; --resolve-row ignored");
            }
            step
        }
        other => bail!("unexpected wizard step after preview: {}", other.name()),
    };

    let destination: Arc<dyn Destination> = store.clone();
    let finished = execute(importing, destination, ctx).await?;
    store
        .save(&store_path)
        .await
        .with_context(|| format!("save store {}", store_path.display()))?;

    let ai_summary = if assistant.is_enabled() {
        summarize(assistant.as_ref(), finished.result(), &module_config).await
    } else {
        None
    };
    let summary = ImportSummary::new(
        &module_config,
        finished.validation(),
        finished.result(),
        finished.auto_skipped(),
    )
    .with_ai_summary(ai_summary);
    print_summary(&summary);

    if let Some(path) = &args.error_report {
        write_report(path, &error_report_csv(finished.result())?)?;
        println!("Error report written to {}", path.display());
    }
    Ok(ImportOutcome::Completed(summary))
}

fn build_assistant(enabled: bool, config: &CliConfig) -> Result<Box<dyn Assistant>> {
    if !enabled {
        return Ok(Box::new(NoopAssistant));
    }
    let settings = config
        .assistant
        .as_ref()
        .ok_or_else(|| anyhow!("--ai needs an [assistant] section in the config file"))?
        .settings();
    Ok(Box::new(CompletionAssistant::new(settings)?))
}

fn log_samples(step: &MappingStep) {
    let Some(first) = step.data().rows.first() else {
        return;
    };
    for (column, value) in first.iter() {
        trace!(column, sample = redact_value(value), "first row");
    }
}

async fn execute(
    importing: ImportingStep,
    destination: Arc<dyn Destination>,
    ctx: TenantContext,
) -> Result<ResultsStep> {
    let total = importing.plan().len() as u64;
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("progress template")?
            .progress_chars("=> "),
    );
    let progress_bar = bar.clone();
    let mut executor = ImportExecutor::new(destination, ctx, importing.config())
        .with_progress_callback(Box::new(move |progress: ImportProgress| {
            progress_bar.set_position(progress.current as u64);
            progress_bar.set_message(progress.message);
        }));

    let results = importing
        .run(&mut executor)
        .await
        .map_err(|rejected| rejected.into_error())?;
    bar.finish_and_clear();
    Ok(results)
}

/// Exit status for a finished command: non-zero only when every submitted
/// row failed.
pub fn exit_code(outcome: &ImportOutcome) -> i32 {
    match outcome {
        ImportOutcome::Previewed => 0,
        ImportOutcome::Completed(summary) if summary.success => 0,
        ImportOutcome::Completed(_) => 1,
    }
}
