use clap::{Args, Parser, Subcommand};
use intake_core::{
    resolve_output_dir, Catalog, CoreConfig, DiagnosisKind, DiagnosisSelection, FlagTierOdds,
    GeneratedDocument, IntakeService, OutputFormat, Probability,
};
use intake_core::constants::OUTPUT_DIR_ENV;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Synthetic clinical intake document generator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate hospital admission assessments
    Admission(GenerateArgs),
    /// Generate medication-order sheets
    Orders(GenerateArgs),
    /// Print one admission record as JSON without writing a document
    Inspect(RecordArgs),
    /// Validate the built-in catalog and print a summary
    CheckCatalog,
}

/// Options that shape the generated records.
#[derive(Args)]
struct RecordArgs {
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Force one diagnosis bundle (cardiac, respiratory, neuro, sepsis)
    #[arg(long)]
    diagnosis: Option<DiagnosisKind>,
    /// Probability (0-1) that a critical flag is drawn
    #[arg(long)]
    critical_flag_odds: Option<Probability>,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    record: RecordArgs,
    /// Directory for generated documents
    #[arg(long, env = OUTPUT_DIR_ENV)]
    output_dir: Option<PathBuf>,
    /// File name for the document (single document only)
    #[arg(long)]
    file_name: Option<String>,
    /// Output format: pdf or markdown
    #[arg(long, default_value = "pdf")]
    format: OutputFormat,
    /// Number of documents to generate
    #[arg(long, default_value_t = 1)]
    count: usize,
}

impl RecordArgs {
    fn apply(&self, cfg: CoreConfig) -> CoreConfig {
        let mut cfg = cfg.with_seed(self.seed);
        if let Some(kind) = self.diagnosis {
            cfg = cfg.with_diagnosis(DiagnosisSelection::Fixed(kind));
        }
        if let Some(critical) = self.critical_flag_odds {
            cfg = cfg.with_flag_odds(FlagTierOdds {
                critical,
                ..FlagTierOdds::default()
            });
        }
        cfg
    }
}

impl GenerateArgs {
    fn config(&self) -> anyhow::Result<CoreConfig> {
        if self.count == 0 {
            anyhow::bail!("--count must be at least 1");
        }
        if self.file_name.is_some() && self.count > 1 {
            anyhow::bail!("--file-name can only be used when generating a single document");
        }
        let cfg = CoreConfig::new(resolve_output_dir(self.output_dir.clone()))?
            .with_output_format(self.format);
        Ok(self.record.apply(cfg))
    }
}

fn report(generated: &GeneratedDocument) {
    println!(
        "{} -> {} ({}, {} bytes, sha256 {})",
        generated.document_id,
        generated.artifact.path.display(),
        generated.media_type,
        generated.artifact.size_bytes,
        generated.artifact.sha256
    );
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let now = chrono::Local::now().naive_local();

    match cli.command {
        Some(Commands::Admission(args)) => {
            let service = IntakeService::new(Arc::new(args.config()?))?;
            for index in 0..args.count {
                let generated = service.write_admission(args.file_name.as_deref(), now, index)?;
                report(&generated);
            }
        }
        Some(Commands::Orders(args)) => {
            let service = IntakeService::new(Arc::new(args.config()?))?;
            for index in 0..args.count {
                let generated = service.write_orders(args.file_name.as_deref(), now, index)?;
                report(&generated);
            }
        }
        Some(Commands::Inspect(args)) => {
            let cfg = args.apply(CoreConfig::new(resolve_output_dir(None))?);
            let service = IntakeService::new(Arc::new(cfg))?;
            println!("{}", service.inspect(now)?);
        }
        Some(Commands::CheckCatalog) => {
            let summary = Catalog::builtin()?.validate()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        None => {
            println!("Use 'intake --help' for commands");
        }
    }

    Ok(())
}
