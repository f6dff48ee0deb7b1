use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use common::{
    config::{
        DEFAULT_CONTROL_FILE, DEFAULT_DAYS_PER_JOB, DEFAULT_JOB_PREFIX, DEFAULT_TIMEOUT_RETRIES,
        DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
    },
    inventory::{self, DEFAULT_HOURS, DEFAULT_PREFIX, DEFAULT_STEP_HOURS},
    parse_date, sorting, BatchConfig, BatchReport, Installation, SkippedJob,
};
use std::{fs, path::PathBuf};
use tracing::info;
use worker::{run_batch, BatchOutcome, ProcessRunner};

#[derive(Parser)]
#[command(name = "flexbatch")]
#[command(about = "Descarga por lotes con flex_extract: parte un rango de fechas en sub-jobs y los corre en paralelo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Arma y ejecuta (o sólo resume, con --dry-run) los sub-jobs del rango
    Run(RunArgs),

    /// Reporta los periodos sin archivos descargados en una carpeta
    Check {
        #[arg(long, value_name = "DIR", env = "FLEXBATCH_SEARCH_DIR")]
        dir: PathBuf,

        #[arg(long, value_parser = parse_date_arg)]
        start: NaiveDate,

        #[arg(long, value_parser = parse_date_arg)]
        end: NaiveDate,

        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Horas de cada día, separadas por coma
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_HOURS)]
        hours: Vec<u32>,

        /// Hueco máximo (en horas) dentro de un mismo periodo faltante
        #[arg(long, default_value_t = DEFAULT_STEP_HOURS)]
        step: i64,
    },

    /// Mueve los archivos descargados a carpetas por año
    SortYears {
        #[arg(long, value_name = "DIR")]
        dir: PathBuf,

        /// Carpeta destino; por defecto la misma que --dir
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Carpeta de instalación de flex_extract
    #[arg(long, value_name = "DIR", env = "FLEXBATCH_FLEX_EXTRACT_DIR")]
    flex_extract_dir: PathBuf,

    /// Nombre del CONTROL file dentro de Run/Control
    #[arg(long, env = "FLEXBATCH_CONTROL_FILE", default_value = DEFAULT_CONTROL_FILE)]
    control_file: String,

    /// Fecha de inicio (YYYYMMDD)
    #[arg(long, env = "FLEXBATCH_START_DATE", value_parser = parse_date_arg)]
    start: NaiveDate,

    /// Fecha de fin, inclusive (YYYYMMDD)
    #[arg(long, env = "FLEXBATCH_END_DATE", value_parser = parse_date_arg)]
    end: NaiveDate,

    #[arg(long, env = "FLEXBATCH_DAYS_PER_JOB", default_value_t = DEFAULT_DAYS_PER_JOB)]
    days_per_job: u32,

    /// Máximo de descargas en paralelo
    #[arg(long, env = "FLEXBATCH_WORKERS", default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    #[arg(long, value_name = "DIR", env = "FLEXBATCH_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Carpeta de logs por job; por defecto --output-dir
    #[arg(long, value_name = "DIR", env = "FLEXBATCH_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[arg(long, env = "FLEXBATCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Sin timeout por job
    #[arg(long)]
    no_timeout: bool,

    /// Reintentos cuando un job supera el timeout
    #[arg(long, env = "FLEXBATCH_RETRIES", default_value_t = DEFAULT_TIMEOUT_RETRIES)]
    retries: u32,

    /// Reintentar también los jobs que salen con código distinto de 0
    #[arg(long)]
    retry_on_failure: bool,

    #[arg(long, env = "FLEXBATCH_JOB_PREFIX", default_value = DEFAULT_JOB_PREFIX)]
    job_prefix: String,

    /// Usar el CONTROL file base en todos los jobs en vez de una copia por job
    #[arg(long)]
    no_copy_control: bool,

    /// Intérprete con el que se lanza submit.py
    #[arg(long, env = "FLEXBATCH_PYTHON", default_value = "python3")]
    python: String,

    /// Lanzar submit.py directamente, sin intérprete
    #[arg(long)]
    direct: bool,

    /// Sólo imprimir el resumen de los jobs
    #[arg(long)]
    dry_run: bool,

    /// Guardar el reporte final en JSON
    #[arg(long, value_name = "FILE")]
    json_report: Option<PathBuf>,
}

impl RunArgs {
    fn to_config(&self) -> BatchConfig {
        let mut config = BatchConfig::new(self.start, self.end, self.output_dir.clone());
        config.days_per_job = self.days_per_job;
        config.workers = self.workers;
        config.log_dir = self.log_dir.clone();
        config.timeout_secs = if self.no_timeout {
            None
        } else {
            Some(self.timeout_secs)
        };
        config.timeout_retries = self.retries;
        config.retry_on_failure = self.retry_on_failure;
        config.job_prefix = self.job_prefix.clone();
        config.copy_control = !self.no_copy_control;
        config.dry_run = self.dry_run;
        config
    }
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|e| e.to_string())
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_jobs(args).await?,

        Commands::Check {
            dir,
            start,
            end,
            prefix,
            hours,
            step,
        } => {
            let report = inventory::check_folder(&dir, &prefix, start, end, &hours, step)
                .with_context(|| format!("no se pudo revisar {}", dir.display()))?;

            println!("\n# Periodo buscado: {} - {}", start, end);
            println!(
                "# Archivos: esperados={}, encontrados={}, faltantes={}",
                report.expected,
                report.found,
                report.missing.len()
            );
            println!("\n# Periodos faltantes:");
            if report.periods.is_empty() {
                println!("  (ninguno)");
            }
            for (first, last) in &report.periods {
                println!(
                    "  [{}, {}]",
                    first.format("%Y-%m-%d %H"),
                    last.format("%Y-%m-%d %H")
                );
            }
        }

        Commands::SortYears {
            dir,
            output_dir,
            prefix,
        } => {
            let dst = output_dir.unwrap_or_else(|| dir.clone());
            let moves = sorting::sort_by_year(&dir, &dst, &prefix)
                .with_context(|| format!("no se pudieron ordenar los archivos de {}", dir.display()))?;
            println!("{} archivo(s) movidos a {}", moves.len(), dst.display());
        }
    }

    Ok(())
}

async fn run_jobs(args: RunArgs) -> Result<()> {
    let installation = Installation::resolve(&args.flex_extract_dir, &args.control_file)
        .context("instalación de flex_extract incompleta")?;

    let python = if args.direct {
        None
    } else {
        Some(args.python.as_str())
    };
    let executable = installation.invocation(python);
    let config = args.to_config();

    if !config.dry_run {
        for dir in [config.output_dir.as_path(), config.log_dir()] {
            fs::create_dir_all(dir)
                .with_context(|| format!("no se pudo crear {}", dir.display()))?;
        }
    }

    info!(
        "batch {} - {}: {} día(s) por job, {} worker(s)",
        config.start, config.end, config.days_per_job, config.workers
    );

    let outcome = run_batch(
        &config,
        executable,
        &installation.control_file,
        ProcessRunner::new(),
    )
    .await
    .context("el batch no pudo arrancar")?;

    match outcome {
        BatchOutcome::Planned { plan, skipped } => {
            print_skipped(&skipped);
            println!("\n{}", plan);
        }
        BatchOutcome::Executed(report) => {
            print_report(&report);

            if let Some(path) = &args.json_report {
                let file = fs::File::create(path)
                    .with_context(|| format!("no se pudo crear {}", path.display()))?;
                serde_json::to_writer_pretty(file, &report)
                    .with_context(|| format!("no se pudo escribir {}", path.display()))?;
            }

            if !report.all_succeeded() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn print_skipped(skipped: &[SkippedJob]) {
    for s in skipped {
        println!("  job #{} ({}): salteado, ya tenía job_done", s.id, s.interval);
    }
}

fn print_report(report: &BatchReport) {
    println!("\n######### Resultados #########");
    print_skipped(&report.skipped);

    for r in &report.results {
        let exit = r
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  job #{} ({}): {} (intentos={}, exit={})",
            r.id,
            r.interval,
            r.outcome.label(),
            r.attempts,
            exit
        );
    }

    println!(
        "\nTotal: {} ok, {} con error, {} salteados",
        report.succeeded(),
        report.failed(),
        report.skipped.len()
    );
}
