//! ahdaf CLI - Learning-objective generator for primary physical education.

use ahdaf::generator::ObjectiveGenerator;
use ahdaf::session::CompetenceContext;
use ahdaf::{
    Config, Curriculum, GeminiClient, GenerateOutcome, ModelObjectiveGenerator, Session,
    render_document,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ahdaf")]
#[command(version)]
#[command(about = "Generate SMART learning objectives for the Algerian primary PE curriculum")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults apply when absent)
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Curriculum JSON file to use instead of the embedded one
    #[arg(long, global = true)]
    curriculum: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List grades, fields and knowledge resources
    Grades,

    /// Generate objectives for one selection
    Generate {
        /// Grade index (see `grades`)
        #[arg(short, long)]
        grade: usize,

        /// Field name
        #[arg(short, long)]
        field: String,

        /// Knowledge resource
        #[arg(short, long)]
        resource: String,

        /// Write the printable card to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Choose grade, field and resource step by step
    Interactive,

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# ahdaf configuration file

[gemini]
# API key (can also use the API_KEY or GEMINI_API_KEY env var)
# api_key = "${MY_GEMINI_KEY}"
api_key_env = "API_KEY"
base_url = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-3-flash-preview"
timeout_secs = 180

[generation]
objective_count = 20
# temperature = 0.7

# Alternative curriculum file (embedded dataset when unset)
# curriculum = "data/curriculum.json"
"#;
    println!("{example}");
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load_or_default(path).with_context(|| format!("Failed to load config from {path:?}"))
}

fn build_generator(config: &Config) -> Result<Arc<dyn ObjectiveGenerator>> {
    let client = GeminiClient::from_config(config).context("Failed to create Gemini client")?;
    info!(model = %client.model(), "Using Gemini model");
    let generator = ModelObjectiveGenerator::new(Arc::new(client))
        .with_objective_count(config.generation.objective_count);
    Ok(Arc::new(generator))
}

fn print_curriculum(curriculum: &Curriculum) {
    let info = &curriculum.curriculum_info;
    println!("{} - {} ({})\n", info.subject, info.stage, info.country);
    for (index, grade) in curriculum.grades().iter().enumerate() {
        println!("[{index}] {}", grade.grade_name);
        for field in &grade.fields {
            println!("    ◦ {}", field.field_name);
            for resource in &field.knowledge_resources {
                println!("        - {resource}");
            }
        }
    }
}

fn print_context(ctx: &CompetenceContext<'_>) {
    println!("\nالكفاءة الشاملة للمستوى:\n  {}", ctx.overall_competence);
    if let Some(final_competence) = ctx.final_competence {
        println!("الكفاءة الختامية:\n  {final_competence}");
    }
}

/// Run the generate action behind a spinner.
async fn generate_with_spinner(session: &mut Session<'_>) -> GenerateOutcome {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("جاري التوليد...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = session.generate().await;

    spinner.finish_and_clear();
    outcome
}

/// Print the card to stdout or write it to `output`.
fn emit_document(session: &Session<'_>, output: Option<&Path>) -> Result<()> {
    let Some(doc) = render_document(session.selection()) else {
        println!("لم يتم توليد أي هدف.");
        return Ok(());
    };

    match output {
        Some(path) => {
            std::fs::write(path, doc)
                .with_context(|| format!("Failed to write document to {path:?}"))?;
            info!(path = %path.display(), "Document written");
        }
        None => println!("{doc}"),
    }
    Ok(())
}

/// Prompt for a 1-based choice among `options`; `None` on empty input or EOF.
fn choose<'a>(
    input: &mut impl BufRead,
    label: &str,
    options: &[&'a str],
) -> Result<Option<(usize, &'a str)>> {
    println!("\n{label}:");
    for (index, option) in options.iter().enumerate() {
        println!("  {}. {option}", index + 1);
    }

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        match line.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some((n - 1, options[n - 1]))),
            _ => println!("اختيار غير صالح، أدخل رقماً بين 1 و {}", options.len()),
        }
    }
}

async fn run_interactive(session: &mut Session<'_>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    loop {
        let grades = session.selection().grade_options();
        let Some((grade_index, _)) = choose(&mut input, "المستوى الدراسي", &grades)? else {
            return Ok(());
        };
        session.set_grade(Some(grade_index));

        let fields = session.selection().field_options();
        let Some((_, field)) = choose(&mut input, "الميدان (الكفاءة الختامية)", &fields)? else {
            continue;
        };
        session.set_field(field);
        if let Some(ctx) = session.context() {
            print_context(&ctx);
        }

        let resources = session.selection().resource_options();
        let Some((_, resource)) = choose(&mut input, "المورد المعرفي", &resources)? else {
            continue;
        };
        session.set_resource(resource);

        match generate_with_spinner(session).await {
            GenerateOutcome::Failed => {
                println!("{}", session.error().unwrap_or_default());
                continue;
            }
            GenerateOutcome::Skipped => continue,
            GenerateOutcome::Completed(_) => {}
        }

        emit_document(session, None)?;
        if let Some(path) = prompt_save_path(&mut input, !session.objectives().is_empty())? {
            emit_document(session, Some(&path))?;
        }
    }
}

/// Ask where to save the card; no prompt is shown when nothing was generated.
fn prompt_save_path(input: &mut impl BufRead, has_objectives: bool) -> Result<Option<PathBuf>> {
    if !has_objectives {
        return Ok(None);
    }

    print!("حفظ البطاقة في ملف (اتركه فارغاً للتخطي): ");
    std::io::stdout().flush()?;
    let mut path = String::new();
    input.read_line(&mut path)?;
    let path = path.trim();
    Ok((!path.is_empty()).then(|| PathBuf::from(path)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Commands::Example = cli.command {
        print_example_config();
        return Ok(());
    }

    let config = load_config(&cli.config)?;

    let loaded;
    let curriculum = match cli.curriculum.as_ref().or(config.curriculum.as_ref()) {
        Some(path) => {
            loaded = Curriculum::from_file(path)
                .with_context(|| format!("Failed to load curriculum from {path:?}"))?;
            &loaded
        }
        None => Curriculum::embedded(),
    };

    match cli.command {
        Commands::Example => unreachable!("handled above"),

        Commands::Validate => {
            config
                .resolve_api_key()
                .context("Failed to resolve API key")?;

            info!("Configuration is valid");
            info!("  Model: {}", config.gemini.model);
            info!("  Endpoint: {}", config.gemini.base_url);
            info!("  Objectives per request: {}", config.generation.objective_count);
            info!("  Grades in curriculum: {}", curriculum.grades().len());
        }

        Commands::Grades => print_curriculum(curriculum),

        Commands::Generate {
            grade,
            field,
            resource,
            output,
        } => {
            let generator = build_generator(&config)?;
            let mut session = Session::new(curriculum, generator);

            session.set_grade(Some(grade));
            if session.current_grade().is_none() {
                bail!(
                    "Grade index {grade} out of range (0..{})",
                    curriculum.grades().len()
                );
            }
            session.set_field(field.as_str());
            if session.current_field().is_none() {
                bail!("Field '{field}' not found in grade {grade}");
            }
            session.set_resource(resource);

            match generate_with_spinner(&mut session).await {
                GenerateOutcome::Failed => {
                    bail!("{}", session.error().unwrap_or_default())
                }
                GenerateOutcome::Skipped => bail!("Selection is incomplete"),
                GenerateOutcome::Completed(count) => {
                    info!(count, "Objectives generated");
                }
            }

            emit_document(&session, output.as_deref())?;
        }

        Commands::Interactive => {
            let generator = build_generator(&config)?;
            let mut session = Session::new(curriculum, generator);
            run_interactive(&mut session).await?;
        }
    }

    Ok(())
}
