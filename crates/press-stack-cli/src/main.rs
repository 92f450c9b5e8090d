//! press-stack: compile HTML into WordPress templates and ACF field groups.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use press_stack::{file_slug, CompileRequest, Compiler, TemplateKind, ThemeShell};
use press_stack_cli::{load_compiler_config, resolve_projects_dir, write_artifacts, ThemeWorkspace};

#[derive(Parser)]
#[command(
    name = "press-stack",
    about = "Compile static HTML into WordPress page templates and ACF field groups",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile one HTML file.
    Compile {
        /// HTML file to compile.
        input: PathBuf,

        /// Template display name. Defaults to the input file name.
        #[arg(long)]
        name: Option<String>,

        /// Template slug. Defaults to the slugified name.
        #[arg(long)]
        slug: Option<String>,

        /// Template kind (fragment, page, page-convention).
        #[arg(long, default_value = "fragment")]
        kind: String,

        /// Project key; enables theme scaffolding, asset copies and layout extraction.
        #[arg(short, long)]
        project: Option<String>,

        /// Directory holding project themes.
        /// Also reads PRESS_STACK_PROJECTS.
        #[arg(long)]
        projects_dir: Option<PathBuf>,

        /// Theme directory to write artifacts into. Defaults to the project's theme.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// JSON file with compiler settings.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Scaffold (or repair) a project's theme shell.
    Init {
        /// Project key.
        project: String,

        /// Directory holding project themes.
        #[arg(long)]
        projects_dir: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   press-stack completions bash > ~/.local/share/bash-completion/completions/press-stack
    ///   press-stack completions zsh > ~/.zfunc/_press-stack
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn default_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace(['-', '_'], " "))
        .unwrap_or_else(|| "Untitled".to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile {
            input,
            name,
            slug,
            kind,
            project,
            projects_dir,
            out,
            config,
        } => {
            let html = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            if html.trim().is_empty() {
                bail!("{} is empty", input.display());
            }
            let kind: TemplateKind = kind.parse()?;
            let config = load_compiler_config(config.as_deref())?;

            let name = name.unwrap_or_else(|| default_name(&input));
            let mut request = CompileRequest::new(html, &name, kind);
            if let Some(slug) = slug {
                request = request.with_slug(file_slug(&slug));
            }

            let source_root = input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let workspace = ThemeWorkspace::new(resolve_projects_dir(projects_dir.as_deref()))
                .with_source_root(source_root);

            let mut compiler = Compiler::new(config);
            let theme_dir = match (&project, out) {
                (_, Some(out)) => Some(out),
                (Some(key), None) => Some(workspace.theme_dir(key)?),
                (None, None) => None,
            };
            if let Some(key) = project {
                compiler = compiler
                    .with_theme_shell(Box::new(workspace.clone()))
                    .with_asset_registry(Box::new(workspace.clone()))
                    .with_layout_extractor(Box::new(workspace.clone()));
                request = request.with_project(key);
            }

            let result = compiler.compile(&request)?;

            match theme_dir {
                Some(dir) => {
                    let written = write_artifacts(&dir, &request, &result)?;
                    println!("Compiled '{}' into {}", request.template_name, dir.display());
                    for file in &written.files {
                        println!("  {:<48} {:>8} bytes", file.filename, file.size);
                    }
                    println!(
                        "  SEO {} -> {}, accessibility {} -> {}",
                        result.reports.seo.initial_score,
                        result.reports.seo.optimized_score,
                        result.reports.accessibility.initial_score,
                        result.reports.accessibility.optimized_score
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }

        Commands::Init {
            project,
            projects_dir,
        } => {
            let workspace = ThemeWorkspace::new(resolve_projects_dir(projects_dir.as_deref()));
            workspace.ensure_theme_shell(&project)?;
            println!("Theme shell ready: {}", workspace.theme_dir(&project)?.display());
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "press-stack", &mut std::io::stdout());
        }
    }

    Ok(())
}
