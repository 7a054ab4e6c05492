use clap::Parser;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tstl_core::ast::SourceFileDocument;
use tstl_core::config::{CompilerConfig, CompilerOptions, LuaLibImport, LuaTarget};
use tstl_core::diagnostics::{CollectingDiagnosticHandler, DiagnosticHandler};
use tstl_core::lua::LuaPrinter;
use tstl_core::oracle::NullTypeOracle;
use tstl_core::transform::transform_source_file;
use tstl_core::LuaLibFeature;

/// tstl - transpile type-checked TSL source documents to Lua
#[derive(Parser, Debug, Clone)]
#[command(name = "tstl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input files to compile (serialised source-file documents)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to a tstlconfig.json configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Output directory for compiled Lua files
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Target Lua dialect (5.1, 5.2, 5.3, jit)
    #[arg(long, value_name = "VERSION")]
    target: Option<String>,

    /// Runtime bundle linkage (inline, require, always, none)
    #[arg(long, value_name = "MODE")]
    lua_lib_import: Option<String>,

    /// Do not emit output files
    #[arg(long)]
    no_emit: bool,

    /// Watch input files for changes
    #[arg(short, long)]
    watch: bool,

    /// Pretty print diagnostics
    #[arg(long, default_value_t = true)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG=debug for detailed logs, RUST_LOG=info for normal output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let options = load_options(&cli)?;

    if cli.files.is_empty() {
        eprintln!("Error: No input files specified. Use --help for usage information.");
        std::process::exit(1);
    }

    info!(
        "tstl - compiling {} file(s) for {}",
        cli.files.len(),
        options.lua_target.display_name()
    );

    if cli.watch {
        watch_mode(cli, options)?;
    } else {
        let ok = compile(&cli, &options)?;
        if !ok {
            std::process::exit(1);
        }
    }

    Ok(())
}

fn load_options(cli: &Cli) -> anyhow::Result<CompilerOptions> {
    let mut options = if let Some(project) = &cli.project {
        CompilerConfig::from_file(project)
            .map_err(|e| anyhow::anyhow!("Failed to load config file: {e}"))?
            .compiler_options
    } else {
        let default_path = PathBuf::from("tstlconfig.json");
        if default_path.exists() {
            CompilerConfig::from_file(&default_path)
                .map_err(|e| anyhow::anyhow!("Failed to load tstlconfig.json: {e}"))?
                .compiler_options
        } else {
            CompilerOptions::default()
        }
    };

    if let Some(target) = &cli.target {
        options.lua_target = parse_lua_target(target)?;
    }
    if let Some(mode) = &cli.lua_lib_import {
        options.lua_lib_import = match mode.as_str() {
            "inline" => LuaLibImport::Inline,
            "require" => LuaLibImport::Require,
            "always" => LuaLibImport::Always,
            "none" => LuaLibImport::None,
            other => anyhow::bail!("Invalid luaLibImport mode '{other}'"),
        };
    }
    Ok(options)
}

fn parse_lua_target(target: &str) -> anyhow::Result<LuaTarget> {
    match target {
        "5.1" | "51" => Ok(LuaTarget::Lua51),
        "5.2" | "52" => Ok(LuaTarget::Lua52),
        "5.3" | "53" => Ok(LuaTarget::Lua53),
        "jit" | "luajit" => Ok(LuaTarget::LuaJit),
        _ => Err(anyhow::anyhow!(
            "Invalid Lua target '{target}'. Supported targets: 5.1, 5.2, 5.3, jit"
        )),
    }
}

struct CompilationOutput {
    lua_code: String,
    output_path: PathBuf,
    used_features: FxHashSet<LuaLibFeature>,
}

struct CompilationFailure {
    file_path: PathBuf,
    message: String,
    diagnostics: Vec<tstl_core::Diagnostic>,
}

/// Compile every input file; returns false when any diagnostics were fatal.
fn compile(cli: &Cli, options: &CompilerOptions) -> anyhow::Result<bool> {
    use rayon::prelude::*;

    let results: Vec<Result<CompilationOutput, CompilationFailure>> = cli
        .files
        .par_iter()
        .map(|file_path| {
            debug!("Compiling {:?}...", file_path);

            let content = std::fs::read_to_string(file_path).map_err(|e| CompilationFailure {
                file_path: file_path.clone(),
                message: format!("Failed to read file: {e}"),
                diagnostics: Vec::new(),
            })?;

            let document: SourceFileDocument =
                serde_json::from_str(&content).map_err(|e| CompilationFailure {
                    file_path: file_path.clone(),
                    message: format!("Invalid source document: {e}"),
                    diagnostics: Vec::new(),
                })?;
            let (interner, file) = document.into_parts();

            let handler = Arc::new(CollectingDiagnosticHandler::new());
            let oracle = NullTypeOracle;
            let transformed =
                transform_source_file(&file, &oracle, options, handler.clone(), &interner)
                    .map_err(|error| CompilationFailure {
                        file_path: file_path.clone(),
                        message: error.to_string(),
                        diagnostics: handler.diagnostics(),
                    })?;

            let mut lua_code = String::new();
            match options.lua_lib_import {
                LuaLibImport::Inline if !transformed.used_features.is_empty() => {
                    lua_code.push_str(&tstl_core::lua_lib_bundle(&transformed.used_features));
                }
                LuaLibImport::Require if !transformed.used_features.is_empty() => {
                    lua_code.push_str("require(\"lualib_bundle\")\n");
                }
                LuaLibImport::Always => {
                    lua_code.push_str("require(\"lualib_bundle\")\n");
                }
                _ => {}
            }
            lua_code.push_str(&LuaPrinter::new().print(&transformed.block));

            let output_path = match &cli.out_dir {
                Some(out_dir) => {
                    let stem = file_path.file_stem().unwrap_or_default().to_string_lossy();
                    out_dir.join(format!("{stem}.lua"))
                }
                None => file_path.with_extension("lua"),
            };

            Ok(CompilationOutput {
                lua_code,
                output_path,
                used_features: transformed.used_features,
            })
        })
        .collect();

    let mut had_errors = false;
    let mut all_features: FxHashSet<LuaLibFeature> = FxHashSet::default();

    for result in results {
        match result {
            Ok(output) => {
                all_features.extend(output.used_features.iter().copied());
                if !cli.no_emit {
                    if let Some(parent) = output.output_path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&output.output_path, &output.lua_code)?;
                    info!("Generated: {:?}", output.output_path);
                }
            }
            Err(failure) => {
                had_errors = true;
                print_failure(&failure, cli.pretty);
            }
        }
    }

    // The shared bundle is written once for require-based linkage.
    if !cli.no_emit
        && matches!(
            options.lua_lib_import,
            LuaLibImport::Require | LuaLibImport::Always
        )
        && !all_features.is_empty()
    {
        let bundle = tstl_core::lua_lib_bundle(&all_features);
        let bundle_path = cli
            .out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lualib_bundle.lua");
        if let Some(parent) = bundle_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&bundle_path, bundle)?;
        info!("Generated runtime bundle: {:?}", bundle_path);
    }

    Ok(!had_errors)
}

fn print_failure(failure: &CompilationFailure, pretty: bool) {
    let file_name = failure.file_path.to_string_lossy();
    if pretty {
        eprintln!("\x1b[31merror\x1b[0m [{file_name}]: {}", failure.message);
    } else {
        eprintln!("{file_name}: error: {}", failure.message);
    }
    for diagnostic in &failure.diagnostics {
        eprintln!(
            "  {} at {}: {}",
            match diagnostic.level {
                tstl_core::DiagnosticLevel::Error => "error",
                tstl_core::DiagnosticLevel::Warning => "warning",
                tstl_core::DiagnosticLevel::Info => "info",
            },
            diagnostic.span,
            diagnostic.message
        );
    }
}

/// Watch mode - recompile on file changes.
fn watch_mode(cli: Cli, options: CompilerOptions) -> anyhow::Result<()> {
    use notify::{
        event::{EventKind, ModifyKind},
        Event, RecursiveMode, Watcher,
    };
    use std::sync::mpsc::channel;
    use std::time::Duration;

    println!("Watching for changes... (Press Ctrl+C to stop)");
    println!("\nInitial compilation:");
    let _ = compile(&cli, &options);

    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    for file_path in &cli.files {
        let target: &Path = file_path.parent().unwrap_or(file_path);
        watcher.watch(target, RecursiveMode::NonRecursive)?;
    }

    let mut last_compile = std::time::Instant::now();
    let debounce = Duration::from_millis(100);

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let relevant = matches!(
                    event.kind,
                    EventKind::Modify(ModifyKind::Data(_)) | EventKind::Create(_)
                ) && event.paths.iter().any(|path| {
                    cli.files
                        .iter()
                        .any(|file| path.file_name() == file.file_name())
                });

                if relevant {
                    let now = std::time::Instant::now();
                    if now.duration_since(last_compile) >= debounce {
                        println!("\n\nFile changed, recompiling...");
                        let _ = compile(&cli, &options);
                        last_compile = now;
                    }
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                return Err(anyhow::anyhow!("File watcher disconnected"));
            }
        }
    }
}
