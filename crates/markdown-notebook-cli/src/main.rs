mod pipeline;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use markdown_notebook_config::PipelineConfig;
use markdown_notebook_engine::{LogSink, extract_code, io};
use pipeline::Pipeline;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "markdown-notebook", version)]
#[command(about = "Split annotated Markdown into kind-tagged notebook cells and rewrite them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment each input, run the pipeline steps and write a notebook
    Run {
        /// Pipeline file (defaults to ~/.config/markdown-notebook/pipeline.toml)
        #[arg(short, long)]
        pipeline: Option<PathBuf>,

        /// Directory for the written notebooks (defaults to next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Exit with failure if any warning or error was reported
        #[arg(long)]
        strict: bool,

        /// Skip check_urls steps
        #[arg(long)]
        no_network: bool,

        /// Markdown or notebook files; glob patterns are expanded
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Write the code cells of a notebook as a script
    ExtractCode {
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a starter pipeline file
    Init {
        /// Where to write it (defaults to ~/.config/markdown-notebook/pipeline.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Run {
            pipeline,
            output_dir,
            strict,
            no_network,
            inputs,
        } => {
            let config = load_pipeline(pipeline.as_deref())?;
            let pipeline = Pipeline::new(config, !no_network)?;
            let output_dir = output_dir.map(|dir| PipelineConfig::expand_path(&dir));
            process_all(&pipeline, &expand_inputs(&inputs)?, output_dir.as_deref(), strict)
        }
        Command::ExtractCode { input, output } => {
            let doc = io::load_document(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            let mut script = extract_code(&doc);
            script.push('\n');
            match output {
                Some(path) => std::fs::write(&path, script)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{script}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Init { path, force } => {
            let path = path
                .map(|p| PipelineConfig::expand_path(&p))
                .unwrap_or_else(PipelineConfig::config_path);
            if path.exists() && !force {
                bail!("{} already exists; use --force to overwrite", path.display());
            }
            PipelineConfig::example().save_to_path(&path)?;
            log::info!("Wrote starter pipeline to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// An explicit pipeline file must exist; the default one is optional.
fn load_pipeline(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            let path = PipelineConfig::expand_path(path);
            log::info!("Pipeline: {}", path.display());
            PipelineConfig::load_from_path(&path)?
                .with_context(|| format!("Pipeline file not found: {}", path.display()))
        }
        None => match PipelineConfig::load()? {
            Some(config) => {
                log::info!("Pipeline: {}", PipelineConfig::config_path().display());
                Ok(config)
            }
            None => {
                log::info!("No pipeline file, segmenting only");
                Ok(PipelineConfig::default())
            }
        },
    }
}

/// Expands glob patterns. A pattern matching nothing is kept as a plain path
/// so the missing file is reported when it is loaded.
fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = PipelineConfig::expand_path(Path::new(pattern));
        let pattern = pattern.to_string_lossy();
        let before = paths.len();
        for entry in glob::glob(&pattern).with_context(|| format!("Invalid pattern {pattern}"))? {
            paths.push(entry?);
        }
        if paths.len() == before {
            paths.push(PathBuf::from(&*pattern));
        }
    }
    Ok(paths)
}

/// Where the notebook for `input` is written: same stem, `.ipynb`, next to
/// the input unless an output directory is given.
fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input.with_extension(io::NOTEBOOK_EXTENSION);
    match (output_dir, name.file_name()) {
        (Some(dir), Some(file_name)) => dir.join(file_name),
        _ => name,
    }
}

fn process_all(
    pipeline: &Pipeline,
    inputs: &[PathBuf],
    output_dir: Option<&Path>,
    strict: bool,
) -> Result<ExitCode> {
    let mut sink = LogSink::new();
    let mut failed = 0;

    for input in inputs {
        log::info!("Processing {}", input.display());
        if let Err(e) = process_file(pipeline, input, output_dir, &mut sink) {
            log::error!("{e:#}");
            failed += 1;
        }
    }

    log::info!(
        "{} file(s), {} warning(s), {} error(s), {} failed",
        inputs.len(),
        sink.warnings(),
        sink.errors(),
        failed
    );
    if failed > 0 || (strict && sink.total() > 0) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn process_file(
    pipeline: &Pipeline,
    input: &Path,
    output_dir: Option<&Path>,
    sink: &mut LogSink,
) -> Result<PathBuf> {
    let mut doc = io::load_document(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    pipeline.process(&mut doc, sink);

    let output = output_path(input, output_dir);
    io::write_notebook(&output, &doc)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Wrote {}", output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_notebook_engine::Kind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn output_goes_next_to_input_by_default() {
        assert_eq!(
            output_path(Path::new("book/ch1.md"), None),
            PathBuf::from("book/ch1.ipynb")
        );
        assert_eq!(
            output_path(Path::new("book/ch1.md"), Some(Path::new("out"))),
            PathBuf::from("out/ch1.ipynb")
        );
    }

    #[test]
    fn notebooks_are_rewritten_in_place() {
        assert_eq!(
            output_path(Path::new("nb.ipynb"), None),
            PathBuf::from("nb.ipynb")
        );
    }

    #[test]
    fn globs_expand_and_literals_pass_through() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.md"), "a").unwrap();
        std::fs::write(temp.path().join("b.md"), "b").unwrap();
        std::fs::write(temp.path().join("c.txt"), "c").unwrap();

        let glob = format!("{}/*.md", temp.path().display());
        let missing = format!("{}/missing.md", temp.path().display());
        let paths = expand_inputs(&[glob, missing.clone()]).unwrap();

        assert_eq!(
            paths,
            vec![
                temp.path().join("a.md"),
                temp.path().join("b.md"),
                PathBuf::from(missing)
            ]
        );
    }

    #[test]
    fn processes_files_into_notebooks() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("ch1.md");
        std::fs::write(&input, "# One\n\nText  \n").unwrap();
        let out_dir = temp.path().join("out");

        let pipeline = Pipeline::new(PipelineConfig::example(), false).unwrap();
        let mut sink = LogSink::new();
        let written = process_file(&pipeline, &input, Some(&out_dir), &mut sink).unwrap();

        assert_eq!(written, out_dir.join("ch1.ipynb"));
        let doc = io::read_notebook(&written).unwrap();
        assert_eq!(doc.len(), 2);
        assert_eq!(
            doc.cells[0].kind,
            Some(Kind::Head {
                level: 1,
                heading: "One".into()
            })
        );
        assert_eq!(doc.cells[1].source, "Text");
    }

    #[test]
    fn strict_mode_fails_on_diagnostics() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("skip.md");
        std::fs::write(&input, "# One\n### Three\n").unwrap();
        let pipeline = Pipeline::new(PipelineConfig::example(), false).unwrap();

        let lenient = process_all(&pipeline, &[input.clone()], None, false).unwrap();
        let strict = process_all(&pipeline, &[input], None, true).unwrap();

        assert_eq!(lenient, ExitCode::SUCCESS);
        assert_eq!(strict, ExitCode::FAILURE);
    }

    #[test]
    fn missing_input_fails_the_run() {
        let temp = TempDir::new().unwrap();
        let pipeline = Pipeline::new(PipelineConfig::default(), false).unwrap();
        let code = process_all(&pipeline, &[temp.path().join("nope.md")], None, false).unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn explicit_pipeline_must_exist() {
        let temp = TempDir::new().unwrap();
        let err = load_pipeline(Some(&temp.path().join("none.toml"))).unwrap_err();
        assert!(err.to_string().contains("Pipeline file not found"));
    }

    #[test]
    fn cli_parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "markdown-notebook",
            "run",
            "--strict",
            "--no-network",
            "-o",
            "out",
            "a.md",
            "b/*.md",
        ])
        .unwrap();
        match cli.command {
            Command::Run {
                strict,
                no_network,
                output_dir,
                inputs,
                pipeline,
            } => {
                assert!(strict && no_network);
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(inputs, ["a.md", "b/*.md"]);
                assert_eq!(pipeline, None);
            }
            _ => panic!("expected run"),
        }
    }
}
