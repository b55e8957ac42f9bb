use anyhow::{Context, Result, bail};
use assembler::{InputItem, assemble, unlock};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pdf-toolkit")]
#[command(about = "Merge PDFs and images, or remove the password from a PDF")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge PDFs and images into a single PDF, in the order given
    Merge {
        #[arg(required = true, help = "PDF or image files to merge")]
        files: Vec<PathBuf>,

        #[arg(
            short,
            long,
            help = "Output path for the merged PDF. Defaults to 'merged_<YYYY-MM-DD>.pdf' in the current directory"
        )]
        output: Option<PathBuf>,
    },
    /// Write a copy of a password protected PDF that opens without a password
    Unlock {
        #[arg(help = "The PDF file to unlock")]
        input: PathBuf,

        #[arg(short, long, help = "Password of the PDF")]
        password: String,

        #[arg(
            short,
            long,
            help = "Output path for the unlocked PDF. Defaults to the input filename prefixed with 'unlocked_'"
        )]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let output_path = match args.command {
        Command::Merge { files, output } => {
            let output_path = output.unwrap_or_else(default_merge_output);
            merge(&files, &output_path)?;
            output_path
        }
        Command::Unlock {
            input,
            password,
            output,
        } => {
            let output_path = output.unwrap_or_else(|| default_unlock_output(&input));
            let bytes = read_file(&input)?;
            let unlocked = unlock(&bytes, &password)
                .with_context(|| format!("Could not unlock {}", input.display()))?;
            write_file(&output_path, &unlocked)?;
            output_path
        }
    };

    println!(
        "✅ PDF saved to {} in {:?}",
        output_path.display(),
        start_time.elapsed()
    );

    Ok(())
}

fn merge(files: &[PathBuf], output_path: &Path) -> Result<()> {
    if files.len() < 2 {
        bail!("At least two files are required to merge");
    }

    let items = files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_owned();
            Ok(InputItem::new(name, read_file(path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let merged = assemble(&items)?;
    write_file(output_path, &merged)
}

fn default_merge_output() -> PathBuf {
    PathBuf::from(format!("merged_{}.pdf", Local::now().format("%Y-%m-%d")))
}

fn default_unlock_output(input: &Path) -> PathBuf {
    let parent_dir = input.parent().unwrap_or(Path::new("."));
    let file_stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    parent_dir.join(format!("unlocked_{file_stem}.pdf"))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Could not read {}", path.display()))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Could not write {}", path.display()))
}
