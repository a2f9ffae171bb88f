use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use memmap2::Mmap;
use phyparse::{Phy, PhyError};
use rootcause::Report;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Decode compiled PHY collision models
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Expected checksum; decoding fails if the file's checksum differs
    #[clap(short, long, allow_hyphen_values = true)]
    checksum: Option<i64>,

    /// Print each decoded file as JSON instead of a summary
    #[clap(long)]
    json: bool,

    /// .phy file(s)
    #[clap(required = true)]
    phy: Vec<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {err}", .path.display())]
    Io { path: PathBuf, err: std::io::Error },
    #[error("failed to decode {}: {err}", .path.display())]
    Decode { path: PathBuf, err: PhyError },
    #[error("failed to serialize {}: {err}", .path.display())]
    Json {
        path: PathBuf,
        err: serde_json::Error,
    },
}

fn load_phy(path: &Path, checksum: Option<i64>) -> Result<Phy, Report<CliError>> {
    let io_error = |err| {
        Report::new(CliError::Io {
            path: path.to_owned(),
            err,
        })
    };
    let file = File::open(path).map_err(io_error)?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(io_error)?;

    Phy::parse(&mmap, checksum).map_err(|err| {
        Report::new(CliError::Decode {
            path: path.to_owned(),
            err,
        })
    })
}

fn print_summary(path: &Path, phy: &Phy) {
    println!(
        "{}: checksum {}, {} solid(s)",
        path.display(),
        phy.checksum(),
        phy.solids().len()
    );
    for (i, solid) in phy.solids().iter().enumerate() {
        let c = solid.centre_of_mass;
        println!(
            "  solid {i}: bone {}, {} vertices, {} triangles, centre of mass ({}, {}, {})",
            solid.bone_index,
            solid.vertices.len(),
            solid.triangle_count(),
            c.x,
            c.y,
            c.z
        );
    }
    let text = phy.text_section();
    if !text.is_empty() {
        let names: Vec<&str> = text.blocks.iter().map(|b| b.name.as_str()).collect();
        println!("  text: {}", names.join(", "));
    }
}

fn main() -> Result<(), Report<CliError>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    for path in &args.phy {
        info!("decoding {}", path.display());
        let phy = load_phy(path, args.checksum)?;
        if args.json {
            let json = serde_json::to_string_pretty(&phy).map_err(|err| {
                Report::new(CliError::Json {
                    path: path.clone(),
                    err,
                })
            })?;
            println!("{json}");
        } else {
            print_summary(path, &phy);
        }
    }

    Ok(())
}
