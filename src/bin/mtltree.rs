use std::path::PathBuf;

use clap::Parser;
use wavefront_mtl::mtl::{self, MtlSet};
use wavefront_mtl::tree::Tree;

/// Print the materials of Wavefront `.mtl` files as a tree.
///
/// Diagnostics go through the log; set `RUST_LOG=warn` (or lower) to see
/// skipped fields.
#[derive(Debug, clap::Parser)]
#[command(name = "mtltree", version = "0.1", about, long_about)]
struct Cli {
  /// Files to parse.
  #[arg(required = true)]
  files: Vec<PathBuf>,

  /// Only report diagnostics, don't print the trees.
  #[arg(short, long)]
  quiet: bool,
}

fn main() {
  env_logger::init();
  let cli = Cli::parse();

  for path in &cli.files {
    let name = path.display().to_string();
    let set = match mtl::load(path) {
      Ok(parsed) => parsed.set,
      Err(err) => {
        log::error!("{}", err);
        MtlSet::default()
      }
    };
    if !cli.quiet {
      print!("{}", Tree::new(&name, &set));
    }
  }
}
