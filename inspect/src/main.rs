//! `lumen-inspect`: load a glTF document and print its resolved scene graph.

mod args;
mod report;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;

use args::InspectArgs;
use lumen_core::gltf::GltfError;

#[derive(Debug, Error)]
enum InspectError {
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error(transparent)]
    Load(#[from] GltfError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = InspectArgs::parse();
    match run(&args) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}: {e}", args.uri);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &InspectArgs) -> Result<String, InspectError> {
    let loader = args.build_loader()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(InspectError::Runtime)?;

    if args.dump.is_empty() {
        let loaded = runtime.block_on(loader.load(&args.uri))?;
        Ok(report::scene_report(&loaded))
    } else {
        let types: Vec<&str> = args.dump.iter().map(String::as_str).collect();
        let entities = runtime.block_on(loader.load_entities(&args.uri, &types))?;
        Ok(report::entity_report(&entities))
    }
}
