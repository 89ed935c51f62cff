use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;

use crate::io::common::loader::RawAssetLoader;
use crate::io::tre::loader::TreLoader;
use crate::io::tre::manifest::Manifest;
use crate::rendering::asset_graph::nodes::AssetNode;
use crate::rendering::asset_graph::repository::AssetRepository;
use crate::rendering::loader::texture_loader::ImageTextureDecoder;
use crate::rendering::scene::assembler::SceneAssembler;
use crate::rendering::scene::graph::SceneGraph;
use crate::rendering::scene::obj_export::export_obj;
use crate::settings::CliArgs;

mod io;
mod rendering;
mod settings;

fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), anyhow::Error> {
    let manifest = match &args.manifest {
        Some(path) => Manifest::from_file(path).with_context(|| format!("Reading manifest {}", path.display()))?,
        None => Manifest::default(),
    };

    let loader = TreLoader::new(&args.data_dir, &manifest)?;
    log::info!(
        "Opened {} of {} archives from {}",
        loader.archive_count(),
        manifest.len(),
        args.data_dir.display()
    );
    let repository = AssetRepository::new(loader, Box::new(ImageTextureDecoder::default()));

    let loaded = load_all(&repository, &args.paths, args.parallel);

    let mut graph = SceneGraph::default();
    let mut assembler = SceneAssembler::new(&mut graph).with_grid_spacing(args.grid_spacing);
    let mut roots = Vec::new();
    for (path, node) in args.paths.iter().zip(loaded) {
        match node {
            Some(node) => {
                println!("{}: {} ({} direct children)", path, kind_name(&node), node.children().len());
                roots.push(assembler.assemble(&node));
            }
            None => println!("{}: not loaded", path),
        }
    }
    drop(assembler);
    roots.into_iter().for_each(|root| graph.add_root(root));

    let stats = repository.stats();
    println!(
        "Resolved {} nodes, {} shaders and {} textures with {} archive requests",
        stats.nodes, stats.shaders, stats.textures, stats.fetches
    );
    println!("Scene: {}", graph.stats());

    if let Some(obj) = &args.obj {
        export_obj(obj, &graph)?;
    }

    Ok(())
}

/// Resolves the requested paths in order, or with one thread per path. Either way the results line
/// up with `paths`.
fn load_all<L>(repository: &AssetRepository<L>, paths: &[String], parallel: bool) -> Vec<Option<Arc<AssetNode>>>
where
    L: RawAssetLoader + Sync,
{
    profiling::scope!("load_all");
    if !parallel {
        return paths.iter().map(|path| repository.load_file(path)).collect_vec();
    }

    thread::scope(|scope| {
        let handles = paths
            .iter()
            .map(|path| scope.spawn(move || repository.load_file(path)))
            .collect_vec();

        handles
            .into_iter()
            .zip(paths)
            .map(|(handle, path)| {
                handle.join().unwrap_or_else(|_| {
                    log::error!("Loading {} panicked", path);
                    None
                })
            })
            .collect_vec()
    })
}

fn kind_name(node: &AssetNode) -> &'static str {
    match node {
        AssetNode::Mesh(_) => "mesh",
        AssetNode::SkeletalMesh(_) => "skeletal mesh",
        AssetNode::Compound(_) => "compound",
        AssetNode::LevelOfDetail(_) => "level of detail",
        AssetNode::Skeleton(_) => "skeleton",
        AssetNode::Terrain(_) => "terrain",
        AssetNode::WorldSnapshot(_) => "world snapshot",
        AssetNode::InteriorLayout(_) => "interior layout",
        AssetNode::Group(group) => match group.kind {
            holocron_files::sniff::RecordKind::Appearance => "appearance",
            holocron_files::sniff::RecordKind::PortalLayout => "portal layout",
            _ => "object template",
        },
        AssetNode::Shader(_) => "shader",
    }
}
