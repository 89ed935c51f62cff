use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::thread;

use glam::Vec3;
use holocron_files::sniff::RecordKind;
use itertools::Itertools;
use ::tre::ArchiveWriter;

use crate::io::tre::loader::TreLoader;
use crate::io::tre::manifest::Manifest;
use crate::rendering::asset_graph::error::AssetError;
use crate::rendering::asset_graph::nodes::AssetNode;
use crate::rendering::asset_graph::repository::AssetRepository;
use crate::rendering::fixtures::{self, MemoryLoader};

const CRATE: &str = "appearance/mesh/crate.msh";
const CRATE_SHADER: &str = "shader/crate.sht";
const CRATE_TEXTURE: &str = "texture/crate.dds";

fn crate_loader() -> Result<MemoryLoader, anyhow::Error> {
    Ok(MemoryLoader::default()
        .with(CRATE, fixtures::triangle(CRATE_SHADER)?)
        .with(CRATE_SHADER, fixtures::shader(CRATE_TEXTURE)?)
        .with(CRATE_TEXTURE, vec![1, 2, 3, 4]))
}

#[test]
fn second_load_is_served_from_the_cache() -> Result<(), anyhow::Error> {
    let repository = fixtures::repository(crate_loader()?);

    let first = repository.load_file(CRATE).expect("crate resolves");
    let second = repository.load_file(CRATE).expect("crate resolves");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(repository.loader().fetches(CRATE), 1);
    assert_eq!(repository.stats().nodes, 1);
    Ok(())
}

#[test]
fn meshes_resolve_shaders_and_textures() -> Result<(), anyhow::Error> {
    let repository = fixtures::repository(crate_loader()?);

    let node = repository.load_file(CRATE).expect("crate resolves");
    let AssetNode::Mesh(mesh) = node.as_ref() else {
        panic!("expected a mesh, got {:?}", node);
    };
    assert_eq!(mesh.mesh.tables[0].vertex_count(), 3);

    let shader = mesh.shaders[0].clone().expect("shader resolves");
    assert!(Arc::ptr_eq(&shader, &repository.load_shader("shader\\crate.sht").expect("cached")));
    let texture = shader.main_texture.clone().expect("texture resolves");
    assert_eq!(texture.data, vec![1, 2, 3, 4]);
    assert!(shader.normal_texture.is_none());

    assert!(Arc::ptr_eq(&texture, &repository.load_texture(CRATE_TEXTURE).expect("cached")));
    assert_eq!(repository.loader().fetches(CRATE_TEXTURE), 1);

    let stats = repository.stats();
    assert_eq!((stats.nodes, stats.shaders, stats.textures, stats.fetches), (1, 1, 1, 3));
    Ok(())
}

#[test]
fn shared_children_are_loaded_once() -> Result<(), anyhow::Error> {
    let loader = crate_loader()?
        .with(
            "appearance/stack.cmp",
            fixtures::compound(&[(CRATE, [0.0, 0.0, 0.0]), (CRATE, [0.0, 1.0, 0.0])])?,
        )
        .with("appearance/pile.cmp", fixtures::compound(&[(CRATE, [5.0, 0.0, 0.0])])?);
    let repository = fixtures::repository(loader);

    let stack = repository.load_file("appearance/stack.cmp").expect("stack resolves");
    let pile = repository.load_file("appearance/pile.cmp").expect("pile resolves");
    let (AssetNode::Compound(stack), AssetNode::Compound(pile)) = (stack.as_ref(), pile.as_ref()) else {
        panic!("expected compounds");
    };

    assert_eq!(stack.children.len(), 2);
    assert!(Arc::ptr_eq(&stack.children[0].node, &stack.children[1].node));
    assert!(Arc::ptr_eq(&stack.children[0].node, &pile.children[0].node));
    assert_eq!(
        stack.children[1].transform.transform_point3(Vec3::ZERO),
        Vec3::new(0.0, 1.0, 0.0)
    );
    assert_eq!(repository.loader().fetches(CRATE), 1);
    assert_eq!(repository.loader().fetches(CRATE_SHADER), 1);
    Ok(())
}

#[test]
fn missing_children_are_left_out() -> Result<(), anyhow::Error> {
    let loader = MemoryLoader::default().with(
        "appearance/lonely.cmp",
        fixtures::compound(&[("appearance/mesh/gone.msh", [0.0; 3])])?,
    );
    let repository = fixtures::repository(loader);

    let node = repository.try_load_file("appearance/lonely.cmp")?.expect("compound resolves");
    assert!(node.children().is_empty());

    assert!(matches!(
        repository.try_load_file("appearance/mesh/gone.msh"),
        Err(AssetError::EntryNotFound { .. })
    ));
    // failures are not cached, every request asks the archives again
    assert_eq!(repository.loader().fetches("appearance/mesh/gone.msh"), 2);
    Ok(())
}

#[test]
fn decode_failures_only_drop_the_broken_child() -> Result<(), anyhow::Error> {
    let mut truncated = fixtures::triangle(CRATE_SHADER)?;
    truncated.truncate(truncated.len() - 3);
    let loader = crate_loader()?
        .with("appearance/mesh/broken.msh", truncated)
        .with(
            "appearance/mixed.cmp",
            fixtures::compound(&[("appearance/mesh/broken.msh", [0.0; 3]), (CRATE, [0.0; 3])])?,
        );
    let repository = fixtures::repository(loader);

    let node = repository.load_file("appearance/mixed.cmp").expect("compound resolves");
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.children()[0].path(), CRATE);

    assert!(matches!(
        repository.try_load_file("appearance/mesh/broken.msh"),
        Err(AssetError::Decode { .. })
    ));
    Ok(())
}

#[test]
fn unknown_and_ignored_types() -> Result<(), anyhow::Error> {
    let loader = MemoryLoader::default()
        .with("clientdata/effect.cef", fixtures::empty_form(b"PEFT")?)
        .with("misc/unknown.iff", fixtures::empty_form(b"ZZZZ")?);
    let repository = fixtures::repository(loader);

    assert!(repository.try_load_file("clientdata/effect.cef")?.is_none());
    assert!(repository.try_load_file("clientdata/effect.cef")?.is_none());
    assert_eq!(repository.loader().fetches("clientdata/effect.cef"), 2);

    let res = repository.try_load_file("misc/unknown.iff");
    assert!(matches!(res, Err(AssetError::UnrecognizedType { ref tag, .. }) if tag == "ZZZZ"));
    assert!(repository.load_file("misc/unknown.iff").is_none());
    Ok(())
}

#[test]
fn cyclic_references_resolve_to_no_child() -> Result<(), anyhow::Error> {
    let loader = MemoryLoader::default()
        .with("appearance/a.cmp", fixtures::compound(&[("appearance/b.cmp", [0.0; 3])])?)
        .with("appearance/b.cmp", fixtures::compound(&[("appearance/a.cmp", [0.0; 3])])?);
    let repository = fixtures::repository(loader);

    let a = repository.load_file("appearance/a.cmp").expect("a resolves");
    let children = a.children();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].path(), "appearance/b.cmp");
    assert!(children[0].children().is_empty());

    // b was generated as part of a and is cached as it was built there
    let b = repository.load_file("appearance/b.cmp").expect("b is cached");
    assert!(Arc::ptr_eq(&b, children[0]));
    Ok(())
}

#[test]
fn self_references_resolve_to_no_child() -> Result<(), anyhow::Error> {
    let loader = MemoryLoader::default().with(
        "appearance/mirror.cmp",
        fixtures::compound(&[("appearance/mirror.cmp", [0.0; 3])])?,
    );
    let repository = fixtures::repository(loader);

    let node = repository.load_file("appearance/mirror.cmp").expect("resolves");
    assert!(node.children().is_empty());
    Ok(())
}

#[test]
fn detail_levels_keep_their_ranges() -> Result<(), anyhow::Error> {
    let loader = MemoryLoader::default()
        .with("a.msh", fixtures::triangle(CRATE_SHADER)?)
        .with("b.msh", fixtures::triangle(CRATE_SHADER)?)
        .with("c.msh", fixtures::triangle(CRATE_SHADER)?)
        .with(
            "appearance/crate.lod",
            fixtures::detail(&[("a.msh", 0.0, 100.0), ("b.msh", 100.0, 200.0), ("c.msh", 50.0, 150.0)])?,
        );
    let repository = fixtures::repository(loader);

    let node = repository.load_file("appearance/crate.lod").expect("lod resolves");
    let AssetNode::LevelOfDetail(lod) = node.as_ref() else {
        panic!("expected a lod, got {:?}", node);
    };
    let levels = lod
        .levels
        .iter()
        .map(|level| (level.node.path(), level.near, level.far))
        .collect_vec();
    assert_eq!(
        levels,
        vec![("a.msh", 0.0, 100.0), ("b.msh", 100.0, 200.0), ("c.msh", 50.0, 150.0)]
    );
    Ok(())
}

#[test]
fn skeletons_form_a_forest() -> Result<(), anyhow::Error> {
    let loader = MemoryLoader::default()
        .with("appearance/skeleton/arm.skt", fixtures::skeleton(&[("root", -1), ("arm", 0)])?)
        .with(
            "appearance/arm.mgn",
            fixtures::skeletal_mesh("appearance/skeleton/arm.skt", CRATE_SHADER)?,
        );
    let repository = fixtures::repository(loader);

    let node = repository.load_file("appearance/arm.mgn").expect("skeletal mesh resolves");
    let AssetNode::SkeletalMesh(mesh) = node.as_ref() else {
        panic!("expected a skeletal mesh, got {:?}", node);
    };
    assert!(mesh.shaders[0].is_none());
    let AssetNode::Skeleton(skeleton) = mesh.skeletons[0].as_ref() else {
        panic!("expected a skeleton");
    };

    let skeleton = &skeleton.skeleton;
    assert_eq!(skeleton.roots().collect_vec(), vec![0]);
    assert_eq!(skeleton.bones[0].name, "root");
    assert_eq!(skeleton.children(0).collect_vec(), vec![1]);
    assert_eq!(skeleton.bones[1].name, "arm");

    // two quarter turns around Y make a half turn
    let rotation = skeleton.bones[1].rotation();
    assert!((rotation.y.abs() - 1.0).abs() < 1e-5);
    assert!(rotation.w.abs() < 1e-5);
    Ok(())
}

#[test]
fn appearances_templates_and_snapshots() -> Result<(), anyhow::Error> {
    let loader = crate_loader()?
        .with("appearance/crate.apt", fixtures::appearance(CRATE)?)
        .with(
            "snapshot/tatooine.ws",
            fixtures::snapshot(
                &[(1, 0, 0), (2, 1, 0), (3, 0, 1)],
                &["appearance/crate.apt", "object/missing.iff"],
            )?,
        );
    let repository = fixtures::repository(loader);

    let node = repository.load_file("snapshot/tatooine.ws").expect("snapshot resolves");
    let AssetNode::WorldSnapshot(snapshot) = node.as_ref() else {
        panic!("expected a snapshot, got {:?}", node);
    };
    assert_eq!(snapshot.roots.len(), 2);

    let first = &snapshot.roots[0];
    let appearance = first.node.clone().expect("appearance resolves");
    let AssetNode::Group(group) = appearance.as_ref() else {
        panic!("expected a group, got {:?}", appearance);
    };
    assert_eq!(group.kind, RecordKind::Appearance);
    assert_eq!(group.children[0].path(), CRATE);
    assert!(Arc::ptr_eq(&appearance, first.children[0].node.as_ref().expect("shared")));
    assert_eq!(first.transform.transform_point3(Vec3::ZERO), Vec3::new(1.0, 0.0, 0.0));

    // the missing template still keeps its place in the tree
    assert!(snapshot.roots[1].node.is_none());
    assert_eq!(snapshot.roots[1].object_id, 3);
    Ok(())
}

#[test]
fn concurrent_first_loads_decode_once() -> Result<(), anyhow::Error> {
    let loader = crate_loader()?.with(
        "appearance/stack.cmp",
        fixtures::compound(&[(CRATE, [0.0; 3]), (CRATE, [1.0, 0.0, 0.0])])?,
    );
    let repository = fixtures::repository(loader);
    let repository = &repository;

    let nodes = thread::scope(|scope| {
        let handles = (0..8)
            .map(|i| {
                let path = if i % 2 == 0 { "appearance/stack.cmp" } else { CRATE };
                scope.spawn(move || repository.load_file(path))
            })
            .collect_vec();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("no panics"))
            .collect_vec()
    });

    assert!(nodes.iter().all(Option::is_some));
    assert_eq!(repository.loader().fetches("appearance/stack.cmp"), 1);
    assert_eq!(repository.loader().fetches(CRATE), 1);
    assert_eq!(repository.loader().fetches(CRATE_SHADER), 1);
    Ok(())
}

#[test]
fn patch_archives_take_precedence() -> Result<(), anyhow::Error> {
    let dir = tempfile::tempdir()?;
    for (name, shader) in [("bottom.tre", "shader/old.sht"), ("patch_00.tre", "shader/new.sht")] {
        let mut writer = ArchiveWriter::new();
        writer.add_file(CRATE, &fixtures::triangle(shader)?, true);
        writer.write(&mut BufWriter::new(File::create(dir.path().join(name))?))?;
    }

    let loader = TreLoader::new(dir.path(), &Manifest::parse("bottom.tre\npatch_00.tre"))?;
    let repository = AssetRepository::new(loader, Box::new(fixtures::PixelDecoder {}));

    let node = repository.load_file(CRATE).expect("crate resolves");
    let AssetNode::Mesh(mesh) = node.as_ref() else {
        panic!("expected a mesh, got {:?}", node);
    };
    assert_eq!(mesh.mesh.tables[0].shader, "shader/new.sht");

    repository.load_file(CRATE);
    // the crate and its missing shader
    assert_eq!(repository.loader().fetch_count(), 2);
    Ok(())
}
