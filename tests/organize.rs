use fasdd_prep::dataset::{read_data_yaml, Split};
use fasdd_prep::organize::{organize_dataset, organize_entry, SplitStatus};
use fasdd_prep::progress::NoProgress;
use fasdd_prep::PrepError;

mod common;

use common::SourceTree;

#[test]
fn copies_only_complete_pairs() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_image("img1.jpg");
    tree.add_label("img1", "0 0.5 0.5 0.2 0.2\n");
    tree.add_image("img2.png");
    tree.add_manifest(Split::Train, &["img1", "img2"]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    let report = organize_dataset(&config, &mut NoProgress).expect("organize");

    let train = report.split(Split::Train).expect("train report");
    assert_eq!(train.processed, 2);
    assert_eq!(train.copied, 1);
    assert_eq!(train.missing_label, 1);

    let out = tree.output();
    assert!(out.join("images/train/img1.jpg").is_file());
    assert!(out.join("labels/train/img1.txt").is_file());
    assert!(!out.join("images/train/img2.png").exists());
    assert!(!out.join("labels/train/img2.txt").exists());
}

#[test]
fn manifest_paths_are_reduced_to_basenames() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_image("fire_001.jpeg");
    tree.add_label("fire_001", "0 0.1 0.1 0.1 0.1\n");
    tree.add_manifest(Split::Val, &["some/dir/fire_001.jpg", "", "   "]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    let report = organize_dataset(&config, &mut NoProgress).expect("organize");

    let val = report.split(Split::Val).expect("val report");
    assert_eq!(val.processed, 1);
    assert_eq!(val.copied, 1);
    assert!(tree.output().join("images/val/fire_001.jpeg").is_file());
}

#[test]
fn missing_manifests_skip_their_split_but_create_dirs() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_image("a.jpg");
    tree.add_label("a", "1 0.5 0.5 0.5 0.5\n");
    tree.add_manifest(Split::Train, &["a"]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    let report = organize_dataset(&config, &mut NoProgress).expect("organize");

    assert_eq!(report.total_copied(), 1);
    let missing: Vec<_> = report.missing_manifests().map(|s| s.split).collect();
    assert_eq!(missing, vec![Split::Val, Split::Test]);
    assert_eq!(
        report.split(Split::Test).map(|s| s.status),
        Some(SplitStatus::ManifestMissing)
    );

    for split in Split::ALL {
        assert!(tree.output().join("images").join(split.as_str()).is_dir());
        assert!(tree.output().join("labels").join(split.as_str()).is_dir());
    }
}

#[test]
fn writes_data_config_with_absolute_root() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_manifest(Split::Train, &[]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    organize_dataset(&config, &mut NoProgress).expect("organize");

    let data = read_data_yaml(&tree.data_yaml()).expect("read data yaml");
    assert!(data.path.is_absolute());
    assert_eq!(
        data.path,
        std::fs::canonicalize(tree.output()).expect("canonical output")
    );
    assert_eq!(data.train, "images/train");
    assert_eq!(data.val, "images/val");
    assert_eq!(data.test, "images/test");
    assert_eq!(data.nc, 2);
    assert_eq!(data.names, vec!["fire", "smoke"]);
}

#[test]
fn custom_classes_flow_into_data_config() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_manifest(Split::Train, &[]);

    let overrides = fasdd_prep::config::OrganizeOverrides {
        class_names: vec!["flame".into(), "smoke".into(), "haze".into()],
        ..Default::default()
    };
    let config = tree.config().organize_config(&overrides).expect("config");
    organize_dataset(&config, &mut NoProgress).expect("organize");

    let data = read_data_yaml(&tree.data_yaml()).expect("read data yaml");
    assert_eq!(data.nc, 3);
    assert_eq!(data.names, vec!["flame", "smoke", "haze"]);
}

#[test]
fn rerun_produces_identical_tree() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    for key in ["a", "b", "c"] {
        tree.add_image(&format!("{}.jpg", key));
        tree.add_label(key, "0 0.5 0.5 0.2 0.2\n1 0.3 0.3 0.1 0.4\n");
    }
    tree.add_manifest(Split::Train, &["a", "b"]);
    tree.add_manifest(Split::Val, &["c", "missing"]);
    tree.add_manifest(Split::Test, &["b"]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");

    let first_report = organize_dataset(&config, &mut NoProgress).expect("first run");
    let first = common::snapshot(&tree.output());
    let first_yaml = std::fs::read(tree.data_yaml()).expect("read yaml");

    let second_report = organize_dataset(&config, &mut NoProgress).expect("second run");
    let second = common::snapshot(&tree.output());
    let second_yaml = std::fs::read(tree.data_yaml()).expect("read yaml");

    assert_eq!(first, second);
    assert_eq!(first_yaml, second_yaml);
    assert_eq!(first_report, second_report);
    assert_eq!(first.len(), 8);
}

#[test]
fn every_copied_pair_exists_in_source() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_image("x.jpg");
    tree.add_label("x", "0 0.5 0.5 0.1 0.1\n");
    tree.add_label("y", "0 0.5 0.5 0.1 0.1\n");
    tree.add_image("z.png");
    tree.add_manifest(Split::Train, &["x", "y", "z"]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    organize_dataset(&config, &mut NoProgress).expect("organize");

    let out = tree.output();
    for (rel, _) in common::snapshot(&out.join("labels/train")) {
        let key = rel.file_stem().and_then(|s| s.to_str()).expect("stem");
        assert!(tree.label(key).is_file());
        assert!(
            ["jpg", "png", "jpeg"]
                .iter()
                .any(|ext| tree.image(&format!("{}.{}", key, ext)).is_file()),
            "no source image for {}",
            key
        );
    }
    assert_eq!(common::snapshot(&out.join("labels/train")).len(), 1);
}

#[test]
fn unreadable_output_location_propagates() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_manifest(Split::Train, &[]);
    // A regular file where the output root should be.
    common::write_file(&tree.output(), "not a directory");

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    let err = organize_dataset(&config, &mut NoProgress).unwrap_err();
    assert!(matches!(err, PrepError::Io(_)), "got {:?}", err);
}

#[test]
fn duplicate_entries_are_counted_and_overwrite() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let tree = SourceTree::new(temp.path());
    tree.add_image("a.jpg");
    tree.add_label("a", "0 0.5 0.5 0.2 0.2\n");
    tree.add_manifest(Split::Train, &["a.jpg", "a.png", "a"]);

    let config = tree
        .config()
        .organize_config(&common::organize_overrides())
        .expect("organize config");
    let report = organize_dataset(&config, &mut NoProgress).expect("organize");

    let train = report.split(Split::Train).expect("train report");
    assert_eq!(train.processed, 3);
    assert_eq!(train.copied, 3);

    let out = tree.output();
    let labels = common::snapshot(&out.join("labels/train"));
    assert_eq!(labels.len(), 1);
    assert!(labels.contains_key(std::path::Path::new("a.txt")));
    assert_eq!(common::snapshot(&out.join("images/train")).len(), 1);
}

#[test]
fn copy_into_missing_destination_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let src = temp.path().join("src");
    common::write_file(&src.join("img/k.jpg"), "jpg");
    common::write_file(&src.join("lbl/k.txt"), "0 0.5 0.5 0.1 0.1\n");
    let dst = temp.path().join("nodir");

    let err = organize_entry(
        "k",
        &src.join("img"),
        &src.join("lbl"),
        &dst.join("img"),
        &dst.join("lbl"),
    )
    .unwrap_err();
    assert!(matches!(err, PrepError::Copy { .. }), "got {:?}", err);
    assert!(!dst.exists());
}
