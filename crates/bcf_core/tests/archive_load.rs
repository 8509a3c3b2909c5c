mod common;

use bcf_core::{
    load, ArchiveReadError, BcfArchive, CodecOptions, CodecWarning, MarkupDocument,
    VisualizationInfoDocument,
};
use common::{build_archive, dir_listing, MARKUP_XML, PNG_BYTES, VIEWPOINT_XML};
use tempfile::TempDir;

#[test]
fn load_reconstructs_complete_topics() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("issues.bcfzip");
    build_archive(
        &path,
        &[
            ("bcf.version", b"<Version VersionId=\"2.1\"/>"),
            ("g1/", b""),
            ("g1/markup.bcf", MARKUP_XML.as_bytes()),
            ("g1/viewpoint.bcfv", VIEWPOINT_XML.as_bytes()),
            ("g1/snapshot.png", PNG_BYTES),
            ("g2/markup.bcf", MARKUP_XML.as_bytes()),
        ],
    );

    let outcome = load(&path).unwrap();
    assert_eq!(outcome.registry.group_ids(), vec!["g1", "g2"]);

    let g1 = outcome.registry.get("g1").unwrap();
    assert_eq!(g1.markup, Some(MarkupDocument::new(MARKUP_XML)));
    assert_eq!(g1.viewpoint, Some(VisualizationInfoDocument::new(VIEWPOINT_XML)));
    assert_eq!(g1.snapshot.as_deref(), Some(PNG_BYTES));
    assert!(outcome.warnings.is_empty());
}

#[test]
fn partial_topic_loads_without_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.bcfzip");
    build_archive(&path, &[("abc123/markup.bcf", MARKUP_XML.as_bytes())]);

    let outcome = load(&path).unwrap();
    assert_eq!(outcome.registry.len(), 1);
    let record = outcome.registry.get("abc123").unwrap();
    assert!(record.markup.is_some());
    assert!(record.viewpoint.is_none());
    assert!(record.snapshot.is_none());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn inner_names_match_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("upper.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/MARKUP.BCF", MARKUP_XML.as_bytes()),
            ("g1/ViewPoint.Bcfv", VIEWPOINT_XML.as_bytes()),
            ("g1/SNAPSHOT.png", PNG_BYTES),
        ],
    );

    let outcome = load(&path).unwrap();
    let record = outcome.registry.get("g1").unwrap();
    assert_eq!(record.markup, Some(MarkupDocument::new(MARKUP_XML)));
    assert!(record.viewpoint.is_some());
    assert!(record.snapshot.is_some());
}

#[test]
fn unknown_sidecars_are_ignored_by_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sidecar.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/markup.bcf", MARKUP_XML.as_bytes()),
            ("g1/extra/notes.txt", b"remember this"),
        ],
    );

    let outcome = load(&path).unwrap();
    let record = outcome.registry.get("g1").unwrap();
    assert!(record.sidecars.is_empty());
    assert!(outcome.warnings.is_empty());
}

#[test]
fn sidecars_are_kept_when_retention_is_enabled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sidecar.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/markup.bcf", MARKUP_XML.as_bytes()),
            ("g1/extra/notes.txt", b"remember this"),
        ],
    );

    let codec = BcfArchive::<MarkupDocument, VisualizationInfoDocument>::new(CodecOptions {
        retain_sidecars: true,
        ..CodecOptions::default()
    });
    let outcome = codec.load(&path).unwrap();
    let record = outcome.registry.get("g1").unwrap();
    assert_eq!(
        record.sidecars.get("extra/notes.txt").map(Vec::as_slice),
        Some(&b"remember this"[..])
    );
}

#[test]
fn unreadable_document_is_absent_and_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/markup.bcf", &[0xff, 0xfe, 0xfd]),
            ("g1/viewpoint.bcfv", VIEWPOINT_XML.as_bytes()),
            ("g2/markup.bcf", MARKUP_XML.as_bytes()),
        ],
    );

    let outcome = load(&path).unwrap();
    let g1 = outcome.registry.get("g1").unwrap();
    assert!(g1.markup.is_none());
    assert!(g1.viewpoint.is_some());
    assert_eq!(outcome.degraded_topics(), vec!["g1"]);
    assert!(matches!(
        &outcome.warnings[0],
        CodecWarning::CollaboratorLoad { group_id, role: "markup", .. } if group_id == "g1"
    ));
}

#[test]
fn topic_with_only_unknown_files_is_kept_and_flagged_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.bcfzip");
    build_archive(&path, &[("g9/readme.txt", b"nothing useful")]);

    let outcome = load(&path).unwrap();
    assert!(outcome.registry.get("g9").unwrap().is_empty());
    assert_eq!(
        outcome.warnings,
        vec![CodecWarning::EmptyTopic {
            group_id: "g9".to_string()
        }]
    );
}

#[test]
fn later_duplicate_entry_replaces_earlier_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dupe.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/snapshot.png", b"first"),
            ("g1/Snapshot.PNG", b"second"),
        ],
    );

    let outcome = load(&path).unwrap();
    assert_eq!(outcome.registry.len(), 1);
    assert_eq!(
        outcome.registry.get("g1").unwrap().snapshot.as_deref(),
        Some(&b"second"[..])
    );
}

#[test]
fn missing_archive_is_an_open_error() {
    let dir = TempDir::new().unwrap();
    let err = load(dir.path().join("absent.bcfzip")).unwrap_err();
    assert!(matches!(err, ArchiveReadError::Open { .. }));
}

#[test]
fn corrupt_container_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.bcfzip");
    std::fs::write(&path, b"this is not a zip archive at all").unwrap();

    let err = load(&path).unwrap_err();
    assert!(matches!(err, ArchiveReadError::InvalidContainer { .. }));
    assert!(err.to_string().contains("garbage.bcfzip"));
}

#[test]
fn staged_files_do_not_outlive_load() {
    let dir = TempDir::new().unwrap();
    let scratch_root = dir.path().join("scratch");
    let path = dir.path().join("issues.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/markup.bcf", &[0xff]),
            ("g1/viewpoint.bcfv", VIEWPOINT_XML.as_bytes()),
            ("g1/other.bin", b"ignored"),
        ],
    );

    let codec = BcfArchive::<MarkupDocument, VisualizationInfoDocument>::new(CodecOptions {
        scratch_root: Some(scratch_root.clone()),
        ..CodecOptions::default()
    });
    codec.load(&path).unwrap();
    assert!(dir_listing(&scratch_root).is_empty());
}

#[test]
fn unusable_scratch_root_degrades_every_entry_without_failing() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file in the way").unwrap();
    let path = dir.path().join("issues.bcfzip");
    build_archive(
        &path,
        &[
            ("g1/markup.bcf", MARKUP_XML.as_bytes()),
            ("g1/snapshot.png", PNG_BYTES),
        ],
    );

    let codec = BcfArchive::<MarkupDocument, VisualizationInfoDocument>::new(CodecOptions {
        scratch_root: Some(blocker.join("scratch")),
        ..CodecOptions::default()
    });
    let outcome = codec.load(&path).unwrap();

    assert!(outcome.registry.is_empty());
    assert_eq!(outcome.warnings.len(), 2);
    assert!(outcome
        .warnings
        .iter()
        .all(|warning| matches!(warning, CodecWarning::EntryStage { .. })));
}
