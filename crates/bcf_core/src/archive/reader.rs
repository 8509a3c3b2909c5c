//! Archive read path: zip entries -> staged files -> collaborators -> registry.

use super::entry_path::{resolve_entry_path, ArtifactRole};
use super::scratch::{release_staged, stage_entry};
use super::{push_warning, ArchiveReadError, CodecWarning, LoadOutcome};
use crate::config::CodecOptions;
use crate::model::document::BcfDocument;
use crate::model::topic::TopicRecord;
use crate::registry::TopicRegistry;
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use zip::ZipArchive;

pub(crate) fn read_archive<M: BcfDocument, V: BcfDocument>(
    archive_path: &Path,
    options: &CodecOptions,
) -> Result<LoadOutcome<M, V>, ArchiveReadError> {
    let started_at = Instant::now();
    info!(
        "event=bcf_load module=archive status=start path={}",
        archive_path.display()
    );

    let mut archive = match open_archive(archive_path) {
        Ok(archive) => archive,
        Err(err) => {
            error!(
                "event=bcf_load module=archive status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    let scratch_root = options.scratch_dir();
    if let Err(err) = std::fs::create_dir_all(&scratch_root) {
        warn!(
            "event=scratch_root module=archive status=error path={} error={}",
            scratch_root.display(),
            err
        );
    }

    let mut registry = TopicRegistry::new();
    let mut warnings = Vec::new();

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(err) => {
                push_warning(
                    &mut warnings,
                    CodecWarning::EntryStage {
                        entry_name: format!("#{index}"),
                        message: err.to_string(),
                    },
                );
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        let Some(resolved) = resolve_entry_path(&entry_name) else {
            debug!("event=entry_skip module=archive status=skip reason=no_group entry={entry_name}");
            continue;
        };

        let staged = match stage_entry(&mut entry, &scratch_root) {
            Ok(staged) => staged,
            Err(err) => {
                push_warning(
                    &mut warnings,
                    CodecWarning::EntryStage {
                        entry_name: entry_name.clone(),
                        message: err.to_string(),
                    },
                );
                continue;
            }
        };

        let record = registry.find_or_create(resolved.group_id);
        dispatch_entry(
            record,
            resolved.inner_name,
            staged.path(),
            options,
            &mut warnings,
        );
        release_staged(staged, &mut warnings);
    }

    for record in registry.iter().filter(|record| record.is_empty()) {
        push_warning(
            &mut warnings,
            CodecWarning::EmptyTopic {
                group_id: record.group_id().to_string(),
            },
        );
    }

    info!(
        "event=bcf_load module=archive status=ok topics={} warnings={} duration_ms={}",
        registry.len(),
        warnings.len(),
        started_at.elapsed().as_millis()
    );
    Ok(LoadOutcome { registry, warnings })
}

fn open_archive(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>, ArchiveReadError> {
    let file = File::open(archive_path).map_err(|source| ArchiveReadError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| ArchiveReadError::InvalidContainer {
        path: archive_path.to_path_buf(),
        source,
    })
}

/// Routes one staged file into the topic field matching its inner name.
fn dispatch_entry<M: BcfDocument, V: BcfDocument>(
    record: &mut TopicRecord<M, V>,
    inner_name: &str,
    staged_path: &Path,
    options: &CodecOptions,
    warnings: &mut Vec<CodecWarning>,
) {
    let role = ArtifactRole::from_inner_name(inner_name);
    debug!(
        "event=entry_dispatch module=archive status=start group_id={} role={} inner={}",
        record.group_id(),
        role.as_str(),
        inner_name
    );

    match role {
        ArtifactRole::Markup => {
            record.markup = load_document::<M>(record.group_id(), staged_path, warnings);
        }
        ArtifactRole::Viewpoint => {
            record.viewpoint = load_document::<V>(record.group_id(), staged_path, warnings);
        }
        ArtifactRole::Snapshot => match std::fs::read(staged_path) {
            Ok(bytes) => record.snapshot = Some(bytes),
            Err(err) => {
                record.snapshot = None;
                push_warning(
                    warnings,
                    CodecWarning::SnapshotRead {
                        group_id: record.group_id().to_string(),
                        message: err.to_string(),
                    },
                );
            }
        },
        ArtifactRole::Sidecar if options.retain_sidecars => match std::fs::read(staged_path) {
            Ok(bytes) => {
                record.sidecars.insert(inner_name.to_string(), bytes);
            }
            Err(err) => push_warning(
                warnings,
                CodecWarning::EntryStage {
                    entry_name: super::entry_path::entry_name(record.group_id(), inner_name),
                    message: err.to_string(),
                },
            ),
        },
        ArtifactRole::Sidecar => {
            debug!(
                "event=entry_skip module=archive status=skip reason=unrecognized group_id={} inner={}",
                record.group_id(),
                inner_name
            );
        }
    }
}

fn load_document<D: BcfDocument>(
    group_id: &str,
    staged_path: &Path,
    warnings: &mut Vec<CodecWarning>,
) -> Option<D> {
    match D::load_from_path(staged_path) {
        Ok(document) => Some(document),
        Err(err) => {
            push_warning(
                warnings,
                CodecWarning::CollaboratorLoad {
                    group_id: group_id.to_string(),
                    role: D::ROLE,
                    message: err.to_string(),
                },
            );
            None
        }
    }
}
