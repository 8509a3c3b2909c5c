//! Archive write path: registry -> collaborators -> scratch dirs -> zip entries.

use super::entry_path::{
    entry_name, ArtifactRole, MARKUP_FILE_NAME, SNAPSHOT_FILE_NAME, VIEWPOINT_FILE_NAME,
};
use super::scratch::ScratchBatch;
use super::{push_warning, ArchiveWriteError, CodecWarning, SaveOutcome};
use crate::config::CodecOptions;
use crate::model::document::BcfDocument;
use crate::model::topic::TopicRecord;
use crate::registry::TopicRegistry;
use chrono::{Datelike, Local, Timelike};
use log::{error, info, warn};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Component, Path, PathBuf};
use std::time::{Instant, SystemTime};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub(crate) fn write_archive<M: BcfDocument, V: BcfDocument>(
    registry: &TopicRegistry<M, V>,
    archive_path: &Path,
    options: &CodecOptions,
) -> Result<SaveOutcome, ArchiveWriteError> {
    let started_at = Instant::now();
    info!(
        "event=bcf_save module=archive status=start path={} topics={}",
        archive_path.display(),
        registry.len()
    );

    let file = match File::create(archive_path) {
        Ok(file) => file,
        Err(source) => {
            error!(
                "event=bcf_save module=archive status=error error_code=archive_create_failed error={}",
                source
            );
            return Err(ArchiveWriteError::Create {
                path: archive_path.to_path_buf(),
                source,
            });
        }
    };

    let mut outcome = SaveOutcome::default();
    let mut scratch = ScratchBatch::new(options.scratch_dir());
    let result = {
        let mut writer = ZipWriter::new(BufWriter::new(file));
        match write_topics(&mut writer, registry, options, &mut scratch, &mut outcome) {
            Ok(()) => finish_archive(writer, archive_path),
            Err(err) => Err(err),
        }
    };
    scratch.release(&mut outcome.warnings);

    match result {
        Ok(()) => {
            info!(
                "event=bcf_save module=archive status=ok entries={} warnings={} duration_ms={}",
                outcome.entries_written.len(),
                outcome.warnings.len(),
                started_at.elapsed().as_millis()
            );
            Ok(outcome)
        }
        Err(err) => {
            error!(
                "event=bcf_save module=archive status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            if let Err(cleanup_err) = std::fs::remove_file(archive_path) {
                warn!(
                    "event=scratch_cleanup_failed module=archive status=degraded path={} error={}",
                    archive_path.display(),
                    cleanup_err
                );
            }
            Err(err)
        }
    }
}

fn finish_archive<W: Write + Seek>(
    writer: ZipWriter<W>,
    archive_path: &Path,
) -> Result<(), ArchiveWriteError> {
    let finalize_error = |source: ZipError| ArchiveWriteError::Finalize {
        path: archive_path.to_path_buf(),
        source,
    };
    let mut inner = writer.finish().map_err(finalize_error)?;
    inner
        .flush()
        .map_err(|err| finalize_error(ZipError::Io(err)))
}

fn write_topics<W: Write + Seek, M: BcfDocument, V: BcfDocument>(
    writer: &mut ZipWriter<W>,
    registry: &TopicRegistry<M, V>,
    options: &CodecOptions,
    scratch: &mut ScratchBatch,
    outcome: &mut SaveOutcome,
) -> Result<(), ArchiveWriteError> {
    for record in registry {
        if record.is_empty() {
            push_warning(
                &mut outcome.warnings,
                CodecWarning::EmptyTopic {
                    group_id: record.group_id().to_string(),
                },
            );
            continue;
        }
        let topic_dir = match scratch.allocate(record.group_id()) {
            Ok(dir) => dir,
            Err(err) => {
                push_warning(
                    &mut outcome.warnings,
                    CodecWarning::TopicStage {
                        group_id: record.group_id().to_string(),
                        message: err.to_string(),
                    },
                );
                continue;
            }
        };
        let leftovers = stage_topic(record, &topic_dir, options, &mut outcome.warnings)?;
        append_directory(
            writer,
            &topic_dir,
            record.group_id(),
            &leftovers,
            options,
            outcome,
        )?;
    }
    Ok(())
}

/// Writes one topic's artifacts into its scratch directory.
///
/// Returns paths of failed documents that could not be removed; they must be
/// kept out of the archive.
fn stage_topic<M: BcfDocument, V: BcfDocument>(
    record: &TopicRecord<M, V>,
    topic_dir: &Path,
    options: &CodecOptions,
    warnings: &mut Vec<CodecWarning>,
) -> Result<Vec<PathBuf>, ArchiveWriteError> {
    let mut leftovers = Vec::new();
    if let Some(markup) = &record.markup {
        leftovers.extend(save_document(
            markup,
            record.group_id(),
            &topic_dir.join(MARKUP_FILE_NAME),
            options,
            warnings,
        )?);
    }
    if let Some(viewpoint) = &record.viewpoint {
        leftovers.extend(save_document(
            viewpoint,
            record.group_id(),
            &topic_dir.join(VIEWPOINT_FILE_NAME),
            options,
            warnings,
        )?);
    }
    if let Some(snapshot) = &record.snapshot {
        if let Err(err) = std::fs::write(topic_dir.join(SNAPSHOT_FILE_NAME), snapshot) {
            push_warning(
                warnings,
                CodecWarning::TopicStage {
                    group_id: record.group_id().to_string(),
                    message: format!("{SNAPSHOT_FILE_NAME}: {err}"),
                },
            );
        }
    }

    for (inner_name, bytes) in &record.sidecars {
        if !is_safe_sidecar_name(inner_name) {
            push_warning(
                warnings,
                CodecWarning::SidecarRejected {
                    group_id: record.group_id().to_string(),
                    inner_name: inner_name.clone(),
                },
            );
            continue;
        }
        let target = topic_dir.join(inner_name);
        let written = match target.parent() {
            Some(parent) => std::fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| std::fs::write(&target, bytes));
        if let Err(err) = written {
            push_warning(
                warnings,
                CodecWarning::TopicStage {
                    group_id: record.group_id().to_string(),
                    message: format!("{inner_name}: {err}"),
                },
            );
        }
    }
    Ok(leftovers)
}

/// Saves one document; on failure returns the path if its remains could not be removed.
fn save_document<D: BcfDocument>(
    document: &D,
    group_id: &str,
    target: &Path,
    options: &CodecOptions,
    warnings: &mut Vec<CodecWarning>,
) -> Result<Option<PathBuf>, ArchiveWriteError> {
    let Err(source) = document.save_to_path(target) else {
        return Ok(None);
    };
    // A half-written document must not reach the archive.
    let leftover = match std::fs::remove_file(target) {
        Ok(()) => None,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            push_warning(
                warnings,
                CodecWarning::ScratchCleanup {
                    path: target.to_path_buf(),
                    message: err.to_string(),
                },
            );
            Some(target.to_path_buf())
        }
    };
    if options.strict_collaborators {
        return Err(ArchiveWriteError::CollaboratorSave {
            group_id: group_id.to_string(),
            role: D::ROLE,
            source,
        });
    }
    push_warning(
        warnings,
        CodecWarning::CollaboratorSave {
            group_id: group_id.to_string(),
            role: D::ROLE,
            message: source.to_string(),
        },
    );
    Ok(leftover)
}

/// Sidecars stay inside the topic folder and never shadow a known artifact.
fn is_safe_sidecar_name(inner_name: &str) -> bool {
    if inner_name.is_empty() || inner_name.contains('\\') {
        return false;
    }
    if ArtifactRole::from_inner_name(inner_name) != ArtifactRole::Sidecar {
        return false;
    }
    Path::new(inner_name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

/// Adds every file under `topic_dir` as `<group_id>/<relative path>`,
/// except anything at or below a path in `excluded`.
fn append_directory<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    topic_dir: &Path,
    group_id: &str,
    excluded: &[PathBuf],
    options: &CodecOptions,
    outcome: &mut SaveOutcome,
) -> Result<(), ArchiveWriteError> {
    for walked in WalkDir::new(topic_dir).follow_links(false).sort_by_file_name() {
        let walked = match walked {
            Ok(walked) => walked,
            Err(err) => {
                push_warning(
                    &mut outcome.warnings,
                    CodecWarning::TopicStage {
                        group_id: group_id.to_string(),
                        message: err.to_string(),
                    },
                );
                continue;
            }
        };
        if !walked.file_type().is_file()
            || excluded.iter().any(|path| walked.path().starts_with(path))
        {
            continue;
        }

        let Ok(relative) = walked.path().strip_prefix(topic_dir) else {
            continue;
        };
        let name = entry_name(group_id, &forward_slash_path(relative));
        let staged = std::fs::read(walked.path()).and_then(|bytes| {
            let modified = walked.metadata().map_err(std::io::Error::from)?.modified()?;
            Ok((bytes, modified))
        });
        let (bytes, modified) = match staged {
            Ok(staged) => staged,
            Err(err) => {
                push_warning(
                    &mut outcome.warnings,
                    CodecWarning::TopicStage {
                        group_id: group_id.to_string(),
                        message: format!("{name}: {err}"),
                    },
                );
                continue;
            }
        };

        writer
            .start_file(name.as_str(), entry_options(options, modified))
            .and_then(|()| writer.write_all(&bytes).map_err(ZipError::Io))
            .map_err(|source| ArchiveWriteError::Entry {
                entry_name: name.clone(),
                source,
            })?;
        outcome.entries_written.push(name);
    }
    Ok(())
}

fn forward_slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn entry_options(options: &CodecOptions, modified: SystemTime) -> SimpleFileOptions {
    let level = options.effective_compression_level();
    let base = SimpleFileOptions::default().last_modified_time(zip_timestamp(modified));
    if level == 0 {
        base.compression_method(CompressionMethod::Stored)
    } else {
        base.compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level))
    }
}

/// Local-time zip timestamp; the zip default when outside the 1980..=2107 range.
fn zip_timestamp(modified: SystemTime) -> DateTime {
    let local: chrono::DateTime<Local> = modified.into();
    let converted = u16::try_from(local.year()).ok().and_then(|year| {
        DateTime::from_date_and_time(
            year,
            local.month() as u8,
            local.day() as u8,
            local.hour() as u8,
            local.minute() as u8,
            local.second() as u8,
        )
        .ok()
    });
    converted.unwrap_or_default()
}
