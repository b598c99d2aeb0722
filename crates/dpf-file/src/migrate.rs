//! Schema migration framework.

use crate::FileError;
use crate::schema::{ResultFile, StepDef};

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut file: ResultFile) -> Result<ResultFile, FileError> {
    if file.version > LATEST_VERSION {
        return Err(FileError::UnsupportedVersion {
            version: file.version,
        });
    }
    while file.version < LATEST_VERSION {
        file = migrate_one_version(file)?;
    }
    Ok(file)
}

fn migrate_one_version(file: ResultFile) -> Result<ResultFile, FileError> {
    match file.version {
        0 => migrate_v0_to_v1(file),
        1 => migrate_v1_to_v2(file),
        v => Err(FileError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut file: ResultFile) -> Result<ResultFile, FileError> {
    file.version = 1;
    Ok(file)
}

/// Version 1 stored the time axis as bare values; each becomes its own load step.
fn migrate_v1_to_v2(mut file: ResultFile) -> Result<ResultFile, FileError> {
    let support = &mut file.time_freq_support;
    if let Some(times) = support.times.take() {
        if !support.steps.is_empty() {
            return Err(FileError::Migration {
                what: "time_freq_support has both `times` and `steps`".to_string(),
            });
        }
        support.steps = times
            .into_iter()
            .enumerate()
            .map(|(i, time)| StepDef {
                time,
                load_step: i as u32 + 1,
                substep: 1,
            })
            .collect();
    }
    file.version = 2;
    Ok(file)
}
