use crate::store::{Store, StoreError};
use crate::validation::validate_learner_id;

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_drop_invalid_learner_keys", m002_drop_invalid_learner_keys),
    ]
}

/// Applies every migration newer than the stored version.
///
/// Migrations must be idempotent: a crash between running one and persisting
/// its version re-runs it on the next start. The version only moves forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("stored version has {} bytes, expected 4", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Learner-scoped trees are only ever read back through validated learner ids,
/// so entries under any other key are unreachable.
fn m002_drop_invalid_learner_keys(store: &Store) -> Result<(), StoreError> {
    for tree in [&store.responses, &store.review_states] {
        let mut dropped = 0usize;
        for entry in tree.iter() {
            let (key, _) = entry?;
            let valid = std::str::from_utf8(&key)
                .map(|id| validate_learner_id(id).is_ok())
                .unwrap_or(false);
            if !valid {
                tree.remove(&key)?;
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::warn!(
                tree = %String::from_utf8_lossy(&tree.name()),
                dropped,
                "Dropped entries with invalid learner keys"
            );
        }
    }
    Ok(())
}
