//! Read and write admission policy
//!
//! Pure decisions over table metadata and content state. The controller
//! calls them in order; each returns the first rejection that applies.
//!
//! Reads:
//! 1. active and unavailable → `ActiveTableUnavailable`
//! 2. content marker not settled → `ContentProcessing`
//! 3. active and stale → `DependenciesStale`
//!
//! Writes:
//! 1. active → `ActiveTableImmutable`
//! 2. unavailable → `TableUnavailable`

use crate::error::Rejection;
use tablegate_common::{ContentState, TableMetadata};

/// Checks that need only the metadata record, run before the content
/// marker is fetched
pub fn read_precheck(meta: &TableMetadata) -> Result<(), Rejection> {
    match meta {
        TableMetadata::Active {
            available: false, ..
        } => Err(Rejection::ActiveTableUnavailable),
        _ => Ok(()),
    }
}

/// Checks against the content marker
pub fn read_content_check(meta: &TableMetadata, content: ContentState) -> Result<(), Rejection> {
    if !content.is_present() {
        return Err(Rejection::ContentProcessing);
    }
    if let TableMetadata::Active { stale: true, .. } = meta {
        return Err(Rejection::DependenciesStale);
    }
    Ok(())
}

pub fn write_check(meta: &TableMetadata) -> Result<(), Rejection> {
    match meta {
        TableMetadata::Active { .. } => Err(Rejection::ActiveTableImmutable),
        TableMetadata::Passive { available: false } => Err(Rejection::TableUnavailable),
        TableMetadata::Passive { available: true } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(meta: TableMetadata, content: ContentState) -> Result<(), Rejection> {
        read_precheck(&meta)?;
        read_content_check(&meta, content)
    }

    #[test]
    fn test_read_passive() {
        assert_eq!(read(TableMetadata::passive(true), ContentState::Settled), Ok(()));
        assert_eq!(
            read(TableMetadata::passive(true), ContentState::InFlight),
            Err(Rejection::ContentProcessing)
        );
        assert_eq!(
            read(TableMetadata::passive(true), ContentState::Missing),
            Err(Rejection::ContentProcessing)
        );
    }

    #[test]
    fn test_read_availability_precedes_content_and_staleness() {
        for content in [ContentState::Missing, ContentState::InFlight, ContentState::Settled] {
            for stale in [false, true] {
                assert_eq!(
                    read(TableMetadata::active(false, stale), content),
                    Err(Rejection::ActiveTableUnavailable)
                );
            }
        }
    }

    #[test]
    fn test_read_content_precedes_staleness() {
        assert_eq!(
            read(TableMetadata::active(true, true), ContentState::Missing),
            Err(Rejection::ContentProcessing)
        );
        assert_eq!(
            read(TableMetadata::active(true, true), ContentState::Settled),
            Err(Rejection::DependenciesStale)
        );
        assert_eq!(read(TableMetadata::active(true, false), ContentState::Settled), Ok(()));
    }

    #[test]
    fn test_write_active_always_immutable() {
        for available in [false, true] {
            for stale in [false, true] {
                assert_eq!(
                    write_check(&TableMetadata::active(available, stale)),
                    Err(Rejection::ActiveTableImmutable)
                );
            }
        }
    }

    #[test]
    fn test_write_passive() {
        assert_eq!(write_check(&TableMetadata::passive(true)), Ok(()));
        assert_eq!(
            write_check(&TableMetadata::passive(false)),
            Err(Rejection::TableUnavailable)
        );
    }
}
