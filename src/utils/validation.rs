//! Validation utilities

use crate::traits::JournalValidator;
use crate::types::*;

/// Validate that a nominal account name is usable
pub fn validate_nominal_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Nominal name cannot be empty".to_string(),
        ));
    }

    if name.len() > 50 {
        return Err(LedgerError::Validation(
            "Nominal name cannot exceed 50 characters".to_string(),
        ));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "Nominal name can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that a journal line description is usable
pub fn validate_description(description: &str) -> LedgerResult<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }

    if description.len() > 500 {
        return Err(LedgerError::Validation(
            "Description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced journal validator with detailed checks
///
/// Runs on top of the unconditional zero-sum check: rejects journals with
/// no lines, malformed nominal names, or unusable descriptions.
pub struct EnhancedJournalValidator;

impl JournalValidator for EnhancedJournalValidator {
    fn validate_journal(&self, journal: &Journal) -> LedgerResult<()> {
        if journal.lines.is_empty() {
            return Err(LedgerError::Validation(
                "Journal must have at least one line".to_string(),
            ));
        }

        for line in &journal.lines {
            validate_nominal_name(&line.nominal)?;
            validate_description(&line.description)?;
        }

        Ok(())
    }
}
