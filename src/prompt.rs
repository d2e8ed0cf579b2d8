//! System instruction for the shopping assistant
//!
//! The text is presentation policy only. It is passed to the model verbatim
//! and nothing in the orchestrator depends on what it says.

use std::path::Path;

use crate::config::PromptConfig;
use crate::error::{Result, ShopmateError};

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "Sei un personal shopper esperto per un negozio online. \
Sei gentile, conciso e persuasivo. \
Quando l'utente cerca un prodotto o chiede un consiglio, usa lo strumento di ricerca prodotti. \
Se consigli un prodotto, includi sempre il nome e il link. \
Se lo stock è basso (sotto 5), crea urgenza. \
Se non trovi esattamente ciò che l'utente cerca, proponi le alternative disponibili senza dire che non esiste.";

/// Resolve the system instruction: inline text, then file, then the default
pub fn load_system_instruction(config: &PromptConfig) -> Result<String> {
    if let Some(text) = config.system_instruction.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(text.to_string());
    }

    if let Some(path) = &config.system_instruction_file {
        return read_instruction_file(path);
    }

    Ok(DEFAULT_SYSTEM_INSTRUCTION.to_string())
}

fn read_instruction_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ShopmateError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to load system instruction from {}: {}", path.display(), e),
        ))
    })?;

    let content = content.trim();
    if content.is_empty() {
        return Err(ShopmateError::Config(format!(
            "system instruction file {} is empty",
            path.display()
        )));
    }
    Ok(content.to_string())
}
