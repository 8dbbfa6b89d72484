/*!
 * Language name to OCR script mapping.
 *
 * Several languages share a writing system, so OCR runs against script
 * models rather than language models. Anything not in the table (including
 * raw model codes from the detector) uses `DEFAULT_SCRIPT`.
 */

use crate::language_utils::LookupTable;

/// Script used for any name missing from the table
pub const DEFAULT_SCRIPT: &str = "Devanagari";

// Ol Chiki has no Tesseract model, so Santhali reads as Bengali script.
static SCRIPTS: LookupTable<&'static str> = LookupTable::new(&[
    ("Hindi", "Devanagari"),
    ("Bengali", "Bengali"),
    ("Tamil", "Tamil"),
    ("Telugu", "Telugu"),
    ("Marathi", "Devanagari"),
    ("Gujarati", "Gujarati"),
    ("Kannada", "Kannada"),
    ("Malayalam", "Malayalam"),
    ("Odia", "Oriya"),
    ("Punjabi", "Gurmukhi"),
    ("Assamese", "Bengali"),
    ("Urdu", "Arabic"),
    ("Sanskrit", "Devanagari"),
    ("Nepali", "Devanagari"),
    ("Konkani", "Devanagari"),
    ("Bodo", "Devanagari"),
    ("Dogri", "Devanagari"),
    ("Maithili", "Devanagari"),
    ("Manipuri", "Bengali"),
    ("Santhali", "Bengali"),
    ("Sindhi", "Arabic"),
    ("Kashmiri", "Arabic"),
]);

/// Map a human-readable language name to an OCR script identifier
///
/// Total: unknown names return [`DEFAULT_SCRIPT`].
pub fn map_script(language_name: &str) -> &'static str {
    SCRIPTS.get_or(language_name, DEFAULT_SCRIPT)
}

/// The full mapping table, in declaration order
pub fn script_table() -> LookupTable<&'static str> {
    SCRIPTS
}
