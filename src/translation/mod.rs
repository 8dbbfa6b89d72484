/*!
 * Page text translation.
 *
 * - `core`: the [`Translator`] and its explicit [`TranslationOutcome`]
 */

pub use self::core::{TranslationOutcome, Translator};

pub mod core;
