/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::Path;

use indic_pdf_translator::file_utils::FileManager;

use crate::common::{self, TestPage};

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

#[test]
fn test_generate_output_path_shouldPrefixFileName() {
    let output_path = FileManager::generate_output_path(Path::new("/tmp/input/report.pdf"), Path::new("/tmp/output"));
    assert_eq!(output_path, Path::new("/tmp/output/translated_report.pdf"));
    assert!(FileManager::is_generated_output(&output_path));
    assert!(!FileManager::is_generated_output("/tmp/input/report.pdf"));
}

#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    Ok(())
}

#[test]
fn test_find_files_withMixedExtensions_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let sub = temp_dir.path().join("sub");
    FileManager::ensure_dir(&sub)?;
    common::create_test_file(temp_dir.path(), "b.pdf", "x")?;
    common::create_test_file(temp_dir.path(), "a.PDF", "x")?;
    common::create_test_file(&sub, "c.pdf", "x")?;
    common::create_test_file(temp_dir.path(), "notes.txt", "x")?;

    let files = FileManager::find_files(temp_dir.path(), ".pdf")?;

    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.PDF", "b.pdf", "c.pdf"]);
    Ok(())
}

#[test]
fn test_is_pdf_withHeaderButNoExtension_shouldDetectPdf() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let real = temp_dir.path().join("scan");
    std::fs::write(&real, common::build_pdf(&[TestPage::native("x")]))?;
    let fake = common::create_test_file(temp_dir.path(), "notes", "hello")?;

    assert!(FileManager::is_pdf(&real));
    assert!(!FileManager::is_pdf(&fake));
    assert!(!FileManager::is_pdf(temp_dir.path()));
    Ok(())
}
