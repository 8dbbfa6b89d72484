/*!
 * Tests for output page construction
 */

use anyhow::Result;
use lopdf::Object;

use indic_pdf_translator::pdf::reassembler::{ANCHOR_X, ANCHOR_Y_FROM_TOP, FONT_SIZE};
use indic_pdf_translator::pdf::{Reassembler, SourceDocument};

use crate::common::{self, build_form_image_pdf, build_pdf, read_output, set_page_attribute, TestPage};

fn rebuild_all(document: &SourceDocument, texts: &[&str]) -> Result<Reassembler> {
    let mut reassembler = Reassembler::new();
    for (page, text) in document.pages().iter().zip(texts) {
        reassembler.rebuild(document, page, text)?;
    }
    Ok(reassembler)
}

#[test]
fn test_rebuild_withVariousSizes_shouldKeepGeometryExactly() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[
        TestPage::Native {
            text: "Letter".to_string(),
            width: 612,
            height: 792,
        },
        TestPage::Scanned { width: 595, height: 842 },
        TestPage::Native {
            text: "Landscape".to_string(),
            width: 842,
            height: 595,
        },
    ]))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    let reassembler = rebuild_all(&document, &["a", "b", "c"])?;
    assert_eq!(reassembler.page_count(), 3);
    reassembler.save(&output)?;

    let pages = read_output(&output);
    assert_eq!(pages.len(), 3);
    for (source, rebuilt) in document.pages().iter().zip(&pages) {
        assert_eq!((rebuilt.width, rebuilt.height), (source.width, source.height));
    }
    Ok(())
}

#[test]
fn test_rebuild_withScannedPage_shouldCopyImageAndDrawRedText() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::scanned()]))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &["Recognised text"])?.save(&output)?;

    let page = &read_output(&output)[0];
    assert_eq!(page.image_count, 1);
    assert!(page.is_red());
    assert_eq!(page.text_runs, vec!["Recognised text".to_string()]);

    // Image first, then text on top
    let image_at = page.operators.iter().position(|op| op == "Do");
    let text_at = page.operators.iter().position(|op| op == "BT");
    assert!(image_at.is_some() && text_at.is_some());
    assert!(image_at < text_at);
    Ok(())
}

#[test]
fn test_rebuild_withNativePage_shouldUseDefaultColour() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::native("Hello")]))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &["Hello again"])?.save(&output)?;

    let page = &read_output(&output)[0];
    assert!(!page.is_red());
    assert_eq!(page.image_count, 0);
    assert_eq!(page.text_runs, vec!["Hello again".to_string()]);
    Ok(())
}

#[test]
fn test_rebuild_withMultilineText_shouldEmitOneRunPerLine() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::native("x")]))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &["one\ntwo\r\nthree"])?.save(&output)?;

    let page = &read_output(&output)[0];
    assert_eq!(page.text_runs, vec!["one", "two", "three"]);
    assert_eq!(page.operators.iter().filter(|op| *op == "T*").count(), 2);
    Ok(())
}

#[test]
fn test_rebuild_shouldPlaceTextAtAnchorInElevenPoint() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::native("x")]))?;
    let reassembler = rebuild_all(&document, &["anchored"])?;
    let output = reassembler.into_document();

    let (_, page_id) = output.get_pages().into_iter().next().expect("one page");
    let content = lopdf::content::Content::decode(&output.get_page_content(page_id)?)?;

    let number = |object: &Object| match object {
        Object::Integer(value) => *value as f32,
        Object::Real(value) => *value,
        other => panic!("not a number: {:?}", other),
    };

    let td = content.operations.iter().find(|op| op.operator == "Td").expect("Td operator");
    assert_eq!(number(&td.operands[0]), ANCHOR_X);
    assert_eq!(number(&td.operands[1]), 792.0 - ANCHOR_Y_FROM_TOP);

    let tf = content.operations.iter().find(|op| op.operator == "Tf").expect("Tf operator");
    assert_eq!(number(&tf.operands[1]), FONT_SIZE);
    Ok(())
}

#[test]
fn test_rebuild_withEmptyText_shouldStillAppendPage() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::scanned()]))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &[""])?.save(&output)?;

    let pages = read_output(&output);
    assert_eq!(pages.len(), 1);
    assert!(pages[0].text_runs.is_empty());
    assert_eq!(pages[0].image_count, 1);
    Ok(())
}

#[test]
fn test_rebuild_withNonLatinText_shouldSubstituteQuestionMarks() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::native("x")]))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &["नमस्ते ok"])?.save(&output)?;

    let page = &read_output(&output)[0];
    assert!(page.text_runs[0].ends_with(" ok"));
    assert!(page.text_runs[0].starts_with('?'));
    Ok(())
}

fn number(object: &Object) -> f32 {
    match object {
        Object::Integer(value) => *value as f32,
        Object::Real(value) => *value,
        other => panic!("not a number: {:?}", other),
    }
}

#[test]
fn test_rebuild_withRotatedPage_shouldKeepRotationAndDisplayedSize() -> Result<()> {
    let bytes = set_page_attribute(&build_pdf(&[TestPage::native("x")]), "Rotate", Object::Integer(90));
    let document = SourceDocument::from_bytes(bytes)?;
    let output = rebuild_all(&document, &["upright"])?.into_document();

    let (_, page_id) = output.get_pages().into_iter().next().expect("one page");
    let page_dict = output.get_dictionary(page_id)?;
    assert_eq!(page_dict.get(b"Rotate")?.as_i64()?, 90);
    let media_box: Vec<f32> = page_dict.get(b"MediaBox")?.as_array()?.iter().map(number).collect();
    assert_eq!(media_box, vec![0.0, 0.0, 612.0, 792.0]);

    let content = lopdf::content::Content::decode(&output.get_page_content(page_id)?)?;
    let cm_at = content.operations.iter().position(|op| op.operator == "cm").expect("cm operator");
    let bt_at = content.operations.iter().position(|op| op.operator == "BT").expect("BT operator");
    assert!(cm_at < bt_at);
    let matrix: Vec<f32> = content.operations[cm_at].operands.iter().map(number).collect();
    assert_eq!(matrix, vec![0.0, 1.0, -1.0, 0.0, 612.0, 0.0]);

    let td = content.operations.iter().find(|op| op.operator == "Td").expect("Td operator");
    assert_eq!(number(&td.operands[1]), 612.0 - ANCHOR_Y_FROM_TOP);
    Ok(())
}

#[test]
fn test_rebuild_withRotatedPage_shouldMatchSourceGeometryWhenReopened() -> Result<()> {
    let bytes = set_page_attribute(&build_pdf(&[TestPage::scanned()]), "Rotate", Object::Integer(270));
    let document = SourceDocument::from_bytes(bytes)?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &["text"])?.save(&output)?;

    let reopened = SourceDocument::open(&output)?;
    let (source, rebuilt) = (&document.pages()[0], &reopened.pages()[0]);
    assert_eq!(rebuilt.rotation, 270);
    assert_eq!((rebuilt.width, rebuilt.height), (source.width, source.height));
    assert_eq!(read_output(&output)[0].image_count, 1);
    Ok(())
}

#[test]
fn test_rebuild_withFormImage_shouldCopyNestedImage() -> Result<()> {
    let document = SourceDocument::from_bytes(build_form_image_pdf(false))?;
    let dir = common::create_temp_dir()?;
    let output = dir.path().join("out.pdf");

    rebuild_all(&document, &["over the form"])?.save(&output)?;

    let page = &read_output(&output)[0];
    assert_eq!(page.image_count, 1);
    assert_eq!(page.operators.iter().filter(|op| *op == "Do").count(), 1);
    Ok(())
}

#[test]
fn test_rebuild_withTypographicPunctuation_shouldKeepWinAnsiCodes() -> Result<()> {
    let document = SourceDocument::from_bytes(build_pdf(&[TestPage::native("x")]))?;
    let output = rebuild_all(&document, &["don\u{2019}t \u{201C}go\u{201D} \u{2014} 5\u{20AC}"])?.into_document();

    let (_, page_id) = output.get_pages().into_iter().next().expect("one page");
    let content = lopdf::content::Content::decode(&output.get_page_content(page_id)?)?;
    let tj = content.operations.iter().find(|op| op.operator == "Tj").expect("Tj operator");

    match &tj.operands[0] {
        Object::String(bytes, _) => {
            assert_eq!(bytes, &vec![b'd', b'o', b'n', 0x92, b't', b' ', 0x93, b'g', b'o', 0x94, b' ', 0x97, b' ', b'5', 0x80]);
            assert!(!bytes.contains(&b'?'));
        }
        other => panic!("not a string: {:?}", other),
    }
    Ok(())
}
