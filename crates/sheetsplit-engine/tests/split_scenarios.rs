//! End-to-end split and merge scenarios against real `.xlsx` files.
//!
//! Fixtures are written into a `TempDir`, the engine runs on them, and the
//! produced workbooks are read back with calamine.

use anyhow::Result;
use calamine::{Data, Reader, open_workbook_auto};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

use sheetsplit_config::Config;
use sheetsplit_engine::{
    DocumentScanner, GroupIndex, Ingestor, MergeEngine, SourceDocument, SplitPipeline,
};
use sheetsplit_utils::error::{DiscoveryError, SheetSplitError};
use sheetsplit_utils::row;
use sheetsplit_utils::test_support::{write_corrupt_workbook, write_identity_workbook, write_workbook};

fn utf8(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir is UTF-8")
}

fn read_rows(path: &Utf8Path) -> Result<Vec<Vec<Data>>> {
    let mut workbook = open_workbook_auto(path.as_std_path())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow::anyhow!("no worksheet"))??;
    Ok(range.rows().map(<[Data]>::to_vec).collect())
}

fn column<'a>(rows: &'a [Vec<Data>], name: &str) -> Vec<&'a Data> {
    let index = rows[0]
        .iter()
        .position(|h| *h == Data::String(name.to_string()))
        .expect("column present");
    rows[1..].iter().map(|r| &r[index]).collect()
}

fn text(value: &str) -> Data {
    Data::String(value.to_string())
}

fn pipeline(out: &Utf8Path, group_size: usize) -> Result<SplitPipeline> {
    let config = Config::builder()
        .group_size(group_size)
        .workers(4)
        .output_dir(out.as_std_path())
        .build()?;
    Ok(SplitPipeline::new(config))
}

#[tokio::test]
async fn two_documents_with_overlapping_identities_make_two_batches() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    let out = utf8(&temp).join("out");
    write_identity_workbook(
        root.join("north/doc1.xlsx").as_std_path(),
        &[("A", "a1"), ("B", "b1"), ("C", "c1")],
    )?;
    write_identity_workbook(
        root.join("south/doc2.xlsx").as_std_path(),
        &[("A", "a2"), ("B", "b2"), ("D", "d2")],
    )?;

    let stats = pipeline(&out, 5)?.run(&root).await?;

    assert_eq!(stats.discovered, 2);
    assert_eq!(stats.loaded, 2);
    assert_eq!(stats.identity_count, 4);
    assert_eq!(stats.batch_count, 2);
    assert_eq!(stats.total_output, 2);
    assert_eq!(stats.failed_output, 0);
    assert!(stats.is_complete());

    let first = read_rows(&out.join("output_001.xlsx"))?;
    assert_eq!(
        column(&first, "BrowserID"),
        vec![&text("A"), &text("B"), &text("C"), &text("D")]
    );
    assert_eq!(
        column(&first, "Value"),
        vec![&text("a1"), &text("b1"), &text("c1"), &text("d2")]
    );
    assert_eq!(
        column(&first, "SourceFolder"),
        vec![&text("north"), &text("north"), &text("north"), &text("south")]
    );

    let second = read_rows(&out.join("output_002.xlsx"))?;
    assert_eq!(column(&second, "BrowserID"), vec![&text("A"), &text("B")]);
    assert_eq!(
        column(&second, "SourceFile"),
        vec![&text("doc2.xlsx"), &text("doc2.xlsx")]
    );
    assert!(!out.join("output_003.xlsx").exists());
    Ok(())
}

#[tokio::test]
async fn only_document_is_header_only_is_no_valid_data() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    write_workbook(root.join("empty.xlsx").as_std_path(), &["BrowserID"], &[])?;

    let err = pipeline(&utf8(&temp).join("out"), 5)?
        .run(&root)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SheetSplitError::NoValidData { ref mode, attempted: 1 } if mode == "split"
    ));
    Ok(())
}

#[tokio::test]
async fn missing_root_fails_before_ingestion() -> Result<()> {
    let temp = TempDir::new()?;
    let out = utf8(&temp).join("out");

    let err = pipeline(&out, 5)?
        .run(&utf8(&temp).join("absent"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SheetSplitError::Discovery(DiscoveryError::DirectoryNotFound { .. })
    ));
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn document_without_identity_column_is_skipped() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    let out = utf8(&temp).join("out");
    write_workbook(
        root.join("a_no_id.xlsx").as_std_path(),
        &["Device", "Value"],
        &[row!["X", 1.0]],
    )?;
    write_identity_workbook(root.join("b_ok.xlsx").as_std_path(), &[("A", "1"), ("B", "2")])?;

    let stats = pipeline(&out, 5)?.run(&root).await?;

    assert_eq!(stats.discovered, 2);
    assert_eq!(stats.loaded, 1);
    assert_eq!(stats.skipped.len(), 1);
    assert_eq!(stats.skipped[0].path, "a_no_id.xlsx");
    assert_eq!(stats.skipped[0].kind, "missing_identity_column");
    assert_eq!(stats.total_output, 1);
    assert!(!stats.is_complete());
    Ok(())
}

#[tokio::test]
async fn ceiling_below_largest_group_drops_extra_rows() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    let out = utf8(&temp).join("out");
    let rows: Vec<(&str, &str)> = ["1", "2", "3", "4", "5"]
        .into_iter()
        .map(|v| ("SAME", v))
        .collect();
    write_identity_workbook(root.join("many.xlsx").as_std_path(), &rows)?;

    let stats = pipeline(&out, 2)?.run(&root).await?;

    assert_eq!(stats.batch_count, 2);
    assert_eq!(stats.total_output, 2);
    assert_eq!(column(&read_rows(&out.join("output_001.xlsx"))?, "Value"), vec![&text("1")]);
    assert_eq!(column(&read_rows(&out.join("output_002.xlsx"))?, "Value"), vec![&text("2")]);
    Ok(())
}

#[tokio::test]
async fn empty_root_is_an_empty_success() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    std::fs::create_dir_all(root.join("nested"))?;
    std::fs::write(root.join("nested/readme.txt"), "not a workbook")?;
    let out = utf8(&temp).join("out");

    let stats = pipeline(&out, 5)?.run(&root).await?;

    assert_eq!(stats.discovered, 0);
    assert_eq!(stats.total_output, 0);
    assert!(stats.outputs.is_empty());
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn numeric_and_text_identities_group_together_after_normalization() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    let out = utf8(&temp).join("out");
    write_workbook(
        root.join("a.xlsx").as_std_path(),
        &["BrowserID", "Value"],
        &[row![42.0, "numeric"], row!["zeta", "text"]],
    )?;
    write_workbook(
        root.join("b.xlsx").as_std_path(),
        &["BrowserID", "Value"],
        &[row![" 42 ", "padded text"]],
    )?;

    let stats = pipeline(&out, 5)?.run(&root).await?;

    assert_eq!(stats.identity_count, 2);
    assert_eq!(stats.batch_count, 2);
    let first = read_rows(&out.join("output_001.xlsx"))?;
    assert_eq!(column(&first, "Value"), vec![&text("numeric"), &text("text")]);
    let second = read_rows(&out.join("output_002.xlsx"))?;
    assert_eq!(column(&second, "Value"), vec![&text("padded text")]);
    Ok(())
}

#[tokio::test]
async fn existing_outputs_are_overwritten() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    let out = utf8(&temp).join("out");
    std::fs::create_dir_all(&out)?;
    std::fs::write(out.join("output_001.xlsx"), b"stale")?;
    write_identity_workbook(root.join("doc.xlsx").as_std_path(), &[("A", "fresh")])?;

    pipeline(&out, 5)?.run(&root).await?;

    let rows = read_rows(&out.join("output_001.xlsx"))?;
    assert_eq!(column(&rows, "Value"), vec![&text("fresh")]);
    Ok(())
}

#[tokio::test]
async fn failed_batch_write_does_not_stop_later_batches() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp).join("in");
    let out = utf8(&temp).join("out");
    std::fs::create_dir_all(out.join("output_001.xlsx"))?;
    write_identity_workbook(
        root.join("doc.xlsx").as_std_path(),
        &[("A", "first"), ("A", "second"), ("A", "third")],
    )?;

    let stats = pipeline(&out, 5)?.run(&root).await?;

    assert_eq!(stats.batch_count, 3);
    assert_eq!(stats.total_output, 2);
    assert_eq!(stats.failed_output, 1);
    assert!(!stats.is_complete());
    assert_eq!(
        stats.outputs,
        vec![
            out.join("output_002.xlsx").to_string(),
            out.join("output_003.xlsx").to_string(),
        ]
    );
    assert_eq!(stats.skipped.len(), 1);
    assert_eq!(stats.skipped[0].path, out.join("output_001.xlsx").to_string());
    assert_eq!(stats.skipped[0].kind, "persist_failed");

    let third = read_rows(&out.join("output_003.xlsx"))?;
    assert_eq!(column(&third, "Value"), vec![&text("third")]);
    Ok(())
}

#[tokio::test]
async fn merge_skips_unreadable_and_keeps_provenance_last() -> Result<()> {
    let temp = TempDir::new()?;
    let base = utf8(&temp);
    let first = base.join("in/one.xlsx");
    let broken = base.join("in/broken.xlsx");
    let third = base.join("in/three.xlsx");
    write_workbook(
        first.as_std_path(),
        &["Name", "Price"],
        &[row!["apple", 1.0], row!["pear", 2.0]],
    )?;
    write_corrupt_workbook(broken.as_std_path())?;
    write_identity_workbook(third.as_std_path(), &[("A", "x"), ("B", "y"), ("C", "z")])?;

    let documents: Vec<SourceDocument> = [&first, &broken, &third]
        .into_iter()
        .map(|p| SourceDocument::from_path(p))
        .collect();
    let destination = base.join("merged/all.xlsx");

    let stats = MergeEngine::new(2, None).merge(&documents, &destination).await?;

    assert_eq!(stats.merged_files_count, 2);
    assert_eq!(stats.total_rows, 5);
    assert_eq!(stats.skipped.len(), 1);
    assert_eq!(stats.skipped[0].kind, "unreadable");

    let rows = read_rows(&destination)?;
    assert_eq!(rows.len(), 6);
    assert_eq!(
        rows[0],
        vec![
            text("Name"),
            text("Price"),
            text("BrowserID"),
            text("Value"),
            text("SourceFile"),
            text("SourceFolder"),
        ]
    );
    assert_eq!(rows[1][4], text("one.xlsx"));
    assert_eq!(rows[5][4], text("three.xlsx"));
    assert_eq!(rows[5][5], text("in"));
    Ok(())
}

#[tokio::test]
async fn merge_with_no_valid_documents_fails() -> Result<()> {
    let temp = TempDir::new()?;
    let broken = utf8(&temp).join("broken.xlsx");
    write_corrupt_workbook(broken.as_std_path())?;

    let err = MergeEngine::new(1, None)
        .merge(&[SourceDocument::from_path(&broken)], &utf8(&temp).join("out.xlsx"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SheetSplitError::NoValidData { attempted: 1, .. }
    ));
    Ok(())
}

#[tokio::test]
async fn grouping_is_identical_across_runs() -> Result<()> {
    let temp = TempDir::new()?;
    let root = utf8(&temp);
    for doc in 0..8 {
        let rows: Vec<(String, String)> = (0..20)
            .map(|row| (format!("ID{}", (row * 7 + doc) % 11), format!("d{doc}r{row}")))
            .collect();
        let borrowed: Vec<(&str, &str)> =
            rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        write_identity_workbook(root.join(format!("dir{}/doc.xlsx", doc % 3)).as_std_path(), &borrowed)?;
        write_identity_workbook(root.join(format!("doc{doc}.xlsx")).as_std_path(), &borrowed)?;
    }

    let scanner = DocumentScanner::new(&Config::builder().build()?.selectors)?;
    let documents = scanner.scan(&root)?;
    let ingestor = Ingestor::new(4).require_column("BrowserID");

    let first = ingestor.ingest(&documents).await;
    let second = ingestor.ingest(&documents).await;

    assert_eq!(first.records, second.records);
    assert_eq!(
        GroupIndex::build(&first.records, "BrowserID")?,
        GroupIndex::build(&second.records, "BrowserID")?
    );
    Ok(())
}
