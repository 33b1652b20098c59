/*!
 * Tests for CSV table reading and writing
 */

use anyhow::Result;
use catalog_translator::table::Table;
use crate::common;

#[test]
fn test_readCsv_withQuotedCells_shouldKeepCommasAndNewlines() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let csv = "Product ID,SKU,Description\n1,0042,\"Silk, hand-rolled\nedges\"\n";
    let path = common::create_test_file(dir.path(), "in.csv", csv)?;

    let table = Table::read_csv(&path)?;

    assert_eq!(table.row_count(), 1);
    assert_eq!(table.get(0, "Description"), Some("Silk, hand-rolled\nedges"));
    assert_eq!(table.get(0, "SKU"), Some("0042"));
    Ok(())
}

#[test]
fn test_writeColumns_thenRead_shouldPreserveLeadingZeros() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut table = Table::read_csv(common::create_test_file(dir.path(), "in.csv", common::PRODUCTS_CSV)?)?;
    table.ensure_column("Description - sv");
    table.set(0, "Description - sv", "En klassisk slips i siden.")?;

    let out = dir.path().join("out.csv");
    table.write_columns(&out, &["SKU", "Description - sv"])?;
    let written = Table::read_csv(&out)?;

    assert_eq!(written.headers(), ["SKU", "Description - sv"]);
    assert_eq!(written.column("SKU").unwrap(), vec!["00123", "00456", "00789"]);
    assert_eq!(written.get(1, "Description - sv"), Some(""));
    Ok(())
}

#[test]
fn test_set_withUnknownColumn_shouldFail() {
    let mut table = Table::new(["Product ID", "SKU"]);
    table.push_row(["1", "001"]);
    assert!(table.set(0, "Description", "x").is_err());
}

#[test]
fn test_readCsv_withMissingFile_shouldFail() {
    assert!(Table::read_csv("no/such/file.csv").is_err());
}
