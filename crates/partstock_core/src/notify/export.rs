//! Spreadsheet export of an inventory snapshot.
//!
//! # Invariants
//! - Row 0 is the header `Part Name | Quantity`.
//! - One data row per part, in snapshot order.

use crate::model::part::Part;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Inventory";
const HEADER_PART_NAME: &str = "Part Name";
const HEADER_QUANTITY: &str = "Quantity";
const NAME_COLUMN_WIDTH: f64 = 32.0;
// Largest magnitude an Excel (f64) cell stores exactly.
const MAX_EXACT_CELL_INTEGER: u64 = 1 << 53;

/// Renders `parts` as an in-memory `.xlsx` workbook.
pub fn render_inventory_xlsx(parts: &[Part]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.set_column_width(0, NAME_COLUMN_WIDTH)?;
    sheet.write_string_with_format(0, 0, HEADER_PART_NAME, &header)?;
    sheet.write_string_with_format(0, 1, HEADER_QUANTITY, &header)?;

    for (index, part) in parts.iter().enumerate() {
        let row = u32::try_from(index + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
        sheet.write_string(row, 0, part.name.as_str())?;
        if part.quantity.unsigned_abs() <= MAX_EXACT_CELL_INTEGER {
            sheet.write_number(row, 1, part.quantity as f64)?;
        } else {
            sheet.write_string(row, 1, part.quantity.to_string())?;
        }
    }

    workbook.save_to_buffer()
}
