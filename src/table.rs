//! Strict parsing of server-rendered tables.
//!
//! A table is a header row and its data rows. The header row must hold no
//! data cells and exactly the expected header texts; each data row must hold
//! no header cells and exactly as many data cells as there are headers. Rows
//! are turned into records one at a time, as the caller consumes them.
//!
//! Usually the header is simply the first row. Some pages put the header row
//! directly under `<table>` and the data rows in an explicit `<tbody>`; the
//! parser then gives the header its own implied `tbody`, and [`RowLayout::Split`]
//! locates the two separately.

use scraper::{ElementRef, Html};

use crate::dom;
use crate::error::{Result, structure};

/// What the header row of a table must contain.
#[derive(Debug, Clone, Copy)]
pub enum Headers {
    /// Header texts, in column order.
    Texts(&'static [&'static str]),
    /// Only the number of header cells is fixed.
    Count(usize),
}

impl Headers {
    pub fn len(&self) -> usize {
        match self {
            Headers::Texts(texts) => texts.len(),
            Headers::Count(count) => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One table layout: its headers and how a row becomes a record.
pub trait TableSchema {
    type Record;

    /// Selector, relative to the header row, for the elements carrying header
    /// text.
    fn header_path(&self) -> &'static str {
        ":scope > th"
    }

    fn headers(&self) -> Headers;

    /// `cells` holds exactly `headers().len()` data cells.
    fn parse_row(&self, cells: &[ElementRef<'_>]) -> Result<Self::Record>;
}

pub fn check_table_headers(row: ElementRef<'_>, header_path: &str, headers: Headers) -> Result<()> {
    let data_cells = dom::select_from(row, ":scope > td")?;
    if !data_cells.is_empty() {
        return Err(structure(format!(
            "header row holds {} data cells",
            data_cells.len()
        )));
    }

    let found = dom::select_from(row, header_path)?;
    if found.len() != headers.len() {
        return Err(structure(format!(
            "header row holds {} headers, expected {}",
            found.len(),
            headers.len()
        )));
    }
    if let Headers::Texts(texts) = headers {
        for (position, (header, expected)) in found.iter().zip(texts).enumerate() {
            let text = dom::text_content(*header);
            if text != *expected {
                return Err(structure(format!(
                    "header {} is {text:?}, expected {expected:?}",
                    position + 1
                )));
            }
        }
    }
    Ok(())
}

pub fn check_table_row_for_data<'a>(
    row: ElementRef<'a>,
    cell_count: usize,
) -> Result<Vec<ElementRef<'a>>> {
    let header_cells = dom::select_from(row, ":scope > th")?;
    if !header_cells.is_empty() {
        return Err(structure(format!(
            "data row holds {} header cells",
            header_cells.len()
        )));
    }
    let cells = dom::select_from(row, ":scope > td")?;
    if cells.len() != cell_count {
        return Err(structure(format!(
            "data row holds {} cells, expected {cell_count}",
            cells.len()
        )));
    }
    Ok(cells)
}

/// Where the header row and the data rows of a table are.
#[derive(Debug, Clone, Copy)]
pub enum RowLayout {
    /// All rows match one selector and the first of them is the header.
    HeaderFirst(&'static str),
    /// Exactly one row matches `header`; every row matching `data` is data.
    Split {
        header: &'static str,
        data: &'static str,
    },
}

/// Records of an already fetched table, parsed lazily.
///
/// The sequence is finite and cannot be restarted; getting the rows again
/// means fetching the page again. Iteration stops after the first error.
pub struct TableRows<S: TableSchema> {
    document: Html,
    data_path: &'static str,
    schema: S,
    next: usize,
    end: usize,
}

impl<S: TableSchema> TableRows<S> {
    /// Validates the header row and prepares the data rows of `layout`.
    pub fn new(document: Html, layout: RowLayout, schema: S) -> Result<Self> {
        let (data_path, next, end) = match layout {
            RowLayout::HeaderFirst(rows_path) => {
                let rows = dom::select(&document, rows_path)?;
                let header = rows
                    .first()
                    .ok_or_else(|| structure(format!("no table rows at {rows_path:?}")))?;
                check_table_headers(*header, schema.header_path(), schema.headers())?;
                (rows_path, 1, rows.len())
            }
            RowLayout::Split { header, data } => {
                let header = dom::select_one(&document, header)?;
                check_table_headers(header, schema.header_path(), schema.headers())?;
                (data, 0, dom::select(&document, data)?.len())
            }
        };

        Ok(TableRows {
            document,
            data_path,
            schema,
            next,
            end,
        })
    }

    fn parse_at(&self, index: usize) -> Result<S::Record> {
        let rows = dom::select(&self.document, self.data_path)?;
        let row = rows
            .get(index)
            .copied()
            .ok_or_else(|| structure(format!("table row {index} disappeared")))?;
        let cells = check_table_row_for_data(row, self.schema.headers().len())?;
        self.schema.parse_row(&cells)
    }
}

impl<S: TableSchema> Iterator for TableRows<S> {
    type Item = Result<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let result = self.parse_at(self.next);
        self.next = if result.is_ok() { self.next + 1 } else { self.end };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.end - self.next))
    }
}
