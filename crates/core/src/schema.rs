//! Explicit column schemas for positionally addressed rows.
//!
//! Every table on the site is read by position: the Nth cell of a row is a
//! fixed field. A [`RowSchema`] writes that layout down as an ordered list of
//! named, typed columns. Binding a row checks its cell count against the
//! schema first, so a short row fails with [`PelotonError::ShapeMismatch`]
//! instead of an out-of-bounds index deep inside a parser. Fields are then
//! read by name through the [`BoundRow`].

use std::time::Duration;

use crate::coerce::{self, GAP_SENTINELS, POSITION_SENTINELS};
use crate::parse::Element;
use crate::{PelotonError, Result};

/// How a column's text is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, trimmed.
    Text,
    /// Required non-negative integer.
    Integer,
    /// Nullable integer; empty text and the listed sentinels are `None`.
    Position(&'static [&'static str]),
    /// Points; empty text is zero.
    Points,
    /// Nullable `+h:m:s` gap; empty text and the listed sentinels are `None`.
    Gap(&'static [&'static str]),
    /// Nullable `h:m:s` or `m:s` time.
    Time,
    /// Nullable distance in kilometres.
    Distance,
}

impl ColumnKind {
    /// Short label used in errors.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Position(_) => "position",
            ColumnKind::Points => "points",
            ColumnKind::Gap(_) => "gap",
            ColumnKind::Time => "time",
            ColumnKind::Distance => "distance",
        }
    }

    /// Sentinels that stand for "no value" in this column.
    pub fn sentinels(&self) -> &'static [&'static str] {
        match *self {
            ColumnKind::Position(s) | ColumnKind::Gap(s) => s,
            _ => &[],
        }
    }
}

/// Finish position column using [`POSITION_SENTINELS`].
pub const POSITION: ColumnKind = ColumnKind::Position(POSITION_SENTINELS);

/// Gap column where the leader shows `-`.
pub const GAP: ColumnKind = ColumnKind::Gap(GAP_SENTINELS);

/// One named column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// Ordered column layout of one row shape.
#[derive(Debug)]
pub struct RowSchema {
    /// Human readable shape name used in errors.
    pub name: &'static str,
    /// Columns in cell order.
    pub columns: &'static [Column],
}

impl RowSchema {
    /// Number of cells a row must have at least.
    pub const fn width(&self) -> usize {
        self.columns.len()
    }

    /// Checks a cell count against the schema.
    pub fn check(&self, found: usize) -> Result<()> {
        if found < self.width() {
            return Err(PelotonError::ShapeMismatch { schema: self.name, expected: self.width(), found });
        }
        Ok(())
    }

    /// Validates `cells` and wraps them for by-name access.
    pub fn bind<'a>(&'static self, cells: Vec<Element<'a>>) -> Result<BoundRow<'a>> {
        self.check(cells.len())?;
        Ok(BoundRow { schema: self, cells })
    }

    fn column(&self, name: &str) -> Result<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
            .ok_or_else(|| PelotonError::invalid_value(self.name, name))
    }
}

/// A row whose cell count has been validated against a [`RowSchema`].
#[derive(Debug)]
pub struct BoundRow<'a> {
    schema: &'static RowSchema,
    cells: Vec<Element<'a>>,
}

impl<'a> BoundRow<'a> {
    /// The schema this row was bound to.
    pub fn schema(&self) -> &'static RowSchema {
        self.schema
    }

    /// The cell for a column.
    pub fn cell(&self, name: &str) -> Result<Element<'a>> {
        let (index, _) = self.schema.column(name)?;
        Ok(self.cells[index])
    }

    /// Trimmed text of a column.
    pub fn text(&self, name: &str) -> Result<String> {
        Ok(self.cell(name)?.trimmed_text())
    }

    /// Looks up a column that must be declared with the kind `read_as` expects.
    ///
    /// Reading a column as another kind than its declared one is an
    /// [`PelotonError::InvalidValue`].
    fn typed(&self, name: &str, read_as: &str, accepts: fn(&ColumnKind) -> bool) -> Result<(usize, &Column)> {
        let (index, column) = self.schema.column(name)?;
        if !accepts(&column.kind) {
            return Err(PelotonError::invalid_value(
                &format!("{}.{}", self.schema.name, name),
                &format!("{} column read as {}", column.kind.label(), read_as),
            ));
        }
        Ok((index, column))
    }

    /// A required integer column.
    pub fn integer(&self, name: &str) -> Result<u32> {
        let (index, _) = self.typed(name, "integer", |k| matches!(k, ColumnKind::Integer))?;
        coerce::parse_int(&self.cells[index].trimmed_text(), name).map_err(|e| self.relabel(name, e))
    }

    /// A nullable position column, using the column's sentinel set.
    pub fn position(&self, name: &str) -> Result<Option<u32>> {
        let (index, column) = self.typed(name, "position", |k| matches!(k, ColumnKind::Position(_)))?;
        let text = self.cells[index].trimmed_text();
        coerce::parse_nullable_int(&text, column.kind.sentinels()).map_err(|e| self.relabel(name, e))
    }

    /// A points column; empty is zero.
    pub fn points(&self, name: &str) -> Result<u32> {
        let (index, _) = self.typed(name, "points", |k| matches!(k, ColumnKind::Points))?;
        coerce::parse_points(&self.cells[index].trimmed_text()).map_err(|e| self.relabel(name, e))
    }

    /// A nullable gap column such as `+0:12`.
    pub fn gap(&self, name: &str) -> Result<Option<Duration>> {
        let (index, column) = self.typed(name, "gap", |k| matches!(k, ColumnKind::Gap(_)))?;
        let text = self.cells[index].trimmed_text();
        if column.kind.sentinels().contains(&text.as_str()) {
            return Ok(None);
        }
        coerce::parse_gap(&text).map_err(|e| self.relabel(name, e))
    }

    /// A nullable time column.
    pub fn time(&self, name: &str) -> Result<Option<Duration>> {
        let (index, _) = self.typed(name, "time", |k| matches!(k, ColumnKind::Time))?;
        self.time_from(name, &self.cells[index].trimmed_text())
    }

    /// Coerces `text` as a time belonging to column `name`.
    ///
    /// Used when the time is read from a nested node rather than the whole cell.
    pub fn time_from(&self, name: &str, text: &str) -> Result<Option<Duration>> {
        self.typed(name, "time", |k| matches!(k, ColumnKind::Time))?;
        coerce::parse_duration(text).map_err(|e| self.relabel(name, e))
    }

    /// A nullable distance column; empty is `None`.
    pub fn distance(&self, name: &str) -> Result<Option<f64>> {
        let (index, _) = self.typed(name, "distance", |k| matches!(k, ColumnKind::Distance))?;
        let text = self.cells[index].trimmed_text();
        if text.is_empty() {
            return Ok(None);
        }
        coerce::parse_distance(&text).map(Some).map_err(|e| self.relabel(name, e))
    }

    fn relabel(&self, name: &str, err: PelotonError) -> PelotonError {
        match err {
            PelotonError::InvalidNumber { value, .. } => {
                PelotonError::InvalidNumber { field: format!("{}.{}", self.schema.name, name), value }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    static SAMPLE: RowSchema = RowSchema {
        name: "sample row",
        columns: &[
            Column::new("pos", POSITION),
            Column::new("gap", GAP),
            Column::new("bib", ColumnKind::Integer),
            Column::new("points", ColumnKind::Points),
            Column::new("km", ColumnKind::Distance),
        ],
    };

    fn cells(doc: &Document) -> Vec<Element<'_>> {
        doc.select("td").unwrap()
    }

    #[test]
    fn test_bind_and_read_by_name() {
        let doc = Document::parse(
            "<table><tr><td>DNF</td><td>+1:05</td><td>31</td><td></td><td>(12.5km)</td></tr></table>",
        )
        .unwrap();
        let row = SAMPLE.bind(cells(&doc)).unwrap();

        assert_eq!(row.position("pos").unwrap(), None);
        assert_eq!(row.gap("gap").unwrap(), Some(Duration::from_secs(65)));
        assert_eq!(row.integer("bib").unwrap(), 31);
        assert_eq!(row.points("points").unwrap(), 0);
        assert_eq!(row.distance("km").unwrap(), Some(12.5));
    }

    #[test]
    fn test_short_row_is_shape_mismatch() {
        let doc = Document::parse("<table><tr><td>1</td><td>-</td></tr></table>").unwrap();

        match SAMPLE.bind(cells(&doc)) {
            Err(PelotonError::ShapeMismatch { schema, expected, found }) => {
                assert_eq!(schema, "sample row");
                assert_eq!(expected, 5);
                assert_eq!(found, 2);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other.map(|r| r.schema().name)),
        }
    }

    #[test]
    fn test_wide_row_is_accepted() {
        let doc =
            Document::parse("<table><tr><td>1</td><td>-</td><td>1</td><td>5</td><td></td><td>x</td></tr></table>")
                .unwrap();
        let row = SAMPLE.bind(cells(&doc)).unwrap();

        assert_eq!(row.gap("gap").unwrap(), None);
        assert_eq!(row.distance("km").unwrap(), None);
    }

    #[test]
    fn test_errors_name_the_column() {
        let doc =
            Document::parse("<table><tr><td>1</td><td>-</td><td>x</td><td>5</td><td></td></tr></table>").unwrap();
        let row = SAMPLE.bind(cells(&doc)).unwrap();

        match row.integer("bib") {
            Err(PelotonError::InvalidNumber { field, value }) => {
                assert_eq!(field, "sample row.bib");
                assert_eq!(value, "x");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
        assert!(matches!(row.text("nope"), Err(PelotonError::InvalidValue { .. })));
    }

    #[test]
    fn test_reading_column_as_other_kind_is_rejected() {
        let doc =
            Document::parse("<table><tr><td>1</td><td>-</td><td>31</td><td>5</td><td></td></tr></table>").unwrap();
        let row = SAMPLE.bind(cells(&doc)).unwrap();

        match row.points("bib") {
            Err(PelotonError::InvalidValue { field, value }) => {
                assert_eq!(field, "sample row.bib");
                assert_eq!(value, "integer column read as points");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
        assert!(matches!(row.integer("pos"), Err(PelotonError::InvalidValue { .. })));
        assert!(matches!(row.time("km"), Err(PelotonError::InvalidValue { .. })));
        assert_eq!(row.text("bib").unwrap(), "31");
    }
}
