// src/schema/arrow.rs

use arrow::{
    array::{ArrayRef, Float64Array, Int64Array, StringArray},
    datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::error::Result;
use crate::table::{Cell, ResponseTable};

/// Pick the Arrow type for a column from its non-missing cells.
///
/// - only Integer cells       → Int64
/// - Integer and Number cells → Float64
/// - anything with text       → Utf8
/// - all missing              → Utf8
pub fn map_to_arrow_type<'a, I>(cells: I) -> DataType
where
    I: IntoIterator<Item = &'a Cell>,
{
    let mut ty: Option<DataType> = None;
    for cell in cells {
        let cell_ty = match cell {
            Cell::Missing => continue,
            Cell::Integer(_) => DataType::Int64,
            Cell::Number(_) => DataType::Float64,
            Cell::Text(_) => return DataType::Utf8,
        };
        ty = Some(match (ty, cell_ty) {
            (Some(DataType::Float64), _) | (_, DataType::Float64) => DataType::Float64,
            _ => DataType::Int64,
        });
    }
    ty.unwrap_or(DataType::Utf8)
}

/// Build an ArrowSchema (inside an Arc) from the table's columns.
pub fn build_arrow_schema(table: &ResponseTable) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = table
        .columns()
        .iter()
        .map(|name| {
            let dt = table
                .column(name)
                .map(map_to_arrow_type)
                .unwrap_or(DataType::Utf8);
            ArrowField::new(name, dt, /* nullable = */ true)
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

/// Convert the whole table into a single record batch.
pub fn table_to_record_batch(table: &ResponseTable) -> Result<RecordBatch> {
    let schema = build_arrow_schema(table);
    let mut cols: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for field in schema.fields() {
        let cells = table.column(field.name())?;
        let arr: ArrayRef = match field.data_type() {
            DataType::Int64 => Arc::new(
                cells
                    .map(|c| match c {
                        Cell::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect::<Int64Array>(),
            ),
            DataType::Float64 => Arc::new(cells.map(Cell::as_f64).collect::<Float64Array>()),
            _ => Arc::new(
                cells
                    .map(|c| (!c.is_missing()).then(|| c.render().into_owned()))
                    .collect::<StringArray>(),
            ),
        };
        cols.push(arr);
    }

    Ok(RecordBatch::try_new(schema, cols)?)
}
