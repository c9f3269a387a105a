use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{Array, Int16Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use crate::error::{Result, SubsetError};
use crate::mask::{Mask, Shape};

const MASK_COLUMN: &str = "mask";
const SHAPE_KEY: &str = "shape";

// ---------------------------------------------------------------------------
// Supported formats
// ---------------------------------------------------------------------------

/// On-disk mask formats. Only Parquet is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskFormat {
    Parquet,
}

impl FromStr for MaskFormat {
    type Err = SubsetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "parquet" | "pq" => Ok(MaskFormat::Parquet),
            _ => Err(SubsetError::UnsupportedFormat(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write `mask` as 0/1 `Int16` values in flat element order, overwriting
/// any existing file. The shape goes into the schema metadata.
pub fn write_mask(path: &Path, mask: &Mask, format: MaskFormat) -> Result<()> {
    match format {
        MaskFormat::Parquet => write_parquet(path, mask),
    }
}

fn write_parquet(path: &Path, mask: &Mask) -> Result<()> {
    let shape_text: Vec<String> = mask.shape().dims().iter().map(|d| d.to_string()).collect();
    let metadata = HashMap::from([(SHAPE_KEY.to_string(), shape_text.join(","))]);
    let schema = Arc::new(
        Schema::new(vec![Field::new(MASK_COLUMN, DataType::Int16, false)])
            .with_metadata(metadata),
    );

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Int16Array::from(mask.to_i16()))],
    )?;

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    info!(
        "wrote mask {} ({} selected) to {}",
        mask.shape(),
        mask.count(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read a mask written by [`write_mask`].
pub fn read_mask(path: &Path) -> Result<Mask> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let shape = builder
        .schema()
        .metadata()
        .get(SHAPE_KEY)
        .ok_or_else(|| SubsetError::MalformedMask("missing shape metadata".into()))
        .and_then(|text| parse_shape(text))?;

    let reader = builder.build()?;
    let mut values = Vec::with_capacity(shape.size());
    for batch in reader {
        let batch = batch?;
        let column = batch
            .column_by_name(MASK_COLUMN)
            .ok_or_else(|| SubsetError::MalformedMask(format!("missing '{MASK_COLUMN}' column")))?;
        let ints = column
            .as_any()
            .downcast_ref::<Int16Array>()
            .ok_or_else(|| {
                SubsetError::MalformedMask(format!(
                    "'{MASK_COLUMN}' column is {:?}, expected Int16",
                    column.data_type()
                ))
            })?;
        values.extend(ints.iter().map(|v| v.unwrap_or(0) != 0));
    }

    Mask::new(shape, values)
}

fn parse_shape(text: &str) -> Result<Shape> {
    let dims = text
        .split(',')
        .map(|tok| {
            tok.trim()
                .parse::<usize>()
                .map_err(|_| SubsetError::MalformedMask(format!("bad shape '{text}'")))
        })
        .collect::<Result<Vec<usize>>>()?;
    Ok(Shape::from(dims))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!("parquet".parse::<MaskFormat>().unwrap(), MaskFormat::Parquet);
        assert_eq!("PQ".parse::<MaskFormat>().unwrap(), MaskFormat::Parquet);
        let err = "fits".parse::<MaskFormat>().unwrap_err();
        assert!(matches!(err, SubsetError::UnsupportedFormat(f) if f == "fits"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.parquet");
        let mask = Mask::from_indices([3usize, 2], &[0, 5]);

        write_mask(&path, &mask, MaskFormat::Parquet).unwrap();
        assert_eq!(read_mask(&path).unwrap(), mask);

        // existing files are overwritten
        let other = Mask::zeros([3usize, 2]);
        write_mask(&path, &other, MaskFormat::Parquet).unwrap();
        assert_eq!(read_mask(&path).unwrap(), other);
    }

    #[test]
    fn test_parse_shape_rejects_garbage() {
        assert_eq!(parse_shape("5, 4").unwrap(), Shape::from([5usize, 4]));
        assert!(parse_shape("5,x").is_err());
    }
}
