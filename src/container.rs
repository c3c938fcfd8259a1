//! On-disk array container used for large entity payloads.
//!
//! Little-endian layout: 4-byte magic, `u32` dimension count, one `u64`
//! extent per dimension, then the row-major `f64` payload. Incremental
//! writers create the header with a zero leading extent and patch it on
//! `finish()`, so an unfinished container reads back as empty.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::error::{AdapterError, Result};

pub const CONTAINER_MAGIC: [u8; 4] = *b"BNA\x01";

/// File extension of array container files.
pub const CONTAINER_EXTENSION: &str = "bna";

fn header_len(ndim: usize) -> usize {
    4 + 4 + ndim * 8
}

/// Read-only, memory-mapped view of a stored array.
pub struct ArrayFile {
    mmap: Mmap,
    shape: Vec<usize>,
    data_offset: usize,
}

impl ArrayFile {
    /// Open a container file and validate its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < 8 || mmap[0..4] != CONTAINER_MAGIC {
            return Err(AdapterError::Parse(format!(
                "{} is not an array container",
                path.display()
            )));
        }

        let mut ndim_bytes = [0u8; 4];
        ndim_bytes.copy_from_slice(&mmap[4..8]);
        let ndim = u32::from_le_bytes(ndim_bytes) as usize;
        if ndim == 0 {
            return Err(AdapterError::Parse(format!(
                "{} declares a zero-dimensional array",
                path.display()
            )));
        }

        let data_offset = header_len(ndim);
        if mmap.len() < data_offset {
            return Err(AdapterError::Parse(format!(
                "{} is truncated before the end of its header",
                path.display()
            )));
        }

        let mut shape = Vec::with_capacity(ndim);
        for d in 0..ndim {
            let mut dim_bytes = [0u8; 8];
            dim_bytes.copy_from_slice(&mmap[8 + d * 8..16 + d * 8]);
            shape.push(u64::from_le_bytes(dim_bytes) as usize);
        }

        let expected = data_offset + shape.iter().product::<usize>() * 8;
        if mmap.len() < expected {
            return Err(AdapterError::Parse(format!(
                "{} holds {} bytes but its header declares {}",
                path.display(),
                mmap.len(),
                expected
            )));
        }

        log::debug!("Opened array container {} with shape {:?}", path.display(), shape);

        Ok(Self {
            mmap,
            shape,
            data_offset,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn element(&self, flat: usize) -> f64 {
        let off = self.data_offset + flat * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.mmap[off..off + 8]);
        f64::from_le_bytes(bytes)
    }

    /// Read the sub-array covered by one coordinate range per axis.
    pub fn read_slice(&self, ranges: &[Range<usize>]) -> Result<ArrayD<f64>> {
        let ndim = self.shape.len();
        if ranges.len() != ndim {
            return Err(AdapterError::InvalidParameter(format!(
                "slice has {} ranges for a {}-dimensional array",
                ranges.len(),
                ndim
            )));
        }
        for (axis, range) in ranges.iter().enumerate() {
            if range.start > range.end || range.end > self.shape[axis] {
                return Err(AdapterError::InvalidParameter(format!(
                    "range {}..{} is outside axis {} of extent {}",
                    range.start, range.end, axis, self.shape[axis]
                )));
            }
        }

        let out_shape: Vec<usize> = ranges.iter().map(|r| r.end - r.start).collect();
        let total: usize = out_shape.iter().product();
        let mut out = Vec::with_capacity(total);

        // Row-major element strides of the stored array.
        let mut strides = vec![1usize; ndim];
        for axis in (0..ndim.saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }

        if total > 0 {
            let inner = ndim - 1;
            let mut index: Vec<usize> = ranges.iter().map(|r| r.start).collect();
            'rows: loop {
                let base: usize = index.iter().zip(&strides).map(|(i, s)| i * s).sum();
                for k in 0..out_shape[inner] {
                    out.push(self.element(base + k));
                }
                // Advance the odometer over the outer axes.
                for axis in (0..inner).rev() {
                    index[axis] += 1;
                    if index[axis] < ranges[axis].end {
                        continue 'rows;
                    }
                    index[axis] = ranges[axis].start;
                }
                break;
            }
        }

        ArrayD::from_shape_vec(IxDyn(&out_shape), out)
            .map_err(|e| AdapterError::Parse(format!("slice reshape failed: {}", e)))
    }

    /// Read the entire array.
    pub fn read_all(&self) -> Result<ArrayD<f64>> {
        let ranges: Vec<Range<usize>> = self.shape.iter().map(|&d| 0..d).collect();
        self.read_slice(&ranges)
    }
}

/// Incremental writer appending slices along a new leading axis.
pub struct ArrayWriter {
    file: File,
    path: PathBuf,
    inner_shape: Vec<usize>,
    slices_written: u64,
}

impl ArrayWriter {
    /// Create a container whose final shape will be
    /// `[slices_written, inner_shape...]`.
    pub fn create<P: AsRef<Path>>(path: P, inner_shape: &[usize]) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path)?;

        file.write_all(&CONTAINER_MAGIC)?;
        let ndim = inner_shape.len() + 1;
        file.write_all(&(ndim as u32).to_le_bytes())?;
        file.write_all(&0u64.to_le_bytes())?;
        for &dim in inner_shape {
            file.write_all(&(dim as u64).to_le_bytes())?;
        }

        Ok(Self {
            file,
            path,
            inner_shape: inner_shape.to_vec(),
            slices_written: 0,
        })
    }

    pub fn slices_written(&self) -> usize {
        self.slices_written as usize
    }

    /// Append one slice. The slice shape must match the inner shape the
    /// writer was created with.
    pub fn write_slice(&mut self, slice: ArrayViewD<'_, f64>) -> Result<()> {
        if slice.shape() != self.inner_shape.as_slice() {
            return Err(AdapterError::InvalidParameter(format!(
                "slice shape {:?} does not match writer shape {:?}",
                slice.shape(),
                self.inner_shape
            )));
        }
        let mut buf = Vec::with_capacity(slice.len() * 8);
        for &value in slice.iter() {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        self.file.write_all(&buf)?;
        self.slices_written += 1;
        Ok(())
    }

    /// Patch the leading extent and flush. Without this the container
    /// reads back as empty.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.file.seek(SeekFrom::Start(8))?;
        self.file.write_all(&self.slices_written.to_le_bytes())?;
        self.file.sync_all()?;
        log::debug!(
            "Finalized array container {} with {} slices of shape {:?}",
            self.path.display(),
            self.slices_written,
            self.inner_shape
        );
        Ok(self.path)
    }
}

/// Write a complete array to a container file in one call.
pub fn write_array<P: AsRef<Path>>(path: P, array: ArrayViewD<'_, f64>) -> Result<()> {
    let path = path.as_ref();
    let mut file = File::create(path)?;

    file.write_all(&CONTAINER_MAGIC)?;
    file.write_all(&(array.ndim() as u32).to_le_bytes())?;
    for &dim in array.shape() {
        file.write_all(&(dim as u64).to_le_bytes())?;
    }
    let mut buf = Vec::with_capacity(array.len() * 8);
    for &value in array.iter() {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    file.write_all(&buf)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    #[test]
    fn test_full_roundtrip_is_bit_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.bna");

        let values = vec![0.0, -1.5, f64::MIN_POSITIVE, 3.25, 1e300, -0.0];
        let array = Array::from_shape_vec(IxDyn(&[2, 3]), values.clone()).unwrap();
        write_array(&path, array.view()).unwrap();

        let stored = ArrayFile::open(&path).unwrap();
        assert_eq!(stored.shape(), &[2, 3]);
        let back = stored.read_all().unwrap();
        for (a, b) in back.iter().zip(&values) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_read_slice_extracts_requested_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.bna");

        let array = Array::from_shape_vec(
            IxDyn(&[2, 3, 4]),
            (0..24).map(|v| v as f64).collect(),
        )
        .unwrap();
        write_array(&path, array.view()).unwrap();

        let stored = ArrayFile::open(&path).unwrap();
        let slice = stored.read_slice(&[0..2, 1..2, 1..3]).unwrap();
        assert_eq!(slice.shape(), &[2, 1, 2]);
        // Element [t, 1, s] of the source is t*12 + 4 + s.
        assert_eq!(slice[[0, 0, 0]], 5.0);
        assert_eq!(slice[[0, 0, 1]], 6.0);
        assert_eq!(slice[[1, 0, 0]], 17.0);
        assert_eq!(slice[[1, 0, 1]], 18.0);
    }

    #[test]
    fn test_read_slice_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("row.bna");
        let array = Array::from_shape_vec(IxDyn(&[3]), vec![1.0, 2.0, 3.0]).unwrap();
        write_array(&path, array.view()).unwrap();

        let stored = ArrayFile::open(&path).unwrap();
        assert!(stored.read_slice(&[0..4]).is_err());
        assert!(stored.read_slice(&[0..1, 0..1]).is_err());
    }

    #[test]
    fn test_incremental_writer_matches_streamed_slices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacked.bna");

        let mut writer = ArrayWriter::create(&path, &[2, 2]).unwrap();
        for v in 0..3 {
            let slice = Array::from_shape_vec(
                IxDyn(&[2, 2]),
                vec![v as f64, 1.0, 2.0, 3.0 + v as f64],
            )
            .unwrap();
            writer.write_slice(slice.view()).unwrap();
        }
        assert_eq!(writer.slices_written(), 3);
        writer.finish().unwrap();

        let stored = ArrayFile::open(&path).unwrap();
        assert_eq!(stored.shape(), &[3, 2, 2]);
        let back = stored.read_all().unwrap();
        assert_eq!(back[[0, 0, 0]], 0.0);
        assert_eq!(back[[2, 0, 0]], 2.0);
        assert_eq!(back[[2, 1, 1]], 5.0);
    }

    #[test]
    fn test_writer_rejects_mismatched_slice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bna");

        let mut writer = ArrayWriter::create(&path, &[2, 2]).unwrap();
        let slice = Array::from_shape_vec(IxDyn(&[3]), vec![0.0; 3]).unwrap();
        assert!(writer.write_slice(slice.view()).is_err());
    }

    #[test]
    fn test_unfinished_writer_reads_back_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.bna");

        let mut writer = ArrayWriter::create(&path, &[4]).unwrap();
        let slice = Array::from_shape_vec(IxDyn(&[4]), vec![1.0; 4]).unwrap();
        writer.write_slice(slice.view()).unwrap();
        drop(writer);

        let stored = ArrayFile::open(&path).unwrap();
        assert_eq!(stored.shape(), &[0, 4]);
    }

    #[test]
    fn test_open_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-container");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(matches!(
            ArrayFile::open(&path),
            Err(AdapterError::Parse(_))
        ));
    }
}
