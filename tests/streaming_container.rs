//! The streaming contract driven end to end over an on-disk container:
//! read one variable slice at a time, transform it, append the partial
//! result to an incrementally written output container.

use bna_rs::container::{write_array, ArrayFile, ArrayWriter};
use bna_rs::error::AdapterError;
use bna_rs::streaming::transform_axis;
use ndarray::{ArrayD, IxDyn};
use std::path::Path;

const SHAPE: [usize; 4] = [6, 5, 3, 2];
const VARIABLE_AXIS: usize = 1;

fn write_series(path: &Path) {
    let total: usize = SHAPE.iter().product();
    let data =
        ArrayD::from_shape_vec(IxDyn(&SHAPE), (0..total).map(|v| v as f64).collect()).unwrap();
    write_array(path, data.view()).unwrap();
}

#[test]
fn test_streamed_sums_cover_every_variable_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("series.bna");
    let output_path = dir.path().join("sums.bna");
    write_series(&input_path);

    let source = ArrayFile::open(&input_path).unwrap();
    let mut writer = ArrayWriter::create(&output_path, &[1]).unwrap();

    let mut order = Vec::new();
    let count = transform_axis(
        &source,
        VARIABLE_AXIS,
        |variable, slice| {
            assert_eq!(slice.shape(), &[SHAPE[0], 1, SHAPE[2], SHAPE[3]]);
            order.push(variable);
            Ok(ArrayD::from_shape_vec(IxDyn(&[1]), vec![slice.sum()]).unwrap())
        },
        |partial| writer.write_slice(partial.view()),
    )
    .unwrap();
    writer.finish().unwrap();

    assert_eq!(count, SHAPE[VARIABLE_AXIS]);
    assert_eq!(order, vec![0, 1, 2, 3, 4]);

    // The output container holds one entry per variable, in stream order,
    // and each entry equals the directly computed slice sum.
    let full = ArrayFile::open(&input_path).unwrap().read_all().unwrap();
    let output = ArrayFile::open(&output_path).unwrap();
    assert_eq!(output.shape(), &[SHAPE[VARIABLE_AXIS], 1]);
    let sums = output.read_all().unwrap();
    for variable in 0..SHAPE[VARIABLE_AXIS] {
        let mut expected = 0.0;
        for t in 0..SHAPE[0] {
            for s in 0..SHAPE[2] {
                for m in 0..SHAPE[3] {
                    expected += full[[t, variable, s, m]];
                }
            }
        }
        assert_eq!(sums[[variable, 0]], expected);
    }
}

#[test]
fn test_failed_stream_leaves_output_unfinalized() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("series.bna");
    let output_path = dir.path().join("partial.bna");
    write_series(&input_path);

    let source = ArrayFile::open(&input_path).unwrap();
    let mut writer = ArrayWriter::create(&output_path, &[1]).unwrap();

    let result = transform_axis(
        &source,
        VARIABLE_AXIS,
        |variable, slice| {
            if variable == 2 {
                return Err(AdapterError::Numeric("did not converge".to_string()));
            }
            Ok(ArrayD::from_shape_vec(IxDyn(&[1]), vec![slice.sum()]).unwrap())
        },
        |partial| writer.write_slice(partial.view()),
    );
    assert!(matches!(result, Err(AdapterError::Numeric(_))));
    drop(writer);

    // The writer was never finalized, so the partial output reads back
    // as an empty stack and cannot be mistaken for a complete result.
    let stored = ArrayFile::open(&output_path).unwrap();
    assert_eq!(stored.shape(), &[0, 1]);
}

#[test]
fn test_each_read_covers_exactly_one_slice() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("series.bna");
    write_series(&input_path);
    let source = ArrayFile::open(&input_path).unwrap();

    // Largest sub-array any single read may return: one slice of the
    // iteration axis. This is the memory bound of the whole stream.
    let slice_len = SHAPE[0] * SHAPE[2] * SHAPE[3];
    transform_axis(
        &source,
        VARIABLE_AXIS,
        |_, slice| {
            assert_eq!(slice.len(), slice_len);
            Ok(())
        },
        |_| Ok(()),
    )
    .unwrap();
}
