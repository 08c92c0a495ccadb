use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// A sparse feature row, as `(feature index, weight)` pairs
pub type SparseRow = Vec<(usize, f32)>;

/// Scatter sparse feature rows into a dense `[rows, n_features]` tensor
pub fn densify<B: Backend>(
    rows: &[SparseRow],
    n_features: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let batch_size = rows.len();
    let mut values = vec![0.0f32; batch_size * n_features];

    for (row_index, row) in rows.iter().enumerate() {
        let offset = row_index * n_features;

        for &(feature, weight) in row {
            values[offset + feature] = weight;
        }
    }

    Tensor::from_data(
        Data::new(
            values.into_iter().map(|v| v.elem::<B::FloatElem>()).collect(),
            Shape::new([batch_size, n_features]),
        ),
        device,
    )
}

/// Build a 1D Int tensor of class ids
pub fn class_ids<B: Backend>(ids: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::from_data(
        Data::new(
            ids.iter().map(|&id| (id as i64).elem::<B::IntElem>()).collect(),
            Shape::new([ids.len()]),
        ),
        device,
    )
}

/// Split a `[rows, cols]` tensor into one `Vec<f32>` per row
pub fn into_rows<B: Backend>(tensor: Tensor<B, 2>) -> Vec<Vec<f32>> {
    let [_, cols] = tensor.dims();
    let values = tensor.into_data().convert::<f32>().value;

    if cols == 0 {
        return Vec::new();
    }

    values.chunks(cols).map(<[f32]>::to_vec).collect()
}
