//! Labelled sample sets for training and evaluation.

pub mod idx;

use std::path::Path;

use ndarray::{Array2, ArrayView2};

use crate::error::{NetError, Result};

pub use idx::{read_idx_images, read_idx_labels, IMAGE_MAGIC, LABEL_MAGIC};

/// Feature rows paired with class labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Vec<usize>,
}

impl Dataset {
    /// Pair one feature row per label.
    pub fn new(features: Array2<f64>, labels: Vec<usize>) -> Result<Self> {
        if features.nrows() != labels.len() {
            return Err(NetError::InvalidData(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        // Rows must be contiguous so they can be handed out as slices
        let features = features.as_standard_layout().into_owned();
        Ok(Dataset { features, labels })
    }

    /// Load an IDX image file and its label file.
    pub fn from_idx<P: AsRef<Path>, Q: AsRef<Path>>(images: P, labels: Q) -> Result<Self> {
        let features = read_idx_images(images)?;
        let labels = read_idx_labels(labels)?;
        let dataset = Self::new(features, labels)?;
        log::info!(
            "loaded {} samples with {} features each",
            dataset.len(),
            dataset.feature_len()
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of features per sample
    pub fn feature_len(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn sample(&self, index: usize) -> Option<(&[f64], usize)> {
        let label = *self.labels.get(index)?;
        let features = self.features.row(index).to_slice()?;
        Some((features, label))
    }

    /// Samples in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], usize)> + '_ {
        self.features
            .rows()
            .into_iter()
            .zip(self.labels.iter())
            .filter_map(|(row, &label)| row.to_slice().map(|features| (features, label)))
    }

    /// Check every label addresses one of `classes` output neurons.
    pub fn validate_labels(&self, classes: usize) -> Result<()> {
        match self.labels.iter().find(|&&label| label >= classes) {
            Some(&label) => Err(NetError::InvalidLabel { label, classes }),
            None => Ok(()),
        }
    }

    /// First `count` samples, or all of them if there are fewer.
    pub fn take(&self, count: usize) -> Dataset {
        let count = count.min(self.len());
        Dataset {
            features: self.features.slice(ndarray::s![..count, ..]).to_owned(),
            labels: self.labels[..count].to_vec(),
        }
    }
}
