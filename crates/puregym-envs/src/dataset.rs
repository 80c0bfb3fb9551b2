//! Image-classification dataset container for the bandit environment.
//!
//! Loading from disk is a caller concern; this type only holds the arrays,
//! validates them at construction, and supports the `fraction` truncation
//! the bandit is built with. A keyed synthetic generator stands in for real
//! data in tests.

use ndarray::{s, Array3, ArrayD, Axis};
use rand::Rng;

use puregym::rng::Key;
use puregym::{GymError, Result};

/// A labeled grayscale image dataset
#[derive(Clone, Debug)]
pub struct ImageDataset {
    /// Pixel data, `[num_images, height, width]`, raw u8 intensities
    images: Array3<u8>,
    /// One label per image, each `< num_classes`
    labels: Vec<u8>,
    /// Number of label classes
    num_classes: usize,
}

impl ImageDataset {
    /// Create a dataset, validating shapes and label ranges
    pub fn new(images: Array3<u8>, labels: Vec<u8>, num_classes: usize) -> Result<Self> {
        if labels.is_empty() {
            return Err(GymError::InvalidConfig("dataset is empty".to_string()));
        }
        if images.shape()[0] != labels.len() {
            return Err(GymError::InvalidConfig(format!(
                "{} images but {} labels",
                images.shape()[0],
                labels.len()
            )));
        }
        if num_classes == 0 {
            return Err(GymError::InvalidConfig(
                "num_classes must be positive".to_string(),
            ));
        }
        if let Some(&label) = labels.iter().find(|&&l| l as usize >= num_classes) {
            return Err(GymError::InvalidConfig(format!(
                "label {label} out of range for {num_classes} classes"
            )));
        }
        Ok(Self {
            images,
            labels,
            num_classes,
        })
    }

    /// Keep only the leading `fraction` of the dataset
    ///
    /// `fraction` must lie in `(0, 1]` and must not truncate the dataset to
    /// nothing.
    pub fn truncate(self, fraction: f64) -> Result<Self> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(GymError::InvalidConfig(format!(
                "fraction must be in (0, 1], got {fraction}"
            )));
        }
        let keep = (fraction * self.len() as f64) as usize;
        if keep == 0 {
            return Err(GymError::InvalidConfig(format!(
                "fraction {fraction} leaves an empty dataset"
            )));
        }
        let images = self.images.slice(s![..keep, .., ..]).to_owned();
        let labels = self.labels[..keep].to_vec();
        Self::new(images, labels, self.num_classes)
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `[height, width]` of each image
    pub fn image_shape(&self) -> [usize; 2] {
        [self.images.shape()[1], self.images.shape()[2]]
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Label of image `idx`
    pub fn label(&self, idx: usize) -> usize {
        self.labels[idx] as usize
    }

    /// Image `idx` normalized to `[0, 1]`
    pub fn normalized_image(&self, idx: usize) -> ArrayD<f32> {
        self.images
            .index_axis(Axis(0), idx)
            .mapv(|v| v as f32 / 255.0)
            .into_dyn()
    }

    /// Generate a deterministic keyed dataset, for tests and examples
    pub fn synthetic(
        num_images: usize,
        height: usize,
        width: usize,
        num_classes: usize,
        key: Key,
    ) -> Result<Self> {
        let mut key = key;
        let mut images = Array3::<u8>::zeros((num_images, height, width));
        let mut labels = Vec::with_capacity(num_images);
        for i in 0..num_images {
            labels.push(key.gen_range(0..num_classes) as u8);
            for pixel in images.index_axis_mut(Axis(0), i).iter_mut() {
                *pixel = key.gen::<u8>();
            }
        }
        Self::new(images, labels, num_classes)
    }
}
