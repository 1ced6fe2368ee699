use std::path::Path;

use opencv::{core, dnn, prelude::*};
use tracing::info;

use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::postprocess::{Candidate, decode_ssd_flat};
use crate::preprocess::{BlobParams, check_input_channels};

/// MobileNet-SSD (Caffe) detector running on OpenCV's dnn module
pub struct SsdDetector {
    net: dnn::Net,
    params: BlobParams,
    num_classes: usize,
}

impl SsdDetector {
    /// Load the network from a Caffe topology and weight file
    ///
    /// # Arguments
    /// * `prototxt` - Network description
    /// * `weights` - Trained weights
    /// * `params` - Input blob parameters
    /// * `num_classes` - Classes in the network output, background included
    pub fn load<P: AsRef<Path>, W: AsRef<Path>>(
        prototxt: P,
        weights: W,
        params: BlobParams,
        num_classes: usize,
    ) -> Result<Self> {
        let prototxt = path_str(prototxt.as_ref())?;
        let weights = path_str(weights.as_ref())?;

        for path in [prototxt, weights] {
            if !Path::new(path).is_file() {
                return Err(Error::ModelLoad(format!("{path} does not exist")));
            }
        }

        let net = dnn::read_net_from_caffe(prototxt, weights)
            .map_err(|e| Error::ModelLoad(e.to_string()))?;
        if net.empty()? {
            return Err(Error::ModelLoad(format!("{prototxt} produced an empty network")));
        }

        info!(prototxt, weights, input = params.size, "detector loaded");

        Ok(Self {
            net,
            params,
            num_classes,
        })
    }

    /// Run the network on an NCHW blob and return the raw detection buffer
    ///
    /// # Returns
    /// * Flat 1x1xNx7 DetectionOutput values
    pub fn inference(&mut self, blob: &core::Mat) -> Result<Vec<f32>> {
        self.net
            .set_input(blob, "", 1.0, core::Scalar::default())
            .map_err(|e| Error::Inference(e.to_string()))?;
        let output = self
            .net
            .forward_single("")
            .map_err(|e| Error::Inference(e.to_string()))?;

        let bytes = output.data_bytes()?;
        let values: &[f32] = bytemuck::try_cast_slice(bytes)
            .map_err(|e| Error::Inference(format!("unexpected output layout: {e:?}")))?;

        Ok(values.to_vec())
    }
}

impl Detector<core::Mat> for SsdDetector {
    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn detect(&mut self, frame: &core::Mat) -> Result<Vec<Candidate>> {
        let blob = input_blob(frame, &self.params)?;
        let output = self.inference(&blob)?;

        Ok(decode_ssd_flat(&output, frame.width(), frame.height()))
    }
}

/// Resize, mean-subtract and scale a BGR frame into a 1x3xSxS f32 blob
fn input_blob(frame: &core::Mat, params: &BlobParams) -> Result<core::Mat> {
    check_input_channels(frame.channels())?;

    let size = params.size as i32;
    let [b, g, r] = params.mean.map(f64::from);
    dnn::blob_from_image(
        frame,
        f64::from(params.scale),
        core::Size::new(size, size),
        core::Scalar::new(b, g, r, 0.0),
        params.swap_rb,
        false,
        core::CV_32F,
    )
    .map_err(|e| Error::Inference(e.to_string()))
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::ModelLoad(format!("{} is not valid UTF-8", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(typ: i32, value: f64) -> core::Mat {
        core::Mat::new_rows_cols_with_default(48, 64, typ, core::Scalar::all(value)).unwrap()
    }

    #[test]
    fn test_blob_shape_and_normalization() {
        let blob = input_blob(&frame(core::CV_8UC3, 255.0), &BlobParams::default()).unwrap();
        assert_eq!(blob.dims(), 4);
        assert_eq!(blob.total(), 3 * 300 * 300);

        let values = blob.data_typed::<f32>().unwrap();
        assert!(values.iter().all(|v| (v - 1.0).abs() < 1e-3));
    }

    #[test]
    fn test_single_channel_frame_is_an_inference_error() {
        let err = input_blob(&frame(core::CV_8UC1, 0.0), &BlobParams::default()).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }
}
