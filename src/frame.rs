use ndarray::Array3;

/// A decoded video frame with fixed dimensions.
pub trait Frame {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
}

/// HWC frame.
impl Frame for Array3<u8> {
    fn width(&self) -> i32 {
        self.dim().1 as i32
    }

    fn height(&self) -> i32 {
        self.dim().0 as i32
    }
}

#[cfg(feature = "opencv-video")]
mod cv {
    use super::Frame;
    use opencv::{core, prelude::*};

    impl Frame for core::Mat {
        fn width(&self) -> i32 {
            self.cols()
        }

        fn height(&self) -> i32 {
            self.rows()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_frame_dims() {
        let frame = Array3::<u8>::zeros((480, 640, 3));
        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 480);
    }
}
