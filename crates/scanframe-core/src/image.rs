use crate::Rotation;

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Rotate an image clockwise so that a frame captured with `rotation`
/// metadata reads upright.
///
/// The output is always `width * height` bytes; a view whose buffer is
/// shorter than that contributes only its complete rows.
pub fn rotate_gray(src: &GrayImageView<'_>, rotation: Rotation) -> GrayImage {
    let (w, h) = (src.width, src.height);
    let (out_w, out_h) = if rotation.swaps_axes() { (h, w) } else { (w, h) };
    let mut out = vec![0u8; out_w * out_h];

    if w == 0 {
        return GrayImage {
            width: out_w,
            height: out_h,
            data: out,
        };
    }

    // Rows missing from a short buffer stay zero.
    for (y, row) in src.data.chunks_exact(w).take(h).enumerate() {
        for (x, &v) in row.iter().enumerate() {
            let (dx, dy) = match rotation {
                Rotation::Deg0 => (x, y),
                Rotation::Deg90 => (h - 1 - y, x),
                Rotation::Deg180 => (w - 1 - x, h - 1 - y),
                Rotation::Deg270 => (y, w - 1 - x),
            };
            out[dy * out_w + dx] = v;
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x2:
    // 1 2 3
    // 4 5 6
    fn sample() -> GrayImage {
        GrayImage {
            width: 3,
            height: 2,
            data: vec![1, 2, 3, 4, 5, 6],
        }
    }

    #[test]
    fn quarter_turns() {
        let img = sample();
        let cw = rotate_gray(&img.view(), Rotation::Deg90);
        assert_eq!((cw.width, cw.height), (2, 3));
        assert_eq!(cw.data, vec![4, 1, 5, 2, 6, 3]);

        let ccw = rotate_gray(&img.view(), Rotation::Deg270);
        assert_eq!(ccw.data, vec![3, 6, 2, 5, 1, 4]);

        let half = rotate_gray(&img.view(), Rotation::Deg180);
        assert_eq!(half.data, vec![6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn four_quarter_turns_restore_the_image() {
        let img = sample();
        let mut cur = img.clone();
        for _ in 0..4 {
            cur = rotate_gray(&cur.view(), Rotation::Deg90);
        }
        assert_eq!(cur, img);
    }

    #[test]
    fn short_buffer_keeps_only_complete_rows() {
        // 3x2 claimed, one and a half rows present.
        let data = [1u8, 2, 3, 4, 5];
        let view = GrayImageView {
            width: 3,
            height: 2,
            data: &data,
        };
        let cw = rotate_gray(&view, Rotation::Deg90);
        assert_eq!((cw.width, cw.height), (2, 3));
        assert_eq!(cw.data, vec![0, 1, 0, 2, 0, 3]);

        let empty = GrayImageView {
            width: 0,
            height: 4,
            data: &[],
        };
        assert!(rotate_gray(&empty, Rotation::Deg270).data.is_empty());
    }
}
