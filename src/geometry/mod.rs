//! Page box geometry.
//!
//! Page boxes are stored the way the writer consumes them: both corners plus
//! the derived width and height, all in user-space units divided by the
//! requested scale.

use crate::object::Object;

/// A page box rectangle in default user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x
    pub llx: f64,
    /// Lower-left y
    pub lly: f64,
    /// Upper-right x
    pub urx: f64,
    /// Upper-right y
    pub ury: f64,
    /// Width (`urx - llx`)
    pub w: f64,
    /// Height (`ury - lly`)
    pub h: f64,
}

impl PageBox {
    /// Create a box from two opposite corners.
    ///
    /// Corners may be given in any order; the result is normalized so that
    /// `llx <= urx` and `lly <= ury`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_import::geometry::PageBox;
    ///
    /// let b = PageBox::from_points(100.0, 200.0, 0.0, 0.0);
    /// assert_eq!((b.llx, b.lly, b.urx, b.ury), (0.0, 0.0, 100.0, 200.0));
    /// assert_eq!((b.w, b.h), (100.0, 200.0));
    /// ```
    pub fn from_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let llx = x0.min(x1);
        let lly = y0.min(y1);
        let urx = x0.max(x1);
        let ury = y0.max(y1);
        Self {
            llx,
            lly,
            urx,
            ury,
            w: urx - llx,
            h: ury - lly,
        }
    }

    /// Build a box from a `[x0 y0 x1 y1]` array, dividing every coordinate by `scale`.
    ///
    /// Returns `None` when the array does not hold four numbers.
    pub fn from_array(arr: &[Object], scale: f64) -> Option<Self> {
        if arr.len() != 4 || scale == 0.0 {
            return None;
        }
        let mut v = [0.0f64; 4];
        for (slot, obj) in v.iter_mut().zip(arr) {
            *slot = obj.as_number()? / scale;
        }
        Some(Self::from_points(v[0], v[1], v[2], v[3]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let b = PageBox::from_points(50.0, 80.0, 10.0, 20.0);
        assert_eq!(b.llx, 10.0);
        assert_eq!(b.lly, 20.0);
        assert_eq!(b.urx, 50.0);
        assert_eq!(b.ury, 80.0);
        assert_eq!(b.w, 40.0);
        assert_eq!(b.h, 60.0);
    }

    #[test]
    fn test_from_array_with_scale() {
        let arr = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(612.0),
            Object::Integer(792),
        ];
        let b = PageBox::from_array(&arr, 2.0).unwrap();
        assert_eq!((b.w, b.h), (306.0, 396.0));
    }

    #[test]
    fn test_from_array_rejects_bad_input() {
        assert!(PageBox::from_array(&[Object::Integer(0)], 1.0).is_none());
        let arr = vec![
            Object::Integer(0),
            Object::Null,
            Object::Integer(1),
            Object::Integer(1),
        ];
        assert!(PageBox::from_array(&arr, 1.0).is_none());
    }
}
