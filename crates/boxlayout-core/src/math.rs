/// SIMD-accelerated `glam` types.
///
/// The geometry module only needs the 2D affine subset ([`Vec2`], [`Mat2`],
/// [`Affine2`]); everything is re-exported so hosts do not need a direct
/// `glam` dependency to build transforms.
///
/// ```
/// use boxlayout_core::math::{Affine2, Vec2};
///
/// let shift = Affine2::from_translation(Vec2::new(10.0, 0.0));
/// assert_eq!(shift.transform_point2(Vec2::ZERO), Vec2::new(10.0, 0.0));
/// ```
///
/// [`glam`]: https://docs.rs/glam
pub mod fast {
    pub use glam::*;
}

pub use fast::*;
