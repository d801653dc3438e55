//! Contains the Grid struct, which describes a relationship between
//! a rectangle of terminal cells with an origin at the top-left, and a
//! rectangle on the complex plane with an arbitrary pair of corners
//! defining the leftlower and rightupper corners of the region.
use errors::{Error, Result};
use num::Complex;

/// Describes the width and height of the terminal area, in
/// characters.  Column 0, row 0 is the top-left character.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// The immutable description of what we are drawing.  Built once at
/// startup and then shared, by reference, with every worker.
#[derive(Copy, Clone, Debug)]
pub struct Grid {
    /// Columns and rows of the output.
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
    // How much of the complex plane a single character covers, in
    // each direction.
    steps: (f64, f64),
}

impl Grid {
    /// Takes the size of the terminal area and two points describing
    /// the complex plane.  Both dimensions must be non-zero and the
    /// region must have a positive width and height.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Grid> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyGrid(width, height));
        }

        // Also rejects NaN corners, since every comparison with NaN fails.
        if !(rightupper.re > leftlower.re) || !(rightupper.im > leftlower.im) {
            return Err(Error::InvertedPlane);
        }

        let steps = (
            (rightupper.re - leftlower.re) / (width as f64),
            (rightupper.im - leftlower.im) / (height as f64),
        );

        Ok(Grid {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            steps,
        })
    }

    /// Characters per row.
    pub fn width(&self) -> usize {
        self.integral_plane.0
    }

    /// Rows in the picture.
    pub fn height(&self) -> usize {
        self.integral_plane.1
    }

    /// The width and height on the complex plane of a single character.
    pub fn steps(&self) -> (f64, f64) {
        self.steps
    }

    /// Given the column and row of a character, return the point on
    /// the complex plane it samples.  Row 0 is the top of the region,
    /// so the imaginary part counts down from the right-upper corner.
    pub fn cell_to_point(&self, column: usize, row: usize) -> Complex<f64> {
        Complex::new(
            self.complex_plane.0.re + (column as f64) * self.steps.0,
            self.complex_plane.1.im - (row as f64) * self.steps.1,
        )
    }
}
