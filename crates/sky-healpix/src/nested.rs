//! HEALPix nested-scheme pixel indexing.
//!
//! The twelve base faces are numbered 0-3 (north polar cap), 4-7
//! (equatorial belt) and 8-11 (south polar cap). Inside a face the pixel
//! index interleaves the bits of `ix` (even bits) and `iy` (odd bits), so
//! dropping the two lowest bits of an index yields its parent one order up.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{HealpixError, Result};

/// Highest supported order (nside = 2^29).
pub const MAX_ORDER: u8 = 29;

/// Ring index of the southernmost corner of each face, in units of nside.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];

/// Longitude index of each face centre, in units of nside / 2.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

const TWO_THIRDS: f64 = 2.0 / 3.0;

/// Number of pixels covering the sphere at `nside`.
pub fn npix(nside: u32) -> u64 {
    12 * nside as u64 * nside as u64
}

/// Order (log2 of nside) for a valid nside.
pub fn order_of(nside: u32) -> Result<u8> {
    if nside == 0 || !nside.is_power_of_two() {
        return Err(HealpixError::InvalidNside(nside));
    }
    let order = nside.trailing_zeros() as u8;
    if order > MAX_ORDER {
        return Err(HealpixError::InvalidNside(nside));
    }
    Ok(order)
}

/// A nested HEALPix grid at one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Nested {
    nside: u32,
    order: u8,
}

impl Nested {
    /// Create a grid for `nside`, which must be a power of two.
    pub fn new(nside: u32) -> Result<Self> {
        let order = order_of(nside)?;
        Ok(Self { nside, order })
    }

    /// Create a grid from its order.
    pub fn from_order(order: u8) -> Result<Self> {
        if order > MAX_ORDER {
            return Err(HealpixError::InvalidNside(u32::MAX));
        }
        Ok(Self {
            nside: 1 << order,
            order,
        })
    }

    pub fn nside(&self) -> u32 {
        self.nside
    }

    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn npix(&self) -> u64 {
        npix(self.nside)
    }

    /// Check that `pixel` addresses a cell of this grid.
    pub fn check_pixel(&self, pixel: u64) -> Result<()> {
        if pixel >= self.npix() {
            return Err(HealpixError::PixelOutOfRange {
                pixel,
                nside: self.nside,
            });
        }
        Ok(())
    }

    /// Pixel containing the direction (`theta`, `phi`), radians.
    ///
    /// `theta` is colatitude in [0, pi]; `phi` is any azimuth and is wrapped
    /// into [0, 2pi).
    pub fn ang2pix(&self, theta: f64, phi: f64) -> u64 {
        self.zphi2pix(theta.cos(), phi)
    }

    /// Pixel containing a (longitude, latitude) position given in degrees.
    pub fn lonlat_to_pix(&self, lon_deg: f64, lat_deg: f64) -> u64 {
        // cos(90 - lat) == sin(lat); use sin directly to keep the poles exact.
        self.zphi2pix(lat_deg.to_radians().sin(), lon_deg.to_radians())
    }

    /// Centre of `pixel` as (`theta`, `phi`) in radians.
    pub fn pix2ang(&self, pixel: u64) -> (f64, f64) {
        let (z, phi) = self.pix2zphi(pixel);
        (z.clamp(-1.0, 1.0).acos(), phi)
    }

    /// Centre of `pixel` as (longitude, latitude) in degrees.
    pub fn pix_to_lonlat(&self, pixel: u64) -> (f64, f64) {
        let (z, phi) = self.pix2zphi(pixel);
        (phi.to_degrees(), z.clamp(-1.0, 1.0).asin().to_degrees())
    }

    /// Index of the ancestor of `pixel` in the coarser grid `coarse`.
    ///
    /// Returns `None` when `coarse` is not coarser than (or equal to) `self`.
    pub fn ancestor(&self, pixel: u64, coarse: &Nested) -> Option<u64> {
        if coarse.order > self.order {
            return None;
        }
        Some(pixel >> (2 * (self.order - coarse.order) as u32))
    }

    fn zphi2pix(&self, z: f64, phi: f64) -> u64 {
        let nside = self.nside as i64;
        let order = self.order as u32;
        let za = z.abs();

        let mut tt = phi.rem_euclid(TAU) / FRAC_PI_2;
        if tt >= 4.0 {
            // rem_euclid can round up to exactly 2pi for tiny negative inputs
            tt -= 4.0;
        }

        if za <= TWO_THIRDS {
            // Equatorial belt
            let temp1 = nside as f64 * (0.5 + tt);
            let temp2 = nside as f64 * (z * 0.75);
            let jp = (temp1 - temp2) as i64; // ascending edge line
            let jm = (temp1 + temp2) as i64; // descending edge line
            let ifp = jp >> order;
            let ifm = jm >> order;
            let face = if ifp == ifm {
                ifp | 4
            } else if ifp < ifm {
                ifp
            } else {
                ifm + 8
            };
            let ix = jm & (nside - 1);
            let iy = nside - (jp & (nside - 1)) - 1;
            self.xyf2pix(ix, iy, face)
        } else {
            // Polar caps
            let ntt = (tt as i64).min(3);
            let tp = tt - ntt as f64;
            let tmp = nside as f64 * (3.0 * (1.0 - za)).sqrt();
            let jp = ((tp * tmp) as i64).min(nside - 1);
            let jm = (((1.0 - tp) * tmp) as i64).min(nside - 1);
            if z >= 0.0 {
                self.xyf2pix(nside - jm - 1, nside - jp - 1, ntt)
            } else {
                self.xyf2pix(jp, jm, ntt + 8)
            }
        }
    }

    fn pix2zphi(&self, pixel: u64) -> (f64, f64) {
        let nside = self.nside as i64;
        let order = self.order as u32;
        let (ix, iy, face) = self.pix2xyf(pixel);

        let fact2 = 4.0 / self.npix() as f64;
        let fact1 = (nside << 1) as f64 * fact2;

        let jr = (JRLL[face] << order) - ix - iy - 1;
        let (nr, z) = if jr < nside {
            (jr, 1.0 - (jr * jr) as f64 * fact2)
        } else if jr > 3 * nside {
            let nr = 4 * nside - jr;
            (nr, (nr * nr) as f64 * fact2 - 1.0)
        } else {
            (nside, (2 * nside - jr) as f64 * fact1)
        };

        let mut tmp = JPLL[face] * nr + ix - iy;
        if tmp < 0 {
            tmp += 8 * nr;
        }
        let phi = if nr == nside {
            0.75 * FRAC_PI_2 * tmp as f64 * fact1
        } else {
            (0.5 * FRAC_PI_2 * tmp as f64) / nr as f64
        };
        (z, phi)
    }

    fn xyf2pix(&self, ix: i64, iy: i64, face: i64) -> u64 {
        let face_offset = (face as u64) << (2 * self.order as u32);
        face_offset + spread_bits(ix as u64) + (spread_bits(iy as u64) << 1)
    }

    fn pix2xyf(&self, pixel: u64) -> (i64, i64, usize) {
        let shift = 2 * self.order as u32;
        let face = (pixel >> shift) as usize;
        let sub = pixel & ((1u64 << shift) - 1);
        let ix = compress_bits(sub) as i64;
        let iy = compress_bits(sub >> 1) as i64;
        (ix, iy, face.min(11))
    }
}

/// Spread the low 32 bits of `v` onto the even bit positions.
fn spread_bits(v: u64) -> u64 {
    let mut x = v & 0xFFFF_FFFF;
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Inverse of [`spread_bits`]: gather the even bits of `v`.
fn compress_bits(v: u64) -> u64 {
    let mut x = v & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x >> 16)) & 0x0000_0000_FFFF_FFFF;
    x
}
