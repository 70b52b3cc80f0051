//! Small permutations of {0, ..., n-1} for n ≤ 5
//!
//! Gluings between simplices of a dimension-d triangulation are permutations
//! of the d+1 vertex labels. We only ever need d ≤ 4, so a fixed array with a
//! length byte is plenty.

use std::fmt;

/// Largest permutation size we support (pentachora have 5 vertices)
pub const MAX_PERM: usize = 5;

/// A permutation of {0, ..., n-1}
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Perm {
    n: u8,
    images: [u8; MAX_PERM],
}

impl Perm {
    /// The identity permutation on n elements
    pub fn identity(n: usize) -> Self {
        assert!(n <= MAX_PERM, "permutations on more than {MAX_PERM} elements");
        let mut images = [0u8; MAX_PERM];
        for (i, img) in images.iter_mut().enumerate().take(n) {
            *img = i as u8;
        }
        Self { n: n as u8, images }
    }

    /// Build from an image list, returning None unless it is a bijection
    pub fn from_images(images: &[u8]) -> Option<Self> {
        let n = images.len();
        if n > MAX_PERM {
            return None;
        }
        let mut seen = [false; MAX_PERM];
        let mut out = [0u8; MAX_PERM];
        for (i, &img) in images.iter().enumerate() {
            let idx = img as usize;
            if idx >= n || seen[idx] {
                return None;
            }
            seen[idx] = true;
            out[i] = img;
        }
        Some(Self {
            n: n as u8,
            images: out,
        })
    }

    pub fn size(&self) -> usize {
        self.n as usize
    }

    /// Image of `i` under this permutation
    pub fn apply(&self, i: usize) -> usize {
        self.images[i] as usize
    }

    /// Composition `self ∘ other` (apply `other` first)
    pub fn compose(&self, other: &Perm) -> Perm {
        debug_assert_eq!(self.n, other.n);
        let mut images = [0u8; MAX_PERM];
        for (i, img) in images.iter_mut().enumerate().take(self.size()) {
            *img = self.images[other.apply(i)];
        }
        Perm { n: self.n, images }
    }

    pub fn inverse(&self) -> Perm {
        let mut images = [0u8; MAX_PERM];
        for i in 0..self.size() {
            images[self.apply(i)] = i as u8;
        }
        Perm { n: self.n, images }
    }

    /// Sign of the permutation: +1 for even, -1 for odd
    pub fn sign(&self) -> i32 {
        let mut sign = 1;
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                if self.images[i] > self.images[j] {
                    sign = -sign;
                }
            }
        }
        sign
    }

    /// Images as a string of digits, e.g. "0132"
    pub fn image_string(&self) -> String {
        self.images[..self.size()]
            .iter()
            .map(|d| char::from(b'0' + d))
            .collect()
    }

    /// The canonical ordering of facet `facet` of a `dim`-simplex
    ///
    /// Maps 0..dim to the vertices of the facet in increasing order and maps
    /// `dim` to the vertex opposite the facet (which is `facet` itself).
    pub fn facet_ordering(dim: usize, facet: usize) -> Perm {
        let mut images = [0u8; MAX_PERM];
        let mut next = 0;
        for v in 0..=dim {
            if v != facet {
                images[next] = v as u8;
                next += 1;
            }
        }
        images[dim] = facet as u8;
        Perm {
            n: (dim + 1) as u8,
            images,
        }
    }
}

impl fmt::Debug for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Perm({})", self.image_string())
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.image_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_images_rejects_repeats() {
        assert!(Perm::from_images(&[0, 1, 1, 3]).is_none());
        assert!(Perm::from_images(&[0, 1, 4, 3]).is_none());
        assert!(Perm::from_images(&[3, 2, 1, 0]).is_some());
    }

    #[test]
    fn test_compose_and_inverse() {
        let p = Perm::from_images(&[1, 2, 3, 0]).unwrap();
        let q = Perm::from_images(&[0, 2, 1, 3]).unwrap();
        // (p ∘ q)(1) = p(q(1)) = p(2) = 3
        assert_eq!(p.compose(&q).apply(1), 3);
        assert_eq!(p.compose(&p.inverse()), Perm::identity(4));
    }

    #[test]
    fn test_facet_ordering() {
        assert_eq!(Perm::facet_ordering(3, 3).image_string(), "0123");
        assert_eq!(Perm::facet_ordering(3, 0).image_string(), "1230");
        assert_eq!(Perm::facet_ordering(2, 1).image_string(), "021");
    }

    #[test]
    fn test_sign() {
        assert_eq!(Perm::identity(4).sign(), 1);
        assert_eq!(Perm::from_images(&[1, 0, 2, 3]).unwrap().sign(), -1);
        assert_eq!(Perm::from_images(&[1, 2, 0]).unwrap().sign(), 1);
    }
}
