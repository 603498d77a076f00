use crate::detection::{RedactError, RedactResult};

/// Side length of a blur kernel.
pub const KERNEL_SIZE: usize = 5;

/// 5x5 integer convolution kernel.
///
/// `weights[i][j]` applies to the neighbour at horizontal offset `i - 2` and
/// vertical offset `j - 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel {
    weights: [[u32; KERNEL_SIZE]; KERNEL_SIZE],
}

impl Kernel {
    /// Binomial approximation of a Gaussian, `[1, 4, 6, 4, 1]` outer product.
    pub const GAUSSIAN_5X5: Kernel = Kernel {
        weights: [
            [1, 4, 6, 4, 1],
            [4, 16, 24, 16, 4],
            [6, 24, 36, 24, 6],
            [4, 16, 24, 16, 4],
            [1, 4, 6, 4, 1],
        ],
    };

    pub fn new(weights: [[u32; KERNEL_SIZE]; KERNEL_SIZE]) -> RedactResult<Self> {
        let kernel = Self { weights };
        if kernel.total_weight() == 0 {
            return Err(RedactError::InvalidConfig(
                "kernel weights must not all be zero".to_string(),
            ));
        }
        Ok(kernel)
    }

    /// Offset from the kernel centre to its border.
    pub const fn radius(&self) -> i64 {
        (KERNEL_SIZE / 2) as i64
    }

    pub fn weight(&self, i: usize, j: usize) -> u32 {
        self.weights[i][j]
    }

    /// Sum of all weights. Widened so any `u32` kernel fits.
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().flatten().map(|&w| w as u64).sum()
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::GAUSSIAN_5X5
    }
}
