//! Matrix-multiplication race: a recursive blocked multiply against the
//! classical triple loop, plus a cache-friendlier transposed variant.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::race::error::{RaceError, Result};
use crate::race::{CancellationToken, Strategy, StrategyOutcome};

/// Upper bound on elements per matrix (4096 x 4096 doubles).
const MAX_ELEMS: usize = 1 << 24;

/// A pair of square matrices in row-major order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixPair {
    pub n: usize,
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

/// Product matrix, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub n: usize,
    pub c: Vec<f64>,
}

impl MatrixPair {
    /// Generate a seeded random pair with entries in `[0, 10)`.
    pub fn random(n: usize, seed: u64) -> Result<Self> {
        let elems = checked_elems(n)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut a = Vec::with_capacity(elems);
        let mut b = Vec::with_capacity(elems);
        for _ in 0..elems {
            a.push(f64::from(rng.random_range(0..100u32)) / 10.0);
        }
        for _ in 0..elems {
            b.push(f64::from(rng.random_range(0..100u32)) / 10.0);
        }
        Ok(Self { n, a, b })
    }
}

fn checked_elems(n: usize) -> Result<usize> {
    match n.checked_mul(n) {
        Some(elems) if elems <= MAX_ELEMS => Ok(elems),
        _ => Err(RaceError::ProblemTooLarge { requested: n }),
    }
}

/// Plain triple-loop product, the ground truth for the whole pool.
pub fn reference_product(pair: &MatrixPair) -> Product {
    let n = pair.n;
    let mut c = vec![0.0; n * n];
    for i in 0..n {
        for k in 0..n {
            let aik = pair.a[i * n + k];
            for j in 0..n {
                c[i * n + j] += aik * pair.b[k * n + j];
            }
        }
    }
    Product { n, c }
}

/// The full pool, recursive strategy first.
pub fn strategies() -> Vec<Box<dyn Strategy<MatrixPair, Product>>> {
    vec![
        Box::new(BlockRecursive::default()),
        Box::new(Classical),
        Box::new(ClassicalTransposed),
    ]
}

/// Classical triple loop, probing once per output row.
pub struct Classical;

impl Strategy<MatrixPair, Product> for Classical {
    fn name(&self) -> &str {
        "classical"
    }

    fn solve(&self, pair: &MatrixPair, cancel: &CancellationToken) -> StrategyOutcome<Product> {
        let n = pair.n;
        let mut c = vec![0.0; n * n];
        for i in 0..n {
            if cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
            for k in 0..n {
                let aik = pair.a[i * n + k];
                for j in 0..n {
                    c[i * n + j] += aik * pair.b[k * n + j];
                }
            }
        }
        StrategyOutcome::Solved(Product { n, c })
    }
}

/// Classical loop over a pre-transposed right operand, trading one copy for
/// sequential reads; probes once per output row.
pub struct ClassicalTransposed;

impl Strategy<MatrixPair, Product> for ClassicalTransposed {
    fn name(&self) -> &str {
        "classical-transposed"
    }

    fn solve(&self, pair: &MatrixPair, cancel: &CancellationToken) -> StrategyOutcome<Product> {
        let n = pair.n;
        let mut bt = vec![0.0; n * n];
        for k in 0..n {
            for j in 0..n {
                bt[j * n + k] = pair.b[k * n + j];
            }
        }
        let mut c = vec![0.0; n * n];
        for i in 0..n {
            if cancel.should_cancel() {
                return StrategyOutcome::Cancelled;
            }
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += pair.a[i * n + k] * bt[j * n + k];
                }
                c[i * n + j] = sum;
            }
        }
        StrategyOutcome::Solved(Product { n, c })
    }
}

/// Recursive quadrant decomposition down to a small base case, probing at
/// every recursion entry.
pub struct BlockRecursive {
    /// Dimension at or below which the classical loop takes over.
    pub base: usize,
}

impl Default for BlockRecursive {
    fn default() -> Self {
        Self { base: 64 }
    }
}

impl Strategy<MatrixPair, Product> for BlockRecursive {
    fn name(&self) -> &str {
        "block-recursive"
    }

    fn solve(&self, pair: &MatrixPair, cancel: &CancellationToken) -> StrategyOutcome<Product> {
        let n = pair.n;
        let mut c = vec![0.0; n * n];
        if multiply_into(&pair.a, &pair.b, &mut c, n, self.base.max(1), cancel) {
            StrategyOutcome::Solved(Product { n, c })
        } else {
            StrategyOutcome::Cancelled
        }
    }
}

/// Recursive multiply; returns `false` if a cancellation was observed.
fn multiply_into(
    a: &[f64],
    b: &[f64],
    c: &mut [f64],
    n: usize,
    base: usize,
    cancel: &CancellationToken,
) -> bool {
    if cancel.should_cancel() {
        return false;
    }
    // Odd dimensions fall through to the base case rather than splitting.
    if n <= base || n % 2 != 0 {
        for i in 0..n {
            for k in 0..n {
                let aik = a[i * n + k];
                for j in 0..n {
                    c[i * n + j] += aik * b[k * n + j];
                }
            }
        }
        return true;
    }

    let m = n / 2;
    let [a11, a12, a21, a22] = quadrants(a, n);
    let [b11, b12, b21, b22] = quadrants(b, n);

    let mut t1 = vec![0.0; m * m];
    let mut t2 = vec![0.0; m * m];
    let pieces: [(&[f64], &[f64], &[f64], &[f64], usize, usize); 4] = [
        (&a11, &b11, &a12, &b21, 0, 0),
        (&a11, &b12, &a12, &b22, 0, 1),
        (&a21, &b11, &a22, &b21, 1, 0),
        (&a21, &b12, &a22, &b22, 1, 1),
    ];
    for (x1, y1, x2, y2, qi, qj) in pieces {
        t1.fill(0.0);
        t2.fill(0.0);
        if !multiply_into(x1, y1, &mut t1, m, base, cancel) {
            return false;
        }
        if !multiply_into(x2, y2, &mut t2, m, base, cancel) {
            return false;
        }
        for i in 0..m {
            for j in 0..m {
                c[(qi * m + i) * n + qj * m + j] = t1[i * m + j] + t2[i * m + j];
            }
        }
    }
    true
}

/// Copy out the four quadrants of an `n` x `n` matrix, row-major each.
fn quadrants(src: &[f64], n: usize) -> [Vec<f64>; 4] {
    let m = n / 2;
    let mut q = [
        vec![0.0; m * m],
        vec![0.0; m * m],
        vec![0.0; m * m],
        vec![0.0; m * m],
    ];
    for i in 0..m {
        for j in 0..m {
            q[0][i * m + j] = src[i * n + j];
            q[1][i * m + j] = src[i * n + j + m];
            q[2][i * m + j] = src[(i + m) * n + j];
            q[3][i * m + j] = src[(i + m) * n + j + m];
        }
    }
    q
}
