use rand::{rngs::StdRng, Rng, SeedableRng};

pub const MAX_ITERATIONS: usize = 300;
pub const TOLERANCE: f64 = 1e-4;

fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum()
}

/// Index of the nearest centroid; ties go to the lowest index.
pub fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// k-means++ seeding: each further centre is drawn with probability
/// proportional to its squared distance from the centres chosen so far.
fn seed_centroids(points: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    while centroids.len() < k {
        let dists: Vec<f64> = points
            .iter()
            .map(|p| squared_distance(p, &centroids[nearest(p, &centroids)]))
            .collect();
        let total: f64 = dists.iter().sum();

        let pick = if total <= 0.0 {
            // All remaining points coincide with a centre.
            rng.gen_range(0..points.len())
        } else {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = points.len() - 1;
            for (i, d) in dists.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        };
        centroids.push(points[pick].clone());
    }
    centroids
}

/// Lloyd's algorithm over `points`, returning one cluster index per point.
///
/// `points` must be non-empty, all of the same dimension, with
/// `1 <= k <= points.len()`.
pub fn assign(points: &[Vec<f32>], k: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dim = points[0].len();
    let mut centroids = seed_centroids(points, k, &mut rng);
    let mut assignments = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        for (a, p) in assignments.iter_mut().zip(points.iter()) {
            *a = nearest(p, &centroids);
        }

        let mut sums = vec![vec![0.0f64; dim]; k];
        let mut counts = vec![0usize; k];
        for (p, &a) in points.iter().zip(assignments.iter()) {
            counts[a] += 1;
            for (s, v) in sums[a].iter_mut().zip(p.iter()) {
                *s += *v as f64;
            }
        }

        let mut shift = 0.0f64;
        for c in 0..k {
            // An empty cluster keeps its previous centre.
            if counts[c] == 0 {
                continue;
            }
            let updated: Vec<f32> = sums[c].iter().map(|s| (s / counts[c] as f64) as f32).collect();
            shift = shift.max(squared_distance(&updated, &centroids[c]));
            centroids[c] = updated;
        }

        if shift <= TOLERANCE {
            break;
        }
    }

    for (a, p) in assignments.iter_mut().zip(points.iter()) {
        *a = nearest(p, &centroids);
    }
    assignments
}
