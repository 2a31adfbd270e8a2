//! Euclidean nearest-neighbor search over normalized feature vectors.

use super::normalizer::FeatureVector;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    /// Position of the candidate, in whatever indexing the caller searched with.
    pub index: usize,
    pub distance: f64,
}

pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let delta = x - y;
            delta * delta
        })
        .sum::<f64>()
        .sqrt()
}

/// Keeps the `k` closest neighbors, ascending by distance.
///
/// The sort is stable, so equally distant candidates keep the order in which
/// they were offered.
fn take_closest(mut neighbors: Vec<Neighbor>, k: usize) -> Vec<Neighbor> {
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    neighbors.truncate(k);
    neighbors
}

/// The `k` candidates closest to `query`. `index` refers to positions in `candidates`.
///
/// Asking for more neighbors than candidates returns all of them.
pub fn nearest(query: &FeatureVector, candidates: &[FeatureVector], k: usize) -> Vec<Neighbor> {
    let neighbors = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| Neighbor {
            index,
            distance: euclidean_distance(query, candidate),
        })
        .collect();
    take_closest(neighbors, k)
}

/// Normalized vectors of the whole catalog, built once.
///
/// Searches scan the index with a pre-filter instead of building a new
/// structure for each subset. `index` in results is the catalog position.
#[derive(Debug, Clone, Default)]
pub struct NeighborIndex {
    vectors: Vec<FeatureVector>,
}

impl NeighborIndex {
    pub fn new(vectors: Vec<FeatureVector>) -> NeighborIndex {
        NeighborIndex { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn search(&self, query: &FeatureVector, k: usize) -> Vec<Neighbor> {
        nearest(query, &self.vectors, k)
    }

    /// Nearest neighbors among catalog rows accepted by `predicate`.
    pub fn search_where<P>(&self, query: &FeatureVector, k: usize, predicate: P) -> Vec<Neighbor>
    where
        P: Fn(usize) -> bool,
    {
        let neighbors = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(index, _)| predicate(*index))
            .map(|(index, candidate)| Neighbor {
                index,
                distance: euclidean_distance(query, candidate),
            })
            .collect();
        take_closest(neighbors, k)
    }

    /// Nearest neighbors among the given catalog positions, which must be in catalog order.
    /// Positions outside the index are ignored.
    pub fn search_among(&self, query: &FeatureVector, k: usize, indices: &[usize]) -> Vec<Neighbor> {
        self.search_where(query, k, |index| indices.binary_search(&index).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> FeatureVector {
        [x, y, 0.0, 0.0, 0.0]
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(euclidean_distance(&v(0.0, 0.0), &v(3.0, 4.0)), 5.0);
        assert_eq!(euclidean_distance(&v(1.0, 1.0), &v(1.0, 1.0)), 0.0);
    }

    #[test]
    fn returns_k_closest_ascending() {
        let candidates = vec![v(10.0, 0.0), v(1.0, 0.0), v(5.0, 0.0), v(2.0, 0.0)];
        let result = nearest(&v(0.0, 0.0), &candidates, 3);
        let indices: Vec<usize> = result.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![1, 3, 2]);
        assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn k_is_clamped_to_candidate_count() {
        let candidates = vec![v(1.0, 0.0), v(2.0, 0.0)];
        assert_eq!(nearest(&v(0.0, 0.0), &candidates, 10).len(), 2);
        assert!(nearest(&v(0.0, 0.0), &candidates, 0).is_empty());
    }

    #[test]
    fn empty_candidates_give_empty_result() {
        assert!(nearest(&v(0.0, 0.0), &[], 3).is_empty());
        assert!(NeighborIndex::default().search(&v(0.0, 0.0), 3).is_empty());
    }

    #[test]
    fn ties_keep_candidate_order() {
        let candidates = vec![v(0.0, 1.0), v(1.0, 0.0), v(-1.0, 0.0), v(0.0, -1.0)];
        let result = nearest(&v(0.0, 0.0), &candidates, 4);
        let indices: Vec<usize> = result.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn filtered_search_reports_catalog_positions() {
        let index = NeighborIndex::new(vec![v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0), v(3.0, 0.0)]);
        let query = v(0.0, 0.0);

        let odd = index.search_where(&query, 5, |i| i % 2 == 1);
        let indices: Vec<usize> = odd.iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![1, 3]);

        let among = index.search_among(&query, 1, &[2, 3, 42]);
        assert_eq!(among.len(), 1);
        assert_eq!(among[0].index, 2);
        assert_eq!(among[0].distance, 2.0);
    }

    #[test]
    fn filtered_search_matches_subset_search() {
        let vectors = vec![v(4.0, 1.0), v(0.5, 2.0), v(3.0, 3.0), v(1.0, 1.0), v(2.0, 0.0)];
        let index = NeighborIndex::new(vectors.clone());
        let query = v(1.0, 0.0);
        let subset = [1, 2, 4];

        let from_index = index.search_among(&query, 2, &subset);
        let subset_vectors: Vec<FeatureVector> = subset.iter().map(|&i| vectors[i]).collect();
        let from_subset: Vec<Neighbor> = nearest(&query, &subset_vectors, 2)
            .into_iter()
            .map(|n| Neighbor {
                index: subset[n.index],
                distance: n.distance,
            })
            .collect();

        assert_eq!(from_index, from_subset);
    }
}
