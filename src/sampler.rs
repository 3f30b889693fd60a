/*

    Voxel grid over a model's bounding box.

    The box is cut into quality x quality x quality cells and
    every cell center is handed to a ContainmentOracle. Cells
    are visited in (i, j, k) lexicographic order, and that order
    is kept in the output: it decides the auto_<n> naming later.

    Cost grows with quality^3. Large values are slow, not wrong.

    @date: Nov, 2025
*/

use rayon::prelude::*;

use crate::bbox::BBox;
use crate::error::{EditorError, EditorResult};
use crate::mesh::Model;
use crate::oracle::ContainmentOracle;
use crate::prelude::*;


/// Grid geometry for one auto-generation request. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub quality: usize,
    pub origin: Vector3,
    pub cell_size: Vector3,
}

impl GridSpec {
    pub fn new(bbox: &BBox, quality: usize) -> EditorResult<Self> {
        if quality == 0 {
            return Err(EditorError::InvalidQuality(quality));
        }
        // Degenerate axes end up with a zero step, centers then sit on the flat plane
        let cell_size = bbox.size() / quality as Float;
        Ok(Self {
            quality,
            origin: bbox.min,
            cell_size,
        })
    }

    /// min + (index + 0.5) * cellSize, componentwise.
    #[inline]
    pub fn cell_center(&self, index: [usize; 3]) -> Vector3 {
        let idx = Vector3::new(index[0] as Float, index[1] as Float, index[2] as Float);
        self.origin + (idx + Vector3::splat(0.5)) * self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.quality.pow(3)
    }

    /// Inverse of the lexicographic enumeration: n -> (i, j, k).
    #[inline]
    pub fn index_of(&self, n: usize) -> [usize; 3] {
        let q = self.quality;
        [n / (q * q), (n / q) % q, n % q]
    }
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub index: [usize; 3],
    pub center: Vector3,
    pub cell_size: Vector3,
}


/// Walk every cell of the grid and keep the ones `oracle` accepts, in (i, j, k) order.
/// `parallel` spreads the oracle calls over rayon's pool, the output is identical.
pub fn sample(model: &Model, quality: usize, oracle: &dyn ContainmentOracle, parallel: bool) -> EditorResult<Vec<CellSample>> {

    let bbox = model.bbox();
    let grid = GridSpec::new(&bbox, quality)?;

    if bbox.is_empty() {
        warn!("Model '{}' has no faces, nothing to sample.", model.name);
        return Ok(Vec::new());
    }

    debug!("Sampling {} cells of size {:?} from {:?} with {}", grid.cell_count(), grid.cell_size, grid.origin, oracle.name());

    let evaluate = |n: usize| -> Option<CellSample> {
        let index = grid.index_of(n);
        let center = grid.cell_center(index);
        oracle
            .accepts(&center, &grid, model)
            .then_some(CellSample { index, center, cell_size: grid.cell_size })
    };

    let accepted: Vec<CellSample> = if parallel {
        // Indexed parallel iterators keep the original order on collect
        (0..grid.cell_count()).into_par_iter().filter_map(evaluate).collect()
    } else {
        (0..grid.cell_count()).filter_map(evaluate).collect()
    };

    debug!("{} / {} cells accepted", accepted.len(), grid.cell_count());
    Ok(accepted)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    #[test]
    fn test_grid_geometry() {
        let bbox = BBox::new(Vector3::new(-1., 0., 0.), Vector3::new(1., 4., 2.));
        let grid = GridSpec::new(&bbox, 2).unwrap();
        assert_eq!(grid.cell_size, Vector3::new(1., 2., 1.));
        assert_eq!(grid.cell_center([0, 0, 0]), Vector3::new(-0.5, 1., 0.5));
        assert_eq!(grid.cell_center([1, 1, 1]), Vector3::new(0.5, 3., 1.5));
        assert_eq!(grid.cell_count(), 8);
    }

    #[test]
    fn test_zero_quality_rejected() {
        let bbox = BBox::new(Vector3::ZERO, Vector3::ONE);
        assert!(matches!(GridSpec::new(&bbox, 0), Err(EditorError::InvalidQuality(0))));
    }

    #[test]
    fn test_flat_axis_has_zero_step() {
        let bbox = BBox::new(Vector3::ZERO, Vector3::new(1., 1., 0.));
        let grid = GridSpec::new(&bbox, 4).unwrap();
        assert_eq!(grid.cell_size.z, 0.0);
        assert_eq!(grid.cell_center([3, 3, 3]).z, 0.0);
    }

    #[test]
    fn test_index_of_is_lexicographic() {
        let grid = GridSpec::new(&BBox::new(Vector3::ZERO, Vector3::ONE), 3).unwrap();
        let mut expected = Vec::new();
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    expected.push([i, j, k]);
                }
            }
        }
        let got: Vec<[usize; 3]> = (0..grid.cell_count()).map(|n| grid.index_of(n)).collect();
        assert_eq!(got, expected);
    }

    /// Accepts points inside a fixed box, ignores the model.
    #[derive(Debug)]
    struct BoxOracle(BBox);

    impl ContainmentOracle for BoxOracle {
        fn name(&self) -> &'static str { "box" }
        fn accepts(&self, point: &Vector3, _grid: &GridSpec, _model: &Model) -> bool {
            (0..3).all(|axis| self.0.axis(axis).contains(component(point, axis)))
        }
    }

    fn flat_square() -> Model {
        use crate::scene::{MeshNode, SceneNode};
        let positions = vec![Vector3::ZERO, Vector3::new(4., 0., 0.), Vector3::new(4., 4., 4.), Vector3::new(0., 4., 4.)];
        let node = MeshNode::new("quad", positions, vec![[0, 1, 2], [0, 2, 3]]);
        Model::from_scene(&SceneNode::group("root", vec![SceneNode::Mesh(node)]), 4)
    }

    #[test]
    fn test_sample_order_and_filter() {
        let model = flat_square();
        let oracle = BoxOracle(BBox::new_from(&Interval::new(0., 2.), &Interval::UNIVERSE, &Interval::new(2., 4.)));
        let cells = sample(&model, 4, &oracle, false).unwrap();
        // x centers 0.5, 1.5 and z centers 2.5, 3.5 pass, every y passes
        assert_eq!(cells.len(), 2 * 4 * 2);
        assert_eq!(cells[0].index, [0, 0, 2]);
        assert_eq!(cells[1].index, [0, 0, 3]);
        assert_eq!(cells[2].index, [0, 1, 2]);
        assert!(cells.windows(2).all(|w| w[0].index < w[1].index));
        assert_eq!(cells[0].cell_size, Vector3::ONE);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = flat_square();
        let oracle = BoxOracle(BBox::new(Vector3::new(1., 0., 0.), Vector3::new(3., 3., 3.)));
        let seq = sample(&model, 6, &oracle, false).unwrap();
        let par = sample(&model, 6, &oracle, true).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_model_yields_nothing() {
        use crate::scene::SceneNode;
        let model = Model::from_scene(&SceneNode::group("empty", vec![]), 4);
        let oracle = BoxOracle(BBox::new_from(&Interval::UNIVERSE, &Interval::UNIVERSE, &Interval::UNIVERSE));
        assert!(sample(&model, 3, &oracle, false).unwrap().is_empty());
        assert!(sample(&model, 0, &oracle, false).is_err());
    }
}
