//! Curvilinear face matching: point-coincidence detection of block
//! interfaces.
//!
//! The only adjacency signal between two curvilinear blocks is point
//! coincidence on their boundary faces. For each of the 36 ordered face
//! pairs, the four corners of the querying face are probed against a
//! static point locator over the other face; every coincident corner
//! seeds sweeps along both in-plane axes in all four direction
//! combinations, and the largest connected 2D sub-grid over which every
//! probed point pair coincides wins. A strictly larger sub-grid replaces
//! the best-so-far: an edge caught on one face pair must yield to a whole
//! face found on another. Matching runs from both sides because the fit
//! is asymmetric: the querying grid must be consumed to one of its
//! corners.
//!
//! A successful fit is canonicalized so the local interface grid sweeps in
//! +x, +y order, negating the paired orientations as needed. Once a fit
//! that is non-degenerate on both in-plane axes is found, the search
//! stops.

use crate::block::structure::Grid2D;
use crate::grid::coords::float_eq;
use crate::grid::curvilinear::FacePatch;
use crate::grid::extent::{face_axes, Extent};
use crate::grid::locator::StaticPointLocator;

/// A matched interface: the 2D sub-grid in the local frame and its
/// counterpart in the remote frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceFit {
    pub local: Grid2D,
    pub remote: Grid2D,
}

const SWEEP: [i64; 2] = [1, -1];

#[inline]
fn points_coincide(a: [f64; 3], b: [f64; 3]) -> bool {
    float_eq(a[0], b[0]) && float_eq(a[1], b[1]) && float_eq(a[2], b[2])
}

/// Find the largest matching interface between the outer point layers of
/// two blocks, or `None` when no face pair fits.
pub fn fit_faces(local_faces: &[FacePatch; 6], remote_faces: &[FacePatch; 6]) -> Option<FaceFit> {
    let remote_locators: Vec<StaticPointLocator<'_>> = remote_faces
        .iter()
        .map(|f| StaticPointLocator::build(&f.points))
        .collect();

    let mut best: Option<FaceFit> = None;

    for local_id in 0..6 {
        let local_locator = StaticPointLocator::build(&local_faces[local_id].points);
        for remote_id in 0..6 {
            let fitted = grids_fit(
                &mut best,
                true,
                &local_faces[local_id],
                local_id,
                &remote_faces[remote_id],
                &remote_locators[remote_id],
                remote_id,
            ) || grids_fit(
                &mut best,
                false,
                &remote_faces[remote_id],
                remote_id,
                &local_faces[local_id],
                &local_locator,
                local_id,
            );
            if !fitted {
                continue;
            }
            let fit = best.as_mut().expect("fitted implies a recorded interface");
            canonicalize(&mut fit.local, &mut fit.remote);

            // A full 2D face match cannot be beaten; stop searching.
            if fit.remote.span_x() != 0 && fit.remote.span_y() != 0 {
                return best;
            }
        }
    }
    best
}

/// Flip both interface grids so the local one sweeps in +x, +y order.
fn canonicalize(local: &mut Grid2D, remote: &mut Grid2D) {
    if local.start_x > local.end_x {
        std::mem::swap(&mut local.start_x, &mut local.end_x);
        local.x_orientation = -local.x_orientation;
        std::mem::swap(&mut remote.start_x, &mut remote.end_x);
        remote.x_orientation = -remote.x_orientation;
    }
    if local.start_y > local.end_y {
        std::mem::swap(&mut local.start_y, &mut local.end_y);
        local.y_orientation = -local.y_orientation;
        std::mem::swap(&mut remote.start_y, &mut remote.end_y);
        remote.y_orientation = -remote.y_orientation;
    }
}

/// Probe the four corners of the query face against the target face and
/// sweep from every coincident corner. `query_is_local` orients the
/// recording: the query-side grid lands in the local slot of `best` when
/// set, in the remote slot otherwise.
#[allow(clippy::too_many_arguments)]
fn grids_fit(
    best: &mut Option<FaceFit>,
    query_is_local: bool,
    query: &FacePatch,
    query_id: usize,
    target: &FacePatch,
    locator: &StaticPointLocator<'_>,
    target_id: usize,
) -> bool {
    let q_ext = &query.extent;
    let (qx_dim, qy_dim) = face_axes(query_id);
    let x_corners = [q_ext[qx_dim], q_ext[qx_dim + 1]];
    let y_corners = [q_ext[qy_dim], q_ext[qy_dim + 1]];

    let mut query_ijk = [0i64; 3];
    query_ijk[query_id / 2] = q_ext[query_id];

    let mut found = false;
    for xc in 0..2 {
        query_ijk[qx_dim / 2] = x_corners[xc];
        for yc in 0..2 {
            query_ijk[qy_dim / 2] = y_corners[yc];
            let qp = query.point(query_ijk);
            let pid = match locator.find_closest(qp) {
                Some(pid) => pid,
                None => continue,
            };
            if !points_coincide(target.points[pid], qp) {
                continue;
            }
            if sweep_grids(
                best,
                query_is_local,
                query,
                query_id,
                qx_dim,
                x_corners[xc],
                x_corners[(xc + 1) % 2],
                SWEEP[xc],
                qy_dim,
                y_corners[yc],
                y_corners[(yc + 1) % 2],
                SWEEP[yc],
                target,
                pid,
                target_id,
            ) {
                found = true;
            }
        }
    }
    found
}

/// Sweep both grids point by point from a coincident corner, in all four
/// target direction combinations, recording into `best` every connected
/// sub-grid strictly larger than the best-so-far.
#[allow(clippy::too_many_arguments)]
fn sweep_grids(
    best: &mut Option<FaceFit>,
    query_is_local: bool,
    query: &FacePatch,
    query_id: usize,
    qx_dim: usize,
    qx_begin: i64,
    qx_end: i64,
    dir_x: i64,
    qy_dim: usize,
    qy_begin: i64,
    qy_end: i64,
    dir_y: i64,
    target: &FacePatch,
    start_pid: usize,
    target_id: usize,
) -> bool {
    let q_ext = &query.extent;
    let t_ext = &target.extent;
    let (tx_dim, ty_dim) = face_axes(target_id);

    let start_ijk = t_ext.point_ijk(start_pid);
    let x_corners = [t_ext[tx_dim], t_ext[tx_dim + 1]];
    let y_corners = [t_ext[ty_dim], t_ext[ty_dim + 1]];
    let x_begin = start_ijk[tx_dim / 2];
    let y_begin = start_ijk[ty_dim / 2];

    let mut query_ijk = [0i64; 3];
    query_ijk[query_id / 2] = q_ext[query_id];

    let mut found = false;
    for xc in 0..2 {
        for yc in 0..2 {
            let mut ijk = start_ijk;
            let mut fitting = true;
            let mut q_x = qx_begin;
            let mut q_y = qy_begin;
            let mut x = x_begin;
            let mut y = y_begin;

            while fitting && q_x != qx_end + dir_x && x != x_corners[(xc + 1) % 2] + SWEEP[xc] {
                query_ijk[qx_dim / 2] = q_x;
                ijk[tx_dim / 2] = x;
                q_y = qy_begin;
                y = y_begin;
                while fitting && q_y != qy_end + dir_y && y != y_corners[(yc + 1) % 2] + SWEEP[yc] {
                    query_ijk[qy_dim / 2] = q_y;
                    ijk[ty_dim / 2] = y;
                    if !points_coincide(query.point(query_ijk), target.point(ijk)) {
                        fitting = false;
                    }
                    q_y += dir_y;
                    y += SWEEP[yc];
                }
                q_x += dir_x;
                x += SWEEP[xc];
            }
            q_x -= dir_x;
            q_y -= dir_y;
            x -= SWEEP[xc];
            y -= SWEEP[yc];

            if !fitting {
                continue;
            }
            let span_x = (q_x - qx_begin).abs();
            let span_y = (q_y - qy_begin).abs();
            let strictly_larger = match best {
                None => true,
                Some(b) => {
                    span_x >= b.local.span_x()
                        && span_y >= b.local.span_y()
                        && (span_x > b.local.span_x() || span_y > b.local.span_y())
                }
            };
            if !strictly_larger {
                continue;
            }

            let query_grid = Grid2D {
                start_x: qx_begin,
                end_x: q_x,
                start_y: qy_begin,
                end_y: q_y,
                x_orientation: dir_x,
                y_orientation: dir_y,
                extent_id: query_id,
            };
            let target_grid = Grid2D {
                start_x: x_begin,
                end_x: x,
                start_y: y_begin,
                end_y: y,
                x_orientation: SWEEP[xc],
                y_orientation: SWEEP[yc],
                extent_id: target_id,
            };
            *best = Some(if query_is_local {
                FaceFit {
                    local: query_grid,
                    remote: target_grid,
                }
            } else {
                FaceFit {
                    local: target_grid,
                    remote: query_grid,
                }
            });
            found = true;
        }
    }
    found
}

/// Re-express the remote extent in the local frame from a matched
/// interface: the in-plane pair comes from the local sub-grid, the
/// out-of-plane pair is the local face's plane followed by the remote's
/// face-normal depth on the neighbor's side of the plane.
pub fn shifted_extent_from_interface(
    local_extent: &Extent,
    remote_extent: &Extent,
    fit: &FaceFit,
) -> Extent {
    let mut shifted = *remote_extent;
    let (xdim, ydim) = face_axes(fit.local.extent_id);
    shifted[xdim] = fit.local.start_x;
    shifted[xdim + 1] = fit.local.end_x;
    shifted[ydim] = fit.local.start_y;
    shifted[ydim + 1] = fit.local.end_y;

    let depth =
        (remote_extent[fit.remote.extent_id] - remote_extent[fit.remote.extent_id ^ 1]).abs();
    let plane = local_extent[fit.local.extent_id];
    let axis = fit.local.extent_id / 2;
    if fit.local.extent_id % 2 == 1 {
        shifted[2 * axis] = plane;
        shifted[2 * axis + 1] = plane + depth;
    } else {
        shifted[2 * axis + 1] = plane;
        shifted[2 * axis] = plane - depth;
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::curvilinear::{extract_outer_layer, CurvilinearGrid};

    /// A grid whose points are the index triple mapped through `f`.
    fn grid_with(extent: Extent, f: impl Fn([i64; 3]) -> [f64; 3]) -> CurvilinearGrid {
        let mut points = vec![[0.0; 3]; extent.num_points()];
        for id in 0..extent.num_points() {
            points[id] = f(extent.point_ijk(id));
        }
        CurvilinearGrid { extent, points }
    }

    fn layers(g: &CurvilinearGrid) -> [FacePatch; 6] {
        std::array::from_fn(|side| extract_outer_layer(g, &g.extent, side))
    }

    fn identity(ijk: [i64; 3]) -> [f64; 3] {
        [ijk[0] as f64, ijk[1] as f64, ijk[2] as f64]
    }

    #[test]
    fn aligned_blocks_share_full_face() {
        // Two unit-spaced boxes abutting on the i axis.
        let a = grid_with(Extent::new([0, 3, 0, 3, 0, 3]), identity);
        let b = grid_with(Extent::new([0, 3, 0, 3, 0, 3]), |ijk| {
            [(ijk[0] + 3) as f64, ijk[1] as f64, ijk[2] as f64]
        });
        let fit = fit_faces(&layers(&a), &layers(&b)).expect("faces should fit");
        // The local interface lies on a's right face and spans it fully.
        assert_eq!(fit.local.extent_id, 1);
        assert_eq!(fit.remote.extent_id, 0);
        assert_eq!((fit.local.start_x, fit.local.end_x), (0, 3));
        assert_eq!((fit.local.start_y, fit.local.end_y), (0, 3));
        assert_eq!(fit.local.x_orientation, 1);
        assert_eq!(fit.local.y_orientation, 1);

        let shifted = shifted_extent_from_interface(&a.extent, &b.extent, &fit);
        assert_eq!(shifted, Extent::new([3, 6, 0, 3, 0, 3]));
    }

    #[test]
    fn rotated_interface_face_and_orientation() {
        // The neighbor's j axis points into its interior along +x and its
        // k axis runs against our j: the match lands on the neighbor's
        // front face with a negated x orientation.
        let a = grid_with(Extent::new([0, 2, 0, 3, 0, 4]), identity);
        let b = grid_with(Extent::new([0, 4, 0, 2, 0, 3]), |ijk| {
            [(ijk[1] + 2) as f64, (3 - ijk[2]) as f64, ijk[0] as f64]
        });
        let fit = fit_faces(&layers(&a), &layers(&b)).expect("faces should fit");
        assert_eq!(fit.local.extent_id, 1);
        assert_eq!(fit.remote.extent_id, 2);
        // Canonical local sweep; the rotation shows up in the remote
        // orientation pair.
        assert_eq!((fit.local.start_x, fit.local.end_x), (0, 3));
        assert_eq!((fit.local.start_y, fit.local.end_y), (0, 4));
        assert_eq!(fit.local.x_orientation, 1);
        assert_eq!(fit.local.y_orientation, 1);
        assert_eq!(fit.remote.x_orientation, -1);
        assert_eq!(fit.remote.y_orientation, 1);

        let shifted = shifted_extent_from_interface(&a.extent, &b.extent, &fit);
        assert_eq!(shifted, Extent::new([2, 4, 0, 3, 0, 4]));
    }

    #[test]
    fn disjoint_blocks_do_not_fit() {
        let a = grid_with(Extent::new([0, 2, 0, 2, 0, 2]), identity);
        let b = grid_with(Extent::new([0, 2, 0, 2, 0, 2]), |ijk| {
            [(ijk[0] + 10) as f64, ijk[1] as f64, ijk[2] as f64]
        });
        assert!(fit_faces(&layers(&a), &layers(&b)).is_none());
    }

    #[test]
    fn edge_contact_yields_degenerate_interface() {
        // Blocks sharing only an edge: the interface collapses on one
        // in-plane axis.
        let a = grid_with(Extent::new([0, 2, 0, 2, 0, 2]), identity);
        let b = grid_with(Extent::new([0, 2, 0, 2, 0, 2]), |ijk| {
            [(ijk[0] + 2) as f64, (ijk[1] + 2) as f64, ijk[2] as f64]
        });
        let fit = fit_faces(&layers(&a), &layers(&b)).expect("edge should fit");
        assert!(fit.remote.span_x() == 0 || fit.remote.span_y() == 0);
    }
}
